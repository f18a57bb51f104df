//! The `CopyDefaultValuesToActual` phase.

use indexmap::IndexMap;
use kiln_ir::{DeclId, Expr, IrGraph, ModuleId, Symbol, SymbolRemapper};
use tracing::debug;

use super::ModuleInput;
use crate::pipeline::{CompilationContext, ExecutionFault, NamedPhase, default_ir_actions};

/// Copy default parameter values from expect declarations to their actuals.
pub fn copy_default_values_to_actual_phase<'a>() -> NamedPhase<ModuleInput<'a>, ModuleInput<'a>> {
    NamedPhase::new(
        "CopyDefaultValuesToActual",
        "Copy default values from expect to actual declarations",
        copy_default_values,
    )
    .pre_actions(default_ir_actions())
    .post_actions(default_ir_actions())
}

fn copy_default_values<'a>(
    _ctx: &mut CompilationContext,
    input: ModuleInput<'a>,
) -> Result<ModuleInput<'a>, ExecutionFault> {
    let copied = DefaultValueCopier::new(&mut *input.graph, input.module).process()?;
    debug!(copied, "default values copied to actual declarations");
    Ok(input)
}

/// Rewrites references from expect declarations to their actuals.
struct ExpectToActualRemapper {
    declarations: IndexMap<DeclId, DeclId>,
    symbols: IndexMap<Symbol, Symbol>,
}

impl SymbolRemapper for ExpectToActualRemapper {
    fn remap_symbol(&self, symbol: Symbol) -> Symbol {
        self.symbols.get(&symbol).copied().unwrap_or(symbol)
    }

    fn remap_declaration(&self, decl: DeclId) -> DeclId {
        self.declarations.get(&decl).copied().unwrap_or(decl)
    }
}

/// Propagates parameter defaults along the module's expect/actual table.
///
/// A default is copied only where the actual parameter has none; a default
/// written on the actual always wins. Copies are rescoped: parameter reads of
/// the expect function become reads of the actual one, and references to any
/// paired expect declaration point at its actual.
pub struct DefaultValueCopier<'g> {
    graph: &'g mut IrGraph,
    module: ModuleId,
}

impl<'g> DefaultValueCopier<'g> {
    pub fn new(graph: &'g mut IrGraph, module: ModuleId) -> Self {
        Self { graph, module }
    }

    /// Copy the defaults, returning how many were attached.
    ///
    /// # Errors
    ///
    /// Fails with [`ExecutionFault::MalformedIr`] if a pair refers to a
    /// missing declaration or pairs functions of different arity.
    pub fn process(self) -> Result<usize, ExecutionFault> {
        let pairs: Vec<_> = self.graph.module(self.module).expect_actual.pairs().collect();
        if pairs.is_empty() {
            return Ok(0);
        }

        let remapper = self.remapper(&pairs)?;
        let mut copied = 0;
        for (expect, actual) in pairs {
            let (Some(expect_fn), Some(actual_fn)) = (
                self.graph.decl(expect).as_function(),
                self.graph.decl(actual).as_function(),
            ) else {
                continue;
            };
            if expect_fn.params.len() != actual_fn.params.len() {
                return Err(ExecutionFault::malformed(format!(
                    "expect '{}' has {} parameter(s) but actual '{}' has {}",
                    self.graph.fq_name_of(expect),
                    expect_fn.params.len(),
                    self.graph.fq_name_of(actual),
                    actual_fn.params.len()
                )));
            }

            let defaults: Vec<(usize, Expr)> = expect_fn
                .params
                .iter()
                .zip(&actual_fn.params)
                .enumerate()
                .filter_map(|(index, (from, to))| match (&from.default, &to.default) {
                    (Some(default), None) => Some((index, default.remapped(&remapper))),
                    _ => None,
                })
                .collect();

            if let Some(target) = self.graph.decl_mut(actual).as_function_mut() {
                for (index, default) in defaults {
                    target.params[index].default = Some(default);
                    copied += 1;
                }
            }
        }
        Ok(copied)
    }

    fn remapper(&self, pairs: &[(DeclId, DeclId)]) -> Result<ExpectToActualRemapper, ExecutionFault> {
        let mut remapper = ExpectToActualRemapper {
            declarations: IndexMap::new(),
            symbols: IndexMap::new(),
        };
        let symbols = self.graph.symbols();
        for &(expect, actual) in pairs {
            for decl in [expect, actual] {
                if self.graph.try_file_of(decl).is_none() {
                    return Err(ExecutionFault::malformed(format!(
                        "expect/actual table refers to {} which is missing or not attached to a file",
                        decl
                    )));
                }
            }
            remapper.declarations.insert(expect, actual);
            if let (Some(from), Some(to)) = (symbols.symbol_of(expect), symbols.symbol_of(actual)) {
                remapper.symbols.insert(from, to);
            }
        }
        Ok(remapper)
    }
}

#[cfg(test)]
mod tests {
    use kiln_config::CompilerConfig;
    use kiln_ir::{Declaration, Function, IrType, ValueParameter};

    use super::*;
    use crate::pipeline::{PhaseEngine, PhaseError};

    struct Program {
        graph: IrGraph,
        module: ModuleId,
        expect: DeclId,
        actual: DeclId,
    }

    /// `expect fun connect(host: String, port: Int = defaultPort(host))`
    /// paired with an actual taking `actual_port_default` as its port default.
    fn program(actual_port_default: Option<Expr>) -> Program {
        let mut graph = IrGraph::new();
        let module = graph.add_module("app");
        let common = graph.add_file(module, "common/net.kiln", "app.net");
        let native = graph.add_file(module, "native/net.kiln", "app.net");

        let expect_default_port = graph.add_declaration(
            common,
            Declaration::function(
                "defaultPort",
                Function::new(IrType::int()).with_param(ValueParameter::new("host", IrType::string())),
            )
            .expect(),
        );
        let expect_default_port_symbol = graph.declare_symbol(expect_default_port);

        let expect = graph.add_declaration(
            common,
            Declaration::function("connect", Function::new(IrType::unit())).expect(),
        );
        graph.declare_symbol(expect);
        let port_default = Expr::call(
            expect_default_port_symbol,
            vec![Expr::GetParam {
                owner: expect,
                index: 0,
            }],
        );
        let function = graph.decl_mut(expect).as_function_mut().unwrap();
        function.params = vec![
            ValueParameter::new("host", IrType::string()),
            ValueParameter::new("port", IrType::int()).with_default(port_default),
        ];

        // Actual declarations live in a file of their own, under distinct names.
        let actual_default_port = graph.add_declaration(
            native,
            Declaration::function(
                "defaultPortImpl",
                Function::new(IrType::int()).with_param(ValueParameter::new("host", IrType::string())),
            ),
        );
        graph.declare_symbol(actual_default_port);
        let mut port = ValueParameter::new("port", IrType::int());
        port.default = actual_port_default;
        let actual = graph.add_declaration(
            native,
            Declaration::function(
                "connectImpl",
                Function::new(IrType::unit())
                    .with_param(ValueParameter::new("host", IrType::string()))
                    .with_param(port),
            ),
        );
        graph.declare_symbol(actual);

        let table = &mut graph.module_mut(module).expect_actual;
        table.insert(expect_default_port, actual_default_port);
        table.insert(expect, actual);

        Program {
            graph,
            module,
            expect,
            actual,
        }
    }

    fn port_default(graph: &IrGraph, decl: DeclId) -> Option<&Expr> {
        graph.decl(decl).as_function().unwrap().params[1].default.as_ref()
    }

    #[test]
    fn test_default_copied_and_rescoped() {
        let mut program = program(None);
        let actual_default_port = program
            .graph
            .symbols()
            .lookup(&"app.net.defaultPortImpl".into())
            .unwrap();

        let copied = DefaultValueCopier::new(&mut program.graph, program.module)
            .process()
            .unwrap();

        assert_eq!(copied, 1);
        assert_eq!(
            port_default(&program.graph, program.actual),
            Some(&Expr::call(
                actual_default_port,
                vec![Expr::GetParam {
                    owner: program.actual,
                    index: 0,
                }],
            ))
        );
        assert!(kiln_ir::verify_module(&program.graph, program.module).is_empty());
    }

    #[test]
    fn test_actual_default_wins() {
        let mut program = program(Some(Expr::int(8080)));
        let expect_before = port_default(&program.graph, program.expect).cloned();

        let copied = DefaultValueCopier::new(&mut program.graph, program.module)
            .process()
            .unwrap();

        assert_eq!(copied, 0);
        assert_eq!(port_default(&program.graph, program.actual), Some(&Expr::int(8080)));
        assert_eq!(port_default(&program.graph, program.expect).cloned(), expect_before);
    }

    #[test]
    fn test_no_pairs_is_noop() {
        let mut graph = IrGraph::new();
        let module = graph.add_module("app");

        let copied = DefaultValueCopier::new(&mut graph, module).process().unwrap();

        assert_eq!(copied, 0);
    }

    #[test]
    fn test_arity_mismatch_fails() {
        let mut program = program(None);
        program
            .graph
            .decl_mut(program.actual)
            .as_function_mut()
            .unwrap()
            .params
            .pop();

        let err = DefaultValueCopier::new(&mut program.graph, program.module)
            .process()
            .unwrap_err();

        assert!(matches!(err, ExecutionFault::MalformedIr { .. }));
    }

    #[test]
    fn test_phase_validates_around_copy() {
        let mut program = program(None);
        let mut config = CompilerConfig::default();
        config.phases.validate = kiln_config::PhaseSet::All;
        let mut ctx = CompilationContext::new(config);
        let mut engine = PhaseEngine::new(&mut ctx);

        let result = engine.run_phase(
            &copy_default_values_to_actual_phase(),
            ModuleInput::new(&mut program.graph, program.module),
        );

        assert!(result.is_ok());
        assert_eq!(engine.executed(), ["CopyDefaultValuesToActual"]);
    }

    #[test]
    fn test_phase_reports_malformed_pairs() {
        let mut graph = IrGraph::new();
        let module = graph.add_module("app");
        graph
            .module_mut(module)
            .expect_actual
            .insert(DeclId::new(10), DeclId::new(11));
        let mut ctx = CompilationContext::new(CompilerConfig::default());

        let err = PhaseEngine::new(&mut ctx)
            .run_phase(
                &copy_default_values_to_actual_phase(),
                ModuleInput::new(&mut graph, module),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            PhaseError::Execution {
                phase: "CopyDefaultValuesToActual",
                fault: ExecutionFault::MalformedIr { .. }
            }
        ));
    }
}
