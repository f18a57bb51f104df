//! The `addEntryPoint` phase.

use kiln_ir::{
    DeclId, DeclOrigin, Declaration, Expr, FileId, Function, IrGraph, IrType, ModuleId,
    ValueParameter,
};
use tracing::info;

use super::ModuleInput;
use crate::{
    ENTRY_ROUTINE_NAME, OutputUnit,
    pipeline::{CompilationContext, ExecutionFault, NamedPhase, default_ir_actions},
};

/// Path of the synthetic file holding the entry routine when the user entry
/// point lives outside the output unit.
pub const ENTRY_POINT_FILE: &str = "entryPointOwner";

/// Package of [`ENTRY_POINT_FILE`].
pub const ENTRY_POINT_PACKAGE: &str = "kiln.native.internal.abi";

/// Synthesize the routine the runtime calls at process start.
pub fn entry_point_phase<'a>() -> NamedPhase<ModuleInput<'a>, ModuleInput<'a>> {
    NamedPhase::new("addEntryPoint", "Add entry point for program", add_entry_point)
        .pre_actions(default_ir_actions())
        .post_actions(default_ir_actions())
}

fn add_entry_point<'a>(
    ctx: &mut CompilationContext,
    input: ModuleInput<'a>,
) -> Result<ModuleInput<'a>, ExecutionFault> {
    let unresolved = || ExecutionFault::UnresolvedEntryPoint {
        name: ctx.config.entry.name.clone(),
    };
    let symbol = ctx.symbols.entry_point.ok_or_else(unresolved)?;
    let entry = input
        .graph
        .symbols()
        .owner(symbol)
        .filter(|decl| input.graph.get_decl(*decl).is_some())
        .ok_or_else(unresolved)?;
    let owner_file = input.graph.try_file_of(entry).ok_or_else(|| {
        ExecutionFault::malformed(format!(
            "entry point '{}' is bound to {} which is not attached to a file",
            ctx.config.entry.name, entry
        ))
    })?;

    let Some(entry_fn) = input.graph.decl(entry).as_function() else {
        return Err(ExecutionFault::malformed(format!(
            "entry point '{}' is not a function",
            input.graph.fq_name_of(entry)
        )));
    };
    let forwards_args = entry_fn.params.len() == 1;
    let returns_int = entry_fn.return_type == IrType::int();

    if let Some(existing) = existing_entry_routine(input.graph, input.module, &ctx.output_unit) {
        return Err(ExecutionFault::malformed(format!(
            "entry routine '{}' already exists",
            input.graph.fq_name_of(existing)
        )));
    }

    let file = target_file(input.graph, input.module, &ctx.output_unit, owner_file);
    let routine = synthesize(input.graph, file, symbol, forwards_args, returns_int);
    info!(
        entry = %input.graph.fq_name_of(entry),
        routine = %input.graph.fq_name_of(routine),
        "entry routine added"
    );
    Ok(input)
}

/// An entry routine already present in the compiled module or the output unit.
fn existing_entry_routine(graph: &IrGraph, module: ModuleId, unit: &OutputUnit) -> Option<DeclId> {
    graph
        .modules()
        .filter(|(id, data)| *id == module || unit.contains_module(&data.name))
        .flat_map(|(id, _)| graph.declarations_in_module(id))
        .find(|decl| graph.decl(*decl).origin == DeclOrigin::EntryPoint)
}

fn target_file(graph: &mut IrGraph, module: ModuleId, unit: &OutputUnit, owner: FileId) -> FileId {
    if unit.contains_file(graph, owner) {
        owner
    } else {
        graph.add_file(module, ENTRY_POINT_FILE, ENTRY_POINT_PACKAGE)
    }
}

fn synthesize(
    graph: &mut IrGraph,
    file: FileId,
    entry: kiln_ir::Symbol,
    forwards_args: bool,
    returns_int: bool,
) -> DeclId {
    let args = ValueParameter::new("args", graph.builtins().string_array_type());
    let routine = graph.add_declaration(
        file,
        Declaration::function(ENTRY_ROUTINE_NAME, Function::new(IrType::int()).with_param(args))
            .with_origin(DeclOrigin::EntryPoint),
    );

    let call_args = if forwards_args {
        vec![Expr::GetParam {
            owner: routine,
            index: 0,
        }]
    } else {
        Vec::new()
    };
    let call = Expr::call(entry, call_args);
    let body = if returns_int {
        Expr::Return {
            value: Box::new(call),
        }
    } else {
        Expr::Block {
            statements: vec![
                call,
                Expr::Return {
                    value: Box::new(Expr::int(0)),
                },
            ],
        }
    };
    if let Some(function) = graph.decl_mut(routine).as_function_mut() {
        function.body = Some(body);
    }
    graph.declare_symbol(routine);
    routine
}

#[cfg(test)]
mod tests {
    use kiln_config::{CompilerConfig, OutputKind};
    use kiln_ir::{FqName, render_module, verify_module};

    use super::*;
    use crate::{
        BackendSymbols,
        pipeline::{PhaseEngine, PhaseError},
    };

    struct Program {
        graph: IrGraph,
        app: ModuleId,
    }

    /// `app` holds `fun main(args: Array<String>)`; `launcher` holds the test
    /// launcher `fun testMain()`.
    fn program() -> Program {
        let mut graph = IrGraph::new();
        let app = graph.add_module("app");
        let launcher = graph.add_module("launcher");
        let main_file = graph.add_file(app, "src/main.kiln", "app");
        let launcher_file = graph.add_file(launcher, "test/launcher.kiln", "kiln.test");

        let main = graph.add_declaration(
            main_file,
            Declaration::function(
                "main",
                Function::new(IrType::unit())
                    .with_param(ValueParameter::new("args", IrType::array(IrType::string()))),
            ),
        );
        graph.declare_symbol(main);
        let test_main = graph.add_declaration(
            launcher_file,
            Declaration::function("testMain", Function::new(IrType::int())),
        );
        graph.declare_symbol(test_main);

        Program { graph, app }
    }

    fn context(graph: &IrGraph, entry: &str, kind: OutputKind) -> CompilationContext {
        let mut config = CompilerConfig::default();
        config.entry.name = entry.to_string();
        config.output.kind = kind;
        config.output.modules = vec!["app".to_string()];
        let mut ctx = CompilationContext::new(config);
        ctx.symbols = BackendSymbols::lookup(graph.symbols(), entry);
        ctx
    }

    fn run(program: &mut Program, ctx: &mut CompilationContext) -> Result<(), PhaseError> {
        PhaseEngine::new(ctx)
            .run_phase(&entry_point_phase(), ModuleInput::new(&mut program.graph, program.app))
            .map(|_| ())
    }

    fn entry_routine(graph: &IrGraph) -> DeclId {
        let symbol = graph
            .symbols()
            .lookup(&FqName::new("app.Kiln_start"))
            .or_else(|| {
                graph
                    .symbols()
                    .lookup(&FqName::new("kiln.native.internal.abi.Kiln_start"))
            })
            .unwrap();
        graph.symbols().owner(symbol).unwrap()
    }

    #[test]
    fn test_entry_in_unit_file() {
        let mut program = program();
        let mut ctx = context(&program.graph, "app.main", OutputKind::Executable);

        run(&mut program, &mut ctx).unwrap();

        let graph = &program.graph;
        let routine = entry_routine(graph);
        assert_eq!(graph.file(graph.file_of(routine)).path, "src/main.kiln");
        assert_eq!(graph.decl(routine).origin, DeclOrigin::EntryPoint);
        assert!(verify_module(graph, program.app).is_empty());
        insta::assert_snapshot!(render_module(graph, program.app), @r"
        module app
          file src/main.kiln (package app)
            fun main(args: Array<String>): Unit
            fun Kiln_start(args: Array<String>): Int = { main(args); return 0 }  // entry point
        ");
    }

    #[test]
    fn test_entry_outside_unit_gets_synthetic_file() {
        let mut program = program();
        let mut ctx = context(&program.graph, "kiln.test.testMain", OutputKind::TestRunner);

        run(&mut program, &mut ctx).unwrap();

        let graph = &program.graph;
        let routine = entry_routine(graph);
        let file = graph.file(graph.file_of(routine));
        assert_eq!(file.path, ENTRY_POINT_FILE);
        assert_eq!(file.package, FqName::new(ENTRY_POINT_PACKAGE));
        assert_eq!(file.module, program.app);
        assert_eq!(
            graph.decl(routine).as_function().unwrap().body,
            Some(Expr::Return {
                value: Box::new(Expr::call(
                    ctx.symbols.entry_point.unwrap(),
                    Vec::new()
                )),
            })
        );
    }

    #[test]
    fn test_unresolved_entry_point_fails() {
        let mut program = program();
        let mut ctx = context(&program.graph, "app.missing", OutputKind::Executable);

        let err = run(&mut program, &mut ctx).unwrap_err();

        assert!(matches!(
            err,
            PhaseError::Execution {
                phase: "addEntryPoint",
                fault: ExecutionFault::UnresolvedEntryPoint { ref name },
            } if name == "app.missing"
        ));
        assert_eq!(program.graph.declarations_in_module(program.app).len(), 1);
    }

    #[test]
    fn test_unbound_entry_point_fails() {
        let mut program = program();
        program.graph.symbols_mut().declare("app.declaredOnly");
        let mut ctx = context(&program.graph, "app.declaredOnly", OutputKind::Executable);

        let err = run(&mut program, &mut ctx).unwrap_err();

        assert!(matches!(
            err,
            PhaseError::Execution {
                fault: ExecutionFault::UnresolvedEntryPoint { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_unattached_entry_point_fails() {
        let mut graph: IrGraph = serde_json::from_str(
            r#"{
              "modules": [{ "name": "app" }],
              "declarations": [
                { "name": "main", "kind": "function", "return_type": { "builtin": "unit" } }
              ],
              "symbols": [{ "name": "app.main", "owner": 0 }]
            }"#,
        )
        .unwrap();
        let app = graph.module_by_name("app").unwrap();
        let mut ctx = context(&graph, "app.main", OutputKind::Executable);

        let err = PhaseEngine::new(&mut ctx)
            .run_phase(&entry_point_phase(), ModuleInput::new(&mut graph, app))
            .unwrap_err();

        let PhaseError::Execution {
            fault: ExecutionFault::MalformedIr { message },
            ..
        } = err
        else {
            panic!("expected malformed IR");
        };
        assert_eq!(
            message,
            "entry point 'app.main' is bound to decl#0 which is not attached to a file"
        );
        assert!(graph.module(app).files.is_empty());
    }

    #[test]
    fn test_rerun_fails() {
        let mut program = program();
        let mut ctx = context(&program.graph, "app.main", OutputKind::Executable);
        run(&mut program, &mut ctx).unwrap();

        let err = run(&mut program, &mut ctx).unwrap_err();

        assert!(matches!(
            err,
            PhaseError::Execution {
                fault: ExecutionFault::MalformedIr { .. },
                ..
            }
        ));
        let routines = program
            .graph
            .declarations_in_module(program.app)
            .into_iter()
            .filter(|decl| program.graph.decl(*decl).origin == DeclOrigin::EntryPoint)
            .count();
        assert_eq!(routines, 1);
    }
}
