//! The `SpecialBackendChecks` phase.
//!
//! Backend-imposed well-formedness rules that front-end type checking does
//! not catch: interop intrinsic call shapes, C type arguments, worker jobs,
//! typed intrinsic references and foreign subclassing.
//!
//! Two front-ends feed the backend. The legacy one registers the interop
//! built-ins on the [`CompilationContext`]; the K2 one hands its native
//! built-ins over in the [`Fir2IrOutput`] plugin context. Each variant
//! builds the same [`SpecialBackendChecksTraversal`] from its own inputs.

mod check;
pub mod checks;

use kiln_ir::{DeclKind, Expr, IrBuiltIns, IrGraph, ModuleId};
use tracing::{debug, warn};

pub use check::{BackendCheck, CheckInfo, CheckScope, Violation};
pub use checks::default_checks;

use super::ModuleInput;
use crate::{
    BackendSymbols, InteropBuiltIns, PluginContext,
    pipeline::{
        CompilationContext, Diagnostic, ExecutionFault, IrHolder, NamedPhase, PhaseEngine,
        PhaseError, default_ir_actions,
    },
};

const PHASE_NAME: &str = "SpecialBackendChecks";
const PHASE_DESCRIPTION: &str = "Special backend checks";

/// Input of the legacy checks phase.
#[derive(Debug)]
pub struct SpecialBackendChecksInput<'a> {
    pub module: ModuleInput<'a>,
    pub symbols: BackendSymbols,
}

impl IrHolder for SpecialBackendChecksInput<'_> {
    fn graph(&self) -> &IrGraph {
        self.module.graph()
    }

    fn module(&self) -> ModuleId {
        self.module.module
    }
}

/// What the K2 front-end hands to the backend.
#[derive(Debug)]
pub struct Fir2IrOutput<'a> {
    pub module: ModuleInput<'a>,
    pub symbols: BackendSymbols,
    pub plugin_context: PluginContext,
}

impl IrHolder for Fir2IrOutput<'_> {
    fn graph(&self) -> &IrGraph {
        self.module.graph()
    }

    fn module(&self) -> ModuleId {
        self.module.module
    }
}

/// Checks phase for IR produced by the legacy front-end.
pub fn special_backend_checks_phase<'a>()
-> NamedPhase<SpecialBackendChecksInput<'a>, SpecialBackendChecksInput<'a>> {
    NamedPhase::new(PHASE_NAME, PHASE_DESCRIPTION, legacy_checks)
        .pre_actions(default_ir_actions())
        .post_actions(default_ir_actions())
}

/// Checks phase for IR produced by the K2 front-end.
pub fn k2_special_backend_checks_phase<'a>() -> NamedPhase<Fir2IrOutput<'a>, Fir2IrOutput<'a>> {
    NamedPhase::new(PHASE_NAME, PHASE_DESCRIPTION, k2_checks)
}

/// Run the legacy checks phase over `module`.
pub fn run_special_backend_checks(
    engine: &mut PhaseEngine<'_>,
    module: ModuleInput<'_>,
    symbols: BackendSymbols,
) -> Result<(), PhaseError> {
    let input = SpecialBackendChecksInput { module, symbols };
    engine.run_phase(&special_backend_checks_phase(), input)?;
    Ok(())
}

/// Run the K2 checks phase over the front-end output.
pub fn run_k2_special_backend_checks(
    engine: &mut PhaseEngine<'_>,
    fir2ir_output: Fir2IrOutput<'_>,
) -> Result<(), PhaseError> {
    engine.run_phase(&k2_special_backend_checks_phase(), fir2ir_output)?;
    Ok(())
}

fn legacy_checks<'a>(
    ctx: &mut CompilationContext,
    input: SpecialBackendChecksInput<'a>,
) -> Result<SpecialBackendChecksInput<'a>, ExecutionFault> {
    let interop = ctx
        .interop_builtins
        .clone()
        .ok_or(ExecutionFault::MissingRegistry {
            registry: "interop built-ins",
        })?;
    let graph = input.graph();
    SpecialBackendChecksTraversal::new(
        &mut ctx.diagnostics,
        interop,
        input.symbols.clone(),
        graph.builtins(),
    )
    .check(graph, input.module.module)?;
    Ok(input)
}

fn k2_checks<'a>(
    ctx: &mut CompilationContext,
    input: Fir2IrOutput<'a>,
) -> Result<Fir2IrOutput<'a>, ExecutionFault> {
    let graph = input.graph();
    let interop = InteropBuiltIns::new(&input.plugin_context.builtins, graph.symbols());
    SpecialBackendChecksTraversal::new(
        &mut ctx.diagnostics,
        interop,
        input.symbols.clone(),
        graph.builtins(),
    )
    .check(graph, input.module.module)?;
    Ok(input)
}

/// One pass over every declaration of a module, running each check.
///
/// The traversal never mutates the graph. Findings are recorded as
/// diagnostics; a finding already present in the sink is not recorded again,
/// so rerunning the checks on the same module adds nothing new.
pub struct SpecialBackendChecksTraversal<'a> {
    diagnostics: &'a mut Vec<Diagnostic>,
    interop: InteropBuiltIns,
    symbols: BackendSymbols,
    builtins: &'a IrBuiltIns,
    checks: Vec<Box<dyn BackendCheck>>,
}

impl<'a> SpecialBackendChecksTraversal<'a> {
    pub fn new(
        diagnostics: &'a mut Vec<Diagnostic>,
        interop: InteropBuiltIns,
        symbols: BackendSymbols,
        builtins: &'a IrBuiltIns,
    ) -> Self {
        Self {
            diagnostics,
            interop,
            symbols,
            builtins,
            checks: default_checks(),
        }
    }

    /// Replace the default checks.
    pub fn with_checks(mut self, checks: Vec<Box<dyn BackendCheck>>) -> Self {
        self.checks = checks;
        self
    }

    /// Get information about all checks that will be run.
    pub fn check_info(&self) -> Vec<CheckInfo> {
        self.checks.iter().map(|c| c.info()).collect()
    }

    /// Run the checks, failing if any error-severity violation was found.
    pub fn check(&mut self, graph: &IrGraph, module: ModuleId) -> Result<(), ExecutionFault> {
        match self.lower(graph, module) {
            0 => Ok(()),
            errors => Err(ExecutionFault::ChecksFailed { errors }),
        }
    }

    /// Run the checks and return the number of distinct error-severity
    /// findings of this run.
    pub fn lower(&mut self, graph: &IrGraph, module: ModuleId) -> usize {
        let mut findings: Vec<Diagnostic> = Vec::new();
        for decl in graph.declarations_in_module(module) {
            let scope = CheckScope {
                graph,
                interop: &self.interop,
                symbols: &self.symbols,
                builtins: self.builtins,
                current: decl,
            };
            let data = graph.decl(decl);

            for check in &self.checks {
                let mut found = Vec::new();
                match &data.kind {
                    DeclKind::Function(function) => {
                        check.visit_function(&scope, function, &mut found)
                    }
                    DeclKind::Class(class) => check.visit_class(&scope, class, &mut found),
                    DeclKind::Property(property) => {
                        check.visit_property(&scope, property, &mut found)
                    }
                }
                for expr in data.expressions() {
                    expr.walk(&mut |e| match e {
                        Expr::Call {
                            callee,
                            type_args,
                            args,
                        } => check.visit_call(&scope, *callee, type_args, args, &mut found),
                        Expr::FunctionRef { target } => {
                            check.visit_function_reference(&scope, *target, &mut found)
                        }
                        _ => {}
                    });
                }

                if found.is_empty() {
                    continue;
                }
                let location = graph.fq_name_of(decl);
                let severity = check.severity();
                for violation in found {
                    let diagnostic =
                        Diagnostic::with_severity(severity, PHASE_NAME, violation.message)
                            .with_code(check.name())
                            .at(location.as_str());
                    if findings.contains(&diagnostic) {
                        continue;
                    }
                    if !severity.is_error() {
                        warn!(check = check.name(), %location, "{}", diagnostic.message);
                    }
                    findings.push(diagnostic);
                }
            }
        }

        let errors = findings.iter().filter(|d| d.severity.is_error()).count();
        for diagnostic in findings {
            if !self.diagnostics.contains(&diagnostic) {
                self.diagnostics.push(diagnostic);
            }
        }
        debug!(module = %graph.module(module).name, errors, "backend checks finished");
        errors
    }
}
