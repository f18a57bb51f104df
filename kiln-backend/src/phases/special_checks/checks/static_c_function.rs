//! Check for `staticCFunction` call shapes.

use kiln_ir::{Expr, IrType, Symbol};

use super::super::{BackendCheck, CheckScope, Violation};
use crate::pipeline::Severity;

/// `staticCFunction` turns its argument into a C function pointer, so the
/// argument must not depend on any runtime state.
pub struct StaticCFunctionCheck;

impl BackendCheck for StaticCFunctionCheck {
    fn name(&self) -> &'static str {
        "static-c-function"
    }

    fn description(&self) -> &'static str {
        "staticCFunction takes one non-capturing lambda or top-level function reference"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn visit_call(
        &self,
        scope: &CheckScope<'_>,
        callee: Symbol,
        _type_args: &[IrType],
        args: &[Expr],
        out: &mut Vec<Violation>,
    ) {
        if Some(callee) != scope.interop.static_c_function {
            return;
        }

        match args {
            [function] => {
                if let Some(problem) = scope.static_function_problem(function) {
                    out.push(Violation::new(format!(
                        "staticCFunction requires a static function: {}",
                        problem
                    )));
                }
            }
            _ => out.push(Violation::new(format!(
                "staticCFunction takes exactly one argument, found {}",
                args.len()
            ))),
        }
    }
}
