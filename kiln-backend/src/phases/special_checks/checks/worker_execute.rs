//! Check for the job argument of `Worker.execute`.

use kiln_ir::{Expr, IrType, Symbol};

use super::super::{BackendCheck, CheckScope, Violation};
use crate::pipeline::Severity;

/// Jobs run on another worker and must not close over the caller's state.
pub struct WorkerExecuteCheck;

impl BackendCheck for WorkerExecuteCheck {
    fn name(&self) -> &'static str {
        "worker-execute"
    }

    fn description(&self) -> &'static str {
        "The job passed to Worker.execute is a non-capturing lambda or top-level function"
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
        if Some(callee) != scope.symbols.worker_execute {
            return;
        }

        match args.last() {
            None => out.push(Violation::new("Worker.execute requires a job argument")),
            Some(job) => {
                if let Some(problem) = scope.static_function_problem(job) {
                    out.push(Violation::new(format!(
                        "Worker.execute job must be static: {}",
                        problem
                    )));
                }
            }
        }
    }
}
