//! Check operation - backend checks only.

use kiln_backend::{Driver, DriverError};
use kiln_config::CompilerConfig;

use crate::{program::Program, reports::CheckReport};

/// Execute the check operation.
///
/// Runs the special backend checks and returns their non-fatal findings.
pub fn check(
    config: CompilerConfig,
    program: &mut Program,
    module: Option<&str>,
) -> Result<CheckReport, DriverError> {
    let module = module.unwrap_or(&program.module).to_string();
    let outcome = Driver::new(config).check(&mut program.graph, &module)?;

    Ok(CheckReport {
        module,
        diagnostics: outcome.diagnostics,
    })
}
