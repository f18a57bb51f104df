//! Compile operation - run every backend phase over a module.

use kiln_backend::{Driver, DriverError};
use kiln_config::CompilerConfig;

use crate::{program::Program, reports::CompileReport};

/// Execute the compile operation.
///
/// Runs the driver over `module`, or over the program's own module when none
/// is given. The program's graph is transformed in place.
pub fn compile(
    config: CompilerConfig,
    program: &mut Program,
    module: Option<&str>,
) -> Result<CompileReport, DriverError> {
    let output_name = config.output.name.clone();
    let output_kind = config.output.kind.to_string();
    let module = module.unwrap_or(&program.module).to_string();

    let outcome = Driver::new(config).compile(&mut program.graph, &module)?;

    Ok(CompileReport {
        output_name,
        output_kind,
        outcome,
        emitted: None,
    })
}
