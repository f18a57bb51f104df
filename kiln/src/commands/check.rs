use clap::Args;
use eyre::Result;
use kiln_config::CompilerConfig;

use super::{InputArgs, UnwrapOrExit};
use crate::{
    ops,
    program::Program,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub input: InputArgs,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let config = CompilerConfig::open(&self.input.config).unwrap_or_exit();
        let mut program = Program::load(&self.input.program)?;

        let report =
            ops::check(config, &mut program, self.input.module.as_deref()).unwrap_or_exit();
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
