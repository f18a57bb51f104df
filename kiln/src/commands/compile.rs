use std::path::PathBuf;

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
pub struct CompileCommand {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the transformed program to this path
    #[arg(long)]
    pub emit: Option<PathBuf>,
}

impl CompileCommand {
    /// Run the compile command
    pub fn run(&self) -> Result<()> {
        let config = CompilerConfig::open(&self.input.config).unwrap_or_exit();
        let mut program = Program::load(&self.input.program)?;

        let mut report =
            ops::compile(config, &mut program, self.input.module.as_deref()).unwrap_or_exit();

        if let Some(path) = &self.emit {
            program.save(path)?;
            report.emitted = Some(path.clone());
        }

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
