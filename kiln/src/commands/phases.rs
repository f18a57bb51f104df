use clap::Args;
use eyre::Result;

use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct PhasesCommand {}

impl PhasesCommand {
    pub fn run(&self) -> Result<()> {
        ops::phases().render(&mut TerminalOutput::new());
        Ok(())
    }
}
