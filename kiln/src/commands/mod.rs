mod check;
mod compile;
mod completions;
mod phases;

use std::path::PathBuf;

use check::CheckCommand;
use clap::{Args, Parser, Subcommand};
use compile::CompileCommand;
use completions::CompletionsCommand;
use eyre::Result;
use kiln_backend::DriverError;
use phases::PhasesCommand;

use crate::reports::{TerminalOutput, render_diagnostics};

/// Extension trait for exiting on configuration and driver errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for kiln_config::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

impl<T> UnwrapOrExit<T> for std::result::Result<T, DriverError> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                if let DriverError::Phase { diagnostics, .. } = &e {
                    render_diagnostics(diagnostics, &mut TerminalOutput::new());
                }
                eprintln!("{:?}", miette::Report::new(e));
                std::process::exit(1);
            }
        }
    }
}

/// Where the configuration and the program come from.
#[derive(Args)]
pub struct InputArgs {
    /// Path to kiln.toml (defaults to ./kiln.toml)
    #[arg(short, long, default_value = "kiln.toml")]
    pub config: PathBuf,

    /// Program to compile, as JSON (defaults to ./program.json)
    #[arg(short, long, default_value = "program.json")]
    pub program: PathBuf,

    /// Module to compile (defaults to the module named by the program)
    #[arg(short, long)]
    pub module: Option<String>,
}

#[derive(Parser)]
#[command(name = "kiln")]
#[command(version)]
#[command(about = "Run the Kiln native backend phases over an IR program")]
pub(crate) struct Cli {
    /// Log phase execution at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Compile(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Phases(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run every backend phase over a module
    Compile(CompileCommand),

    /// Run the special backend checks only
    Check(CheckCommand),

    /// List the backend phases and checks
    Phases(PhasesCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compile_args() {
        let cli = Cli::parse_from([
            "kiln", "-v", "compile", "--program", "hello.json", "--emit", "out.json",
        ]);

        assert!(cli.verbose());
        let Commands::Compile(cmd) = cli.command else {
            panic!("expected the compile command");
        };
        assert_eq!(cmd.input.config, PathBuf::from("kiln.toml"));
        assert_eq!(cmd.input.program, PathBuf::from("hello.json"));
        assert_eq!(cmd.emit, Some(PathBuf::from("out.json")));
    }
}
