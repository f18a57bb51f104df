//! Compiler configuration for the Kiln native backend.
//!
//! The configuration is read from a `kiln.toml` file:
//!
//! ```toml
//! [compiler]
//! frontend = "k2"          # or "legacy"
//! measure_time = true
//!
//! [output]
//! name = "hello"
//! kind = "executable"      # test-runner, static-library, dynamic-library, library
//! modules = ["app"]        # modules linked into this output unit
//!
//! [entry]
//! name = "app.main"
//!
//! [phases]
//! validate = "all"
//! dump_after = ["addEntryPoint"]
//! ```

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod phase_set;

use std::{path::Path, str::FromStr};

pub use error::{Error, Result};
pub use phase_set::PhaseSet;
use serde::Deserialize;

/// Root of `kiln.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    #[serde(default)]
    pub compiler: CompilerSection,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub entry: EntryConfig,
    #[serde(default)]
    pub phases: PhaseConfig,
}

/// The `[compiler]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerSection {
    /// Which front-end produced the IR.
    #[serde(default)]
    pub frontend: Frontend,
    /// Record the wall time of every phase.
    #[serde(default)]
    pub measure_time: bool,
}

/// Front-end pipeline that produced the IR handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frontend {
    /// The legacy front-end, which registers interop built-ins on the context.
    Legacy,
    /// The symbol-resolution front-end, which hands over its own built-ins.
    #[default]
    K2,
}

impl std::fmt::Display for Frontend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frontend::Legacy => write!(f, "legacy"),
            Frontend::K2 => write!(f, "k2"),
        }
    }
}

/// The `[output]` section: the linked artifact being produced.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_name")]
    pub name: String,
    #[serde(default)]
    pub kind: OutputKind,
    /// Modules whose files are linked into this output unit.
    #[serde(default)]
    pub modules: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name: default_output_name(),
            kind: OutputKind::default(),
            modules: Vec::new(),
        }
    }
}

fn default_output_name() -> String {
    "main".to_string()
}

/// Kind of linked artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputKind {
    #[default]
    Executable,
    TestRunner,
    StaticLibrary,
    DynamicLibrary,
    Library,
}

impl OutputKind {
    /// Whether the artifact is started as a process and needs an entry point.
    pub fn is_final_binary(self) -> bool {
        matches!(self, OutputKind::Executable | OutputKind::TestRunner)
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputKind::Executable => "executable",
            OutputKind::TestRunner => "test-runner",
            OutputKind::StaticLibrary => "static-library",
            OutputKind::DynamicLibrary => "dynamic-library",
            OutputKind::Library => "library",
        };
        f.write_str(name)
    }
}

/// The `[entry]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryConfig {
    /// Fully-qualified name of the user entry point.
    #[serde(default = "default_entry_name")]
    pub name: String,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            name: default_entry_name(),
        }
    }
}

fn default_entry_name() -> String {
    "main".to_string()
}

/// The `[phases]` section: per-phase instrumentation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseConfig {
    /// Phases whose input and output are structurally verified.
    #[serde(default)]
    pub validate: PhaseSet,
    /// Phases whose input is dumped.
    #[serde(default)]
    pub dump_before: PhaseSet,
    /// Phases whose output is dumped.
    #[serde(default)]
    pub dump_after: PhaseSet,
}

impl CompilerConfig {
    /// Read and validate a configuration file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        parse_file(path)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self, src: &str, filename: &str) -> Result<()> {
        if self.output.name.trim().is_empty() {
            return Err(Error::validation(
                "output name must not be empty",
                Some("output.name"),
                src,
                filename,
            ));
        }

        if self.output.kind.is_final_binary() && self.output.modules.is_empty() {
            return Err(Error::validation(
                format!(
                    "a {} output must link at least one module",
                    self.output.kind
                ),
                Some("output.modules"),
                src,
                filename,
            ));
        }

        let entry = self.entry.name.trim();
        if entry.is_empty() || entry.contains(char::is_whitespace) {
            return Err(Error::validation(
                format!("invalid entry point name '{}'", self.entry.name),
                Some("entry.name"),
                src,
                filename,
            ));
        }

        Ok(())
    }
}

impl FromStr for CompilerConfig {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_str(s)
    }
}

/// Parse a kiln.toml file from the given path
pub fn parse_file(path: impl AsRef<Path>) -> Result<CompilerConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source: e,
        })
    })?;
    let filename = path.display().to_string();
    parse_str_with_filename(&content, &filename)
}

/// Parse a kiln.toml from a string (uses "kiln.toml" as default filename)
pub fn parse_str(content: &str) -> Result<CompilerConfig> {
    parse_str_with_filename(content, "kiln.toml")
}

/// Parse a kiln.toml from a string with a custom filename for error reporting
pub fn parse_str_with_filename(content: &str, filename: &str) -> Result<CompilerConfig> {
    let config: CompilerConfig =
        toml::from_str(content).map_err(|e| Error::parse(e, content, filename))?;

    config.validate(content, filename)?;
    Ok(config)
}
