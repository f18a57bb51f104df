//! The linked artifact currently being produced.

use indexmap::IndexSet;
use kiln_config::{OutputConfig, OutputKind};
use kiln_ir::{FileId, IrGraph};

/// Which modules are linked into the artifact being finalized.
///
/// A program's modules may be split across several artifacts (a shared
/// library plus the executable that uses it, for example), so membership is
/// tracked per module name.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputUnit {
    pub name: String,
    pub kind: OutputKind,
    modules: IndexSet<String>,
}

impl OutputUnit {
    pub fn new<I, S>(name: impl Into<String>, kind: OutputKind, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind,
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.name, config.kind, &config.modules)
    }

    pub fn contains_module(&self, name: &str) -> bool {
        self.modules.contains(name)
    }

    /// Whether the module owning `file` is linked into the artifact. Files
    /// missing from the graph belong to no artifact.
    pub fn contains_file(&self, graph: &IrGraph, file: FileId) -> bool {
        graph
            .get_file(file)
            .and_then(|data| graph.get_module(data.module))
            .is_some_and(|module| self.contains_module(&module.name))
    }

    /// Whether the artifact is started as a process and needs an entry point.
    pub fn is_final_binary(&self) -> bool {
        self.kind.is_final_binary()
    }
}
