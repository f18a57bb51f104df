//! Programs exchanged with front-ends as JSON.

use std::{fs, path::Path};

use eyre::{Context, Result, bail};
use kiln_ir::{IrGraph, verify_graph};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// An IR graph together with the module to compile.
#[derive(Debug, Serialize, Deserialize)]
pub struct Program {
    /// Name of the module handed to the backend.
    pub module: String,
    pub graph: IrGraph,
}

impl Program {
    /// Read a program and verify its structure.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read program '{}'", path.display()))?;
        let program: Program = serde_json::from_str(&content)
            .wrap_err_with(|| format!("failed to parse program '{}'", path.display()))?;

        let violations = verify_graph(&program.graph);
        if !violations.is_empty() {
            let details: Vec<_> = violations.iter().map(|v| format!("  {v}")).collect();
            bail!(
                "program '{}' is malformed:\n{}",
                path.display(),
                details.join("\n")
            );
        }
        debug!(
            path = %path.display(),
            module = %program.module,
            declarations = program.graph.declarations().count(),
            "program loaded"
        );
        Ok(program)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).wrap_err_with(|| format!("failed to write '{}'", path.display()))?;
        info!(path = %path.display(), "program written");
        Ok(())
    }
}
