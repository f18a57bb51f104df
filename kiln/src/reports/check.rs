//! Check command report data structures.

use kiln_backend::pipeline::Diagnostic;

use super::{
    output::{Output, Report},
    render_diagnostics,
};

/// Report data from a backend checks run that found no errors.
#[derive(Debug)]
pub struct CheckReport {
    /// Name of the checked module.
    pub module: String,
    /// Non-fatal findings.
    pub diagnostics: Vec<Diagnostic>,
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        render_diagnostics(&self.diagnostics, out);

        let warnings = self
            .diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count();
        match warnings {
            0 => out.preformatted(&format!("✓ module '{}' passed backend checks", self.module)),
            n => out.preformatted(&format!(
                "✓ module '{}' passed backend checks with {} warning{}",
                self.module,
                n,
                if n == 1 { "" } else { "s" }
            )),
        }
    }
}
