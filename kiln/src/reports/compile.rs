//! Compile command report data structures.

use std::path::PathBuf;

use kiln_backend::CompileOutcome;

use super::{
    output::{Output, Report},
    render_diagnostics,
};

/// Report data from a successful compilation.
#[derive(Debug)]
pub struct CompileReport {
    /// Name of the linked artifact.
    pub output_name: String,
    /// Kind of the linked artifact.
    pub output_kind: String,
    /// What the driver produced.
    pub outcome: CompileOutcome,
    /// Where the transformed program was written, if requested.
    pub emitted: Option<PathBuf>,
}

impl Report for CompileReport {
    fn render(&self, out: &mut dyn Output) {
        render_diagnostics(&self.outcome.diagnostics, out);

        out.preformatted(&format!(
            "✓ compiled module '{}' for {} '{}'",
            self.outcome.module, self.output_kind, self.output_name
        ));
        out.newline();

        out.section("Phases");
        for (i, phase) in self.outcome.executed.iter().enumerate() {
            let timing = self.outcome.timings.iter().find(|t| t.phase == *phase);
            let text = match timing {
                Some(timing) => format!("{} ({:.2?})", phase, timing.elapsed),
                None => phase.to_string(),
            };
            out.numbered_item(i + 1, &text);
        }

        for dump in &self.outcome.dumps {
            out.newline();
            out.divider(&format!("{} {}", dump.stage, dump.phase));
            out.preformatted(dump.text.trim_end());
        }

        if let Some(path) = &self.emitted {
            out.newline();
            out.key_value("Emitted", &path.display().to_string());
        }
    }
}
