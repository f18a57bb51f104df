//! Report data structures for commands.
//!
//! This module provides data structures that separate data collection from rendering.
//! Commands build reports, then render them to an Output target.

mod check;
mod compile;
mod output;
mod phases;

use kiln_backend::pipeline::Diagnostic;

pub use check::CheckReport;
pub use compile::CompileReport;
#[cfg(test)]
pub use output::BufferOutput;
pub use output::{Output, Report, TerminalOutput};
pub use phases::{CheckEntry, PhaseEntry, PhasesReport};

/// Render diagnostics one per entry, with their location on a second line.
pub(crate) fn render_diagnostics(diagnostics: &[Diagnostic], out: &mut dyn Output) {
    for diagnostic in diagnostics {
        let mut text = match &diagnostic.code {
            Some(code) => format!("{}[{}]: {}", diagnostic.severity, code, diagnostic.message),
            None => format!("{}: {}", diagnostic.severity, diagnostic.message),
        };
        if let Some(location) = &diagnostic.location {
            text.push_str(&format!("\n  --> {}", location));
        }
        out.diagnostic(&text);
    }
    if !diagnostics.is_empty() {
        out.newline();
    }
}
