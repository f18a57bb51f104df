//! Phases command report data structures.

use super::output::{Output, Report};

/// A backend phase, in driver order.
#[derive(Debug)]
pub struct PhaseEntry {
    pub name: String,
    pub description: String,
}

/// A check run by the special backend checks phase.
#[derive(Debug)]
pub struct CheckEntry {
    pub name: String,
    pub description: String,
    pub severity: String,
}

/// Report listing what the backend does.
#[derive(Debug)]
pub struct PhasesReport {
    pub phases: Vec<PhaseEntry>,
    pub checks: Vec<CheckEntry>,
}

impl Report for PhasesReport {
    fn render(&self, out: &mut dyn Output) {
        out.title("Kiln backend phases");
        out.newline();

        for (i, phase) in self.phases.iter().enumerate() {
            out.numbered_item(i + 1, &format!("{} - {}", phase.name, phase.description));
        }
        out.newline();

        out.section("Backend checks");
        for check in &self.checks {
            out.list_item(&format!(
                "{} ({}): {}",
                check.name, check.severity, check.description
            ));
        }
    }
}
