//! Phases operation - describe the backend pipeline.

use kiln_backend::{phase_catalog, phases::special_checks::default_checks};

use crate::reports::{CheckEntry, PhaseEntry, PhasesReport};

/// Execute the phases operation.
pub fn phases() -> PhasesReport {
    let phases = phase_catalog()
        .into_iter()
        .map(|p| PhaseEntry {
            name: p.name.to_string(),
            description: p.description.to_string(),
        })
        .collect();

    let checks = default_checks()
        .iter()
        .map(|check| {
            let info = check.info();
            CheckEntry {
                name: info.name.to_string(),
                description: info.description.to_string(),
                severity: info.severity.to_string(),
            }
        })
        .collect();

    PhasesReport { phases, checks }
}
