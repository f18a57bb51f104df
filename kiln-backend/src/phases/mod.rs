//! Backend phases.
//!
//! Each phase is built by a constructor function returning a
//! [`NamedPhase`](crate::pipeline::NamedPhase):
//!
//! - `SpecialBackendChecks`: backend-imposed well-formedness rules, in a
//!   legacy and a K2 variant
//! - `CopyDefaultValuesToActual`: propagate expect parameter defaults
//! - `addEntryPoint`: synthesize the process entry routine

mod copy_defaults;
mod entry_point;
pub mod special_checks;

use kiln_ir::{IrGraph, ModuleId};

pub use copy_defaults::{DefaultValueCopier, copy_default_values_to_actual_phase};
pub use entry_point::{ENTRY_POINT_FILE, ENTRY_POINT_PACKAGE, entry_point_phase};
pub use special_checks::{
    Fir2IrOutput, SpecialBackendChecksInput, SpecialBackendChecksTraversal,
    k2_special_backend_checks_phase, run_k2_special_backend_checks, run_special_backend_checks,
    special_backend_checks_phase,
};

use crate::pipeline::IrHolder;

/// A module of the graph, lent mutably to a phase.
#[derive(Debug)]
pub struct ModuleInput<'a> {
    pub graph: &'a mut IrGraph,
    pub module: ModuleId,
}

impl<'a> ModuleInput<'a> {
    pub fn new(graph: &'a mut IrGraph, module: ModuleId) -> Self {
        Self { graph, module }
    }
}

impl IrHolder for ModuleInput<'_> {
    fn graph(&self) -> &IrGraph {
        self.graph
    }

    fn module(&self) -> ModuleId {
        self.module
    }
}
