//! Phase engine and backend phases for the Kiln native compiler.
//!
//! The backend receives an [`IrGraph`](kiln_ir::IrGraph) from a front-end and
//! runs a fixed sequence of checked transformations over one of its modules:
//!
//! ```text
//! SpecialBackendChecks → CopyDefaultValuesToActual → addEntryPoint
//! ```
//!
//! - [`pipeline`] holds the phase descriptor, the engine and the default IR
//!   validation/dump actions
//! - [`phases`] holds the concrete phases and their constructors
//! - [`Driver`] builds a compilation context from configuration and runs the
//!   phases in the order it requires
//!
//! # Example
//!
//! ```ignore
//! use kiln_backend::Driver;
//!
//! let config = kiln_config::parse_file("kiln.toml")?;
//! let outcome = Driver::new(config).compile(&mut graph, "app")?;
//! for diagnostic in &outcome.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! ```

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod driver;
mod output_unit;
pub mod phases;
pub mod pipeline;
mod symbols;

pub use driver::{CompileOutcome, Driver, DriverError, phase_catalog};
pub use output_unit::OutputUnit;
pub use symbols::{
    BackendSymbols, ENTRY_ROUTINE_NAME, InteropBuiltIns, NativeBuiltIns, PluginContext,
    TYPED_INTRINSIC, is_foreign_class, is_typed_intrinsic,
};
