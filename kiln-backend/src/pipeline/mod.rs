//! Phase pipeline for the native backend.
//!
//! This module provides the phase abstraction and the engine that runs it:
//!
//! - [`NamedPhase`] describes a transformation from `In` to `Out` together
//!   with its pre- and post-actions
//! - [`PhaseEngine`] executes a phase against a [`CompilationContext`]
//! - [`default_ir_actions`] is the validation/dump action set reused by
//!   every module-level phase
//! - Non-fatal findings are collected as [`Diagnostic`]s, fatal ones surface
//!   as [`PhaseError`]
//!
//! # Example
//!
//! ```ignore
//! use kiln_backend::pipeline::{CompilationContext, PhaseEngine};
//!
//! let mut ctx = CompilationContext::new(config);
//! let mut engine = PhaseEngine::new(&mut ctx);
//! engine.run_phase(&entry_point_phase(), ModuleInput::new(&mut graph, module))?;
//!
//! for diag in &ctx.diagnostics {
//!     eprintln!("{diag}");
//! }
//! ```

mod actions;
mod context;
mod diagnostic;
mod engine;
mod error;
mod phase;

pub use actions::{IrHolder, default_ir_actions};
pub use context::{CompilationContext, IrDump, PhaseTiming};
pub use diagnostic::{Diagnostic, Severity};
pub use engine::PhaseEngine;
pub use error::{ActionStage, ExecutionFault, PhaseError, ValidationFailure};
pub use phase::{Action, ActionScope, NamedPhase, PhaseBody, PhaseInfo};
