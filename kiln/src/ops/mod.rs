//! Core operations.
//!
//! This module contains the business logic for kiln commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod compile;
pub mod phases;

pub use check::check;
pub use compile::compile;
pub use phases::phases;
