//! Built-in backend checks.

mod c_type_argument;
mod foreign_subclass;
mod intrinsic_reference;
mod static_c_function;
mod worker_execute;

pub use c_type_argument::CTypeArgumentCheck;
pub use foreign_subclass::ForeignSubclassCheck;
pub use intrinsic_reference::IntrinsicReferenceCheck;
pub use static_c_function::StaticCFunctionCheck;
pub use worker_execute::WorkerExecuteCheck;

use super::BackendCheck;

/// The checks run by the `SpecialBackendChecks` phase.
pub fn default_checks() -> Vec<Box<dyn BackendCheck>> {
    vec![
        Box::new(StaticCFunctionCheck),
        Box::new(CTypeArgumentCheck),
        Box::new(WorkerExecuteCheck),
        Box::new(IntrinsicReferenceCheck),
        Box::new(ForeignSubclassCheck),
    ]
}
