//! Check that typed intrinsics are never used as values.

use kiln_ir::Symbol;

use super::super::{BackendCheck, CheckScope, Violation};
use crate::{is_typed_intrinsic, pipeline::Severity};

/// Typed intrinsics have no body of their own: the backend expands them at
/// each call site, so a reference to one has nothing to point at.
pub struct IntrinsicReferenceCheck;

impl BackendCheck for IntrinsicReferenceCheck {
    fn name(&self) -> &'static str {
        "intrinsic-reference"
    }

    fn description(&self) -> &'static str {
        "Functions annotated @TypedIntrinsic are only called directly"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn visit_function_reference(
        &self,
        scope: &CheckScope<'_>,
        target: Symbol,
        out: &mut Vec<Violation>,
    ) {
        if let Some(decl) = scope.graph.symbols().owner(target)
            && is_typed_intrinsic(scope.graph, decl)
        {
            out.push(Violation::new(format!(
                "intrinsic '{}' can only be called directly",
                scope.display_name(target)
            )));
        }
    }
}
