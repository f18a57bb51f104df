//! Check for the type arguments of `sizeOf` and `alloc`.

use kiln_ir::{Expr, IrType, Symbol, render_type};

use super::super::{BackendCheck, CheckScope, Violation};
use crate::pipeline::Severity;

/// The layout intrinsics only accept types with a C representation:
/// primitives and subclasses of `CVariable`.
pub struct CTypeArgumentCheck;

impl BackendCheck for CTypeArgumentCheck {
    fn name(&self) -> &'static str {
        "c-type-argument"
    }

    fn description(&self) -> &'static str {
        "sizeOf and alloc take a primitive type or a CVariable subtype"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn visit_call(
        &self,
        scope: &CheckScope<'_>,
        callee: Symbol,
        type_args: &[IrType],
        _args: &[Expr],
        out: &mut Vec<Violation>,
    ) {
        if !scope.interop.is_type_intrinsic(callee) {
            return;
        }

        let intrinsic = scope.display_name(callee);
        if type_args.is_empty() {
            out.push(Violation::new(format!("{} requires a type argument", intrinsic)));
        }
        for ty in type_args.iter().filter(|ty| !scope.is_c_type(ty)) {
            out.push(Violation::new(format!(
                "type argument '{}' of {} must be a primitive type or a subtype of CVariable",
                render_type(scope.graph, ty),
                intrinsic
            )));
        }
    }
}
