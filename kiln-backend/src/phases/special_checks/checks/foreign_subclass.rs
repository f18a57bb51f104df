//! Check for native classes extending foreign classes.

use kiln_ir::{Class, Modality};

use super::super::{BackendCheck, CheckScope, Violation};
use crate::{is_foreign_class, pipeline::Severity};

/// Warns when a native subclass of a foreign class can be extended further.
pub struct ForeignSubclassCheck;

impl BackendCheck for ForeignSubclassCheck {
    fn name(&self) -> &'static str {
        "foreign-subclass"
    }

    fn description(&self) -> &'static str {
        "Native classes extending a foreign class should be final"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn visit_class(&self, scope: &CheckScope<'_>, class: &Class, out: &mut Vec<Violation>) {
        let decl = scope.graph.decl(scope.current);
        if decl.is_external || class.modality == Modality::Final {
            return;
        }

        for supertype in &class.supertypes {
            if is_foreign_class(scope.graph, *supertype) {
                out.push(Violation::new(format!(
                    "class '{}' extends foreign class '{}' and should be final",
                    decl.name,
                    scope.display_name(*supertype)
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kiln_ir::Declaration;

    use super::*;
    use crate::phases::special_checks::checks::fixture::Fixture;

    fn subclass(fixture: &Fixture, modality: Modality) -> Declaration {
        Declaration::class(
            "Delegate",
            Class {
                supertypes: vec![fixture.symbol("kiln.interop.NSObject")],
                modality,
            },
        )
    }

    #[test]
    fn test_open_subclass_warns() {
        let mut fixture = Fixture::new();
        let declaration = subclass(&fixture, Modality::Open);
        fixture.class(declaration);

        let diagnostics = fixture.run(ForeignSubclassCheck);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].severity.is_warning());
        assert_eq!(
            diagnostics[0].message,
            "class 'Delegate' extends foreign class 'NSObject' and should be final"
        );
        assert_eq!(diagnostics[0].location.as_deref(), Some("app.Delegate"));
    }

    #[test]
    fn test_final_subclass_allowed() {
        let mut fixture = Fixture::new();
        let declaration = subclass(&fixture, Modality::Final);
        fixture.class(declaration);

        assert!(fixture.run(ForeignSubclassCheck).is_empty());
    }

    #[test]
    fn test_foreign_subclass_of_foreign_allowed() {
        let mut fixture = Fixture::new();
        let declaration = subclass(&fixture, Modality::Open).external();
        fixture.class(declaration);

        assert!(fixture.run(ForeignSubclassCheck).is_empty());
    }
}
