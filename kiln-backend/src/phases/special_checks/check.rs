//! The backend check trait and the scope checks inspect.

use kiln_ir::{Class, DeclId, Expr, Function, IrBuiltIns, IrGraph, IrType, Property, Symbol};

use crate::{BackendSymbols, InteropBuiltIns, pipeline::Severity};

/// A single rule violation found by a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub message: String,
}

impl Violation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Everything a check may consult while visiting one declaration.
pub struct CheckScope<'a> {
    pub graph: &'a IrGraph,
    pub interop: &'a InteropBuiltIns,
    pub symbols: &'a BackendSymbols,
    pub builtins: &'a IrBuiltIns,
    /// The declaration being visited.
    pub current: DeclId,
}

impl CheckScope<'_> {
    /// Short name of a symbol, for messages.
    pub fn display_name(&self, symbol: Symbol) -> String {
        self.graph
            .symbols()
            .name(symbol)
            .map(|name| name.short_name().to_string())
            .unwrap_or_else(|| symbol.to_string())
    }

    /// Whether the class `symbol` is `base` or transitively derives from it.
    pub fn derives_from(&self, symbol: Symbol, base: Symbol) -> bool {
        let mut pending = vec![symbol];
        let mut seen = Vec::new();
        while let Some(current) = pending.pop() {
            if current == base {
                return true;
            }
            if seen.contains(&current) {
                continue;
            }
            seen.push(current);
            if let Some(class) = self.graph.resolve(current).and_then(|d| d.as_class()) {
                pending.extend(class.supertypes.iter().copied());
            }
        }
        false
    }

    /// Why `expr` cannot be used as a static function pointer, if it cannot.
    ///
    /// Only non-capturing lambdas and references to top-level functions
    /// qualify.
    pub fn static_function_problem(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Lambda { captures, .. } if captures.is_empty() => None,
            Expr::Lambda { captures, .. } => {
                Some(format!("lambda captures '{}'", captures.join("', '")))
            }
            Expr::FunctionRef { target } => match self.graph.symbols().owner(*target) {
                Some(decl) if self.is_top_level_function(decl) => None,
                Some(_) => Some(format!(
                    "'{}' is not a top-level function",
                    self.display_name(*target)
                )),
                None => Some(format!("'{}' is unresolved", self.display_name(*target))),
            },
            _ => Some("argument is neither a lambda nor a function reference".to_string()),
        }
    }

    /// Whether the type can be laid out as a C value.
    pub fn is_c_type(&self, ty: &IrType) -> bool {
        if self.builtins.is_primitive_type(ty) {
            return true;
        }
        match (ty, self.interop.c_variable) {
            (IrType::Class(symbol), Some(c_variable)) => self.derives_from(*symbol, c_variable),
            _ => false,
        }
    }

    fn is_top_level_function(&self, decl: DeclId) -> bool {
        self.graph
            .get_decl(decl)
            .is_some_and(|d| d.is_top_level() && d.as_function().is_some())
    }
}

/// A backend-imposed well-formedness rule.
///
/// The traversal dispatches each declaration to the kind-specific visitor
/// and every call and function reference inside its expressions to
/// [`visit_call`](BackendCheck::visit_call) and
/// [`visit_function_reference`](BackendCheck::visit_function_reference).
/// All visitors default to doing nothing.
pub trait BackendCheck: Send + Sync {
    /// The name of this check, used as the diagnostic code.
    fn name(&self) -> &'static str;

    /// A human-readable description of the rule.
    fn description(&self) -> &'static str;

    /// Severity of every violation this check reports.
    fn severity(&self) -> Severity;

    /// Get information about this check.
    fn info(&self) -> CheckInfo {
        CheckInfo {
            name: self.name(),
            description: self.description(),
            severity: self.severity(),
        }
    }

    #[allow(unused_variables)]
    fn visit_function(
        &self,
        scope: &CheckScope<'_>,
        function: &Function,
        out: &mut Vec<Violation>,
    ) {
    }

    #[allow(unused_variables)]
    fn visit_class(&self, scope: &CheckScope<'_>, class: &Class, out: &mut Vec<Violation>) {}

    #[allow(unused_variables)]
    fn visit_property(
        &self,
        scope: &CheckScope<'_>,
        property: &Property,
        out: &mut Vec<Violation>,
    ) {
    }

    #[allow(unused_variables)]
    fn visit_call(
        &self,
        scope: &CheckScope<'_>,
        callee: Symbol,
        type_args: &[IrType],
        args: &[Expr],
        out: &mut Vec<Violation>,
    ) {
    }

    #[allow(unused_variables)]
    fn visit_function_reference(
        &self,
        scope: &CheckScope<'_>,
        target: Symbol,
        out: &mut Vec<Violation>,
    ) {
    }
}

/// Information about a check, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
}
