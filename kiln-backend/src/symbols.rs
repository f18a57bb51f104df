//! Well-known backend symbols and interop registries.

use kiln_ir::{DeclId, FqName, IrGraph, Symbol, SymbolTable};

/// Name of the synthesized routine invoked at process start.
pub const ENTRY_ROUTINE_NAME: &str = "Kiln_start";

/// Annotation marking functions lowered by the backend at each call site.
pub const TYPED_INTRINSIC: &str = "kiln.internal.TypedIntrinsic";

/// Symbols the backend phases look up by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendSymbols {
    /// The user entry point, usually `main`.
    pub entry_point: Option<Symbol>,
    /// `Worker.execute` from the concurrency library.
    pub worker_execute: Option<Symbol>,
}

impl BackendSymbols {
    pub const WORKER_EXECUTE: &'static str = "kiln.concurrent.Worker.execute";

    /// Resolve the well-known symbols declared in `table`.
    pub fn lookup(table: &SymbolTable, entry_point: &str) -> Self {
        Self {
            entry_point: table.lookup(&FqName::new(entry_point)),
            worker_execute: table.lookup(&FqName::new(Self::WORKER_EXECUTE)),
        }
    }
}

/// The native built-ins a front-end hands over with its IR.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeBuiltIns {
    /// Package holding the C interop intrinsics and types.
    pub interop_package: FqName,
}

impl Default for NativeBuiltIns {
    fn default() -> Self {
        Self {
            interop_package: FqName::new("kiln.interop"),
        }
    }
}

/// Front-end plugin state carried alongside the K2 IR.
#[derive(Debug, Clone, Default)]
pub struct PluginContext {
    pub builtins: NativeBuiltIns,
}

/// Interop intrinsics and types, resolved against a symbol table.
///
/// Entries are `None` when the program never declares them, in which case
/// the checks that depend on them have nothing to match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteropBuiltIns {
    pub static_c_function: Option<Symbol>,
    pub size_of: Option<Symbol>,
    pub alloc: Option<Symbol>,
    pub c_variable: Option<Symbol>,
}

impl InteropBuiltIns {
    pub fn new(builtins: &NativeBuiltIns, table: &SymbolTable) -> Self {
        let resolve = |name: &str| table.lookup(&builtins.interop_package.child(name));
        Self {
            static_c_function: resolve("staticCFunction"),
            size_of: resolve("sizeOf"),
            alloc: resolve("alloc"),
            c_variable: resolve("CVariable"),
        }
    }

    /// Whether `callee` is one of the intrinsics taking C type arguments.
    pub fn is_type_intrinsic(&self, callee: Symbol) -> bool {
        Some(callee) == self.size_of || Some(callee) == self.alloc
    }
}

/// Whether a class symbol names a foreign class, one provided by a C library.
pub fn is_foreign_class(graph: &IrGraph, symbol: Symbol) -> bool {
    graph.resolve(symbol).is_some_and(|decl| decl.is_external && decl.as_class().is_some())
}

/// Whether the declaration carries the typed intrinsic annotation.
pub fn is_typed_intrinsic(graph: &IrGraph, decl: DeclId) -> bool {
    graph
        .get_decl(decl)
        .is_some_and(|d| d.has_annotation(&FqName::new(TYPED_INTRINSIC)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interop_lookup() {
        let mut table = SymbolTable::new();
        let size_of = table.declare("kiln.interop.sizeOf");
        let c_variable = table.declare("kiln.interop.CVariable");
        table.declare("app.sizeOf");

        let interop = InteropBuiltIns::new(&NativeBuiltIns::default(), &table);

        assert_eq!(interop.size_of, Some(size_of));
        assert_eq!(interop.c_variable, Some(c_variable));
        assert_eq!(interop.alloc, None);
        assert!(interop.is_type_intrinsic(size_of));
        assert!(!interop.is_type_intrinsic(c_variable));
    }

    #[test]
    fn test_backend_symbols_lookup() {
        let mut table = SymbolTable::new();
        let main = table.declare("app.main");

        let symbols = BackendSymbols::lookup(&table, "app.main");

        assert_eq!(symbols.entry_point, Some(main));
        assert_eq!(symbols.worker_execute, None);
        assert_eq!(BackendSymbols::lookup(&table, "main").entry_point, None);
    }
}
