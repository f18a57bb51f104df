//! Intermediate representation for the Kiln native backend.
//!
//! This crate provides the module graph that backend phases read and mutate.
//! The graph is an arena: modules, files and declarations live in flat
//! vectors and refer to each other through stable indices.
//!
//! # Architecture
//!
//! ```text
//! front-end → IrGraph (modules → files → declarations) → backend phases
//! ```
//!
//! - [`IrGraph`] owns every module, file and declaration of a compilation
//! - [`SymbolTable`] maps fully-qualified names to declarations
//! - [`IrBuiltIns`] is the built-in types registry of the graph
//! - [`verify_module`] performs the structural checks every phase relies on

mod decl;
mod expr;
mod graph;
mod ids;
mod name;
mod render;
mod symbols;
mod types;
mod verify;

pub use decl::{
    Class, DeclKind, DeclOrigin, DeclParent, Declaration, Function, Modality, Property,
    ValueParameter,
};
pub use expr::{Expr, Literal, SymbolRemapper};
pub use graph::{ExpectActualTable, IrFile, IrGraph, IrModule};
pub use ids::{DeclId, FileId, ModuleId, Symbol};
pub use name::FqName;
pub use render::{render_expr, render_module, render_type};
pub use symbols::{SymbolEntry, SymbolTable};
pub use types::{BuiltinType, IrBuiltIns, IrType};
pub use verify::{IrViolation, verify_graph, verify_module};
