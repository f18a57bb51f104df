//! IR types and the built-in types registry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{FqName, Symbol};

/// Types provided by the language runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinType {
    Unit,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Any,
    Nothing,
}

impl BuiltinType {
    const ALL: [BuiltinType; 12] = [
        BuiltinType::Unit,
        BuiltinType::Boolean,
        BuiltinType::Byte,
        BuiltinType::Short,
        BuiltinType::Int,
        BuiltinType::Long,
        BuiltinType::Float,
        BuiltinType::Double,
        BuiltinType::Char,
        BuiltinType::String,
        BuiltinType::Any,
        BuiltinType::Nothing,
    ];

    /// The simple name of this type.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Unit => "Unit",
            BuiltinType::Boolean => "Boolean",
            BuiltinType::Byte => "Byte",
            BuiltinType::Short => "Short",
            BuiltinType::Int => "Int",
            BuiltinType::Long => "Long",
            BuiltinType::Float => "Float",
            BuiltinType::Double => "Double",
            BuiltinType::Char => "Char",
            BuiltinType::String => "String",
            BuiltinType::Any => "Any",
            BuiltinType::Nothing => "Nothing",
        }
    }
}

/// The type of a value in the IR.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrType {
    /// A built-in type.
    Builtin(BuiltinType),
    /// A class declared in the graph.
    Class(Symbol),
    /// An array of the element type.
    Array(Box<IrType>),
    /// The nullable variant of the inner type.
    Nullable(Box<IrType>),
}

impl IrType {
    pub fn unit() -> Self {
        IrType::Builtin(BuiltinType::Unit)
    }

    pub fn int() -> Self {
        IrType::Builtin(BuiltinType::Int)
    }

    pub fn string() -> Self {
        IrType::Builtin(BuiltinType::String)
    }

    pub fn array(element: IrType) -> Self {
        IrType::Array(Box::new(element))
    }

    pub fn nullable(self) -> Self {
        match self {
            IrType::Nullable(_) => self,
            other => IrType::Nullable(Box::new(other)),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, IrType::Nullable(_))
    }

    /// The class symbol of this type, if it is a (possibly nullable) class type.
    pub fn class_symbol(&self) -> Option<Symbol> {
        match self {
            IrType::Class(symbol) => Some(*symbol),
            IrType::Nullable(inner) => inner.class_symbol(),
            _ => None,
        }
    }

    /// Symbols of every class mentioned by this type.
    pub fn referenced_symbols(&self) -> Vec<Symbol> {
        match self {
            IrType::Builtin(_) => Vec::new(),
            IrType::Class(symbol) => vec![*symbol],
            IrType::Array(inner) | IrType::Nullable(inner) => inner.referenced_symbols(),
        }
    }
}

/// Registry of built-in types, keyed by their qualified names.
#[derive(Debug, Clone)]
pub struct IrBuiltIns {
    names: IndexMap<BuiltinType, FqName>,
}

impl IrBuiltIns {
    /// The package every built-in type lives in.
    pub const PACKAGE: &'static str = "kiln";

    pub fn new() -> Self {
        let package = FqName::new(Self::PACKAGE);
        let names = BuiltinType::ALL
            .iter()
            .map(|ty| (*ty, package.child(ty.name())))
            .collect();
        Self { names }
    }

    /// Qualified name of a built-in type.
    pub fn fq_name(&self, ty: BuiltinType) -> Option<&FqName> {
        self.names.get(&ty)
    }

    /// Resolve a qualified name to a built-in type.
    pub fn lookup(&self, name: &FqName) -> Option<BuiltinType> {
        self.names
            .iter()
            .find(|(_, fq)| *fq == name)
            .map(|(ty, _)| *ty)
    }

    /// Whether the type is a non-nullable primitive value type.
    pub fn is_primitive_type(&self, ty: &IrType) -> bool {
        match ty {
            IrType::Builtin(builtin) => {
                self.names.contains_key(builtin)
                    && matches!(
                        builtin,
                        BuiltinType::Boolean
                            | BuiltinType::Byte
                            | BuiltinType::Short
                            | BuiltinType::Int
                            | BuiltinType::Long
                            | BuiltinType::Float
                            | BuiltinType::Double
                            | BuiltinType::Char
                    )
            }
            _ => false,
        }
    }

    /// `Array<String>`, the parameter type of program entry points.
    pub fn string_array_type(&self) -> IrType {
        IrType::array(IrType::string())
    }
}

impl Default for IrBuiltIns {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_names() {
        let builtins = IrBuiltIns::new();
        assert_eq!(
            builtins.fq_name(BuiltinType::Int),
            Some(&FqName::new("kiln.Int"))
        );
        assert_eq!(
            builtins.lookup(&FqName::new("kiln.String")),
            Some(BuiltinType::String)
        );
        assert_eq!(builtins.lookup(&FqName::new("kiln.Widget")), None);
    }

    #[test]
    fn test_primitive_types() {
        let builtins = IrBuiltIns::new();
        assert!(builtins.is_primitive_type(&IrType::int()));
        assert!(!builtins.is_primitive_type(&IrType::string()));
        assert!(!builtins.is_primitive_type(&IrType::int().nullable()));
        assert!(!builtins.is_primitive_type(&IrType::Class(Symbol::new(0))));
    }

    #[test]
    fn test_class_symbol_through_nullable() {
        let ty = IrType::Class(Symbol::new(4)).nullable();
        assert_eq!(ty.class_symbol(), Some(Symbol::new(4)));
        assert_eq!(IrType::array(ty).class_symbol(), None);
    }
}
