//! Stable arena indices.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from an arena position.
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// The arena position this id refers to.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

arena_id!(
    /// Index of a module in the [`IrGraph`](crate::IrGraph).
    ModuleId,
    "module#"
);
arena_id!(
    /// Index of a file in the [`IrGraph`](crate::IrGraph).
    FileId,
    "file#"
);
arena_id!(
    /// Index of a declaration in the [`IrGraph`](crate::IrGraph).
    DeclId,
    "decl#"
);
arena_id!(
    /// Handle into the [`SymbolTable`](crate::SymbolTable).
    Symbol,
    "sym#"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = DeclId::new(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "decl#7");
    }

    #[test]
    fn test_id_serializes_as_number() {
        let json = serde_json::to_string(&Symbol::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
