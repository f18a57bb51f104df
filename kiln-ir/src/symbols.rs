//! Symbol table.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{DeclId, FqName, Symbol};

/// A named symbol and the declaration it resolves to, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: FqName,
    #[serde(default)]
    pub owner: Option<DeclId>,
}

/// Maps fully-qualified names to symbols and symbols to their declarations.
///
/// Front-ends declare and bind symbols; backend phases mostly read them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<SymbolEntry>", into = "Vec<SymbolEntry>")]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    by_name: IndexMap<FqName, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a symbol, returning the existing one if the name is already known.
    pub fn declare(&mut self, name: impl Into<FqName>) -> Symbol {
        let name = name.into();
        if let Some(symbol) = self.by_name.get(&name) {
            return *symbol;
        }
        let symbol = Symbol::new(self.entries.len());
        self.entries.push(SymbolEntry {
            name: name.clone(),
            owner: None,
        });
        self.by_name.insert(name, symbol);
        symbol
    }

    /// Bind a symbol to the declaration it refers to.
    ///
    /// # Panics
    ///
    /// Panics if the symbol was not created by this table.
    pub fn bind(&mut self, symbol: Symbol, decl: DeclId) {
        self.entries[symbol.index()].owner = Some(decl);
    }

    pub fn lookup(&self, name: &FqName) -> Option<Symbol> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        symbol.index() < self.entries.len()
    }

    /// The declaration a symbol resolves to.
    pub fn owner(&self, symbol: Symbol) -> Option<DeclId> {
        self.entries.get(symbol.index()).and_then(|e| e.owner)
    }

    pub fn name(&self, symbol: Symbol) -> Option<&FqName> {
        self.entries.get(symbol.index()).map(|e| &e.name)
    }

    /// The symbol bound to a declaration, if any.
    pub fn symbol_of(&self, decl: DeclId) -> Option<Symbol> {
        self.entries
            .iter()
            .position(|e| e.owner == Some(decl))
            .map(Symbol::new)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &SymbolEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (Symbol::new(i), e))
    }
}

impl From<Vec<SymbolEntry>> for SymbolTable {
    fn from(entries: Vec<SymbolEntry>) -> Self {
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), Symbol::new(i)))
            .collect();
        Self { entries, by_name }
    }
}

impl From<SymbolTable> for Vec<SymbolEntry> {
    fn from(table: SymbolTable) -> Self {
        table.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_is_idempotent() {
        let mut table = SymbolTable::new();
        let a = table.declare("app.main");
        let b = table.declare("app.main");

        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_bind_and_resolve() {
        let mut table = SymbolTable::new();
        let symbol = table.declare("app.main");
        assert_eq!(table.owner(symbol), None);

        table.bind(symbol, DeclId::new(3));

        assert_eq!(table.owner(symbol), Some(DeclId::new(3)));
        assert_eq!(table.symbol_of(DeclId::new(3)), Some(symbol));
        assert_eq!(table.lookup(&FqName::new("app.main")), Some(symbol));
    }

    #[test]
    fn test_serde_rebuilds_name_index() {
        let mut table = SymbolTable::new();
        table.declare("a");
        let b = table.declare("b");

        let json = serde_json::to_string(&table).unwrap();
        let restored: SymbolTable = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.lookup(&FqName::new("b")), Some(b));
    }
}
