//! The IR module graph arena.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    DeclId, DeclParent, Declaration, FileId, FqName, IrBuiltIns, ModuleId, Symbol, SymbolTable,
};

/// Pairs of expect declarations and their actual implementations.
///
/// Maintained by the front-end; backend phases only read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectActualTable {
    pairs: Vec<(DeclId, DeclId)>,
}

impl ExpectActualTable {
    /// Record that `actual` implements `expect`, replacing any previous pairing.
    pub fn insert(&mut self, expect: DeclId, actual: DeclId) {
        match self.pairs.iter_mut().find(|(e, _)| *e == expect) {
            Some(pair) => pair.1 = actual,
            None => self.pairs.push((expect, actual)),
        }
    }

    pub fn pairs(&self) -> impl Iterator<Item = (DeclId, DeclId)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// A compilation module: an ordered collection of files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrModule {
    pub name: String,
    #[serde(default)]
    pub files: Vec<FileId>,
    #[serde(default, skip_serializing_if = "ExpectActualTable::is_empty")]
    pub expect_actual: ExpectActualTable,
}

/// A source (or synthetic) file: an ordered collection of top-level declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrFile {
    pub path: String,
    #[serde(default)]
    pub package: FqName,
    pub module: ModuleId,
    #[serde(default)]
    pub declarations: Vec<DeclId>,
}

/// Arena holding every module, file and declaration of one compilation.
///
/// Back-references (declaration to parent, file to module) are indices, so
/// the graph can be traversed and mutated without ownership cycles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrGraph {
    #[serde(default)]
    modules: Vec<IrModule>,
    #[serde(default)]
    files: Vec<IrFile>,
    #[serde(default)]
    declarations: Vec<Declaration>,
    #[serde(default)]
    symbols: SymbolTable,
    #[serde(skip)]
    builtins: IrBuiltIns,
}

impl IrGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, name: impl Into<String>) -> ModuleId {
        let id = ModuleId::new(self.modules.len());
        self.modules.push(IrModule {
            name: name.into(),
            files: Vec::new(),
            expect_actual: ExpectActualTable::default(),
        });
        id
    }

    /// Append a file to a module.
    pub fn add_file(
        &mut self,
        module: ModuleId,
        path: impl Into<String>,
        package: impl Into<FqName>,
    ) -> FileId {
        let id = FileId::new(self.files.len());
        self.files.push(IrFile {
            path: path.into(),
            package: package.into(),
            module,
            declarations: Vec::new(),
        });
        self.modules[module.index()].files.push(id);
        id
    }

    /// Attach a declaration to a file or to another declaration.
    pub fn add_declaration(
        &mut self,
        parent: impl Into<DeclParent>,
        mut declaration: Declaration,
    ) -> DeclId {
        let parent = parent.into();
        let id = DeclId::new(self.declarations.len());
        declaration.parent = Some(parent);
        declaration.children.clear();
        self.declarations.push(declaration);
        match parent {
            DeclParent::File(file) => self.files[file.index()].declarations.push(id),
            DeclParent::Declaration(owner) => self.declarations[owner.index()].children.push(id),
        }
        id
    }

    /// Declare a symbol named after the declaration and bind it.
    pub fn declare_symbol(&mut self, decl: DeclId) -> Symbol {
        let name = self.fq_name_of(decl);
        let symbol = self.symbols.declare(name);
        self.symbols.bind(symbol, decl);
        symbol
    }

    pub fn module(&self, id: ModuleId) -> &IrModule {
        &self.modules[id.index()]
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut IrModule {
        &mut self.modules[id.index()]
    }

    pub fn get_module(&self, id: ModuleId) -> Option<&IrModule> {
        self.modules.get(id.index())
    }

    pub fn module_by_name(&self, name: &str) -> Option<ModuleId> {
        self.modules
            .iter()
            .position(|m| m.name == name)
            .map(ModuleId::new)
    }

    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &IrModule)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, m)| (ModuleId::new(i), m))
    }

    pub fn file(&self, id: FileId) -> &IrFile {
        &self.files[id.index()]
    }

    pub fn get_file(&self, id: FileId) -> Option<&IrFile> {
        self.files.get(id.index())
    }

    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.declarations[id.index()]
    }

    pub fn get_decl(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(id.index())
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.declarations[id.index()]
    }

    /// Every declaration of the arena, attached or not.
    pub fn declarations(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.declarations
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclId::new(i), d))
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// The built-in types registry of this graph.
    pub fn builtins(&self) -> &IrBuiltIns {
        &self.builtins
    }

    /// The declaration a symbol resolves to.
    pub fn resolve(&self, symbol: Symbol) -> Option<&Declaration> {
        self.symbols.owner(symbol).and_then(|id| self.get_decl(id))
    }

    /// The file that (transitively) owns a declaration.
    ///
    /// # Panics
    ///
    /// Panics if the declaration was never attached to the graph.
    pub fn file_of(&self, decl: DeclId) -> FileId {
        self.try_file_of(decl)
            .unwrap_or_else(|| panic!("{} is not attached to the graph", decl))
    }

    /// The file that (transitively) owns a declaration, or `None` when the
    /// parent chain is missing, cyclic, or ends at a file that does not exist.
    pub fn try_file_of(&self, decl: DeclId) -> Option<FileId> {
        let mut current = decl;
        // A chain longer than the arena loops.
        for _ in 0..=self.declarations.len() {
            match self.get_decl(current)?.parent()? {
                DeclParent::File(file) => return self.get_file(file).map(|_| file),
                DeclParent::Declaration(owner) => current = owner,
            }
        }
        None
    }

    /// Fully-qualified name: the file package, then every enclosing declaration.
    pub fn fq_name_of(&self, decl: DeclId) -> FqName {
        let mut segments = vec![self.decl(decl).name.as_str()];
        let mut current = decl;
        while let Some(DeclParent::Declaration(owner)) = self.decl(current).parent {
            if segments.len() > self.declarations.len() {
                break;
            }
            segments.push(self.decl(owner).name.as_str());
            current = owner;
        }
        let package = self.file(self.file_of(decl)).package.clone();
        segments
            .iter()
            .rev()
            .fold(package, |name, segment| name.child(segment))
    }

    /// Declarations of a file, including nested ones, in pre-order.
    ///
    /// Only declarations whose parent link points back at their owner are
    /// visited, and each at most once.
    pub fn declarations_in_file(&self, file: FileId) -> Vec<DeclId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        if let Some(data) = self.get_file(file) {
            for decl in &data.declarations {
                self.collect_preorder(*decl, DeclParent::File(file), &mut seen, &mut out);
            }
        }
        out
    }

    /// Declarations of every file of a module, in pre-order.
    pub fn declarations_in_module(&self, module: ModuleId) -> Vec<DeclId> {
        self.module(module)
            .files
            .iter()
            .flat_map(|file| self.declarations_in_file(*file))
            .collect()
    }

    fn collect_preorder(
        &self,
        decl: DeclId,
        parent: DeclParent,
        seen: &mut HashSet<DeclId>,
        out: &mut Vec<DeclId>,
    ) {
        let Some(data) = self.get_decl(decl) else {
            return;
        };
        if data.parent != Some(parent) || !seen.insert(decl) {
            return;
        }
        out.push(decl);
        for child in &data.children {
            self.collect_preorder(*child, DeclParent::Declaration(decl), seen, out);
        }
    }
}
