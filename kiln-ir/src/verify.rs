//! Structural IR verification.
//!
//! The verifier never mutates the graph. It reports every violation it finds
//! so callers can decide how fatal they are.

use std::{collections::HashSet, fmt};

use crate::{DeclId, DeclKind, DeclParent, Expr, FileId, IrGraph, IrType, ModuleId, Symbol};

/// A structural invariant the graph does not satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrViolation {
    /// Where the violation was found (file path or declaration name).
    pub location: String,
    pub message: String,
}

impl fmt::Display for IrViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Verify every module of the graph, then report declarations no file of any
/// module reaches.
pub fn verify_graph(graph: &IrGraph) -> Vec<IrViolation> {
    let mut violations: Vec<_> = graph
        .modules()
        .flat_map(|(id, _)| verify_module(graph, id))
        .collect();

    let reachable: HashSet<DeclId> = graph
        .modules()
        .flat_map(|(id, _)| graph.declarations_in_module(id))
        .collect();
    for (id, decl) in graph.declarations() {
        if !reachable.contains(&id) {
            violations.push(IrViolation {
                location: decl.name.clone(),
                message: format!("{} is not attached to a file of any module", id),
            });
        }
    }
    violations
}

/// Verify one module: file membership, parent links, symbol references and
/// parameter reads.
pub fn verify_module(graph: &IrGraph, module: ModuleId) -> Vec<IrViolation> {
    let mut verifier = Verifier {
        graph,
        visited: HashSet::new(),
        violations: Vec::new(),
    };
    verifier.module(module);
    verifier.violations
}

struct Verifier<'g> {
    graph: &'g IrGraph,
    visited: HashSet<DeclId>,
    violations: Vec<IrViolation>,
}

impl Verifier<'_> {
    fn report(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.violations.push(IrViolation {
            location: location.into(),
            message: message.into(),
        });
    }

    fn module(&mut self, module: ModuleId) {
        let graph = self.graph;
        let Some(data) = graph.get_module(module) else {
            self.report(module.to_string(), "module does not exist");
            return;
        };
        for file in &data.files {
            let Some(file_data) = graph.get_file(*file) else {
                self.report(&data.name, format!("{} does not exist", file));
                continue;
            };
            if file_data.module != module {
                self.report(
                    &file_data.path,
                    format!("listed in module '{}' but owned by {}", data.name, file_data.module),
                );
            }
            self.file(*file);
        }

        for (expect, actual) in data.expect_actual.pairs() {
            for decl in [expect, actual] {
                if graph.get_decl(decl).is_none() {
                    self.report(&data.name, format!("expect/actual pair refers to missing {}", decl));
                }
            }
        }
    }

    fn file(&mut self, file: FileId) {
        let graph = self.graph;
        let data = graph.file(file);
        for decl in &data.declarations {
            self.declaration(*decl, DeclParent::File(file), &data.path);
        }
    }

    fn declaration(&mut self, id: DeclId, expected_parent: DeclParent, path: &str) {
        let graph = self.graph;
        let Some(decl) = graph.get_decl(id) else {
            self.report(path, format!("{} does not exist", id));
            return;
        };
        let location = format!("{}::{}", path, decl.name);

        if decl.parent != Some(expected_parent) {
            self.report(
                &location,
                format!("parent link {:?} does not match owner {:?}", decl.parent, expected_parent),
            );
            return;
        }
        if !self.visited.insert(id) {
            self.report(&location, format!("{} appears more than once in the tree", id));
            return;
        }

        match &decl.kind {
            DeclKind::Function(function) => {
                for param in &function.params {
                    self.ty(&location, &param.ty);
                }
                self.ty(&location, &function.return_type);
            }
            DeclKind::Class(class) => {
                for supertype in &class.supertypes {
                    self.symbol(&location, *supertype);
                }
            }
            DeclKind::Property(property) => self.ty(&location, &property.ty),
        }

        for expr in decl.expressions() {
            self.expr(&location, id, expr);
        }

        for child in &decl.children {
            self.declaration(*child, DeclParent::Declaration(id), path);
        }
    }

    fn expr(&mut self, location: &str, scope: DeclId, expr: &Expr) {
        let mut reads = Vec::new();
        let mut symbols = Vec::new();
        let mut types = Vec::new();
        expr.walk(&mut |e| match e {
            Expr::GetParam { owner, index } => reads.push((*owner, *index)),
            Expr::Call {
                callee, type_args, ..
            } => {
                symbols.push(*callee);
                types.extend(type_args.iter());
            }
            Expr::FunctionRef { target } => symbols.push(*target),
            _ => {}
        });

        for symbol in symbols {
            self.symbol(location, symbol);
        }
        for ty in types {
            self.ty(location, ty);
        }
        for (owner, index) in reads {
            self.param_read(location, scope, owner, index);
        }
    }

    fn param_read(&mut self, location: &str, scope: DeclId, owner: DeclId, index: usize) {
        if !self.encloses(owner, scope) {
            self.report(location, format!("reads a parameter of {} outside its scope", owner));
            return;
        }
        let arity = self
            .graph
            .decl(owner)
            .as_function()
            .map(|f| f.params.len())
            .unwrap_or(0);
        if index >= arity {
            self.report(
                location,
                format!("reads parameter #{} of {} which has {} parameter(s)", index, owner, arity),
            );
        }
    }

    /// Whether `owner` is `scope` or one of its enclosing declarations.
    fn encloses(&self, owner: DeclId, scope: DeclId) -> bool {
        if self.graph.get_decl(owner).is_none() {
            return false;
        }
        let mut current = Some(scope);
        while let Some(id) = current {
            if id == owner {
                return true;
            }
            current = match self.graph.get_decl(id).and_then(|d| d.parent) {
                Some(DeclParent::Declaration(parent)) => Some(parent),
                _ => None,
            };
        }
        false
    }

    fn ty(&mut self, location: &str, ty: &IrType) {
        for symbol in ty.referenced_symbols() {
            self.symbol(location, symbol);
        }
    }

    fn symbol(&mut self, location: &str, symbol: Symbol) {
        let graph = self.graph;
        let symbols = graph.symbols();
        if !symbols.contains(symbol) {
            self.report(location, format!("references unknown {}", symbol));
            return;
        }
        match symbols.owner(symbol) {
            Some(owner) if graph.try_file_of(owner).is_some() => {}
            Some(owner) if graph.get_decl(owner).is_some() => {
                let name = symbols.name(symbol).cloned().unwrap_or_default();
                self.report(
                    location,
                    format!("symbol '{}' is bound to {} which is not attached to a file", name, owner),
                );
            }
            Some(owner) => {
                let name = symbols.name(symbol).cloned().unwrap_or_default();
                self.report(location, format!("symbol '{}' is bound to missing {}", name, owner));
            }
            None => {
                let name = symbols.name(symbol).cloned().unwrap_or_default();
                self.report(location, format!("dangling reference to unbound symbol '{}'", name));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Declaration, Function, ValueParameter};

    fn graph_with_caller(callee: Symbol) -> (IrGraph, ModuleId) {
        let mut graph = IrGraph::new();
        let module = graph.add_module("app");
        let file = graph.add_file(module, "main.kiln", "app");
        graph.add_declaration(
            file,
            Declaration::function(
                "main",
                Function::new(IrType::unit()).with_body(Expr::call(callee, vec![])),
            ),
        );
        (graph, module)
    }

    #[test]
    fn test_well_formed_module() {
        let mut graph = IrGraph::new();
        let module = graph.add_module("app");
        let file = graph.add_file(module, "main.kiln", "app");
        let helper = graph.add_declaration(
            file,
            Declaration::function(
                "helper",
                Function::new(IrType::unit()).with_param(ValueParameter::new("x", IrType::int())),
            ),
        );
        let symbol = graph.declare_symbol(helper);
        graph.add_declaration(
            file,
            Declaration::function(
                "main",
                Function::new(IrType::unit()).with_body(Expr::call(symbol, vec![Expr::int(1)])),
            ),
        );

        assert!(verify_module(&graph, module).is_empty());
    }

    #[test]
    fn test_dangling_symbol() {
        let (mut graph, module) = graph_with_caller(Symbol::new(0));
        graph.symbols_mut().declare("lib.missing");

        let violations = verify_module(&graph, module);

        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("unbound symbol 'lib.missing'"));
        assert_eq!(violations[0].location, "main.kiln::main");
    }

    #[test]
    fn test_unknown_symbol() {
        let (graph, module) = graph_with_caller(Symbol::new(42));

        let violations = verify_module(&graph, module);

        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("unknown sym#42"));
    }

    #[test]
    fn test_parameter_read_out_of_range() {
        let mut graph = IrGraph::new();
        let module = graph.add_module("app");
        let file = graph.add_file(module, "main.kiln", "app");
        let f = graph.add_declaration(
            file,
            Declaration::function("f", Function::new(IrType::unit())),
        );
        graph.decl_mut(f).as_function_mut().unwrap().body = Some(Expr::GetParam {
            owner: f,
            index: 0,
        });

        let violations = verify_module(&graph, module);

        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("has 0 parameter(s)"));
    }

    #[test]
    fn test_parameter_read_from_foreign_scope() {
        let mut graph = IrGraph::new();
        let module = graph.add_module("app");
        let file = graph.add_file(module, "main.kiln", "app");
        let f = graph.add_declaration(
            file,
            Declaration::function(
                "f",
                Function::new(IrType::unit()).with_param(ValueParameter::new("x", IrType::int())),
            ),
        );
        graph.add_declaration(
            file,
            Declaration::function(
                "g",
                Function::new(IrType::unit()).with_body(Expr::GetParam { owner: f, index: 0 }),
            ),
        );

        let violations = verify_module(&graph, module);

        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("outside its scope"));
    }

    #[test]
    fn test_self_listed_child_reported() {
        let mut graph = IrGraph::new();
        let module = graph.add_module("app");
        let file = graph.add_file(module, "main.kiln", "app");
        let boxed = graph.add_declaration(file, Declaration::class("Box", Default::default()));
        graph.decl_mut(boxed).children.push(boxed);

        let violations = verify_module(&graph, module);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location, "main.kiln::Box");
        assert!(violations[0].message.contains("does not match owner"));
    }

    #[test]
    fn test_duplicate_listing_reported() {
        let mut graph = IrGraph::new();
        let module = graph.add_module("app");
        let file = graph.add_file(module, "main.kiln", "app");
        let widget = graph.add_declaration(file, Declaration::class("Widget", Default::default()));
        let draw = graph.add_declaration(
            widget,
            Declaration::function("draw", Function::new(IrType::unit())),
        );
        graph.decl_mut(widget).children.push(draw);

        let violations = verify_module(&graph, module);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location, "main.kiln::draw");
        assert!(violations[0].message.contains("decl#1 appears more than once"));
    }

    #[test]
    fn test_unattached_declaration_reported() {
        let (mut graph, _) = graph_with_caller(Symbol::new(0));
        let symbol = graph.symbols_mut().declare("app.helper");
        let helper = graph.add_declaration(
            FileId::new(0),
            Declaration::function("helper", Function::new(IrType::unit())),
        );
        graph.symbols_mut().bind(symbol, helper);
        graph.decl_mut(helper).parent = None;

        let violations: Vec<_> = verify_graph(&graph).iter().map(ToString::to_string).collect();

        assert_eq!(violations.len(), 3);
        assert_eq!(
            violations[0],
            "main.kiln::main: symbol 'app.helper' is bound to decl#1 which is not attached to a file"
        );
        assert!(violations[1].starts_with("main.kiln::helper: parent link"));
        assert_eq!(violations[2], "helper: decl#1 is not attached to a file of any module");
    }
}
