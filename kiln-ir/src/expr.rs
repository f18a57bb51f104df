//! IR expressions.

use serde::{Deserialize, Serialize};

use crate::{DeclId, IrType, Symbol};

/// A constant value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Unit,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// An expression tree.
///
/// Expressions refer to declarations only through symbols and parameter
/// owners, so a tree can be cloned into another scope by remapping those
/// references (see [`Expr::remapped`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Const(Literal),
    /// Read the value parameter at `index` of the function `owner`.
    GetParam { owner: DeclId, index: usize },
    /// Read a local variable or a lambda parameter.
    GetLocal { name: String },
    Call {
        callee: Symbol,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_args: Vec<IrType>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Expr>,
    },
    /// A reference to a function used as a value.
    FunctionRef { target: Symbol },
    Lambda {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        params: Vec<String>,
        /// Names of enclosing locals the lambda closes over.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        captures: Vec<String>,
        body: Box<Expr>,
    },
    Block { statements: Vec<Expr> },
    Return { value: Box<Expr> },
}

/// Maps references from one declaration scope into another.
pub trait SymbolRemapper {
    /// Map a referenced symbol.
    fn remap_symbol(&self, symbol: Symbol) -> Symbol;

    /// Map the owner of a parameter read.
    fn remap_declaration(&self, decl: DeclId) -> DeclId;
}

impl Expr {
    pub fn int(value: i64) -> Self {
        Expr::Const(Literal::Int(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Const(Literal::String(value.into()))
    }

    /// A call without type arguments.
    pub fn call(callee: Symbol, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee,
            type_args: Vec::new(),
            args,
        }
    }

    /// A call with explicit type arguments.
    pub fn generic_call(callee: Symbol, type_args: Vec<IrType>, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee,
            type_args,
            args,
        }
    }

    /// A lambda closing over the given locals.
    pub fn lambda(captures: Vec<String>, body: Expr) -> Self {
        Expr::Lambda {
            params: Vec::new(),
            captures,
            body: Box::new(body),
        }
    }

    /// Direct subexpressions, in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Const(_)
            | Expr::GetParam { .. }
            | Expr::GetLocal { .. }
            | Expr::FunctionRef { .. } => Vec::new(),
            Expr::Call { args, .. } => args.iter().collect(),
            Expr::Lambda { body, .. } => vec![body],
            Expr::Block { statements } => statements.iter().collect(),
            Expr::Return { value } => vec![value],
        }
    }

    /// Visit this expression and all nested expressions in pre-order.
    pub fn walk<'e>(&'e self, visit: &mut impl FnMut(&'e Expr)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Every symbol this tree refers to, including symbols inside type arguments.
    pub fn referenced_symbols(&self) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        self.walk(&mut |expr| match expr {
            Expr::Call {
                callee, type_args, ..
            } => {
                symbols.push(*callee);
                symbols.extend(type_args.iter().flat_map(IrType::referenced_symbols));
            }
            Expr::FunctionRef { target } => symbols.push(*target),
            _ => {}
        });
        symbols
    }

    /// Deep-clone this tree, rewriting references through `remapper`.
    pub fn remapped(&self, remapper: &dyn SymbolRemapper) -> Expr {
        match self {
            Expr::Const(literal) => Expr::Const(literal.clone()),
            Expr::GetParam { owner, index } => Expr::GetParam {
                owner: remapper.remap_declaration(*owner),
                index: *index,
            },
            Expr::GetLocal { name } => Expr::GetLocal { name: name.clone() },
            Expr::Call {
                callee,
                type_args,
                args,
            } => Expr::Call {
                callee: remapper.remap_symbol(*callee),
                type_args: type_args
                    .iter()
                    .map(|ty| remap_type(ty, remapper))
                    .collect(),
                args: args.iter().map(|arg| arg.remapped(remapper)).collect(),
            },
            Expr::FunctionRef { target } => Expr::FunctionRef {
                target: remapper.remap_symbol(*target),
            },
            Expr::Lambda {
                params,
                captures,
                body,
            } => Expr::Lambda {
                params: params.clone(),
                captures: captures.clone(),
                body: Box::new(body.remapped(remapper)),
            },
            Expr::Block { statements } => Expr::Block {
                statements: statements.iter().map(|s| s.remapped(remapper)).collect(),
            },
            Expr::Return { value } => Expr::Return {
                value: Box::new(value.remapped(remapper)),
            },
        }
    }
}

fn remap_type(ty: &IrType, remapper: &dyn SymbolRemapper) -> IrType {
    match ty {
        IrType::Builtin(builtin) => IrType::Builtin(*builtin),
        IrType::Class(symbol) => IrType::Class(remapper.remap_symbol(*symbol)),
        IrType::Array(inner) => IrType::Array(Box::new(remap_type(inner, remapper))),
        IrType::Nullable(inner) => IrType::Nullable(Box::new(remap_type(inner, remapper))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shift;

    impl SymbolRemapper for Shift {
        fn remap_symbol(&self, symbol: Symbol) -> Symbol {
            Symbol::new(symbol.index() + 10)
        }

        fn remap_declaration(&self, decl: DeclId) -> DeclId {
            DeclId::new(decl.index() + 100)
        }
    }

    #[test]
    fn test_walk_is_preorder() {
        let expr = Expr::Block {
            statements: vec![
                Expr::call(Symbol::new(1), vec![Expr::int(1)]),
                Expr::Return {
                    value: Box::new(Expr::int(2)),
                },
            ],
        };

        let mut kinds = Vec::new();
        expr.walk(&mut |e| {
            kinds.push(match e {
                Expr::Block { .. } => "block",
                Expr::Call { .. } => "call",
                Expr::Return { .. } => "return",
                Expr::Const(_) => "const",
                _ => "other",
            })
        });

        assert_eq!(kinds, ["block", "call", "const", "return", "const"]);
    }

    #[test]
    fn test_referenced_symbols_include_type_args() {
        let expr = Expr::generic_call(
            Symbol::new(1),
            vec![IrType::Class(Symbol::new(2))],
            vec![Expr::FunctionRef {
                target: Symbol::new(3),
            }],
        );

        assert_eq!(
            expr.referenced_symbols(),
            vec![Symbol::new(1), Symbol::new(2), Symbol::new(3)]
        );
    }

    #[test]
    fn test_remapped_rewrites_references() {
        let expr = Expr::lambda(
            vec!["x".into()],
            Expr::call(
                Symbol::new(1),
                vec![Expr::GetParam {
                    owner: DeclId::new(0),
                    index: 1,
                }],
            ),
        );

        let copy = expr.remapped(&Shift);

        assert_eq!(
            copy,
            Expr::lambda(
                vec!["x".into()],
                Expr::call(
                    Symbol::new(11),
                    vec![Expr::GetParam {
                        owner: DeclId::new(100),
                        index: 1,
                    }],
                ),
            )
        );
        // The original is untouched.
        assert_eq!(expr.referenced_symbols(), vec![Symbol::new(1)]);
    }
}
