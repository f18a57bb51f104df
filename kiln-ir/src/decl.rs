//! Declarations.

use serde::{Deserialize, Serialize};

use crate::{DeclId, Expr, FileId, FqName, IrType, Symbol};

/// Where a declaration is attached in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclParent {
    /// A top-level declaration of a file.
    File(FileId),
    /// A member of another declaration.
    Declaration(DeclId),
}

impl From<FileId> for DeclParent {
    fn from(file: FileId) -> Self {
        DeclParent::File(file)
    }
}

impl From<DeclId> for DeclParent {
    fn from(decl: DeclId) -> Self {
        DeclParent::Declaration(decl)
    }
}

/// How a declaration came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclOrigin {
    /// Written by the user.
    #[default]
    Source,
    /// Created by a backend phase.
    Synthetic,
    /// The routine invoked at process start.
    EntryPoint,
}

/// Inheritance modality of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    #[default]
    Final,
    Open,
    Abstract,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueParameter {
    pub name: String,
    pub ty: IrType,
    /// Default value expression, evaluated in the scope of the owning function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Expr>,
}

impl ValueParameter {
    pub fn new(name: impl Into<String>, ty: IrType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    #[serde(default)]
    pub params: Vec<ValueParameter>,
    pub return_type: IrType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Expr>,
}

impl Function {
    pub fn new(return_type: IrType) -> Self {
        Self {
            params: Vec::new(),
            return_type,
            body: None,
        }
    }

    pub fn with_param(mut self, param: ValueParameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_body(mut self, body: Expr) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Class {
    /// Direct supertypes, as class symbols.
    #[serde(default)]
    pub supertypes: Vec<Symbol>,
    #[serde(default)]
    pub modality: Modality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub ty: IrType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Expr>,
}

/// The kind-specific payload of a declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclKind {
    Function(Function),
    Class(Class),
    Property(Property),
}

/// A declaration node of the graph.
///
/// The `parent` and `children` links are maintained by
/// [`IrGraph::add_declaration`](crate::IrGraph::add_declaration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(flatten)]
    pub kind: DeclKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<FqName>,
    /// Declared once abstractly, implemented per platform.
    #[serde(default)]
    pub is_expect: bool,
    /// Provided by a foreign library rather than compiled from source.
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub origin: DeclOrigin,
    #[serde(default)]
    pub(crate) parent: Option<DeclParent>,
    #[serde(default)]
    pub(crate) children: Vec<DeclId>,
}

impl Declaration {
    fn with_kind(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotations: Vec::new(),
            is_expect: false,
            is_external: false,
            origin: DeclOrigin::Source,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn function(name: impl Into<String>, function: Function) -> Self {
        Self::with_kind(name, DeclKind::Function(function))
    }

    pub fn class(name: impl Into<String>, class: Class) -> Self {
        Self::with_kind(name, DeclKind::Class(class))
    }

    pub fn property(name: impl Into<String>, property: Property) -> Self {
        Self::with_kind(name, DeclKind::Property(property))
    }

    pub fn annotated(mut self, annotation: impl Into<FqName>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn expect(mut self) -> Self {
        self.is_expect = true;
        self
    }

    pub fn external(mut self) -> Self {
        self.is_external = true;
        self
    }

    pub fn with_origin(mut self, origin: DeclOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// The node this declaration is attached to, once added to a graph.
    pub fn parent(&self) -> Option<DeclParent> {
        self.parent
    }

    /// Nested declarations, in declaration order.
    pub fn children(&self) -> &[DeclId] {
        &self.children
    }

    pub fn has_annotation(&self, annotation: &FqName) -> bool {
        self.annotations.iter().any(|a| a == annotation)
    }

    pub fn is_top_level(&self) -> bool {
        matches!(self.parent, Some(DeclParent::File(_)))
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            DeclKind::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut Function> {
        match &mut self.kind {
            DeclKind::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Class> {
        match &self.kind {
            DeclKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Expressions owned directly by this declaration (defaults, body, initializer).
    pub fn expressions(&self) -> Vec<&Expr> {
        match &self.kind {
            DeclKind::Function(function) => function
                .params
                .iter()
                .filter_map(|p| p.default.as_ref())
                .chain(function.body.as_ref())
                .collect(),
            DeclKind::Class(_) => Vec::new(),
            DeclKind::Property(property) => property.initializer.iter().collect(),
        }
    }
}
