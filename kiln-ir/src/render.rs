//! Human-readable IR dumps.

use std::fmt::Write;

use crate::{
    DeclId, DeclKind, DeclOrigin, Expr, IrGraph, IrType, Literal, Modality, ModuleId, Symbol,
};

/// Render a module as indented text, one declaration per line.
pub fn render_module(graph: &IrGraph, module: ModuleId) -> String {
    let mut out = String::new();
    let data = graph.module(module);
    let _ = writeln!(out, "module {}", data.name);
    for file in &data.files {
        let file_data = graph.file(*file);
        if file_data.package.is_root() {
            let _ = writeln!(out, "  file {}", file_data.path);
        } else {
            let _ = writeln!(out, "  file {} (package {})", file_data.path, file_data.package);
        }
        for decl in &file_data.declarations {
            render_declaration(graph, *decl, 2, &mut out);
        }
    }
    out
}

/// Render a single expression.
pub fn render_expr(graph: &IrGraph, expr: &Expr) -> String {
    match expr {
        Expr::Const(literal) => match literal {
            Literal::Unit => "Unit".to_string(),
            Literal::Null => "null".to_string(),
            Literal::Bool(value) => value.to_string(),
            Literal::Int(value) => value.to_string(),
            Literal::Float(value) => value.to_string(),
            Literal::String(value) => format!("{:?}", value),
        },
        Expr::GetParam { owner, index } => graph
            .get_decl(*owner)
            .and_then(|d| d.as_function())
            .and_then(|f| f.params.get(*index))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("{}[{}]", owner, index)),
        Expr::GetLocal { name } => name.clone(),
        Expr::Call {
            callee,
            type_args,
            args,
        } => {
            let mut rendered = symbol_name(graph, *callee);
            if !type_args.is_empty() {
                let types: Vec<_> = type_args.iter().map(|t| render_type(graph, t)).collect();
                let _ = write!(rendered, "<{}>", types.join(", "));
            }
            let args: Vec<_> = args.iter().map(|a| render_expr(graph, a)).collect();
            let _ = write!(rendered, "({})", args.join(", "));
            rendered
        }
        Expr::FunctionRef { target } => format!("::{}", symbol_name(graph, *target)),
        Expr::Lambda {
            params,
            captures,
            body,
        } => {
            let mut rendered = String::from("{ ");
            if !captures.is_empty() {
                let _ = write!(rendered, "[{}] ", captures.join(", "));
            }
            if !params.is_empty() {
                let _ = write!(rendered, "{} -> ", params.join(", "));
            }
            let _ = write!(rendered, "{} }}", render_expr(graph, body));
            rendered
        }
        Expr::Block { statements } => {
            let statements: Vec<_> = statements.iter().map(|s| render_expr(graph, s)).collect();
            format!("{{ {} }}", statements.join("; "))
        }
        Expr::Return { value } => format!("return {}", render_expr(graph, value)),
    }
}

fn render_declaration(graph: &IrGraph, id: DeclId, depth: usize, out: &mut String) {
    let decl = graph.decl(id);
    let indent = "  ".repeat(depth);
    let mut line = indent.clone();

    for annotation in &decl.annotations {
        let _ = write!(line, "@{} ", annotation.short_name());
    }
    if decl.is_expect {
        line.push_str("expect ");
    }
    if decl.is_external {
        line.push_str("external ");
    }

    match &decl.kind {
        DeclKind::Function(function) => {
            let params: Vec<_> = function
                .params
                .iter()
                .map(|p| {
                    let mut param = format!("{}: {}", p.name, render_type(graph, &p.ty));
                    if let Some(default) = &p.default {
                        let _ = write!(param, " = {}", render_expr(graph, default));
                    }
                    param
                })
                .collect();
            let _ = write!(
                line,
                "fun {}({}): {}",
                decl.name,
                params.join(", "),
                render_type(graph, &function.return_type)
            );
            if let Some(body) = &function.body {
                let _ = write!(line, " = {}", render_expr(graph, body));
            }
        }
        DeclKind::Class(class) => {
            match class.modality {
                Modality::Final => {}
                Modality::Open => line.push_str("open "),
                Modality::Abstract => line.push_str("abstract "),
            }
            let _ = write!(line, "class {}", decl.name);
            if !class.supertypes.is_empty() {
                let supertypes: Vec<_> = class
                    .supertypes
                    .iter()
                    .map(|s| symbol_name(graph, *s))
                    .collect();
                let _ = write!(line, " : {}", supertypes.join(", "));
            }
        }
        DeclKind::Property(property) => {
            let _ = write!(line, "val {}: {}", decl.name, render_type(graph, &property.ty));
            if let Some(initializer) = &property.initializer {
                let _ = write!(line, " = {}", render_expr(graph, initializer));
            }
        }
    }

    match decl.origin {
        DeclOrigin::Source => {}
        DeclOrigin::Synthetic => line.push_str("  // synthetic"),
        DeclOrigin::EntryPoint => line.push_str("  // entry point"),
    }

    let _ = writeln!(out, "{}", line);
    for child in decl.children() {
        render_declaration(graph, *child, depth + 1, out);
    }
}

/// Render a type by the short names of the classes it mentions.
pub fn render_type(graph: &IrGraph, ty: &IrType) -> String {
    match ty {
        IrType::Builtin(builtin) => builtin.name().to_string(),
        IrType::Class(symbol) => symbol_name(graph, *symbol),
        IrType::Array(element) => format!("Array<{}>", render_type(graph, element)),
        IrType::Nullable(inner) => format!("{}?", render_type(graph, inner)),
    }
}

fn symbol_name(graph: &IrGraph, symbol: Symbol) -> String {
    graph
        .symbols()
        .name(symbol)
        .map(|name| name.short_name().to_string())
        .unwrap_or_else(|| symbol.to_string())
}
