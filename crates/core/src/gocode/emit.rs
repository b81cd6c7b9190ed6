//! Go source emission via the Emit trait.
//!
//! Converts IR nodes into gofmt-shaped text: tab indentation, space-aligned
//! struct columns, grouped imports. Emission is a pure function of the node,
//! so emitting the same tree twice yields identical text.

use super::types::{
    BinaryOp, Decl, Else, Expr, Field, FuncDecl, FuncSig, GoFile, InterfaceMethod, Lit, Stmt, Tag,
    TypeDecl, TypeDeclKind, TypeExpr, UnaryOp,
};
use super::utils::quote_go_string;

/// Trait for emitting Go code from IR nodes.
pub trait Emit {
    /// Convert the node to its Go source representation.
    fn emit(&self) -> String;
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TypeExpr {
    fn emit(&self) -> String {
        match self {
            TypeExpr::Ident(name) => name.clone(),
            TypeExpr::Selector { pkg, name } => format!("{pkg}.{name}"),
            TypeExpr::Pointer(inner) => format!("*{}", inner.emit()),
            TypeExpr::Slice(elem) => format!("[]{}", elem.emit()),
            TypeExpr::Map { key, value } => format!("map[{}]{}", key.emit(), value.emit()),
            TypeExpr::Func(sig) => format!("func{}", sig.emit()),
            TypeExpr::Struct(fields) => {
                if fields.is_empty() {
                    "struct{}".to_string()
                } else {
                    let parts: Vec<_> = fields.iter().map(emit_inline_field).collect();
                    format!("struct{{ {} }}", parts.join("; "))
                }
            }
            TypeExpr::Interface(methods) => {
                if methods.is_empty() {
                    "interface{}".to_string()
                } else {
                    let parts: Vec<_> = methods.iter().map(|m| m.emit()).collect();
                    format!("interface{{ {} }}", parts.join("; "))
                }
            }
        }
    }
}

fn emit_inline_field(field: &Field) -> String {
    let mut out = match &field.name {
        Some(name) => format!("{name} {}", field.ty.emit()),
        None => field.ty.emit(),
    };
    if !field.tags.is_empty() {
        out.push(' ');
        out.push_str(&emit_tags(&field.tags));
    }
    out
}

impl Emit for FuncSig {
    fn emit(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| match &p.name {
                Some(name) => format!("{name} {}", p.ty.emit()),
                None => p.ty.emit(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let results = match self.results.as_slice() {
            [] => String::new(),
            [single] if single.name.is_none() => format!(" {}", single.ty.emit()),
            many => {
                let inner = many
                    .iter()
                    .map(|r| match &r.name {
                        Some(name) => format!("{name} {}", r.ty.emit()),
                        None => r.ty.emit(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(" ({inner})")
            }
        };
        format!("({params}){results}")
    }
}

impl Emit for InterfaceMethod {
    fn emit(&self) -> String {
        format!("{}{}", self.name, self.sig.emit())
    }
}

/// Render tag segments as one struct tag literal.
///
/// Uses a raw string unless a segment contains a backtick.
pub fn emit_tags(tags: &[Tag]) -> String {
    let body = tags
        .iter()
        .map(|t| format!("{}:{}", t.key, quote_go_string(&t.value)))
        .collect::<Vec<_>>()
        .join(" ");
    if body.contains('`') {
        quote_go_string(&body)
    } else {
        format!("`{body}`")
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for Lit {
    fn emit(&self) -> String {
        match self {
            Lit::Str(s) => quote_go_string(s),
            Lit::Int(i) => i.to_string(),
            Lit::Float(f) => {
                let s = f.to_string();
                if s.contains(['.', 'e', 'E']) {
                    s
                } else {
                    format!("{s}.0")
                }
            }
            Lit::Bool(b) => b.to_string(),
            Lit::Nil => "nil".to_string(),
        }
    }
}

impl Emit for BinaryOp {
    fn emit(&self) -> String {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
        }
        .to_string()
    }
}

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::Gt => 3,
        }
    }
}

/// Operand position: wrap anything that is not a primary expression.
fn emit_operand(expr: &Expr) -> String {
    match expr {
        Expr::Unary { .. } | Expr::Binary { .. } => format!("({})", expr.emit()),
        Expr::Type(ty @ (TypeExpr::Pointer(_) | TypeExpr::Func(_))) => format!("({})", ty.emit()),
        _ => expr.emit(),
    }
}

fn emit_binary_side(side: &Expr, parent: BinaryOp) -> String {
    match side {
        Expr::Binary { op, .. } if op.precedence() < parent.precedence() => {
            format!("({})", side.emit())
        }
        _ => side.emit(),
    }
}

impl Emit for Expr {
    fn emit(&self) -> String {
        match self {
            Expr::Ident(name) => name.clone(),
            Expr::Lit(lit) => lit.emit(),
            Expr::Selector { x, sel } => format!("{}.{sel}", emit_operand(x)),
            Expr::Call { func, args } => {
                let args = args.iter().map(|a| a.emit()).collect::<Vec<_>>().join(", ");
                format!("{}({args})", emit_operand(func))
            }
            Expr::Composite { ty, elems } => {
                let elems = elems
                    .iter()
                    .map(|e| match &e.key {
                        Some(key) => format!("{key}: {}", e.value.emit()),
                        None => e.value.emit(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}{{{elems}}}", ty.emit())
            }
            Expr::Unary { op, x } => {
                let op = match op {
                    UnaryOp::Addr => "&",
                    UnaryOp::Deref => "*",
                    UnaryOp::Not => "!",
                };
                let operand = match **x {
                    Expr::Binary { .. } => format!("({})", x.emit()),
                    _ => x.emit(),
                };
                format!("{op}{operand}")
            }
            Expr::Binary { x, op, y } => format!(
                "{} {} {}",
                emit_binary_side(x, *op),
                op.emit(),
                emit_binary_side(y, *op)
            ),
            Expr::Index { x, index } => format!("{}[{}]", emit_operand(x), index.emit()),
            Expr::Type(ty) => ty.emit(),
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

fn join_exprs(exprs: &[Expr]) -> String {
    exprs.iter().map(|e| e.emit()).collect::<Vec<_>>().join(", ")
}

fn emit_block(stmts: &[Stmt], indent: usize) -> String {
    stmts.iter().map(|s| s.emit_indented(indent)).collect()
}

impl Emit for Stmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl Stmt {
    /// Single-line form, used for simple statements and if-initializers.
    fn emit_simple(&self) -> String {
        match self {
            Stmt::Define { names, values } => format!("{} := {}", names.join(", "), join_exprs(values)),
            Stmt::Assign { targets, values } => {
                format!("{} = {}", join_exprs(targets), join_exprs(values))
            }
            Stmt::Var { name, ty, value } => match value {
                Some(v) => format!("var {name} {} = {}", ty.emit(), v.emit()),
                None => format!("var {name} {}", ty.emit()),
            },
            Stmt::Expr(expr) => expr.emit(),
            Stmt::Return(values) if values.is_empty() => "return".to_string(),
            Stmt::Return(values) => format!("return {}", join_exprs(values)),
            Stmt::Comment(text) => format!("// {text}"),
            Stmt::If { .. } | Stmt::Range { .. } => self.emit_indented(0).trim_end().to_string(),
        }
    }

    /// Emit with the given indentation level (one tab per level).
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "\t".repeat(indent);
        match self {
            Stmt::If { .. } => format!("{prefix}{}\n", self.emit_if(indent)),
            Stmt::Range {
                key,
                value,
                x,
                body,
            } => {
                let header = match (key, value) {
                    (None, None) => format!("for range {}", x.emit()),
                    (Some(k), None) => format!("for {k} := range {}", x.emit()),
                    (k, Some(v)) => format!(
                        "for {}, {v} := range {}",
                        k.as_deref().unwrap_or("_"),
                        x.emit()
                    ),
                };
                format!(
                    "{prefix}{header} {{\n{}{prefix}}}\n",
                    emit_block(body, indent + 1)
                )
            }
            other => format!("{prefix}{}\n", other.emit_simple()),
        }
    }

    /// `if ... { ... } else ...` without leading indentation or trailing newline.
    fn emit_if(&self, indent: usize) -> String {
        let Stmt::If {
            init,
            cond,
            body,
            else_branch,
        } = self
        else {
            return self.emit_simple();
        };
        let prefix = "\t".repeat(indent);
        let head = match init {
            Some(init) => format!("if {}; {}", init.emit_simple(), cond.emit()),
            None => format!("if {}", cond.emit()),
        };
        let mut out = format!("{head} {{\n{}{prefix}}}", emit_block(body, indent + 1));
        match else_branch {
            Some(Else::If(next)) => {
                out.push_str(" else ");
                out.push_str(&next.emit_if(indent));
            }
            Some(Else::Block(stmts)) => {
                out.push_str(&format!(" else {{\n{}{prefix}}}", emit_block(stmts, indent + 1)));
            }
            None => {}
        }
        out
    }
}

// =============================================================================
// Declarations
// =============================================================================

fn emit_doc(doc: Option<&str>, indent: &str) -> String {
    doc.map(|text| {
        text.lines()
            .map(|line| {
                if line.trim().is_empty() {
                    format!("{indent}//\n")
                } else {
                    format!("{indent}// {}\n", line.trim_end())
                }
            })
            .collect::<String>()
    })
    .unwrap_or_default()
}

/// Struct body lines with gofmt-style column alignment.
fn emit_struct_fields(fields: &[Field]) -> String {
    let name_width = fields
        .iter()
        .filter_map(|f| f.name.as_ref().map(|n| n.chars().count()))
        .max()
        .unwrap_or(0);
    // Tags align only across consecutive tagged fields, as in gofmt.
    let tagged = |f: &Field| f.name.is_some() && !f.tags.is_empty();
    let mut type_widths = vec![0; fields.len()];
    let mut i = 0;
    while i < fields.len() {
        if !tagged(&fields[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < fields.len() && tagged(&fields[i]) {
            i += 1;
        }
        let width = fields[start..i]
            .iter()
            .map(|f| f.ty.emit().chars().count())
            .max()
            .unwrap_or(0);
        type_widths[start..i].fill(width);
    }

    let mut out = String::new();
    for (field, type_width) in fields.iter().zip(type_widths) {
        out.push_str(&emit_doc(field.doc.as_deref(), "\t"));
        let ty = field.ty.emit();
        let mut line = match &field.name {
            Some(name) => format!("\t{name:<name_width$} {ty}"),
            None => format!("\t{ty}"),
        };
        if !field.tags.is_empty() {
            if field.name.is_some() {
                let pad = type_width.saturating_sub(ty.chars().count());
                line.push_str(&" ".repeat(pad));
            }
            line.push(' ');
            line.push_str(&emit_tags(&field.tags));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

impl Emit for TypeDecl {
    fn emit(&self) -> String {
        let mut out = emit_doc(self.doc.as_deref(), "");
        match &self.kind {
            TypeDeclKind::Struct(fields) if fields.is_empty() => {
                out.push_str(&format!("type {} struct{{}}\n", self.name));
            }
            TypeDeclKind::Struct(fields) => {
                out.push_str(&format!(
                    "type {} struct {{\n{}}}\n",
                    self.name,
                    emit_struct_fields(fields)
                ));
            }
            TypeDeclKind::Interface(methods) if methods.is_empty() => {
                out.push_str(&format!("type {} interface{{}}\n", self.name));
            }
            TypeDeclKind::Interface(methods) => {
                out.push_str(&format!("type {} interface {{\n", self.name));
                for method in methods {
                    out.push_str(&emit_doc(method.doc.as_deref(), "\t"));
                    out.push_str(&format!("\t{}\n", method.emit()));
                }
                out.push_str("}\n");
            }
            TypeDeclKind::Alias { ty, assign } => {
                let eq = if *assign { "= " } else { "" };
                out.push_str(&format!("type {} {eq}{}\n", self.name, ty.emit()));
            }
        }
        out
    }
}

impl Emit for FuncDecl {
    fn emit(&self) -> String {
        let mut out = emit_doc(self.doc.as_deref(), "");
        out.push_str("func ");
        if let Some(recv) = &self.receiver {
            out.push_str(&format!("({} {}) ", recv.name, recv.ty.emit()));
        }
        out.push_str(&self.name);
        out.push_str(&self.sig.emit());
        out.push_str(" {\n");
        out.push_str(&emit_block(&self.body, 1));
        out.push_str("}\n");
        out
    }
}

impl Emit for Decl {
    fn emit(&self) -> String {
        match self {
            Decl::Type(t) => t.emit(),
            Decl::Func(f) => f.emit(),
        }
    }
}

// =============================================================================
// File
// =============================================================================

impl Emit for GoFile {
    fn emit(&self) -> String {
        let mut out = String::new();

        if let Some(header) = &self.header {
            out.push_str(&emit_doc(Some(header), ""));
            out.push('\n');
        }

        out.push_str(&format!("package {}\n", self.package));

        let paths = self.import_paths();
        match paths.as_slice() {
            [] => {}
            [single] => out.push_str(&format!("\nimport {}\n", quote_go_string(single))),
            _ => {
                out.push_str("\nimport (\n");
                let groups: Vec<String> = self
                    .imports
                    .iter()
                    .map(|tier| {
                        tier.iter()
                            .map(|p| format!("\t{}\n", quote_go_string(p)))
                            .collect()
                    })
                    .collect();
                out.push_str(&groups.join("\n"));
                out.push_str(")\n");
            }
        }

        for decl in &self.decls {
            out.push('\n');
            out.push_str(&decl.emit());
        }

        out
    }
}

// =============================================================================
// Tests
// =============================================================================
