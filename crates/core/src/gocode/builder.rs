//! Builders over the Go IR.
//!
//! `FileBuilder` owns the accumulation state of one generation run: the
//! import set, the ordered top-level declarations, and the current statement
//! list. The smaller builders produce individual nodes that get attached to
//! it. All builders own their data, so `clone()` yields an independent copy.
//!
//! Builders enforce their preconditions with assertions: a missing name or
//! type is a bug in the caller, not bad input, and aborts immediately.

use super::imports::ImportSet;
use super::types::{
    Decl, Expr, Field, FuncDecl, FuncSig, GoFile, InterfaceMethod, Receiver, Stmt, Tag,
    TypeDecl, TypeDeclKind, TypeExpr,
};

/// Accumulation state for one output file.
#[derive(Debug, Clone)]
pub struct FileBuilder {
    package: String,
    header: Option<String>,
    local_prefix: String,
    imports: ImportSet,
    decls: Vec<Decl>,
    stmts: Vec<Stmt>,
}

impl FileBuilder {
    pub fn new(package: impl Into<String>) -> Self {
        let package = package.into();
        assert!(!package.is_empty(), "file builder requires a package name");
        Self {
            package,
            header: None,
            local_prefix: String::new(),
            imports: ImportSet::new(),
            decls: Vec::new(),
            stmts: Vec::new(),
        }
    }

    /// Module path prefix that marks first-party imports.
    pub fn with_local_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.local_prefix = prefix.into();
        self
    }

    /// Comment emitted above the package clause.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn add_import(&mut self, path: impl Into<String>) -> &mut Self {
        self.imports.insert(path);
        self
    }

    pub fn add_decl(&mut self, decl: Decl) -> &mut Self {
        self.decls.push(decl);
        self
    }

    pub fn add_stmt(&mut self, stmt: Stmt) -> &mut Self {
        self.stmts.push(stmt);
        self
    }

    pub fn extend_stmts(&mut self, stmts: impl IntoIterator<Item = Stmt>) -> &mut Self {
        self.stmts.extend(stmts);
        self
    }

    pub fn clear_imports(&mut self) -> &mut Self {
        self.imports.clear();
        self
    }

    pub fn clear_decls(&mut self) -> &mut Self {
        self.decls.clear();
        self
    }

    pub fn clear_stmts(&mut self) -> &mut Self {
        self.stmts.clear();
        self
    }

    /// Drain the current statement list, typically into a function body.
    pub fn take_stmts(&mut self) -> Vec<Stmt> {
        std::mem::take(&mut self.stmts)
    }

    pub fn imports(&self) -> &ImportSet {
        &self.imports
    }

    pub fn decls(&self) -> &[Decl] {
        &self.decls
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn has_decl(&self, name: &str) -> bool {
        self.decls.iter().any(|d| d.name() == name)
    }

    /// Snapshot the accumulated state into a finished file.
    ///
    /// Pending statements are not part of the file; they must have been
    /// moved into a function body first.
    pub fn build(&self) -> GoFile {
        assert!(
            self.stmts.is_empty(),
            "file built with {} dangling statements",
            self.stmts.len()
        );
        GoFile {
            package: self.package.clone(),
            header: self.header.clone(),
            imports: self.imports.tiers(&self.local_prefix),
            decls: self.decls.clone(),
        }
    }
}

/// Builds a struct field, parameter or result.
#[derive(Debug, Clone, Default)]
pub struct FieldBuilder {
    name: Option<String>,
    ty: Option<TypeExpr>,
    tags: Vec<Tag>,
    doc: Option<String>,
}

impl FieldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new().name(name)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "field name must not be empty when given");
        self.name = Some(name);
        self
    }

    pub fn ty(mut self, ty: TypeExpr) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Append a tag segment. Segments keep insertion order.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        assert!(!key.is_empty(), "tag segment requires a key");
        self.tags.push(Tag {
            key,
            value: value.into(),
        });
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn build(self) -> Field {
        let Some(ty) = self.ty else {
            panic_missing("field", "type", self.name.as_deref());
        };
        Field {
            name: self.name,
            ty,
            tags: self.tags,
            doc: self.doc,
        }
    }
}

/// Builds a `type Name struct { ... }` declaration.
#[derive(Debug, Clone, Default)]
pub struct StructBuilder {
    name: String,
    doc: Option<String>,
    fields: Vec<Field>,
}

impl StructBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn build(self) -> Decl {
        assert!(!self.name.is_empty(), "struct declaration requires a name");
        Decl::Type(TypeDecl {
            name: self.name,
            doc: self.doc,
            kind: TypeDeclKind::Struct(self.fields),
        })
    }
}

/// Builds a `type Name interface { ... }` declaration.
#[derive(Debug, Clone, Default)]
pub struct InterfaceBuilder {
    name: String,
    doc: Option<String>,
    methods: Vec<InterfaceMethod>,
}

impl InterfaceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn method(mut self, name: impl Into<String>, sig: FuncSig, doc: Option<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "interface method requires a name");
        self.methods.push(InterfaceMethod { name, sig, doc });
        self
    }

    pub fn build(self) -> Decl {
        assert!(!self.name.is_empty(), "interface declaration requires a name");
        Decl::Type(TypeDecl {
            name: self.name,
            doc: self.doc,
            kind: TypeDeclKind::Interface(self.methods),
        })
    }
}

/// Builds `type Name T` (or `type Name = T`).
#[derive(Debug, Clone, Default)]
pub struct AliasBuilder {
    name: String,
    doc: Option<String>,
    ty: Option<TypeExpr>,
    assign: bool,
}

impl AliasBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn ty(mut self, ty: TypeExpr) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Emit a true alias (`type A = B`) instead of a defined type.
    pub fn assign(mut self, assign: bool) -> Self {
        self.assign = assign;
        self
    }

    pub fn build(self) -> Decl {
        assert!(!self.name.is_empty(), "type alias declaration requires a name");
        let Some(ty) = self.ty else {
            panic_missing("type alias", "type", Some(&self.name));
        };
        Decl::Type(TypeDecl {
            name: self.name,
            doc: self.doc,
            kind: TypeDeclKind::Alias {
                ty,
                assign: self.assign,
            },
        })
    }
}

/// Builds a function or method declaration.
#[derive(Debug, Clone, Default)]
pub struct FuncBuilder {
    name: String,
    doc: Option<String>,
    receiver: Option<Receiver>,
    sig: FuncSig,
    body: Vec<Stmt>,
}

impl FuncBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Make this a method on `ty`.
    pub fn receiver(mut self, name: impl Into<String>, ty: TypeExpr) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "method receiver requires a name");
        self.receiver = Some(Receiver { name, ty });
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeExpr) -> Self {
        self.sig.params.push(Field::named(name, ty));
        self
    }

    pub fn result(mut self, ty: TypeExpr) -> Self {
        self.sig.results.push(Field::unnamed(ty));
        self
    }

    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.body.push(stmt);
        self
    }

    pub fn body(mut self, stmts: impl IntoIterator<Item = Stmt>) -> Self {
        self.body.extend(stmts);
        self
    }

    pub fn build(self) -> Decl {
        assert!(!self.name.is_empty(), "function declaration requires a name");
        Decl::Func(FuncDecl {
            name: self.name,
            doc: self.doc,
            receiver: self.receiver,
            sig: self.sig,
            body: self.body,
        })
    }
}

/// `a, b := x, y`
pub fn define(names: &[&str], values: Vec<Expr>) -> Stmt {
    assert!(!names.is_empty(), "short variable declaration requires a name");
    assert!(!values.is_empty(), "short variable declaration requires a value");
    Stmt::Define {
        names: names.iter().map(|n| (*n).to_string()).collect(),
        values,
    }
}

/// `target = value`
pub fn assign(target: Expr, value: Expr) -> Stmt {
    Stmt::Assign {
        targets: vec![target],
        values: vec![value],
    }
}

/// `var name T`
pub fn var(name: impl Into<String>, ty: TypeExpr) -> Stmt {
    let name = name.into();
    assert!(!name.is_empty(), "var declaration requires a name");
    Stmt::Var {
        name,
        ty,
        value: None,
    }
}

/// `if cond { body }`
pub fn if_then(cond: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::If {
        init: None,
        cond,
        body,
        else_branch: None,
    }
}

/// `if init; cond { body }`
pub fn if_init(init: Stmt, cond: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::If {
        init: Some(Box::new(init)),
        cond,
        body,
        else_branch: None,
    }
}

/// `for _, value := range x { body }`
pub fn range_values(value: impl Into<String>, x: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::Range {
        key: None,
        value: Some(value.into()),
        x,
        body,
    }
}

fn panic_missing(node: &str, what: &str, name: Option<&str>) -> ! {
    match name {
        Some(name) => panic!("{node} `{name}` requires a {what}"),
        None => panic!("{node} requires a {what}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn string_field(name: &str) -> Field {
        FieldBuilder::named(name)
            .ty(TypeExpr::ident("string"))
            .build()
    }

    #[test]
    fn test_accumulate_and_build() {
        let mut file = FileBuilder::new("api").with_local_prefix("github.com/test");
        file.add_import("github.com/test/x")
            .add_import("fmt")
            .add_import("github.com/a/b")
            .add_import("strings")
            .add_decl(StructBuilder::new("User").field(string_field("Name")).build());

        let built = file.build();
        assert_eq!(built.package, "api");
        assert_eq!(
            built.import_paths(),
            vec!["fmt", "strings", "github.com/a/b", "github.com/test/x"]
        );
        assert!(built.decl("User").is_some());
    }

    #[test]
    fn test_take_stmts_drains() {
        let mut file = FileBuilder::new("api");
        file.add_stmt(Stmt::Return(vec![]));
        file.add_stmt(Stmt::Return(vec![Expr::nil()]));
        let body = file.take_stmts();
        assert_eq!(body.len(), 2);
        assert!(file.stmts().is_empty());
    }

    #[test]
    fn test_clear_operations() {
        let mut file = FileBuilder::new("api");
        file.add_import("fmt")
            .add_decl(StructBuilder::new("A").build())
            .add_stmt(Stmt::Return(vec![]));
        file.clear_imports().clear_decls().clear_stmts();
        assert!(file.imports().is_empty());
        assert!(file.decls().is_empty());
        assert!(file.stmts().is_empty());
    }

    #[test]
    fn test_file_builder_clone_is_independent() {
        let mut original = FileBuilder::new("api");
        original.add_import("fmt");
        let mut copy = original.clone();
        copy.add_import("strings")
            .add_decl(StructBuilder::new("Extra").build())
            .add_stmt(Stmt::Return(vec![]));

        assert_eq!(original.imports().len(), 1);
        assert!(original.decls().is_empty());
        assert!(original.stmts().is_empty());
        assert_eq!(copy.imports().len(), 2);
    }

    #[test]
    fn test_struct_builder_clone_is_independent() {
        let original = StructBuilder::new("User").field(string_field("ID"));
        let copy = original.clone().field(string_field("Email"));
        let fields = |decl: Decl| match decl {
            Decl::Type(TypeDecl {
                kind: TypeDeclKind::Struct(fields),
                ..
            }) => fields.len(),
            other => panic!("expected a struct, got {other:?}"),
        };
        assert_eq!(fields(original.build()), 1);
        assert_eq!(fields(copy.build()), 2);
    }

    #[test]
    fn test_field_builder_clone_is_independent() {
        let original = FieldBuilder::named("Email")
            .ty(TypeExpr::ident("string"))
            .tag("json", "email");
        let copy = original.clone().tag("validate", "email");
        assert_eq!(original.build().tags.len(), 1);
        assert_eq!(copy.build().tags.len(), 2);
    }

    #[test]
    fn test_func_builder_clone_is_independent() {
        let original = FuncBuilder::new("Do").param("x", TypeExpr::ident("int"));
        let copy = original.clone().param("y", TypeExpr::ident("int"));
        let Decl::Func(original) = original.build() else {
            panic!("expected a function declaration");
        };
        let Decl::Func(copy) = copy.build() else {
            panic!("expected a function declaration");
        };
        assert_eq!(original.sig.params.len(), 1);
        assert_eq!(copy.sig.params.len(), 2);
    }

    #[test]
    fn test_interface_builder_clone_is_independent() {
        let original = InterfaceBuilder::new("Service").method("A", FuncSig::default(), None);
        let copy = original.clone().method("B", FuncSig::default(), None);
        let methods = |decl: Decl| match decl {
            Decl::Type(TypeDecl {
                kind: TypeDeclKind::Interface(methods),
                ..
            }) => methods.len(),
            other => panic!("expected an interface, got {other:?}"),
        };
        assert_eq!(methods(original.build()), 1);
        assert_eq!(methods(copy.build()), 2);
    }

    #[test]
    fn test_method_has_receiver() {
        let decl = FuncBuilder::new("GetUser")
            .receiver("h", TypeExpr::pointer(TypeExpr::ident("Handler")))
            .build();
        let Decl::Func(func) = decl else {
            panic!("expected a function declaration");
        };
        assert!(func.receiver.is_some());
    }

    #[test]
    #[should_panic(expected = "requires a type")]
    fn test_field_without_type_panics() {
        let _ = FieldBuilder::named("Name").build();
    }

    #[test]
    #[should_panic(expected = "struct declaration requires a name")]
    fn test_struct_without_name_panics() {
        let _ = StructBuilder::new("").build();
    }

    #[test]
    #[should_panic(expected = "interface declaration requires a name")]
    fn test_interface_without_name_panics() {
        let _ = InterfaceBuilder::new("").build();
    }

    #[test]
    #[should_panic(expected = "function declaration requires a name")]
    fn test_func_without_name_panics() {
        let _ = FuncBuilder::new("").build();
    }

    #[test]
    #[should_panic(expected = "requires a package name")]
    fn test_file_without_package_panics() {
        let _ = FileBuilder::new("");
    }

    #[test]
    #[should_panic(expected = "dangling statements")]
    fn test_build_with_pending_stmts_panics() {
        let mut file = FileBuilder::new("api");
        file.add_stmt(Stmt::Return(vec![]));
        let _ = file.build();
    }
}
