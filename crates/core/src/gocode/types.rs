//! Go IR node types.
//!
//! This module defines the Go syntax tree the synthesizers assemble:
//! - TypeExpr: type expressions (identifiers, selectors, pointers, slices, ...)
//! - Expr: expressions (identifiers, calls, literals, composite literals, ...)
//! - Stmt: statements in a function body
//! - Decl: top-level declarations (types and functions)
//! - GoFile: the finished output node handed to a formatter

/// Go type expression.
///
/// The set of kinds is closed; every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Identifier type: string, int64, User
    Ident(String),
    /// Qualified type: http.Request, time.Time
    Selector { pkg: String, name: String },
    /// Pointer type: *T
    Pointer(Box<TypeExpr>),
    /// Slice type: []T
    Slice(Box<TypeExpr>),
    /// Map type: map[K]V
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// Function type: func(a int) error
    Func(FuncSig),
    /// Anonymous struct type: struct{ ... }
    Struct(Vec<Field>),
    /// Anonymous interface type: interface{ ... }
    Interface(Vec<InterfaceMethod>),
}

impl TypeExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "identifier type requires a name");
        TypeExpr::Ident(name)
    }

    pub fn selector(pkg: impl Into<String>, name: impl Into<String>) -> Self {
        let (pkg, name) = (pkg.into(), name.into());
        assert!(
            !pkg.is_empty() && !name.is_empty(),
            "selector type requires both package and name"
        );
        TypeExpr::Selector { pkg, name }
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Slice(Box::new(elem))
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Wrap in a pointer unless the type is already nil-able.
    pub fn optional(self) -> Self {
        if self.is_nilable() {
            self
        } else {
            TypeExpr::pointer(self)
        }
    }

    /// Pointers, slices, maps, funcs and interfaces have a nil zero value.
    pub fn is_nilable(&self) -> bool {
        match self {
            TypeExpr::Pointer(_)
            | TypeExpr::Slice(_)
            | TypeExpr::Map { .. }
            | TypeExpr::Func(_)
            | TypeExpr::Interface(_) => true,
            TypeExpr::Selector { pkg, name } => pkg == "json" && name == "RawMessage",
            TypeExpr::Ident(name) => name == "any" || name == "error",
            TypeExpr::Struct(_) => false,
        }
    }
}

/// Function signature shared by function types, interface methods and declarations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuncSig {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

/// Method in an interface type.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMethod {
    pub name: String,
    pub sig: FuncSig,
    pub doc: Option<String>,
}

/// Struct-tag segment: `json:"id,omitempty"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Struct field, function parameter or function result.
///
/// `name` is absent for embedded fields and unnamed results.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Option<String>,
    pub ty: TypeExpr,
    pub tags: Vec<Tag>,
    pub doc: Option<String>,
}

impl Field {
    /// Named field without tags.
    pub fn named(name: impl Into<String>, ty: TypeExpr) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "named field requires a non-empty name");
        Field {
            name: Some(name),
            ty,
            tags: Vec::new(),
            doc: None,
        }
    }

    /// Unnamed field (result types, embedded fields).
    pub fn unnamed(ty: TypeExpr) -> Self {
        Field {
            name: None,
            ty,
            tags: Vec::new(),
            doc: None,
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    /// Interpreted string literal: "foo"
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Nil,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// &x
    Addr,
    /// *x
    Deref,
    /// !x
    Not,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    And,
    Or,
    Lt,
    Gt,
}

/// Composite literal element: `value` or `key: value`
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: Option<String>,
    pub value: Expr,
}

/// Go expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifier: foo
    Ident(String),
    /// Literal: "bar", 42, true, nil
    Lit(Lit),
    /// Selector: x.sel
    Selector { x: Box<Expr>, sel: String },
    /// Call: f(a, b)
    Call { func: Box<Expr>, args: Vec<Expr> },
    /// Composite literal: T{a: 1}, &T{} is Unary(Addr, Composite)
    Composite { ty: TypeExpr, elems: Vec<Element> },
    /// Unary expression: &x, *x, !x
    Unary { op: UnaryOp, x: Box<Expr> },
    /// Binary expression: a == b
    Binary {
        x: Box<Expr>,
        op: BinaryOp,
        y: Box<Expr>,
    },
    /// Index expression: x[i]
    Index { x: Box<Expr>, index: Box<Expr> },
    /// Type in expression position (conversions, make, new): int32, []string
    Type(TypeExpr),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "identifier expression requires a name");
        Expr::Ident(name)
    }

    pub fn str(value: impl Into<String>) -> Self {
        Expr::Lit(Lit::Str(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Expr::Lit(Lit::Int(value))
    }

    pub fn nil() -> Self {
        Expr::Lit(Lit::Nil)
    }

    /// Selector on this expression: `self.sel`
    pub fn dot(self, sel: impl Into<String>) -> Self {
        let sel = sel.into();
        assert!(!sel.is_empty(), "selector requires a name");
        Expr::Selector {
            x: Box::new(self),
            sel,
        }
    }

    /// Call this expression: `self(args...)`
    pub fn call(self, args: Vec<Expr>) -> Self {
        Expr::Call {
            func: Box::new(self),
            args,
        }
    }

    /// `pkg.name` as an expression.
    pub fn qualified(pkg: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::ident(pkg).dot(name)
    }

    pub fn addr(self) -> Self {
        Expr::Unary {
            op: UnaryOp::Addr,
            x: Box::new(self),
        }
    }

    pub fn binary(self, op: BinaryOp, y: Expr) -> Self {
        Expr::Binary {
            x: Box::new(self),
            op,
            y: Box::new(y),
        }
    }

    pub fn equals(self, y: Expr) -> Self {
        self.binary(BinaryOp::Eq, y)
    }

    pub fn not_equals(self, y: Expr) -> Self {
        self.binary(BinaryOp::NotEq, y)
    }

    pub fn index(self, index: Expr) -> Self {
        Expr::Index {
            x: Box::new(self),
            index: Box::new(index),
        }
    }

    /// Keyed composite literal: `T{k: v, ...}`
    pub fn composite(ty: TypeExpr, fields: Vec<(String, Expr)>) -> Self {
        Expr::Composite {
            ty,
            elems: fields
                .into_iter()
                .map(|(key, value)| Element {
                    key: Some(key),
                    value,
                })
                .collect(),
        }
    }
}

/// `else` branch of an if statement
#[derive(Debug, Clone, PartialEq)]
pub enum Else {
    /// else if ...
    If(Box<Stmt>),
    /// else { ... }
    Block(Vec<Stmt>),
}

/// Statement in a function body
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Short variable declaration: a, b := x, y
    Define { names: Vec<String>, values: Vec<Expr> },
    /// Assignment: a.b = x
    Assign { targets: Vec<Expr>, values: Vec<Expr> },
    /// var name T [= value]
    Var {
        name: String,
        ty: TypeExpr,
        value: Option<Expr>,
    },
    /// Expression statement: f(x)
    Expr(Expr),
    /// return a, b
    Return(Vec<Expr>),
    /// if [init; ] cond { ... } [else ...]
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        body: Vec<Stmt>,
        else_branch: Option<Else>,
    },
    /// for key, value := range x { ... }
    Range {
        key: Option<String>,
        value: Option<String>,
        x: Expr,
        body: Vec<Stmt>,
    },
    /// Line comment inside a body: // text
    Comment(String),
}

/// Kind of a type declaration
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDeclKind {
    /// type Foo struct { ... }
    Struct(Vec<Field>),
    /// type Foo interface { ... }
    Interface(Vec<InterfaceMethod>),
    /// type Foo T (defined type) or type Foo = T when `assign` is set
    Alias { ty: TypeExpr, assign: bool },
}

/// Type declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub doc: Option<String>,
    pub kind: TypeDeclKind,
}

/// Method receiver: (h *Handler)
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub name: String,
    pub ty: TypeExpr,
}

/// Function declaration. A receiver makes it a method.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub doc: Option<String>,
    pub receiver: Option<Receiver>,
    pub sig: FuncSig,
    pub body: Vec<Stmt>,
}

/// Top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Type(TypeDecl),
    Func(FuncDecl),
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Type(t) => &t.name,
            Decl::Func(f) => &f.name,
        }
    }
}

/// Finished Go source file: the immutable output of one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GoFile {
    pub package: String,
    /// Header comment emitted above the package clause.
    pub header: Option<String>,
    /// Import paths grouped into standard-library, third-party and local tiers.
    pub imports: Vec<Vec<String>>,
    pub decls: Vec<Decl>,
}

impl GoFile {
    /// All import paths in emission order.
    pub fn import_paths(&self) -> Vec<&str> {
        self.imports
            .iter()
            .flat_map(|tier| tier.iter().map(String::as_str))
            .collect()
    }

    /// Find a declaration by name.
    pub fn decl(&self, name: &str) -> Option<&Decl> {
        self.decls.iter().find(|d| d.name() == name)
    }
}
