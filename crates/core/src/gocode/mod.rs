//! Go syntax-tree construction and emission.
//!
//! Knows nothing about OpenAPI; the synthesizers in `openapi::ir` drive it.
//!
//! ## Module Structure
//!
//! - `types`: Go IR nodes (TypeExpr, Expr, Stmt, Decl, GoFile)
//! - `imports`: import set with std / third-party / local tiers
//! - `builder`: FileBuilder accumulation state plus node builders
//! - `patterns`: canned statement sequences (error checks, JSON, validation)
//! - `emit`: Go IR -> gofmt-shaped source text (via Emit trait)
//! - `utils`: identifier casing and string quoting

mod builder;
mod emit;
mod imports;
mod patterns;
mod types;
pub mod utils;

pub use builder::{
    AliasBuilder, FieldBuilder, FileBuilder, FuncBuilder, InterfaceBuilder, StructBuilder, assign,
    define, if_init, if_then, range_values, var,
};
pub use emit::{Emit, emit_tags};
pub use imports::{ImportSet, ImportTier};
pub use patterns::{Patterns, err_not_nil, status_constant};
pub use types::{
    BinaryOp, Decl, Element, Else, Expr, Field, FuncDecl, FuncSig, GoFile, InterfaceMethod, Lit,
    Receiver, Stmt, Tag, TypeDecl, TypeDeclKind, TypeExpr, UnaryOp,
};
