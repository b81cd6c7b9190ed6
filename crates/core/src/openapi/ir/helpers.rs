//! Runtime helpers the generated adapters call.
//!
//! `writeJSON` and `writeError` are always emitted. `parseTime` and
//! `validateRegexp` only when the file uses time-typed values or
//! `regexp=` rules.

use super::api::FileFeatures;
use crate::error::SynthError;
use crate::gocode::utils::quote_go_string;
use crate::gocode::{
    Decl, Expr, FileBuilder, FuncBuilder, Stmt, TypeExpr, define, err_not_nil, if_init, if_then,
};

/// Emit the helper functions `features` calls for.
pub fn synthesize_helpers(
    file: &mut FileBuilder,
    features: &FileFeatures,
    validator_package: &str,
) -> Result<(), SynthError> {
    let mut decls = vec![write_json(file), write_error()];
    if features.uses_time {
        decls.push(parse_time(file));
    }
    if features.uses_regexp {
        decls.push(validate_regexp(file, validator_package));
    }
    for decl in decls {
        if file.has_decl(decl.name()) {
            return Err(SynthError::DuplicateSchema {
                name: decl.name().to_string(),
            });
        }
        file.add_decl(decl);
    }
    Ok(())
}

fn response_writer() -> TypeExpr {
    TypeExpr::selector("http", "ResponseWriter")
}

fn write_json(file: &mut FileBuilder) -> Decl {
    file.add_import("net/http");
    let w = Expr::ident("w");
    let set_header = w
        .clone()
        .dot("Header")
        .call(vec![])
        .dot("Set")
        .call(vec![Expr::str("Content-Type"), Expr::str("application/json")]);
    let encode = file.patterns().json_encode(w.clone(), Expr::ident("v"));
    FuncBuilder::new("writeJSON")
        .param("w", response_writer())
        .param("status", TypeExpr::ident("int"))
        .param("v", TypeExpr::ident("any"))
        .stmt(Stmt::Expr(set_header))
        .stmt(Stmt::Expr(w.dot("WriteHeader").call(vec![Expr::ident("status")])))
        .stmt(encode)
        .build()
}

fn write_error() -> Decl {
    let payload = Expr::composite(
        TypeExpr::map(TypeExpr::ident("string"), TypeExpr::ident("string")),
        vec![(
            quote_go_string("error"),
            Expr::ident("err").dot("Error").call(vec![]),
        )],
    );
    FuncBuilder::new("writeError")
        .param("w", response_writer())
        .param("status", TypeExpr::ident("int"))
        .param("err", TypeExpr::ident("error"))
        .stmt(Stmt::Expr(Expr::ident("writeJSON").call(vec![
            Expr::ident("w"),
            Expr::ident("status"),
            payload,
        ])))
        .build()
}

/// Accepts RFC 3339 timestamps and plain dates.
fn parse_time(file: &mut FileBuilder) -> Decl {
    file.add_import("time");
    let parse = |layout: Expr| {
        Expr::qualified("time", "Parse").call(vec![layout, Expr::ident("value")])
    };
    FuncBuilder::new("parseTime")
        .param("value", TypeExpr::ident("string"))
        .result(TypeExpr::selector("time", "Time"))
        .result(TypeExpr::ident("error"))
        .stmt(if_init(
            define(&["t", "err"], vec![parse(Expr::qualified("time", "RFC3339"))]),
            Expr::ident("err").equals(Expr::nil()),
            vec![Stmt::Return(vec![Expr::ident("t"), Expr::nil()])],
        ))
        .stmt(Stmt::Return(vec![parse(Expr::str("2006-01-02"))]))
        .build()
}

/// Custom validator backing `regexp=` rules.
fn validate_regexp(file: &mut FileBuilder, validator_package: &str) -> Decl {
    file.add_import("regexp");
    let fl = Expr::ident("fl");
    let compile = Expr::qualified("regexp", "Compile").call(vec![fl.clone().dot("Param").call(vec![])]);
    let value = fl.dot("Field").call(vec![]).dot("String").call(vec![]);
    FuncBuilder::new("validateRegexp")
        .param("fl", TypeExpr::selector(validator_package, "FieldLevel"))
        .result(TypeExpr::ident("bool"))
        .stmt(define(&["re", "err"], vec![compile]))
        .stmt(if_then(
            err_not_nil(),
            vec![Stmt::Return(vec![Expr::ident("false")])],
        ))
        .stmt(Stmt::Return(vec![
            Expr::ident("re").dot("MatchString").call(vec![value]),
        ]))
        .build()
}
