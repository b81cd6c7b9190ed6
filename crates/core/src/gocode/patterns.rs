//! Canned statement patterns shared by the parameter and handler synthesizers.
//!
//! A `Patterns` value borrows the file builder so every pattern registers
//! the imports it needs on the same accumulation state it is emitted into.

use super::builder::{FileBuilder, assign, define, if_init, if_then};
use super::types::{Expr, Stmt};

/// View over a `FileBuilder` that produces canned statement sequences.
#[derive(Debug)]
pub struct Patterns<'a> {
    file: &'a mut FileBuilder,
}

impl FileBuilder {
    pub fn patterns(&mut self) -> Patterns<'_> {
        Patterns { file: self }
    }
}

/// `err != nil`
pub fn err_not_nil() -> Expr {
    Expr::ident("err").not_equals(Expr::nil())
}

impl Patterns<'_> {
    /// `if err != nil { return results... }`
    pub fn if_err_return(&mut self, results: Vec<Expr>) -> Stmt {
        if_then(err_not_nil(), vec![Stmt::Return(results)])
    }

    /// `if err := call; err != nil { body }`
    pub fn check_err(&mut self, call: Expr, body: Vec<Stmt>) -> Stmt {
        if_init(define(&["err"], vec![call]), err_not_nil(), body)
    }

    /// `fmt.Errorf(format, args...)`
    pub fn errorf(&mut self, format: &str, args: Vec<Expr>) -> Expr {
        self.file.add_import("fmt");
        let mut all = vec![Expr::str(format)];
        all.extend(args);
        Expr::qualified("fmt", "Errorf").call(all)
    }

    /// `if raw == "" { return zero, fmt.Errorf("missing required <location> parameter %q", name) }`
    pub fn required_check(&mut self, raw: &str, location: &str, name: &str, zero: Expr) -> Stmt {
        let err = self.errorf(
            &format!("missing required {location} parameter %q"),
            vec![Expr::str(name)],
        );
        if_then(
            Expr::ident(raw).equals(Expr::str("")),
            vec![Stmt::Return(vec![zero, err])],
        )
    }

    /// `if err := json.NewDecoder(source).Decode(&target); err != nil { on_error }`
    pub fn json_decode(&mut self, source: Expr, target: &str, on_error: Vec<Stmt>) -> Stmt {
        self.file.add_import("encoding/json");
        let decode = Expr::qualified("json", "NewDecoder")
            .call(vec![source])
            .dot("Decode")
            .call(vec![Expr::ident(target).addr()]);
        self.check_err(decode, on_error)
    }

    /// `_ = json.NewEncoder(writer).Encode(value)`
    pub fn json_encode(&mut self, writer: Expr, value: Expr) -> Stmt {
        self.file.add_import("encoding/json");
        let encode = Expr::qualified("json", "NewEncoder")
            .call(vec![writer])
            .dot("Encode")
            .call(vec![value]);
        assign(Expr::ident("_"), encode)
    }

    /// `if err := validator.Struct(target); err != nil { on_error }`
    pub fn validate_struct(&mut self, validator: Expr, target: Expr, on_error: Vec<Stmt>) -> Stmt {
        let call = validator.dot("Struct").call(vec![target]);
        self.check_err(call, on_error)
    }

    /// `writeError(w, status, err)` followed by a bare `return`.
    pub fn write_error_return(&mut self, status: Expr, err: Expr) -> Vec<Stmt> {
        vec![
            Stmt::Expr(Expr::ident("writeError").call(vec![Expr::ident("w"), status, err])),
            Stmt::Return(vec![]),
        ]
    }

    /// `http.StatusXxx` for well-known codes, a literal otherwise.
    pub fn status_code(&mut self, code: u16) -> Expr {
        self.file.add_import("net/http");
        match status_constant(code) {
            Some(name) => Expr::qualified("http", name),
            None => Expr::int(i64::from(code)),
        }
    }
}

/// Name of the `net/http` constant for a status code.
pub fn status_constant(code: u16) -> Option<&'static str> {
    Some(match code {
        200 => "StatusOK",
        201 => "StatusCreated",
        202 => "StatusAccepted",
        204 => "StatusNoContent",
        301 => "StatusMovedPermanently",
        302 => "StatusFound",
        304 => "StatusNotModified",
        400 => "StatusBadRequest",
        401 => "StatusUnauthorized",
        403 => "StatusForbidden",
        404 => "StatusNotFound",
        405 => "StatusMethodNotAllowed",
        409 => "StatusConflict",
        410 => "StatusGone",
        412 => "StatusPreconditionFailed",
        415 => "StatusUnsupportedMediaType",
        422 => "StatusUnprocessableEntity",
        429 => "StatusTooManyRequests",
        500 => "StatusInternalServerError",
        501 => "StatusNotImplemented",
        502 => "StatusBadGateway",
        503 => "StatusServiceUnavailable",
        504 => "StatusGatewayTimeout",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gocode::Emit;

    #[test]
    fn test_json_decode_registers_import() {
        let mut file = FileBuilder::new("api");
        let stmt = file.patterns().json_decode(
            Expr::ident("r").dot("Body"),
            "body",
            vec![Stmt::Return(vec![])],
        );
        assert!(file.imports().contains("encoding/json"));
        assert_eq!(
            stmt.emit_indented(0),
            "if err := json.NewDecoder(r.Body).Decode(&body); err != nil {\n\treturn\n}\n"
        );
    }

    #[test]
    fn test_required_check() {
        let mut file = FileBuilder::new("api");
        let stmt = file
            .patterns()
            .required_check("limitRaw", "query", "limit", Expr::nil());
        assert!(file.imports().contains("fmt"));
        assert_eq!(
            stmt.emit_indented(0),
            "if limitRaw == \"\" {\n\treturn nil, fmt.Errorf(\"missing required query parameter %q\", \"limit\")\n}\n"
        );
    }

    #[test]
    fn test_status_code_constants() {
        let mut file = FileBuilder::new("api");
        assert_eq!(file.patterns().status_code(404).emit(), "http.StatusNotFound");
        assert_eq!(file.patterns().status_code(418).emit(), "418");
        assert!(file.imports().contains("net/http"));
    }

    #[test]
    fn test_json_encode_discards_error() {
        let mut file = FileBuilder::new("api");
        let stmt = file
            .patterns()
            .json_encode(Expr::ident("w"), Expr::ident("v"));
        assert_eq!(stmt.emit_indented(0), "_ = json.NewEncoder(w).Encode(v)\n");
    }
}
