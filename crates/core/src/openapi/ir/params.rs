//! Parameter struct and parse-method synthesis.
//!
//! For each (operation, location) pair with at least one parameter this
//! emits `<Base><Location>Params` and a `parse<Base><Location>Params`
//! method on the handler struct that pulls raw strings off the request,
//! converts them and validates the result.

use std::collections::HashSet;

use tracing::debug;

use super::api::{FileFeatures, ParamLocation, ParameterSpec};
use super::translate::{TypeContext, effective_schema, ref_name, validation_rules};
use super::utils::path_wildcard;
use crate::error::SynthError;
use crate::gocode::utils::{camel_case, pascal_case};
use crate::gocode::{
    Expr, FieldBuilder, FileBuilder, FuncBuilder, Stmt, StructBuilder, TypeExpr, assign, define,
    if_init, if_then, range_values, var,
};
use crate::openapi::spec::Schema;

/// Scalar kinds a raw parameter string can be parsed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scalar {
    String,
    Int,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    Time,
}

impl Scalar {
    fn of(schema: &Schema) -> Self {
        let format = schema.format.as_deref();
        match schema.primary_type() {
            Some("string") if format == Some("date-time") => Scalar::Time,
            Some("integer") => match format {
                Some("int32") => Scalar::Int32,
                Some("int64") => Scalar::Int64,
                _ => Scalar::Int,
            },
            Some("number") if format == Some("float") => Scalar::Float32,
            Some("number") => Scalar::Float64,
            Some("boolean") => Scalar::Bool,
            _ => Scalar::String,
        }
    }

    fn go_type(self) -> TypeExpr {
        match self {
            Scalar::String => TypeExpr::ident("string"),
            Scalar::Int => TypeExpr::ident("int"),
            Scalar::Int32 => TypeExpr::ident("int32"),
            Scalar::Int64 => TypeExpr::ident("int64"),
            Scalar::Float32 => TypeExpr::ident("float32"),
            Scalar::Float64 => TypeExpr::ident("float64"),
            Scalar::Bool => TypeExpr::ident("bool"),
            Scalar::Time => TypeExpr::selector("time", "Time"),
        }
    }
}

/// How one parameter is carried in its params struct.
#[derive(Debug, Clone)]
struct ParamShape {
    scalar: Scalar,
    array: bool,
    /// Component type the parsed value is converted to.
    named: Option<String>,
}

impl ParamShape {
    fn of(param: &ParameterSpec) -> Self {
        let target = param
            .resolved
            .as_ref()
            .or(param.schema.as_ref())
            .map(effective_schema);
        let Some(target) = target else {
            return ParamShape {
                scalar: Scalar::String,
                array: false,
                named: None,
            };
        };

        let convertible = matches!(
            target.primary_type(),
            Some("string" | "integer" | "number" | "boolean" | "array")
        );
        let named = param
            .schema
            .as_ref()
            .and_then(|s| s.ref_path.as_deref())
            .and_then(ref_name)
            .filter(|_| convertible);

        if target.primary_type() == Some("array") {
            let scalar = target
                .items
                .as_deref()
                .filter(|items| items.ref_path.is_none())
                .map_or(Scalar::String, Scalar::of);
            ParamShape {
                scalar,
                array: true,
                named,
            }
        } else {
            ParamShape {
                scalar: Scalar::of(target),
                array: false,
                named,
            }
        }
    }

    fn go_type(&self) -> TypeExpr {
        match (&self.named, self.array) {
            (Some(name), _) => TypeExpr::ident(name.clone()),
            (None, true) => TypeExpr::slice(self.scalar.go_type()),
            (None, false) => self.scalar.go_type(),
        }
    }
}

/// One parameter resolved to its struct field and local variable names.
struct ParamField<'a> {
    param: &'a ParameterSpec,
    go_name: String,
    var: String,
    shape: ParamShape,
    ty: TypeExpr,
}

/// Name of the params struct for one operation and location.
pub fn params_struct_name(base: &str, location: ParamLocation) -> String {
    format!("{base}{}Params", location.label())
}

/// Name of the parse method for one operation and location.
pub fn parse_method_name(base: &str, location: ParamLocation) -> String {
    format!("parse{base}{}Params", location.label())
}

/// Emit the params struct and parse method for `location`.
///
/// Returns the struct name, or None when the operation has no parameters
/// in that location (nothing is emitted).
pub fn synthesize_params(
    file: &mut FileBuilder,
    base: &str,
    location: ParamLocation,
    params: &[ParameterSpec],
    ctx: TypeContext,
    handler_struct: &str,
    features: &mut FileFeatures,
) -> Result<Option<String>, SynthError> {
    let selected: Vec<&ParameterSpec> = params.iter().filter(|p| p.location == location).collect();
    if selected.is_empty() {
        return Ok(None);
    }
    if base.trim().is_empty() {
        return Err(SynthError::EmptyName {
            what: "parameter struct",
        });
    }
    if handler_struct.trim().is_empty() {
        return Err(SynthError::EmptyName {
            what: "handler struct",
        });
    }

    let struct_name = params_struct_name(base, location);
    if file.has_decl(&struct_name) {
        return Err(SynthError::DuplicateSchema { name: struct_name });
    }

    let fields = resolve_fields(&selected, ctx);

    let mut builder = StructBuilder::new(&struct_name);
    for field in &fields {
        let target = field.param.resolved.as_ref().or(field.param.schema.as_ref());
        let rules = validation_rules(target, field.param.required);
        features.uses_regexp |= rules.iter().any(|r| r.starts_with("regexp="));
        let mut fb = FieldBuilder::named(&field.go_name).ty(field.ty.clone());
        if !rules.is_empty() {
            fb = fb.tag("validate", rules.join(","));
        }
        if let Some(doc) = &field.param.description {
            fb = fb.doc(doc);
        }
        builder = builder.field(fb.build());
    }
    file.add_decl(builder.build());

    let body = parse_body(file, &struct_name, location, &fields, features);
    file.add_import("net/http");
    let method = FuncBuilder::new(parse_method_name(base, location))
        .receiver("h", TypeExpr::pointer(TypeExpr::ident(handler_struct)))
        .param("r", TypeExpr::pointer(TypeExpr::selector("http", "Request")))
        .result(TypeExpr::pointer(TypeExpr::ident(&struct_name)))
        .result(TypeExpr::ident("error"))
        .body(body)
        .build();
    file.add_decl(method);

    debug!(name = %struct_name, params = fields.len(), "parameter struct");
    Ok(Some(struct_name))
}

fn resolve_fields<'a>(selected: &[&'a ParameterSpec], ctx: TypeContext) -> Vec<ParamField<'a>> {
    let mut used_fields = HashSet::new();
    let mut used_vars = HashSet::from(["params".to_string(), "err".to_string()]);
    selected
        .iter()
        .map(|param| {
            let shape = ParamShape::of(param);
            let mut ty = shape.go_type();
            if !param.required && ctx.use_pointers {
                ty = ty.optional();
            }
            ParamField {
                param,
                go_name: unique(pascal_case(&param.name), &mut used_fields),
                var: unique(camel_case(&param.name), &mut used_vars),
                shape,
                ty,
            }
        })
        .collect()
}

fn unique(base: String, used: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{base}{n}");
        n += 1;
    }
    candidate
}

/// Accumulates the parse method body on the file's statement list and
/// drains it once complete.
fn parse_body(
    file: &mut FileBuilder,
    struct_name: &str,
    location: ParamLocation,
    fields: &[ParamField<'_>],
    features: &mut FileFeatures,
) -> Vec<Stmt> {
    file.add_stmt(define(
        &["params"],
        vec![Expr::composite(TypeExpr::ident(struct_name), vec![]).addr()],
    ));

    for field in fields {
        let raw = format!("{}Raw", field.var);
        file.extend_stmts(extract_raw(field.param, location, &raw));

        let (mut convert, value) = parse_value(file, field, location, &raw, features);
        let target = Expr::ident("params").dot(&field.go_name);
        let value = if matches!(field.ty, TypeExpr::Pointer(_)) {
            Expr::ident(value).addr()
        } else {
            Expr::ident(value)
        };
        convert.push(assign(target, value));

        if field.param.required {
            let check = file.patterns().required_check(
                &raw,
                location.as_str(),
                &field.param.name,
                Expr::nil(),
            );
            file.add_stmt(check).extend_stmts(convert);
        } else {
            file.add_stmt(if_then(
                Expr::ident(&raw).not_equals(Expr::str("")),
                convert,
            ));
        }
    }

    let validate = Expr::ident("h").dot("validate");
    let on_error = vec![Stmt::Return(vec![Expr::nil(), Expr::ident("err")])];
    let check = file
        .patterns()
        .validate_struct(validate, Expr::ident("params"), on_error);
    file.add_stmt(check)
        .add_stmt(Stmt::Return(vec![Expr::ident("params"), Expr::nil()]));
    file.take_stmts()
}

/// Statements that bind `raw` to the parameter's string value.
fn extract_raw(param: &ParameterSpec, location: ParamLocation, raw: &str) -> Vec<Stmt> {
    let r = Expr::ident("r");
    let name = Expr::str(&param.name);
    match location {
        ParamLocation::Query => vec![define(
            &[raw],
            vec![r.dot("URL").dot("Query").call(vec![]).dot("Get").call(vec![name])],
        )],
        ParamLocation::Header => vec![define(&[raw], vec![r.dot("Header").dot("Get").call(vec![name])])],
        ParamLocation::Path => vec![define(
            &[raw],
            vec![r.dot("PathValue").call(vec![Expr::str(path_wildcard(&param.name))])],
        )],
        ParamLocation::Cookie => vec![
            var(raw, TypeExpr::ident("string")),
            if_init(
                define(&["cookie", "err"], vec![r.dot("Cookie").call(vec![name])]),
                Expr::ident("err").equals(Expr::nil()),
                vec![assign(Expr::ident(raw), Expr::ident("cookie").dot("Value"))],
            ),
        ],
    }
}

/// Statements converting `raw` into the field's value type, plus the
/// variable holding the final value.
fn parse_value(
    file: &mut FileBuilder,
    field: &ParamField<'_>,
    location: ParamLocation,
    raw: &str,
    features: &mut FileFeatures,
) -> (Vec<Stmt>, String) {
    let name = &field.param.name;
    let shape = &field.shape;

    if shape.scalar == Scalar::Time {
        file.add_import("time");
        features.uses_time = true;
    }

    let mut stmts = Vec::new();
    let parsed = if shape.array {
        file.add_import("strings");
        let split = Expr::qualified("strings", "Split").call(vec![Expr::ident(raw), Expr::str(",")]);
        if shape.scalar == Scalar::String {
            split
        } else {
            let values = format!("{}Values", field.var);
            let (mut item_body, item) = scalar_parse(file, shape.scalar, "item", location, name);
            let append = Expr::ident("append").call(vec![
                Expr::ident(&values),
                Expr::ident(item.unwrap_or_else(|| "item".to_string())),
            ]);
            item_body.push(assign(Expr::ident(&values), append));
            stmts.push(var(&values, TypeExpr::slice(shape.scalar.go_type())));
            stmts.push(range_values("item", split, item_body));
            Expr::ident(values)
        }
    } else {
        let (mut parse, result) = scalar_parse(file, shape.scalar, raw, location, name);
        stmts.append(&mut parse);
        Expr::ident(result.unwrap_or_else(|| raw.to_string()))
    };

    // scalar_parse may already have defined `<var>Value`
    let (converted, value) = match &shape.named {
        Some(named) => (
            Expr::Type(TypeExpr::ident(named.clone())).call(vec![parsed]),
            format!("{}Typed", field.var),
        ),
        None => (parsed, format!("{}Value", field.var)),
    };
    if let Expr::Ident(ident) = converted {
        return (stmts, ident);
    }
    stmts.push(define(&[value.as_str()], vec![converted]));
    (stmts, value)
}

/// Parse one scalar out of the string variable `raw`. Returns the
/// statements and the variable holding the parsed value; strings need no
/// parsing.
fn scalar_parse(
    file: &mut FileBuilder,
    scalar: Scalar,
    raw: &str,
    location: ParamLocation,
    name: &str,
) -> (Vec<Stmt>, Option<String>) {
    let stem = raw.strip_suffix("Raw").unwrap_or(raw);
    let value = format!("{stem}Value");
    let parsed = format!("{stem}Parsed");
    let input = Expr::ident(raw);

    let strconv = |func: &str, args: Vec<Expr>| Expr::qualified("strconv", func).call(args);
    let (call, conversion) = match scalar {
        Scalar::String => return (Vec::new(), None),
        Scalar::Int64 => (strconv("ParseInt", vec![input, Expr::int(10), Expr::int(64)]), None),
        Scalar::Int => (strconv("ParseInt", vec![input, Expr::int(10), Expr::int(0)]), Some("int")),
        Scalar::Int32 => (strconv("ParseInt", vec![input, Expr::int(10), Expr::int(32)]), Some("int32")),
        Scalar::Float64 => (strconv("ParseFloat", vec![input, Expr::int(64)]), None),
        Scalar::Float32 => (strconv("ParseFloat", vec![input, Expr::int(32)]), Some("float32")),
        Scalar::Bool => (strconv("ParseBool", vec![input]), None),
        Scalar::Time => (Expr::ident("parseTime").call(vec![input]), None),
    };
    if scalar != Scalar::Time {
        file.add_import("strconv");
    }

    let err = file.patterns().errorf(
        &format!("invalid {} parameter %q: %w", location.as_str()),
        vec![Expr::str(name), Expr::ident("err")],
    );
    let check = file.patterns().if_err_return(vec![Expr::nil(), err]);

    let stmts = match conversion {
        None => vec![define(&[value.as_str(), "err"], vec![call]), check],
        Some(ty) => vec![
            define(&[parsed.as_str(), "err"], vec![call]),
            check,
            define(
                &[value.as_str()],
                vec![Expr::Type(TypeExpr::ident(ty)).call(vec![Expr::ident(&parsed)])],
            ),
        ],
    };
    (stmts, Some(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::gocode::Emit;

    fn param(name: &str, location: ParamLocation, required: bool, schema: &str) -> ParameterSpec {
        ParameterSpec {
            name: name.into(),
            location,
            required,
            description: None,
            schema: Some(serde_json::from_str(schema).unwrap()),
            resolved: None,
        }
    }

    fn synth(location: ParamLocation, params: &[ParameterSpec]) -> (FileBuilder, Option<String>) {
        let mut file = FileBuilder::new("api");
        let name = synthesize_params(
            &mut file,
            "GetUser",
            location,
            params,
            TypeContext::default(),
            "Handler",
            &mut FileFeatures::default(),
        )
        .unwrap();
        (file, name)
    }

    fn emitted(file: &FileBuilder) -> String {
        file.decls().iter().map(Emit::emit).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_no_params_in_location_is_noop() {
        let params = [param("limit", ParamLocation::Query, false, r#"{"type":"integer"}"#)];
        let (file, name) = synth(ParamLocation::Header, &params);
        assert!(name.is_none());
        assert!(file.decls().is_empty());
        assert!(file.stmts().is_empty());
        assert!(file.imports().is_empty());
    }

    #[test]
    fn test_required_path_param() {
        let params = [param(
            "id",
            ParamLocation::Path,
            true,
            r#"{"type":"integer","format":"int64"}"#,
        )];
        let (file, name) = synth(ParamLocation::Path, &params);
        assert_eq!(name.as_deref(), Some("GetUserPathParams"));
        assert!(file.stmts().is_empty(), "method body drained into the decl");
        let expected = "type GetUserPathParams struct {
\tID int64 `validate:\"required\"`
}

func (h *Handler) parseGetUserPathParams(r *http.Request) (*GetUserPathParams, error) {
\tparams := &GetUserPathParams{}
\tidRaw := r.PathValue(\"id\")
\tif idRaw == \"\" {
\t\treturn nil, fmt.Errorf(\"missing required path parameter %q\", \"id\")
\t}
\tidValue, err := strconv.ParseInt(idRaw, 10, 64)
\tif err != nil {
\t\treturn nil, fmt.Errorf(\"invalid path parameter %q: %w\", \"id\", err)
\t}
\tparams.ID = idValue
\tif err := h.validate.Struct(params); err != nil {
\t\treturn nil, err
\t}
\treturn params, nil
}
";
        assert_eq!(emitted(&file), expected);
        assert!(file.imports().contains("strconv"));
        assert!(file.imports().contains("net/http"));
    }

    #[test]
    fn test_optional_query_param_is_guarded() {
        let params = [param(
            "limit",
            ParamLocation::Query,
            false,
            r#"{"type":"integer","format":"int32","maximum":100}"#,
        )];
        let (file, _) = synth(ParamLocation::Query, &params);
        let out = emitted(&file);
        assert!(out.contains("\tLimit *int32 `validate:\"omitempty,max=100\"`"));
        assert!(out.contains("\tlimitRaw := r.URL.Query().Get(\"limit\")\n\tif limitRaw != \"\" {\n"));
        assert!(out.contains("\t\tlimitParsed, err := strconv.ParseInt(limitRaw, 10, 32)\n"));
        assert!(out.contains("\t\tlimitValue := int32(limitParsed)\n"));
        assert!(out.contains("\t\tparams.Limit = &limitValue\n"));
        assert!(!out.contains("missing required"));
    }

    #[test]
    fn test_string_params_assign_raw() {
        let params = [
            param("X-Request-ID", ParamLocation::Header, true, r#"{"type":"string","format":"uuid"}"#),
            param("X-Trace", ParamLocation::Header, false, r#"{"type":"string"}"#),
        ];
        let (file, _) = synth(ParamLocation::Header, &params);
        let out = emitted(&file);
        assert!(out.contains("XRequestID string `validate:\"required,uuid\"`"));
        assert!(out.contains("xRequestIDRaw := r.Header.Get(\"X-Request-ID\")"));
        assert!(out.contains("\tparams.XRequestID = xRequestIDRaw\n"));
        assert!(out.contains("\t\tparams.XTrace = &xTraceRaw\n"));
    }

    #[test]
    fn test_cookie_param() {
        let params = [param("session", ParamLocation::Cookie, true, r#"{"type":"string"}"#)];
        let (file, _) = synth(ParamLocation::Cookie, &params);
        let out = emitted(&file);
        assert!(out.contains(
            "\tvar sessionRaw string\n\tif cookie, err := r.Cookie(\"session\"); err == nil {\n\t\tsessionRaw = cookie.Value\n\t}\n"
        ));
    }

    #[test]
    fn test_array_param() {
        let params = [
            param(
                "ids",
                ParamLocation::Query,
                true,
                r#"{"type":"array","items":{"type":"integer","format":"int64"}}"#,
            ),
            param("tags", ParamLocation::Query, true, r#"{"type":"array","items":{"type":"string"}}"#),
        ];
        let (file, _) = synth(ParamLocation::Query, &params);
        let out = emitted(&file);
        assert!(out.contains("\tvar idsValues []int64\n\tfor _, item := range strings.Split(idsRaw, \",\") {\n"));
        assert!(out.contains("\t\titemValue, err := strconv.ParseInt(item, 10, 64)\n"));
        assert!(out.contains("\t\tidsValues = append(idsValues, itemValue)\n"));
        assert!(out.contains("\tparams.Ids = idsValues\n"));
        assert!(out.contains("\ttagsValue := strings.Split(tagsRaw, \",\")\n\tparams.Tags = tagsValue\n"));
        assert!(file.imports().contains("strings"));
    }

    #[test]
    fn test_time_param_sets_feature() {
        let mut file = FileBuilder::new("api");
        let mut features = FileFeatures::default();
        let params = [param(
            "since",
            ParamLocation::Query,
            true,
            r#"{"type":"string","format":"date-time"}"#,
        )];
        synthesize_params(
            &mut file,
            "ListEvents",
            ParamLocation::Query,
            &params,
            TypeContext::default(),
            "Handler",
            &mut features,
        )
        .unwrap();
        assert!(features.uses_time);
        assert!(file.imports().contains("time"));
        assert!(emitted(&file).contains("sinceValue, err := parseTime(sinceRaw)"));
    }

    #[test]
    fn test_named_ref_param_is_converted() {
        let mut p = param(
            "status",
            ParamLocation::Query,
            true,
            r##"{"$ref":"#/components/schemas/Status"}"##,
        );
        p.resolved = Some(serde_json::from_str(r#"{"type":"string","enum":["on","off"]}"#).unwrap());
        let (file, _) = synth(ParamLocation::Query, &[p]);
        let out = emitted(&file);
        assert!(out.contains("\tStatus Status `validate:\"required,oneof=on off\"`"));
        assert!(out.contains("\tstatusTyped := Status(statusRaw)\n\tparams.Status = statusTyped\n"));
    }

    #[test]
    fn test_named_integer_ref_param_parses_then_converts() {
        let mut p = param(
            "id",
            ParamLocation::Path,
            true,
            r##"{"$ref":"#/components/schemas/UserID"}"##,
        );
        p.resolved = Some(serde_json::from_str(r#"{"type":"integer","format":"int64"}"#).unwrap());
        let (file, _) = synth(ParamLocation::Path, &[p]);
        let out = emitted(&file);
        assert!(out.contains("\tidValue, err := strconv.ParseInt(idRaw, 10, 64)\n"));
        assert!(out.contains("\tidTyped := UserID(idValue)\n\tparams.ID = idTyped\n"));
        assert!(!out.contains("idValue := UserID("));
    }

    #[test]
    fn test_empty_handler_struct_is_error() {
        let mut file = FileBuilder::new("api");
        let params = [param("id", ParamLocation::Path, true, r#"{"type":"string"}"#)];
        let err = synthesize_params(
            &mut file,
            "GetUser",
            ParamLocation::Path,
            &params,
            TypeContext::default(),
            "",
            &mut FileFeatures::default(),
        )
        .unwrap_err();
        assert_eq!(err, SynthError::EmptyName { what: "handler struct" });
    }

    #[test]
    fn test_wildcard_is_camel_cased() {
        let params = [param("item-id", ParamLocation::Path, true, r#"{"type":"string"}"#)];
        let (file, _) = synth(ParamLocation::Path, &params);
        assert!(emitted(&file).contains("itemIDRaw := r.PathValue(\"itemID\")"));
    }
}
