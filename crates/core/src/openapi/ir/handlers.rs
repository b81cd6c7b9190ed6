//! Handler and route synthesis.
//!
//! Per operation this emits `<Name>Request` / `<Name>Response` structs, a
//! method on the service interface and an HTTP adapter on the handler
//! struct. The scaffolding (`Service`, `Handler`, `NewHandler`,
//! `RegisterRoutes`) is always emitted, even for an empty operation set.

use tracing::debug;

use super::api::{FileFeatures, ParamLocation, RouteSpec};
use super::params::{params_struct_name, parse_method_name};
use super::structs::{claim_nested, synthesize_schema};
use super::translate::{TypeContext, translate};
use super::utils::route_pattern;
use crate::error::SynthError;
use crate::gocode::utils::camel_case;
use crate::gocode::{
    Decl, Expr, Field, FieldBuilder, FileBuilder, FuncBuilder, FuncSig, InterfaceBuilder, Stmt,
    StructBuilder, TypeExpr, assign, define, err_not_nil, if_then, var,
};

/// Names and imports the handler scaffolding depends on.
#[derive(Debug, Clone)]
pub struct HandlerOptions {
    pub service_interface: String,
    pub handler_struct: String,
    /// Import path of the validator package.
    pub validator_import: String,
    /// Package name the validator import is referred to by.
    pub validator_package: String,
    pub ctx: TypeContext,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            service_interface: "Service".to_string(),
            handler_struct: "Handler".to_string(),
            validator_import: "github.com/go-playground/validator/v10".to_string(),
            validator_package: "validator".to_string(),
            ctx: TypeContext::default(),
        }
    }
}

/// Emit request/response types, the service interface, the handler
/// scaffolding, one adapter per route and the route registration.
pub fn synthesize_handlers(
    file: &mut FileBuilder,
    routes: &[RouteSpec],
    opts: &HandlerOptions,
    features: &mut FileFeatures,
) -> Result<(), SynthError> {
    if opts.service_interface.trim().is_empty() {
        return Err(SynthError::EmptyName {
            what: "service interface",
        });
    }
    if opts.handler_struct.trim().is_empty() {
        return Err(SynthError::EmptyName {
            what: "handler struct",
        });
    }

    let mut shapes = Vec::with_capacity(routes.len());
    for route in routes {
        let shape = route_types(file, route, opts.ctx, features)?;
        add_unique(file, shape.request.clone())?;
        add_unique(file, shape.response.clone())?;
        shapes.push(shape);
    }

    let service = service_interface(file, routes, &opts.service_interface);
    add_unique(file, service)?;
    let handler = handler_struct(file, opts);
    add_unique(file, handler)?;
    add_unique(file, new_handler(opts, features))?;

    for (route, shape) in routes.iter().zip(&shapes) {
        let decl = adapter(file, route, shape, opts, features);
        add_unique(file, decl)?;
    }
    let registration = register_routes(file, routes, &opts.handler_struct);
    add_unique(file, registration)?;

    debug!(routes = routes.len(), "handlers");
    Ok(())
}

fn add_unique(file: &mut FileBuilder, decl: Decl) -> Result<(), SynthError> {
    if file.has_decl(decl.name()) {
        return Err(SynthError::DuplicateSchema {
            name: decl.name().to_string(),
        });
    }
    file.add_decl(decl);
    Ok(())
}

/// Request/response declarations of one route plus what the adapter needs
/// to know about them.
#[derive(Debug, Clone)]
struct RouteTypes {
    request: Decl,
    response: Decl,
    /// Body type without pointer indirection.
    body: Option<TypeExpr>,
    /// (field, status, has content) in write order.
    statuses: Vec<(String, u16, bool)>,
}

fn route_types(
    file: &mut FileBuilder,
    route: &RouteSpec,
    ctx: TypeContext,
    features: &mut FileFeatures,
) -> Result<RouteTypes, SynthError> {
    let name = &route.handler_name;

    let mut request = StructBuilder::new(format!("{name}Request"))
        .doc(format!("{name}Request carries the decoded inputs of {name}."));
    for location in ParamLocation::ALL {
        if route.has_location(location) {
            let ty = TypeExpr::pointer(TypeExpr::ident(params_struct_name(name, location)));
            request = request.field(FieldBuilder::named(location.label()).ty(ty).build());
        }
    }

    let mut body = None;
    if let Some(spec) = &route.body {
        let mut mapping = translate(Some(&spec.schema), true, &format!("{name}RequestBody"), ctx);
        claim_nested(file, &mut mapping, features);
        for path in &mapping.imports {
            file.add_import(*path);
        }
        for nested in &mapping.nested {
            synthesize_schema(file, nested, ctx, features)?;
        }
        let ty = if spec.required {
            mapping.ty.clone()
        } else {
            mapping.ty.clone().optional()
        };
        request = request.field(FieldBuilder::named("Body").ty(ty).build());
        body = Some(mapping.ty);
    }

    let mut response = StructBuilder::new(format!("{name}Response")).doc(format!(
        "{name}Response holds the possible results of {name}; the first non-empty field in status order is written."
    ));
    let mut statuses = Vec::new();
    for spec in &route.responses {
        let field = spec.status.field_name();
        let ty = match &spec.schema {
            Some(schema) => {
                let nested_name = format!("{name}{}Body", spec.status.type_suffix());
                let mut mapping = translate(Some(schema), true, &nested_name, ctx);
                claim_nested(file, &mut mapping, features);
                for path in &mapping.imports {
                    file.add_import(*path);
                }
                for nested in &mapping.nested {
                    synthesize_schema(file, nested, ctx, features)?;
                }
                mapping.ty.optional()
            }
            None => TypeExpr::ident("bool"),
        };
        let mut fb = FieldBuilder::named(&field).ty(ty);
        if let Some(doc) = spec.description.as_deref().filter(|d| !d.trim().is_empty()) {
            fb = fb.doc(doc);
        }
        response = response.field(fb.build());
        statuses.push((field, spec.status.write_status(), spec.schema.is_some()));
    }

    Ok(RouteTypes {
        request: request.build(),
        response: response.build(),
        body,
        statuses,
    })
}

fn service_interface(file: &mut FileBuilder, routes: &[RouteSpec], name: &str) -> Decl {
    let mut builder = InterfaceBuilder::new(name)
        .doc(format!("{name} is implemented by the application to serve each operation."));
    if !routes.is_empty() {
        file.add_import("context");
    }
    for route in routes {
        let handler = &route.handler_name;
        let sig = FuncSig {
            params: vec![
                Field::named("ctx", TypeExpr::selector("context", "Context")),
                Field::named(
                    "req",
                    TypeExpr::pointer(TypeExpr::ident(format!("{handler}Request"))),
                ),
            ],
            results: vec![
                Field::unnamed(TypeExpr::pointer(TypeExpr::ident(format!("{handler}Response")))),
                Field::unnamed(TypeExpr::ident("error")),
            ],
        };
        builder = builder.method(handler, sig, route.summary.clone());
    }
    builder.build()
}

fn handler_struct(file: &mut FileBuilder, opts: &HandlerOptions) -> Decl {
    file.add_import(opts.validator_import.as_str());
    StructBuilder::new(&opts.handler_struct)
        .doc(format!(
            "{} adapts HTTP requests to {}.",
            opts.handler_struct, opts.service_interface
        ))
        .field(Field::named("service", TypeExpr::ident(&opts.service_interface)))
        .field(Field::named(
            "validate",
            TypeExpr::pointer(TypeExpr::selector(&opts.validator_package, "Validate")),
        ))
        .build()
}

fn new_handler(opts: &HandlerOptions, features: &FileFeatures) -> Decl {
    let handler = &opts.handler_struct;
    let validate = Expr::qualified(&opts.validator_package, "New").call(vec![]);
    let mut body = vec![define(&["validate"], vec![validate])];
    if features.uses_regexp {
        let register = Expr::ident("validate").dot("RegisterValidation").call(vec![
            Expr::str("regexp"),
            Expr::ident("validateRegexp"),
        ]);
        body.push(assign(Expr::ident("_"), register));
    }
    body.push(Stmt::Return(vec![
        Expr::composite(
            TypeExpr::ident(handler),
            vec![
                ("service".to_string(), Expr::ident("service")),
                ("validate".to_string(), Expr::ident("validate")),
            ],
        )
        .addr(),
    ]));

    FuncBuilder::new(format!("New{handler}"))
        .doc(format!("New{handler} returns a {handler} serving service."))
        .param("service", TypeExpr::ident(&opts.service_interface))
        .result(TypeExpr::pointer(TypeExpr::ident(handler)))
        .body(body)
        .build()
}

fn adapter(
    file: &mut FileBuilder,
    route: &RouteSpec,
    shape: &RouteTypes,
    opts: &HandlerOptions,
    features: &FileFeatures,
) -> Decl {
    let name = &route.handler_name;
    file.add_import("net/http");
    let bad_request = file.patterns().status_code(400);
    let server_error = file.patterns().status_code(500);

    let mut body = vec![define(
        &["req"],
        vec![Expr::composite(TypeExpr::ident(format!("{name}Request")), vec![]).addr()],
    )];

    for location in ParamLocation::ALL {
        if !route.has_location(location) {
            continue;
        }
        let local = format!("{}Params", camel_case(location.label()));
        let call = Expr::ident("h")
            .dot(parse_method_name(name, location))
            .call(vec![Expr::ident("r")]);
        body.push(define(&[local.as_str(), "err"], vec![call]));
        body.push(if_then(
            err_not_nil(),
            file.patterns()
                .write_error_return(bad_request.clone(), Expr::ident("err")),
        ));
        body.push(assign(
            Expr::ident("req").dot(location.label()),
            Expr::ident(local),
        ));
    }

    if let (Some(spec), Some(body_ty)) = (&route.body, &shape.body) {
        body.extend(decode_body(file, spec.required, body_ty, &bad_request, features));
    }

    let call = Expr::ident("h")
        .dot("service")
        .dot(name)
        .call(vec![
            Expr::ident("r").dot("Context").call(vec![]),
            Expr::ident("req"),
        ]);
    body.push(define(&["resp", "err"], vec![call]));
    body.push(if_then(
        err_not_nil(),
        file.patterns()
            .write_error_return(server_error.clone(), Expr::ident("err")),
    ));

    file.add_import("errors");
    let no_response = Expr::qualified("errors", "New").call(vec![Expr::str(format!(
        "{name} returned no response"
    ))]);
    body.push(if_then(
        Expr::ident("resp").equals(Expr::nil()),
        file.patterns()
            .write_error_return(server_error.clone(), no_response),
    ));

    for (field, status, has_content) in &shape.statuses {
        let value = Expr::ident("resp").dot(field);
        let code = file.patterns().status_code(*status);
        let (cond, write) = if *has_content {
            (
                value.clone().not_equals(Expr::nil()),
                Expr::ident("writeJSON").call(vec![Expr::ident("w"), code, value]),
            )
        } else {
            (
                value,
                Expr::ident("w").dot("WriteHeader").call(vec![code]),
            )
        };
        body.push(if_then(cond, vec![Stmt::Expr(write), Stmt::Return(vec![])]));
    }

    let empty = Expr::qualified("errors", "New").call(vec![Expr::str(format!(
        "{name} response has no populated status"
    ))]);
    body.push(Stmt::Expr(Expr::ident("writeError").call(vec![
        Expr::ident("w"),
        server_error,
        empty,
    ])));

    FuncBuilder::new(name)
        .doc(format!("{name} handles {}.", route.label()))
        .receiver("h", TypeExpr::pointer(TypeExpr::ident(&opts.handler_struct)))
        .param("w", TypeExpr::selector("http", "ResponseWriter"))
        .param("r", TypeExpr::pointer(TypeExpr::selector("http", "Request")))
        .body(body)
        .build()
}

/// Decode (and, for generated structs, validate) the JSON request body.
fn decode_body(
    file: &mut FileBuilder,
    required: bool,
    body_ty: &TypeExpr,
    bad_request: &Expr,
    features: &FileFeatures,
) -> Vec<Stmt> {
    let mut stmts = vec![var("body", body_ty.clone())];
    let on_error = file
        .patterns()
        .write_error_return(bad_request.clone(), Expr::ident("err"));
    let source = Expr::ident("r").dot("Body");
    stmts.push(file.patterns().json_decode(source, "body", on_error));

    let validated = matches!(body_ty, TypeExpr::Ident(name) if features.structs.contains(name));
    if validated {
        let on_error = file
            .patterns()
            .write_error_return(bad_request.clone(), Expr::ident("err"));
        let validate = Expr::ident("h").dot("validate");
        stmts.push(file.patterns().validate_struct(
            validate,
            Expr::ident("body").addr(),
            on_error,
        ));
    }

    let target = Expr::ident("req").dot("Body");
    if required {
        stmts.push(assign(target, Expr::ident("body")));
        stmts
    } else {
        let value = if body_ty.is_nilable() {
            Expr::ident("body")
        } else {
            Expr::ident("body").addr()
        };
        stmts.push(assign(target, value));
        let has_body = Expr::ident("r").dot("ContentLength").not_equals(Expr::int(0));
        vec![if_then(has_body, stmts)]
    }
}

fn register_routes(file: &mut FileBuilder, routes: &[RouteSpec], handler: &str) -> Decl {
    file.add_import("net/http");
    let body = routes.iter().map(|route| {
        Stmt::Expr(Expr::ident("mux").dot("HandleFunc").call(vec![
            Expr::str(route_pattern(route.method, &route.path)),
            Expr::ident("h").dot(&route.handler_name),
        ]))
    });
    FuncBuilder::new("RegisterRoutes")
        .doc("RegisterRoutes binds every operation to mux.")
        .param("mux", TypeExpr::pointer(TypeExpr::selector("http", "ServeMux")))
        .param("h", TypeExpr::pointer(TypeExpr::ident(handler)))
        .body(body)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::gocode::Emit;
    use crate::openapi::ir::api::{BodySpec, HttpMethod, ParameterSpec, ResponseSpec, StatusKey};

    fn schema(json: &str) -> crate::openapi::spec::Schema {
        serde_json::from_str(json).unwrap()
    }

    fn get_user() -> RouteSpec {
        RouteSpec {
            method: HttpMethod::Get,
            path: "/users/{id}".into(),
            handler_name: "GetUser".into(),
            summary: Some("Fetch one user.".into()),
            parameters: vec![ParameterSpec {
                name: "id".into(),
                location: ParamLocation::Path,
                required: true,
                description: None,
                schema: Some(schema(r#"{"type":"string"}"#)),
                resolved: None,
            }],
            body: None,
            responses: vec![
                ResponseSpec {
                    status: StatusKey::Code(200),
                    description: Some("OK".into()),
                    schema: Some(schema(r##"{"$ref":"#/components/schemas/User"}"##)),
                },
                ResponseSpec {
                    status: StatusKey::Code(404),
                    description: None,
                    schema: None,
                },
            ],
        }
    }

    fn create_user(required: bool) -> RouteSpec {
        RouteSpec {
            method: HttpMethod::Post,
            path: "/users".into(),
            handler_name: "POSTUsers".into(),
            summary: None,
            parameters: vec![],
            body: Some(BodySpec {
                required,
                schema: schema(r##"{"$ref":"#/components/schemas/User"}"##),
            }),
            responses: vec![ResponseSpec {
                status: StatusKey::Default,
                description: None,
                schema: Some(schema(r##"{"$ref":"#/components/schemas/Error"}"##)),
            }],
        }
    }

    fn synth(routes: &[RouteSpec], features: &mut FileFeatures) -> FileBuilder {
        let mut file = FileBuilder::new("api");
        synthesize_handlers(&mut file, routes, &HandlerOptions::default(), features).unwrap();
        file
    }

    fn decl(file: &FileBuilder, name: &str) -> String {
        file.decls()
            .iter()
            .find(|d| d.name() == name)
            .map(Emit::emit)
            .unwrap()
    }

    #[test]
    fn test_request_and_response_structs() {
        let file = synth(&[get_user()], &mut FileFeatures::default());
        assert_eq!(
            decl(&file, "GetUserRequest"),
            "// GetUserRequest carries the decoded inputs of GetUser.\ntype GetUserRequest struct {\n\tPath *GetUserPathParams\n}\n"
        );
        let response = decl(&file, "GetUserResponse");
        assert!(response.contains("\t// OK\n\tStatus200 *User\n\tStatus404 bool\n"));
    }

    #[test]
    fn test_service_interface_method() {
        let file = synth(&[get_user()], &mut FileFeatures::default());
        assert_eq!(
            decl(&file, "Service"),
            "// Service is implemented by the application to serve each operation.
type Service interface {
\t// Fetch one user.
\tGetUser(ctx context.Context, req *GetUserRequest) (*GetUserResponse, error)
}
"
        );
        assert!(file.imports().contains("context"));
    }

    #[test]
    fn test_adapter_flow() {
        let file = synth(&[get_user()], &mut FileFeatures::default());
        let expected = "// GetUser handles GET /users/{id}.
func (h *Handler) GetUser(w http.ResponseWriter, r *http.Request) {
\treq := &GetUserRequest{}
\tpathParams, err := h.parseGetUserPathParams(r)
\tif err != nil {
\t\twriteError(w, http.StatusBadRequest, err)
\t\treturn
\t}
\treq.Path = pathParams
\tresp, err := h.service.GetUser(r.Context(), req)
\tif err != nil {
\t\twriteError(w, http.StatusInternalServerError, err)
\t\treturn
\t}
\tif resp == nil {
\t\twriteError(w, http.StatusInternalServerError, errors.New(\"GetUser returned no response\"))
\t\treturn
\t}
\tif resp.Status200 != nil {
\t\twriteJSON(w, http.StatusOK, resp.Status200)
\t\treturn
\t}
\tif resp.Status404 {
\t\tw.WriteHeader(http.StatusNotFound)
\t\treturn
\t}
\twriteError(w, http.StatusInternalServerError, errors.New(\"GetUser response has no populated status\"))
}
";
        let adapter = file
            .decls()
            .iter()
            .filter(|d| d.name() == "GetUser")
            .map(Emit::emit)
            .next()
            .unwrap();
        assert_eq!(adapter, expected);
    }

    #[test]
    fn test_required_body_is_decoded_and_validated() {
        let mut features = FileFeatures::default();
        features.structs.insert("User".into());
        let file = synth(&[create_user(true)], &mut features);
        let adapter = decl(&file, "POSTUsers");
        assert!(adapter.contains(
            "\tvar body User\n\tif err := json.NewDecoder(r.Body).Decode(&body); err != nil {\n\t\twriteError(w, http.StatusBadRequest, err)\n\t\treturn\n\t}\n"
        ));
        assert!(adapter.contains("\tif err := h.validate.Struct(&body); err != nil {\n"));
        assert!(adapter.contains("\treq.Body = body\n"));
        assert!(adapter.contains(
            "\tif resp.Default != nil {\n\t\twriteJSON(w, http.StatusInternalServerError, resp.Default)\n"
        ));
        assert!(decl(&file, "POSTUsersRequest").contains("\tBody User\n"));
    }

    #[test]
    fn test_optional_body_is_guarded() {
        let file = synth(&[create_user(false)], &mut FileFeatures::default());
        let adapter = decl(&file, "POSTUsers");
        assert!(adapter.contains("\tif r.ContentLength != 0 {\n\t\tvar body User\n"));
        assert!(adapter.contains("\t\treq.Body = &body\n"));
        assert!(!adapter.contains("h.validate.Struct"));
        assert!(decl(&file, "POSTUsersRequest").contains("\tBody *User\n"));
    }

    #[test]
    fn test_register_routes_in_input_order() {
        let file = synth(&[get_user(), create_user(true)], &mut FileFeatures::default());
        assert_eq!(
            decl(&file, "RegisterRoutes"),
            "// RegisterRoutes binds every operation to mux.
func RegisterRoutes(mux *http.ServeMux, h *Handler) {
\tmux.HandleFunc(\"GET /users/{id}\", h.GetUser)
\tmux.HandleFunc(\"POST /users\", h.POSTUsers)
}
"
        );
    }

    #[test]
    fn test_empty_operations_still_scaffold() {
        let file = synth(&[], &mut FileFeatures::default());
        let names: Vec<_> = file.decls().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(names, vec!["Service", "Handler", "NewHandler", "RegisterRoutes"]);
        assert!(decl(&file, "Service").contains("type Service interface{}"));
        assert!(!file.imports().contains("context"));
    }

    #[test]
    fn test_new_handler_registers_regexp() {
        let features = FileFeatures {
            uses_regexp: true,
            ..FileFeatures::default()
        };
        let decl = new_handler(&HandlerOptions::default(), &features);
        assert_eq!(
            decl.emit(),
            "// NewHandler returns a Handler serving service.
func NewHandler(service Service) *Handler {
\tvalidate := validator.New()
\t_ = validate.RegisterValidation(\"regexp\", validateRegexp)
\treturn &Handler{service: service, validate: validate}
}
"
        );
    }

    #[test]
    fn test_empty_service_name_is_error() {
        let opts = HandlerOptions {
            service_interface: " ".into(),
            ..HandlerOptions::default()
        };
        let mut file = FileBuilder::new("api");
        let err = synthesize_handlers(&mut file, &[], &opts, &mut FileFeatures::default())
            .unwrap_err();
        assert_eq!(err, SynthError::EmptyName { what: "service interface" });
    }

    #[test]
    fn test_collision_with_schema_is_error() {
        let mut file = FileBuilder::new("api");
        file.add_decl(StructBuilder::new("Handler").build());
        let err = synthesize_handlers(
            &mut file,
            &[],
            &HandlerOptions::default(),
            &mut FileFeatures::default(),
        )
        .unwrap_err();
        assert_eq!(err, SynthError::DuplicateSchema { name: "Handler".into() });
    }
}
