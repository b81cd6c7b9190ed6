//! OpenAPI to Go server code generator.
//!
//! This module parses OpenAPI 3.x documents (JSON or YAML) and generates a
//! single Go source file with:
//! - Structs for component schemas, with `json` and `validate` tags
//! - Typed parameter structs and their parsing methods
//! - A `Service` interface, `net/http` adapters and `RegisterRoutes`

mod generator;
pub mod ir;
pub mod loader;
pub mod spec;

pub use generator::{GENERATED_HEADER, Generator, generate, output_path};
pub use loader::{DocumentFormat, load_document};
pub use spec::OpenApiSpec;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::output::Gofmt;

    const TEST_OPENAPI_JSON: &str = r##"{
  "openapi": "3.0.3",
  "info": { "title": "Users API", "version": "1.0.0" },
  "paths": {
    "/users": {
      "get": {
        "operationId": "list_users",
        "summary": "List users.",
        "parameters": [
          { "$ref": "#/components/parameters/Limit" },
          { "name": "since", "in": "query", "schema": { "type": "string", "format": "date-time" } },
          { "name": "status", "in": "query", "schema": { "$ref": "#/components/schemas/Status" } }
        ],
        "responses": {
          "200": { "description": "OK", "content": { "application/json": { "schema": { "type": "array", "items": { "$ref": "#/components/schemas/User" } } } } }
        }
      },
      "post": {
        "requestBody": { "required": true, "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewUser" } } } },
        "responses": {
          "201": { "description": "Created", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/User" } } } },
          "default": { "description": "Error", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } } }
        }
      }
    },
    "/users/{id}": {
      "parameters": [{ "name": "id", "in": "path", "required": true, "schema": { "type": "integer", "format": "int64" } }],
      "get": {
        "operationId": "getUser",
        "parameters": [{ "name": "X-Request-ID", "in": "header", "schema": { "type": "string", "format": "uuid" } }],
        "responses": {
          "200": { "description": "OK", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/User" } } } },
          "404": { "description": "Not found" }
        }
      },
      "delete": {
        "operationId": "deleteUser",
        "responses": { "204": { "description": "Deleted" } }
      }
    }
  },
  "components": {
    "parameters": {
      "Limit": { "name": "limit", "in": "query", "schema": { "type": "integer", "format": "int32", "minimum": 1, "maximum": 100 } }
    },
    "schemas": {
      "User": {
        "type": "object",
        "required": ["id", "email"],
        "properties": {
          "id": { "type": "integer", "format": "int64" },
          "name": { "type": "string", "maxLength": 64 },
          "email": { "type": "string", "format": "email" },
          "created_at": { "type": "string", "format": "date-time" }
        }
      },
      "NewUser": {
        "type": "object",
        "required": ["email"],
        "properties": {
          "email": { "type": "string", "format": "email" },
          "handle": { "type": "string", "pattern": "^[a-z0-9_]+$" }
        }
      },
      "Status": { "type": "string", "enum": ["active", "disabled"] },
      "Error": {
        "type": "object",
        "required": ["message"],
        "properties": { "message": { "type": "string" } }
      }
    }
  }
}"##;

    const PING_YAML: &str = r#"
openapi: 3.0.3
info:
  title: Ping
  version: "1"
paths:
  /ping:
    get:
      operationId: ping
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema:
                type: object
                properties:
                  ok:
                    type: boolean
"#;

    const PING_JSON: &str = r#"{
  "openapi": "3.0.3",
  "info": { "title": "Ping", "version": "1" },
  "paths": {
    "/ping": {
      "get": {
        "operationId": "ping",
        "responses": {
          "200": { "description": "OK", "content": { "application/json": { "schema": { "type": "object", "properties": { "ok": { "type": "boolean" } } } } } }
        }
      }
    }
  }
}"#;

    fn users_api() -> String {
        generate(TEST_OPENAPI_JSON, &GeneratorConfig::default()).unwrap()
    }

    #[test]
    fn test_generate_from_openapi_json() {
        let output = users_api();

        assert!(output.starts_with("// Code generated by goapi. DO NOT EDIT.\n\npackage api\n"));

        // Schemas
        assert!(output.contains("type User struct {\n\tID        int64      `json:\"id\" validate:\"required\"`\n"));
        assert!(output.contains("\tCreatedAt *time.Time `json:\"created_at,omitempty\"`\n"));
        assert!(output.contains("type NewUser struct {"));
        assert!(output.contains("type Status string\n"));

        // Parameter structs exist only for locations that have parameters
        assert!(output.contains("type ListUsersQueryParams struct {"));
        assert!(!output.contains("ListUsersPathParams"));
        assert!(output.contains("type GetUserPathParams struct {"));
        assert!(output.contains("type GetUserHeaderParams struct {"));
        assert!(output.contains("type DeleteUserPathParams struct {"));
        assert!(output.contains("func (h *Handler) parseListUsersQueryParams(r *http.Request) (*ListUsersQueryParams, error) {"));
        assert!(output.contains("Status(statusRaw)"));
        assert!(output.contains("parseTime(sinceRaw)"));

        // Service and adapters
        assert!(output.contains("type Service interface {\n\t// List users.\n\tListUsers(ctx context.Context, req *ListUsersRequest) (*ListUsersResponse, error)\n"));
        assert!(output.contains("\tPOSTUsers(ctx context.Context, req *POSTUsersRequest) (*POSTUsersResponse, error)\n"));
        assert!(output.contains("func (h *Handler) DeleteUser(w http.ResponseWriter, r *http.Request) {"));
        assert!(output.contains("\tStatus204 bool\n"));

        // Routes in document order
        assert!(output.contains(
            "\tmux.HandleFunc(\"GET /users\", h.ListUsers)
\tmux.HandleFunc(\"POST /users\", h.POSTUsers)
\tmux.HandleFunc(\"GET /users/{id}\", h.GetUser)
\tmux.HandleFunc(\"DELETE /users/{id}\", h.DeleteUser)
"
        ));

        // Helpers gated on features
        assert!(output.contains("func writeJSON(w http.ResponseWriter, status int, v any) {"));
        assert!(output.contains("func parseTime(value string) (time.Time, error) {"));
        assert!(output.contains("func validateRegexp(fl validator.FieldLevel) bool {"));
        assert!(output.contains("\t_ = validate.RegisterValidation(\"regexp\", validateRegexp)\n"));
    }

    #[test]
    fn test_declaration_order() {
        let output = users_api();
        let position = |needle: &str| {
            output
                .find(needle)
                .unwrap_or_else(|| panic!("missing {needle}"))
        };
        let order = [
            "type User struct",
            "type Error struct",
            "type ListUsersQueryParams struct",
            "type ListUsersRequest struct",
            "type Service interface",
            "type Handler struct",
            "func NewHandler(",
            "func (h *Handler) ListUsers(",
            "func RegisterRoutes(",
            "func writeJSON(",
            "func validateRegexp(",
        ];
        for pair in order.windows(2) {
            assert!(
                position(pair[0]) < position(pair[1]),
                "{} should come before {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_import_tiers() {
        let output = users_api();
        assert!(output.contains(
            "import (
\t\"context\"
\t\"encoding/json\"
\t\"errors\"
\t\"fmt\"
\t\"net/http\"
\t\"regexp\"
\t\"strconv\"
\t\"time\"

\t\"github.com/go-playground/validator/v10\"
)
"
        ));
    }

    #[test]
    fn test_local_prefix_moves_import_to_last_tier() {
        let config = GeneratorConfig {
            local_prefix: "github.com/go-playground".to_string(),
            ..GeneratorConfig::default()
        };
        let output = generate(TEST_OPENAPI_JSON, &config).unwrap();
        assert!(output.contains("\t\"time\"\n\n\t\"github.com/go-playground/validator/v10\"\n)"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(users_api(), users_api());
    }

    #[test]
    fn test_yaml_and_json_generate_the_same_file() {
        let config = GeneratorConfig::default();
        let from_yaml = generate(PING_YAML, &config).unwrap();
        let from_json = generate(PING_JSON, &config).unwrap();
        assert_eq!(from_yaml, from_json);
        assert!(from_yaml.contains("type PingResponse struct"));
        assert!(from_yaml.contains("type Ping200Body struct {\n\tOk *bool `json:\"ok,omitempty\"`\n}\n"));
    }

    #[test]
    fn test_minimal_document_has_no_optional_imports() {
        let output = generate(PING_JSON, &GeneratorConfig::default()).unwrap();
        assert!(!output.contains("\"time\""));
        assert!(!output.contains("\"regexp\""));
        assert!(!output.contains("\"strconv\""));
        assert!(!output.contains("func parseTime("));
        assert!(!output.contains("RegisterValidation"));
    }

    #[test]
    fn test_custom_names() {
        let config = GeneratorConfig {
            package: "users".to_string(),
            service_interface: "UserService".to_string(),
            handler_struct: "Server".to_string(),
            use_pointers: false,
            ..GeneratorConfig::default()
        };
        let output = generate(TEST_OPENAPI_JSON, &config).unwrap();
        assert!(output.contains("\npackage users\n"));
        assert!(output.contains("type UserService interface {"));
        assert!(output.contains("func (h *Server) GetUser(w http.ResponseWriter, r *http.Request) {"));
        assert!(output.contains("func RegisterRoutes(mux *http.ServeMux, h *Server) {"));
        assert!(output.contains("\tCreatedAt time.Time `json:\"created_at,omitempty\"`\n"));
    }

    #[test]
    fn test_root_and_trailing_slash_routes_are_exact() {
        let document = r#"{
  "openapi": "3.0.3",
  "paths": {
    "/": { "get": { "operationId": "index", "responses": { "204": { "description": "OK" } } } },
    "/files/": { "get": { "operationId": "listFiles", "responses": { "204": { "description": "OK" } } } }
  }
}"#;
        let output = generate(document, &GeneratorConfig::default()).unwrap();
        assert!(output.contains("\tmux.HandleFunc(\"GET /{$}\", h.Index)\n"));
        assert!(output.contains("\tmux.HandleFunc(\"GET /files/{$}\", h.ListFiles)\n"));
    }

    #[test]
    fn test_invalid_document_is_load_error() {
        let err = generate("{ not json", &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, crate::error::GenerateError::Load(_)));
    }

    #[test]
    fn test_output_is_valid_gofmt_input() {
        // Only meaningful where a Go toolchain is installed.
        let Ok(gofmt) = Gofmt::locate() else {
            return;
        };
        gofmt.format_source(&users_api()).unwrap();
    }
}
