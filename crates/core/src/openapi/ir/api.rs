//! Schema-domain model for normalized operations.
//!
//! This is what the synthesizers consume:
//! - NamedSchema: a schema that becomes a Go type declaration
//! - SchemaStruct / SchemaField: an object schema resolved to Go fields
//! - RouteSpec: one HTTP operation with merged parameters, body and responses

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::gocode::TypeExpr;
use crate::openapi::spec::Schema;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Order in which methods of one path item are visited.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    Query,
    Header,
    Path,
    Cookie,
}

impl ParamLocation {
    /// Order in which locations are parsed by a handler.
    pub const ALL: [ParamLocation; 4] = [
        ParamLocation::Path,
        ParamLocation::Query,
        ParamLocation::Header,
        ParamLocation::Cookie,
    ];

    /// Case-insensitive parse of an OpenAPI `in` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            "path" => Some(ParamLocation::Path),
            "cookie" => Some(ParamLocation::Cookie),
            _ => None,
        }
    }

    /// Lower-case name used in error messages: `query`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Path => "path",
            ParamLocation::Cookie => "cookie",
        }
    }

    /// Capitalized name used in identifiers: `Query`.
    pub fn label(&self) -> &'static str {
        match self {
            ParamLocation::Query => "Query",
            ParamLocation::Header => "Header",
            ParamLocation::Path => "Path",
            ParamLocation::Cookie => "Cookie",
        }
    }
}

/// Schema that becomes one top-level Go type.
#[derive(Debug, Clone)]
pub struct NamedSchema {
    /// Go type name (already PascalCase).
    pub name: String,
    pub schema: Option<Schema>,
}

/// Object schema resolved into Go fields.
#[derive(Debug, Clone)]
pub struct SchemaStruct {
    pub name: String,
    pub doc: Option<String>,
    pub fields: Vec<SchemaField>,
}

/// One property of an object schema.
#[derive(Debug, Clone)]
pub struct SchemaField {
    /// Property name as written in the document (JSON key).
    pub name: String,
    /// Exported Go field name.
    pub go_name: String,
    pub ty: TypeExpr,
    pub required: bool,
    pub doc: Option<String>,
    /// Validation rules in emission order.
    pub rules: Vec<String>,
}

impl SchemaField {
    /// `json` tag value: name, plus `omitempty` when optional.
    pub fn json_tag(&self) -> String {
        if self.required {
            self.name.clone()
        } else {
            format!("{},omitempty", self.name)
        }
    }
}

/// Operation parameter after `$ref` resolution and path/operation merging.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<Schema>,
    /// Component schema behind a `$ref`, used to pick the parse routine.
    pub resolved: Option<Schema>,
}

/// JSON request body.
#[derive(Debug, Clone)]
pub struct BodySpec {
    pub required: bool,
    /// Inline objects have been hoisted, so this is a `$ref`, array or primitive.
    pub schema: Schema,
}

/// Response key: a concrete status code or `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKey {
    Code(u16),
    Default,
}

impl StatusKey {
    /// Parse a response key. Range keys such as `2XX` are not supported.
    pub fn parse(key: &str) -> Option<Self> {
        if key.eq_ignore_ascii_case("default") {
            return Some(StatusKey::Default);
        }
        match key.parse::<u16>() {
            Ok(code) if (100..=599).contains(&code) => Some(StatusKey::Code(code)),
            _ => None,
        }
    }

    /// Response struct field: `Status200` or `Default`.
    pub fn field_name(&self) -> String {
        match self {
            StatusKey::Code(code) => format!("Status{code}"),
            StatusKey::Default => "Default".to_string(),
        }
    }

    /// Component of hoisted body type names: `200` or `Default`.
    pub fn type_suffix(&self) -> String {
        match self {
            StatusKey::Code(code) => code.to_string(),
            StatusKey::Default => "Default".to_string(),
        }
    }

    /// Status written for this key; `default` responses are written as 500.
    pub fn write_status(&self) -> u16 {
        match self {
            StatusKey::Code(code) => *code,
            StatusKey::Default => 500,
        }
    }
}

impl Ord for StatusKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (StatusKey::Code(a), StatusKey::Code(b)) => a.cmp(b),
            (StatusKey::Code(_), StatusKey::Default) => Ordering::Less,
            (StatusKey::Default, StatusKey::Code(_)) => Ordering::Greater,
            (StatusKey::Default, StatusKey::Default) => Ordering::Equal,
        }
    }
}

impl PartialOrd for StatusKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One documented response.
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    pub status: StatusKey,
    pub description: Option<String>,
    /// None for responses without a JSON body.
    pub schema: Option<Schema>,
}

/// One HTTP operation.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub method: HttpMethod,
    /// Path template as written in the document: `/users/{id}`
    pub path: String,
    /// Go identifier derived from operationId or method + path.
    pub handler_name: String,
    pub summary: Option<String>,
    /// Merged path-level and operation-level parameters, in declaration order.
    pub parameters: Vec<ParameterSpec>,
    pub body: Option<BodySpec>,
    /// Sorted ascending by status, `default` last.
    pub responses: Vec<ResponseSpec>,
}

impl RouteSpec {
    /// `METHOD /path` label used in logs and errors.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    pub fn has_location(&self, location: ParamLocation) -> bool {
        self.parameters.iter().any(|p| p.location == location)
    }
}

/// Facts collected while synthesizing that decide which helpers and
/// registrations the file needs.
#[derive(Debug, Clone, Default)]
pub struct FileFeatures {
    /// Some field or parameter is a `time.Time`.
    pub uses_time: bool,
    /// Some field or parameter carries a `regexp=` rule.
    pub uses_regexp: bool,
    /// Names of generated struct declarations.
    pub structs: BTreeSet<String>,
    /// Type names claimed so far, declared or still pending.
    pub type_names: BTreeSet<String>,
}

/// Normalized document.
#[derive(Debug, Clone, Default)]
pub struct ApiModel {
    pub title: Option<String>,
    /// Component schemas followed by hoisted operation-local schemas.
    pub schemas: Vec<NamedSchema>,
    /// Operations in document order.
    pub routes: Vec<RouteSpec>,
}
