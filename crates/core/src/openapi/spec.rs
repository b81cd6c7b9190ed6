//! OpenAPI specification structs for serde deserialization.
//!
//! This module defines the subset of OpenAPI 3.0/3.1 the generator reads.
//! Maps are `IndexMap` so paths, properties and responses keep document order.

#![allow(dead_code)]

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Number;

/// Root OpenAPI specification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: Option<String>,
    pub info: Option<Info>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    pub components: Option<Components>,
}

/// Document metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

/// Components section containing reusable schemas and parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    pub schemas: Option<IndexMap<String, Schema>>,
    pub parameters: Option<IndexMap<String, Parameter>>,
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    pub summary: Option<String>,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations.
    pub parameters: Option<Vec<ParameterOrRef>>,
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Option<Vec<ParameterOrRef>>,
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
}

/// Inline parameter or a `$ref` into `#/components/parameters`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Item(Parameter),
}

/// A parameter (query, header, path, or cookie).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<Schema>,
}

/// A request body definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub content: Option<IndexMap<String, MediaType>>,
}

/// A response definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    pub description: Option<String>,
    pub content: Option<IndexMap<String, MediaType>>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The type of the schema (string, number, integer, boolean, object, array).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    pub description: Option<String>,

    /// Properties for object types, in document order.
    pub properties: Option<IndexMap<String, Schema>>,

    /// Required property names for object types.
    pub required: Option<Vec<String>>,

    /// Item schema for array types.
    pub items: Option<Box<Schema>>,

    /// Enum values (can be strings, integers, floats, booleans, or null).
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<Schema>>,

    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<Schema>>,

    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<Schema>>,

    /// Additional properties for object types (map types).
    pub additional_properties: Option<AdditionalProperties>,

    /// Format hint (e.g., date-time, uuid, email).
    pub format: Option<String>,

    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead).
    pub nullable: Option<bool>,

    // --- Validation keywords ---
    /// Regex pattern for string validation.
    pub pattern: Option<String>,

    /// Bounds keep the number as written so integral bounds stay integral.
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,

    /// Boolean in OpenAPI 3.0, a bound of its own in 3.1.
    pub exclusive_minimum: Option<ExclusiveBound>,
    pub exclusive_maximum: Option<ExclusiveBound>,

    pub multiple_of: Option<Number>,

    pub min_length: Option<u64>,
    pub max_length: Option<u64>,

    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: Option<bool>,
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// `exclusiveMinimum` / `exclusiveMaximum` across OpenAPI versions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    /// 3.0: modifies `minimum` / `maximum`.
    Flag(bool),
    /// 3.1: the bound itself.
    Value(Number),
}

impl Schema {
    /// Primary non-null type name.
    pub fn primary_type(&self) -> Option<&str> {
        match self.schema_type.as_ref()? {
            SchemaType::Single(t) => Some(t.as_str()),
            SchemaType::Multiple(types) => types.iter().map(String::as_str).find(|t| *t != "null"),
        }
    }

    /// `{"type": "null"}`
    pub fn is_null(&self) -> bool {
        matches!(&self.schema_type, Some(SchemaType::Single(t)) if t == "null")
    }

    /// Non-null members of `oneOf` / `anyOf`, when the schema is a composition.
    pub fn union_members(&self) -> Option<Vec<&Schema>> {
        let members = self.one_of.as_ref().or(self.any_of.as_ref())?;
        Some(members.iter().filter(|s| !s.is_null()).collect())
    }

    /// Whether this schema declares an inline object.
    pub fn is_object(&self) -> bool {
        self.primary_type() == Some("object") || self.properties.is_some()
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|r| r.iter().any(|name| name == property))
    }
}
