//! Intermediate representation for OpenAPI to Go code generation.
//!
//! Two layers sit between the document and the Go syntax tree:
//! 1. Schema-domain model: named schemas and normalized routes (OpenAPI-agnostic)
//! 2. Synthesizers: schema-domain model -> `gocode` declarations
//!
//! All OpenAPI corner cases (refs, allOf, inline objects, parameter
//! merging) are resolved in normalization, so the synthesizers only ever
//! see named types and flat parameter lists.
//!
//! ## Module Structure
//!
//! - `api`: schema-domain model (NamedSchema, RouteSpec, ParameterSpec, FileFeatures)
//! - `normalize`: OpenAPI spec -> schema-domain model
//! - `translate`: schema node -> Go type and validation rules
//! - `structs`: named schemas -> struct and defined-type declarations
//! - `params`: per-location parameter structs and parse methods
//! - `handlers`: request/response types, service interface, adapters, routes
//! - `helpers`: runtime helper functions the adapters call
//! - `utils`: handler naming and route patterns

pub mod api;
mod handlers;
mod helpers;
mod normalize;
mod params;
mod structs;
mod translate;
pub mod utils;

pub use handlers::{HandlerOptions, synthesize_handlers};
pub use helpers::synthesize_helpers;
pub use normalize::normalize_spec;
pub use params::{params_struct_name, parse_method_name, synthesize_params};
pub use structs::{build_struct, schema_struct, synthesize_schema, synthesize_structs};
pub use translate::{TypeContext, TypeMapping, effective_schema, ref_name, translate, validation_rules};
