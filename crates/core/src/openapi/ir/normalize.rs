//! Normalization from OpenAPI spec to the schema-domain model.
//!
//! This module handles all the OpenAPI-specific logic:
//! - Component schema naming and `allOf` flattening
//! - Parameter `$ref` resolution, merging and deduplication
//! - Hoisting inline request/response objects into named schemas
//! - Handler name derivation and collision checks
//! - Reference validation

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::SynthError;
use crate::gocode::utils::pascal_case;
use crate::openapi::spec::{
    AdditionalProperties, MediaType, OpenApiSpec, Operation, Parameter, ParameterOrRef, PathItem,
    Schema, SchemaType,
};

use super::api::{
    ApiModel, BodySpec, HttpMethod, NamedSchema, ParamLocation, ParameterSpec, ResponseSpec,
    RouteSpec, StatusKey,
};
use super::translate::{SCHEMA_REF_PREFIX, ref_name};
use super::utils::handler_name;

const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

/// Depth limit for `allOf` flattening through references.
const MAX_FLATTEN_DEPTH: usize = 32;

type ComponentSchemas = IndexMap<String, Schema>;

/// Normalize an OpenAPI spec into the schema-domain model.
pub fn normalize_spec(spec: Option<&OpenApiSpec>) -> Result<ApiModel, SynthError> {
    let spec = spec.ok_or(SynthError::MissingDocument)?;
    let component_schemas = spec.components.as_ref().and_then(|c| c.schemas.as_ref());
    let component_params = spec.components.as_ref().and_then(|c| c.parameters.as_ref());

    let mut schemas = Vec::new();
    let mut schema_names = HashSet::new();
    if let Some(components) = component_schemas {
        for (name, schema) in components {
            let go_name = pascal_case(name);
            if !schema_names.insert(go_name.clone()) {
                return Err(SynthError::DuplicateSchema { name: go_name });
            }
            schemas.push(NamedSchema {
                name: go_name,
                schema: Some(flatten_all_of(schema, component_schemas, 0)),
            });
        }
    }

    let mut routes = Vec::new();
    let mut hoisted = Vec::new();
    let mut handler_owners: HashMap<String, String> = HashMap::new();

    for (path, item) in &spec.paths {
        for method in HttpMethod::ALL {
            let Some(op) = operation_for(item, method) else {
                continue;
            };
            let ctx = OperationContext {
                path,
                method,
                item,
                component_schemas,
                component_params,
            };
            let route = normalize_operation(&ctx, op, &mut hoisted)?;

            if let Some(first) = handler_owners.get(&route.handler_name) {
                return Err(SynthError::DuplicateHandler {
                    name: route.handler_name.clone(),
                    first: first.clone(),
                    second: route.label(),
                });
            }
            handler_owners.insert(route.handler_name.clone(), route.label());
            debug!(route = %route.label(), handler = %route.handler_name, "normalized operation");
            routes.push(route);
        }
    }

    for named in hoisted {
        if !schema_names.insert(named.name.clone()) {
            return Err(SynthError::DuplicateSchema { name: named.name });
        }
        schemas.push(named);
    }

    for named in &schemas {
        if let Some(schema) = &named.schema {
            check_refs(schema, &schema_names)?;
        }
    }
    for route in &routes {
        for param in &route.parameters {
            if let Some(schema) = &param.schema {
                check_refs(schema, &schema_names)?;
            }
        }
        if let Some(body) = &route.body {
            check_refs(&body.schema, &schema_names)?;
        }
        for response in &route.responses {
            if let Some(schema) = &response.schema {
                check_refs(schema, &schema_names)?;
            }
        }
    }

    Ok(ApiModel {
        title: spec.info.as_ref().and_then(|i| i.title.clone()),
        schemas,
        routes,
    })
}

fn operation_for(item: &PathItem, method: HttpMethod) -> Option<&Operation> {
    match method {
        HttpMethod::Get => item.get.as_ref(),
        HttpMethod::Put => item.put.as_ref(),
        HttpMethod::Post => item.post.as_ref(),
        HttpMethod::Delete => item.delete.as_ref(),
        HttpMethod::Options => item.options.as_ref(),
        HttpMethod::Head => item.head.as_ref(),
        HttpMethod::Patch => item.patch.as_ref(),
        HttpMethod::Trace => item.trace.as_ref(),
    }
}

/// Everything an operation needs from its surroundings.
struct OperationContext<'a> {
    path: &'a str,
    method: HttpMethod,
    item: &'a PathItem,
    component_schemas: Option<&'a ComponentSchemas>,
    component_params: Option<&'a IndexMap<String, Parameter>>,
}

impl OperationContext<'_> {
    fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Normalize an operation
fn normalize_operation(
    ctx: &OperationContext<'_>,
    op: &Operation,
    hoisted: &mut Vec<NamedSchema>,
) -> Result<RouteSpec, SynthError> {
    let name = handler_name(ctx.method, ctx.path, op.operation_id.as_deref());
    let parameters = normalize_params(ctx, op)?;
    let body = normalize_body(ctx, op, &name, hoisted);
    let responses = normalize_responses(ctx, op, &name, hoisted);

    Ok(RouteSpec {
        method: ctx.method,
        path: ctx.path.to_string(),
        handler_name: name,
        summary: op
            .summary
            .clone()
            .or_else(|| op.description.clone())
            .or_else(|| ctx.item.summary.clone()),
        parameters,
        body,
        responses,
    })
}

/// Merge path-level and operation-level parameters.
///
/// An operation-level parameter replaces a path-level one with the same
/// name and location.
fn normalize_params(
    ctx: &OperationContext<'_>,
    op: &Operation,
) -> Result<Vec<ParameterSpec>, SynthError> {
    let mut params: Vec<ParameterSpec> = Vec::new();

    for level in [ctx.item.parameters.as_deref(), op.parameters.as_deref()] {
        let Some(level) = level else {
            continue;
        };
        let mut seen = HashSet::new();
        for entry in level {
            let param = resolve_parameter(entry, ctx.component_params)?;
            let spec = normalize_param(param, ctx.component_schemas)?;
            if !seen.insert((spec.name.clone(), spec.location)) {
                return Err(SynthError::DuplicateParameter {
                    name: spec.name,
                    location: spec.location.as_str().to_string(),
                    operation: ctx.label(),
                });
            }
            params.retain(|p| !(p.name == spec.name && p.location == spec.location));
            params.push(spec);
        }
    }

    Ok(params)
}

fn resolve_parameter<'a>(
    entry: &'a ParameterOrRef,
    components: Option<&'a IndexMap<String, Parameter>>,
) -> Result<&'a Parameter, SynthError> {
    match entry {
        ParameterOrRef::Item(param) => Ok(param),
        ParameterOrRef::Ref { ref_path } => ref_path
            .strip_prefix(PARAMETER_REF_PREFIX)
            .and_then(|name| components?.get(name))
            .ok_or_else(|| SynthError::UnresolvedRef {
                reference: ref_path.clone(),
            }),
    }
}

/// Normalize a single parameter
fn normalize_param(
    p: &Parameter,
    components: Option<&ComponentSchemas>,
) -> Result<ParameterSpec, SynthError> {
    let location = ParamLocation::parse(&p.location).ok_or_else(|| {
        SynthError::UnsupportedLocation {
            name: p.name.clone(),
            location: p.location.clone(),
        }
    })?;

    let schema = p
        .schema
        .as_ref()
        .map(|s| flatten_all_of(s, components, 0));
    let resolved = schema
        .as_ref()
        .and_then(|s| s.ref_path.as_deref())
        .and_then(|r| lookup_schema(r, components))
        .map(|s| flatten_all_of(s, components, 0));

    Ok(ParameterSpec {
        name: p.name.clone(),
        location,
        // Path parameters are always required.
        required: p.required || location == ParamLocation::Path,
        description: p.description.clone(),
        schema,
        resolved,
    })
}

fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or(media_type).trim();
    essence == "application/json" || essence.ends_with("+json")
}

fn json_schema(content: Option<&IndexMap<String, MediaType>>) -> Option<&Schema> {
    content?
        .iter()
        .find(|(media_type, _)| is_json_media_type(media_type))
        .and_then(|(_, media)| media.schema.as_ref())
}

/// Normalize request body. Only JSON bodies are decoded.
fn normalize_body(
    ctx: &OperationContext<'_>,
    op: &Operation,
    handler: &str,
    hoisted: &mut Vec<NamedSchema>,
) -> Option<BodySpec> {
    let body = op.request_body.as_ref()?;
    let Some(schema) = json_schema(body.content.as_ref()) else {
        warn!(route = %ctx.label(), "request body has no JSON schema, skipping");
        return None;
    };
    let name = pascal_case(&format!("{handler}RequestBody"));
    Some(BodySpec {
        required: body.required,
        schema: hoist_inline(schema, &name, ctx.component_schemas, hoisted),
    })
}

/// Normalize responses, sorted ascending with `default` last.
fn normalize_responses(
    ctx: &OperationContext<'_>,
    op: &Operation,
    handler: &str,
    hoisted: &mut Vec<NamedSchema>,
) -> Vec<ResponseSpec> {
    let mut responses = Vec::new();
    for (key, response) in &op.responses {
        let Some(status) = StatusKey::parse(key) else {
            warn!(route = %ctx.label(), status = %key, "unsupported response key, skipping");
            continue;
        };
        let name = pascal_case(&format!("{handler}{}Body", status.type_suffix()));
        let schema = json_schema(response.content.as_ref())
            .map(|s| hoist_inline(s, &name, ctx.component_schemas, hoisted));
        responses.push(ResponseSpec {
            status,
            description: response.description.clone(),
            schema,
        });
    }
    responses.sort_by_key(|r| r.status);
    responses
}

/// Move inline objects (directly or as array items) into named schemas and
/// reference them instead.
fn hoist_inline(
    schema: &Schema,
    name: &str,
    components: Option<&ComponentSchemas>,
    hoisted: &mut Vec<NamedSchema>,
) -> Schema {
    let mut schema = flatten_all_of(schema, components, 0);
    let has_properties = schema.properties.as_ref().is_some_and(|p| !p.is_empty());
    if schema.ref_path.is_none() && has_properties {
        hoisted.push(NamedSchema {
            name: name.to_string(),
            schema: Some(schema),
        });
        return schema_ref(name);
    }
    if let Some(items) = schema.items.take() {
        schema.items = Some(Box::new(hoist_inline(
            &items,
            &format!("{name}Item"),
            components,
            hoisted,
        )));
    }
    schema
}

fn schema_ref(name: &str) -> Schema {
    Schema {
        ref_path: Some(format!("{SCHEMA_REF_PREFIX}{name}")),
        ..Schema::default()
    }
}

fn lookup_schema<'a>(ref_path: &str, components: Option<&'a ComponentSchemas>) -> Option<&'a Schema> {
    let name = ref_path.strip_prefix(SCHEMA_REF_PREFIX)?;
    components?.get(name)
}

/// Merge `allOf` members into one object schema, recursively.
///
/// A lone `allOf` member without sibling properties is left for the
/// translator, which treats it as the member itself.
fn flatten_all_of(schema: &Schema, components: Option<&ComponentSchemas>, depth: usize) -> Schema {
    let mut out = schema.clone();
    if depth > MAX_FLATTEN_DEPTH {
        return out;
    }

    if let Some(all_of) = &schema.all_of
        && (all_of.len() > 1 || schema.properties.is_some())
    {
        let mut properties = schema.properties.clone().unwrap_or_default();
        let mut required = schema.required.clone().unwrap_or_default();
        for member in all_of {
            let member = member
                .ref_path
                .as_deref()
                .and_then(|r| lookup_schema(r, components))
                .unwrap_or(member);
            let member = flatten_all_of(member, components, depth + 1);
            for (key, value) in member.properties.unwrap_or_default() {
                properties.entry(key).or_insert(value);
            }
            for name in member.required.unwrap_or_default() {
                if !required.contains(&name) {
                    required.push(name);
                }
            }
        }
        out.all_of = None;
        out.properties = Some(properties);
        out.required = (!required.is_empty()).then_some(required);
        if out.schema_type.is_none() {
            out.schema_type = Some(SchemaType::Single("object".to_string()));
        }
    }

    if let Some(properties) = &mut out.properties {
        for value in properties.values_mut() {
            *value = flatten_all_of(value, components, depth + 1);
        }
    }
    if let Some(items) = &mut out.items {
        **items = flatten_all_of(items, components, depth + 1);
    }
    if let Some(AdditionalProperties::Schema(value)) = &mut out.additional_properties {
        **value = flatten_all_of(value, components, depth + 1);
    }
    out
}

/// Every `$ref` must name a known schema.
fn check_refs(schema: &Schema, known: &HashSet<String>) -> Result<(), SynthError> {
    if let Some(ref_path) = &schema.ref_path {
        match ref_name(ref_path) {
            Some(name) if known.contains(&name) => {}
            _ => {
                return Err(SynthError::UnresolvedRef {
                    reference: ref_path.clone(),
                });
            }
        }
    }

    let children = schema
        .properties
        .iter()
        .flat_map(|p| p.values())
        .chain(schema.items.as_deref())
        .chain(match &schema.additional_properties {
            Some(AdditionalProperties::Schema(value)) => Some(&**value),
            _ => None,
        })
        .chain(schema.any_of.iter().flatten())
        .chain(schema.one_of.iter().flatten())
        .chain(schema.all_of.iter().flatten());

    for child in children {
        check_refs(child, known)?;
    }
    Ok(())
}
