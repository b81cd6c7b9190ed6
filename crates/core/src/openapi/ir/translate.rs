//! Schema -> Go type and validation-rule translation.
//!
//! Pure functions of the schema node, the owning field's required flag and
//! the pointer setting. Inline object schemas found on the way are returned
//! as nested named schemas for the struct synthesizer to emit.

use serde_json::Number;

use super::api::NamedSchema;
use crate::gocode::TypeExpr;
use crate::gocode::utils::pascal_case;
use crate::openapi::spec::{AdditionalProperties, EnumValue, ExclusiveBound, Schema};

/// Prefix of references to component schemas.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Translation options.
#[derive(Debug, Clone, Copy)]
pub struct TypeContext {
    /// Wrap optional non-nil-able types in pointers.
    pub use_pointers: bool,
}

impl Default for TypeContext {
    fn default() -> Self {
        Self { use_pointers: true }
    }
}

/// Result of translating one schema node.
#[derive(Debug, Clone)]
pub struct TypeMapping {
    pub ty: TypeExpr,
    /// Validation rules in emission order.
    pub rules: Vec<String>,
    /// Import paths the type needs.
    pub imports: Vec<&'static str>,
    /// Inline objects that need their own struct declarations.
    pub nested: Vec<NamedSchema>,
}

impl TypeMapping {
    pub fn needs_time(&self) -> bool {
        self.imports.contains(&"time")
    }

    pub fn uses_regexp(&self) -> bool {
        self.rules.iter().any(|r| r.starts_with("regexp="))
    }

    fn add_import(&mut self, path: &'static str) {
        if !self.imports.contains(&path) {
            self.imports.push(path);
        }
    }
}

/// Translate a (possibly absent) schema for a field.
///
/// `nested_name` names the struct generated if the schema is an inline object.
pub fn translate(
    schema: Option<&Schema>,
    required: bool,
    nested_name: &str,
    ctx: TypeContext,
) -> TypeMapping {
    let mut mapping = TypeMapping {
        ty: TypeExpr::ident("string"),
        rules: Vec::new(),
        imports: Vec::new(),
        nested: Vec::new(),
    };
    if let Some(schema) = schema {
        mapping.ty = resolve_type(schema, nested_name, &mut mapping);
    }
    mapping.rules = validation_rules(schema, required);
    if !required && ctx.use_pointers {
        mapping.ty = mapping.ty.optional();
    }
    mapping
}

/// Go type name for a component schema reference.
///
/// Returns None for references outside `#/components/schemas/`.
pub fn ref_name(ref_path: &str) -> Option<String> {
    let raw = ref_path.strip_prefix(SCHEMA_REF_PREFIX)?;
    if raw.is_empty() || raw.contains('/') {
        return None;
    }
    Some(pascal_case(&raw.replace("~1", "/").replace("~0", "~")))
}

/// Strip a nullable `anyOf` / `oneOf` wrapper down to its single member.
pub fn effective_schema(schema: &Schema) -> &Schema {
    match schema.union_members().as_deref() {
        Some([single]) => effective_schema(*single),
        _ => schema,
    }
}

fn resolve_type(schema: &Schema, nested_name: &str, mapping: &mut TypeMapping) -> TypeExpr {
    if let Some(ref_path) = &schema.ref_path {
        // Unresolvable references are rejected during normalization.
        return TypeExpr::ident(ref_name(ref_path).unwrap_or_else(|| pascal_case(ref_path)));
    }

    if let Some(members) = schema.union_members() {
        match members.as_slice() {
            [single] => return resolve_type(single, nested_name, mapping),
            [] => {}
            _ => return raw_message(mapping),
        }
    }

    if let Some(all_of) = &schema.all_of {
        match all_of.as_slice() {
            [single] if schema.properties.is_none() => {
                return resolve_type(single, nested_name, mapping);
            }
            [] => {}
            _ if schema.properties.is_none() => return raw_message(mapping),
            _ => {}
        }
    }

    match schema.primary_type() {
        Some("string") => match schema.format.as_deref() {
            Some("date-time") => {
                mapping.add_import("time");
                TypeExpr::selector("time", "Time")
            }
            _ => TypeExpr::ident("string"),
        },
        Some("integer") => TypeExpr::ident(match schema.format.as_deref() {
            Some("int32") => "int32",
            Some("int64") => "int64",
            _ => "int",
        }),
        Some("number") => TypeExpr::ident(match schema.format.as_deref() {
            Some("float") => "float32",
            _ => "float64",
        }),
        Some("boolean") => TypeExpr::ident("bool"),
        Some("array") => {
            let elem = match &schema.items {
                Some(items) => resolve_type(items, &format!("{nested_name}Item"), mapping),
                None => TypeExpr::ident("string"),
            };
            TypeExpr::slice(elem)
        }
        Some("object") => resolve_object(schema, nested_name, mapping),
        None if schema.is_object() || schema.additional_properties.is_some() => {
            resolve_object(schema, nested_name, mapping)
        }
        _ => TypeExpr::ident("string"),
    }
}

fn resolve_object(schema: &Schema, nested_name: &str, mapping: &mut TypeMapping) -> TypeExpr {
    let has_properties = schema.properties.as_ref().is_some_and(|p| !p.is_empty());
    if has_properties {
        mapping.nested.push(NamedSchema {
            name: nested_name.to_string(),
            schema: Some(schema.clone()),
        });
        return TypeExpr::ident(nested_name);
    }
    let value = match &schema.additional_properties {
        Some(AdditionalProperties::Schema(value)) => {
            resolve_type(value, &format!("{nested_name}Value"), mapping)
        }
        _ => TypeExpr::ident("any"),
    };
    TypeExpr::map(TypeExpr::ident("string"), value)
}

fn raw_message(mapping: &mut TypeMapping) -> TypeExpr {
    mapping.add_import("encoding/json");
    TypeExpr::selector("json", "RawMessage")
}

/// Validation rules for a field, in fixed order:
/// required, bounds, pattern or array constraints, format, enum.
///
/// Optional fields with rules get a leading `omitempty` so absent values
/// are not validated.
pub fn validation_rules(schema: Option<&Schema>, required: bool) -> Vec<String> {
    let mut rules = Vec::new();
    if required {
        rules.push("required".to_string());
    }
    let Some(schema) = schema.map(effective_schema) else {
        return rules;
    };

    let kind = schema.primary_type().or_else(|| {
        schema
            .enum_values
            .as_ref()
            .map(|_| "string")
            .or(schema.pattern.as_ref().map(|_| "string"))
    });

    match kind {
        Some("string") => {
            if let Some(min) = schema.min_length {
                rules.push(format!("min={min}"));
            }
            if let Some(max) = schema.max_length {
                rules.push(format!("max={max}"));
            }
            if let Some(pattern) = &schema.pattern {
                rules.push(format!("regexp={}", escape_rule_param(pattern)));
            }
        }
        Some(numeric @ ("integer" | "number")) => {
            push_bound_rules(schema, numeric == "integer", &mut rules);
        }
        Some("array") => {
            if let Some(min) = schema.min_items {
                rules.push(format!("min={min}"));
            }
            if let Some(max) = schema.max_items {
                rules.push(format!("max={max}"));
            }
            if schema.unique_items == Some(true) {
                rules.push("unique".to_string());
            }
        }
        _ => {}
    }

    if matches!(kind, Some("string") | None)
        && let Some(token) = schema.format.as_deref().and_then(format_token)
    {
        rules.push(token.to_string());
    }

    if let Some(token) = schema.enum_values.as_deref().and_then(oneof_token) {
        rules.push(token);
    }

    if !required && !rules.is_empty() {
        rules.insert(0, "omitempty".to_string());
    }
    rules
}

fn push_bound_rules(schema: &Schema, integral: bool, rules: &mut Vec<String>) {
    match (&schema.minimum, &schema.exclusive_minimum) {
        (Some(min), Some(ExclusiveBound::Flag(true))) => {
            rules.push(format!("gt={}", render_bound(min, integral)));
        }
        (_, Some(ExclusiveBound::Value(min))) => {
            rules.push(format!("gt={}", render_bound(min, integral)));
        }
        (Some(min), _) => rules.push(format!("min={}", render_bound(min, integral))),
        (None, _) => {}
    }
    match (&schema.maximum, &schema.exclusive_maximum) {
        (Some(max), Some(ExclusiveBound::Flag(true))) => {
            rules.push(format!("lt={}", render_bound(max, integral)));
        }
        (_, Some(ExclusiveBound::Value(max))) => {
            rules.push(format!("lt={}", render_bound(max, integral)));
        }
        (Some(max), _) => rules.push(format!("max={}", render_bound(max, integral))),
        (None, _) => {}
    }
}

/// Integer kinds render integral bounds without a decimal point; number
/// kinds keep the bound as written.
#[allow(clippy::cast_possible_truncation)]
fn render_bound(bound: &Number, integral: bool) -> String {
    if integral {
        if let Some(i) = bound.as_i64() {
            return i.to_string();
        }
        if let Some(u) = bound.as_u64() {
            return u.to_string();
        }
        if let Some(f) = bound.as_f64()
            && f.fract() == 0.0
            && f.abs() < 9.0e15
        {
            return (f as i64).to_string();
        }
    }
    bound.to_string()
}

fn format_token(format: &str) -> Option<&'static str> {
    Some(match format {
        "email" => "email",
        "uri" => "uri",
        "url" => "url",
        "uuid" => "uuid",
        "date" => "datetime=2006-01-02",
        "time" => "datetime=15:04:05",
        "ipv4" => "ipv4",
        "ipv6" => "ipv6",
        "hostname" => "hostname",
        _ => return None,
    })
}

fn oneof_token(values: &[EnumValue]) -> Option<String> {
    let words: Vec<String> = values
        .iter()
        .filter_map(|value| match value {
            EnumValue::String(s) if s.is_empty() || s.contains(' ') => Some(format!("'{s}'")),
            EnumValue::String(s) => Some(s.clone()),
            EnumValue::Integer(i) => Some(i.to_string()),
            EnumValue::Float(f) => Some(f.to_string()),
            EnumValue::Bool(b) => Some(b.to_string()),
            EnumValue::Null => None,
        })
        .collect();
    (!words.is_empty()).then(|| format!("oneof={}", escape_rule_param(&words.join(" "))))
}

/// Escape characters the validator treats as rule separators.
pub fn escape_rule_param(param: &str) -> String {
    param.replace(',', "0x2C").replace('|', "0x7C")
}
