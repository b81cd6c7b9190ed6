//! Struct/field synthesis from named schemas.
//!
//! Object schemas become structs with one field per property, in document
//! order. Arrays and primitives become defined types. Inline objects found
//! in properties are emitted right after their parent.

use std::collections::HashSet;

use tracing::debug;

use super::api::{FileFeatures, NamedSchema, SchemaField, SchemaStruct};
use super::translate::{TypeContext, TypeMapping, effective_schema, translate};
use crate::error::SynthError;
use crate::gocode::utils::pascal_case;
use crate::gocode::{AliasBuilder, Decl, FieldBuilder, FileBuilder, StructBuilder, TypeExpr};
use crate::openapi::spec::Schema;

/// Synthesize every named schema, in order.
pub fn synthesize_structs(
    file: &mut FileBuilder,
    schemas: &[NamedSchema],
    ctx: TypeContext,
    features: &mut FileFeatures,
) -> Result<(), SynthError> {
    // Inline objects must not take a name a later schema declares.
    features
        .type_names
        .extend(schemas.iter().map(|named| named.name.clone()));
    for named in schemas {
        synthesize_schema(file, named, ctx, features)?;
    }
    Ok(())
}

/// Synthesize one named schema plus any inline objects it contains.
pub fn synthesize_schema(
    file: &mut FileBuilder,
    named: &NamedSchema,
    ctx: TypeContext,
    features: &mut FileFeatures,
) -> Result<(), SynthError> {
    if named.name.trim().is_empty() {
        return Err(SynthError::EmptyName { what: "struct" });
    }
    let Some(schema) = &named.schema else {
        return Err(SynthError::MissingSchema {
            name: named.name.clone(),
        });
    };
    if file.has_decl(&named.name) {
        return Err(SynthError::DuplicateSchema {
            name: named.name.clone(),
        });
    }

    let schema = effective_schema(schema);
    let nested = if is_struct_schema(schema) {
        let (decl, nested) = struct_decl(file, &named.name, schema, ctx, features);
        features.structs.insert(named.name.clone());
        file.add_decl(decl);
        nested
    } else {
        let mut mapping = translate(Some(schema), true, &named.name, ctx);
        claim_nested(file, &mut mapping, features);
        register(file, &mapping, features);
        debug!(name = %named.name, "defined type");
        file.add_decl(defined_type(&named.name, schema.description.as_deref(), mapping.ty));
        mapping.nested
    };

    for child in &nested {
        synthesize_schema(file, child, ctx, features)?;
    }
    Ok(())
}

fn is_struct_schema(schema: &Schema) -> bool {
    schema.ref_path.is_none() && schema.properties.as_ref().is_some_and(|p| !p.is_empty())
}

/// Resolve an object schema into its Go fields.
///
/// Returns the struct model and the inline objects discovered in its
/// properties, in property order.
pub fn schema_struct(
    name: &str,
    schema: &Schema,
    ctx: TypeContext,
) -> (SchemaStruct, Vec<TypeMapping>) {
    let mut fields = Vec::new();
    let mut mappings = Vec::new();
    let mut used = HashSet::new();

    for (prop, prop_schema) in schema.properties.iter().flatten() {
        let required = schema.is_required(prop);
        let go_name = unique_name(pascal_case(prop), &mut used);
        let mapping = translate(Some(prop_schema), required, &format!("{name}{go_name}"), ctx);
        fields.push(SchemaField {
            name: prop.clone(),
            go_name,
            ty: mapping.ty.clone(),
            required,
            doc: prop_schema.description.clone(),
            rules: mapping.rules.clone(),
        });
        mappings.push(mapping);
    }

    (
        SchemaStruct {
            name: name.to_string(),
            doc: schema.description.clone(),
            fields,
        },
        mappings,
    )
}

/// Disambiguate properties that collapse to the same Go name.
fn unique_name(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn struct_decl(
    file: &mut FileBuilder,
    name: &str,
    schema: &Schema,
    ctx: TypeContext,
    features: &mut FileFeatures,
) -> (Decl, Vec<NamedSchema>) {
    let (mut model, mappings) = schema_struct(name, schema, ctx);
    let mut nested = Vec::new();
    for (field, mut mapping) in model.fields.iter_mut().zip(mappings) {
        if claim_nested(file, &mut mapping, features) {
            field.ty = mapping.ty.clone();
        }
        register(file, &mapping, features);
        nested.extend(mapping.nested);
    }
    debug!(name, fields = model.fields.len(), "struct");
    (build_struct(&model), nested)
}

/// Turn a struct model into a declaration with `json` and `validate` tags.
pub fn build_struct(model: &SchemaStruct) -> Decl {
    let mut builder = StructBuilder::new(&model.name);
    if let Some(doc) = &model.doc {
        builder = builder.doc(doc);
    }
    for field in &model.fields {
        let mut fb = FieldBuilder::named(&field.go_name)
            .ty(field.ty.clone())
            .tag("json", field.json_tag());
        if !field.rules.is_empty() {
            fb = fb.tag("validate", field.rules.join(","));
        }
        if let Some(doc) = &field.doc {
            fb = fb.doc(doc);
        }
        builder = builder.field(fb.build());
    }
    builder.build()
}

/// `type Name T`, or `type Name = T` for types from other packages so
/// their methods (JSON marshalling) carry over.
fn defined_type(name: &str, doc: Option<&str>, ty: TypeExpr) -> Decl {
    let assign = matches!(ty, TypeExpr::Selector { .. });
    let mut builder = AliasBuilder::new(name).ty(ty).assign(assign);
    if let Some(doc) = doc {
        builder = builder.doc(doc);
    }
    builder.build()
}

/// Give every inline object of `mapping` a type name nothing else uses,
/// suffixing `2`, `3`, ... on collision and rewriting `mapping.ty` to match.
///
/// Returns whether anything was renamed.
pub(super) fn claim_nested(
    file: &FileBuilder,
    mapping: &mut TypeMapping,
    features: &mut FileFeatures,
) -> bool {
    let mut renamed = false;
    for nested in &mut mapping.nested {
        let taken = |name: &str| features.type_names.contains(name) || file.has_decl(name);
        let mut candidate = nested.name.clone();
        let mut n = 2;
        while taken(&candidate) {
            candidate = format!("{}{n}", nested.name);
            n += 1;
        }
        if candidate != nested.name {
            debug!(from = %nested.name, to = %candidate, "renamed inline object");
            rename_ident(&mut mapping.ty, &nested.name, &candidate);
            nested.name.clone_from(&candidate);
            renamed = true;
        }
        features.type_names.insert(candidate);
    }
    renamed
}

fn rename_ident(ty: &mut TypeExpr, from: &str, to: &str) {
    match ty {
        TypeExpr::Ident(name) if *name == from => *name = to.to_string(),
        TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) => rename_ident(inner, from, to),
        TypeExpr::Map { value, .. } => rename_ident(value, from, to),
        _ => {}
    }
}

fn register(file: &mut FileBuilder, mapping: &TypeMapping, features: &mut FileFeatures) {
    for path in &mapping.imports {
        file.add_import(*path);
    }
    features.uses_time |= mapping.needs_time();
    features.uses_regexp |= mapping.uses_regexp();
}
