//! Naming helpers shared by normalization and the synthesizers.

use super::api::HttpMethod;
use crate::gocode::utils::{camel_case, capitalize_first, is_go_identifier};

/// Handler name for an operation.
///
/// An operationId is split on `_` (and any other non-identifier character)
/// with each segment capitalized: `get_user` → `GetUser`. Without one the
/// name is the method followed by the capitalized literal path segments:
/// `POST /users/{id}/roles` → `POSTUsersRoles`.
pub fn handler_name(method: HttpMethod, path: &str, operation_id: Option<&str>) -> String {
    if let Some(id) = operation_id {
        let name = capitalize_segments(id);
        if !name.is_empty() {
            return if name.starts_with(|c: char| c.is_ascii_digit()) {
                format!("Op{name}")
            } else {
                name
            };
        }
    }

    let segments: String = path
        .split('/')
        .filter(|s| !s.is_empty() && !s.starts_with('{'))
        .map(capitalize_segments)
        .collect();
    format!("{}{segments}", method.as_str())
}

fn capitalize_segments(value: &str) -> String {
    value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(capitalize_first)
        .collect()
}

/// `ServeMux` wildcard name for a path parameter.
///
/// Wildcards must be Go identifiers, so other names are camel-cased.
pub fn path_wildcard(name: &str) -> String {
    if is_go_identifier(name) {
        name.to_string()
    } else {
        camel_case(name)
    }
}

/// Go 1.22 route pattern: `GET /users/{id}`.
///
/// A trailing `/` would match the whole subtree, so it is anchored with
/// `{$}`: `/` → `GET /{$}`.
pub fn route_pattern(method: HttpMethod, path: &str) -> String {
    let mut pattern = String::with_capacity(path.len() + 8);
    pattern.push_str(method.as_str());
    pattern.push(' ');
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        pattern.push_str(&rest[..start]);
        pattern.push('{');
        pattern.push_str(&path_wildcard(&rest[start + 1..start + len]));
        pattern.push('}');
        rest = &rest[start + len + 1..];
    }
    pattern.push_str(rest);
    if pattern.ends_with('/') {
        pattern.push_str("{$}");
    }
    pattern
}
