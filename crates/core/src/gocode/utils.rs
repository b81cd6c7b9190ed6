//! Common utilities for Go code generation.
//!
//! Identifier casing, keyword escaping and string quoting shared by the
//! emitter and the synthesizers.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Go keywords that cannot be used as identifiers.
pub static GO_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "chan",
        "const",
        "continue",
        "default",
        "defer",
        "else",
        "fallthrough",
        "for",
        "func",
        "go",
        "goto",
        "if",
        "import",
        "interface",
        "map",
        "package",
        "range",
        "return",
        "select",
        "struct",
        "switch",
        "type",
        "var",
    ]
    .into_iter()
    .collect()
});

/// Words rendered fully upper-case in exported identifiers (Go lint convention).
const INITIALISMS: &[&str] = &["ID", "URL", "API", "HTTP", "UUID"];

/// Quote a string as a Go interpreted string literal.
pub fn quote_go_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Split a name into words on non-alphanumeric characters and
/// lower-to-upper case transitions.
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn pascal_word(word: &str) -> String {
    let upper = word.to_ascii_uppercase();
    if INITIALISMS.contains(&upper.as_str()) {
        upper
    } else {
        capitalize_first(word)
    }
}

/// Convert a name to an exported Go identifier.
///
/// `user_id` → `UserID`, `created-at` → `CreatedAt`, `2fa` → `N2fa`.
pub fn pascal_case(name: &str) -> String {
    let result: String = split_words(name).iter().map(|w| pascal_word(w)).collect();
    if result.is_empty() {
        return "X".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("N{result}");
    }
    result
}

/// Convert a name to an unexported Go identifier.
///
/// `X-Request-ID` → `xRequestID`, `id` → `id`, `type` → `type_`.
pub fn camel_case(name: &str) -> String {
    let words = split_words(name);
    let Some((first, rest)) = words.split_first() else {
        return "x".to_string();
    };
    let mut result = first.to_ascii_lowercase();
    for word in rest {
        result.push_str(&pascal_word(word));
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result = format!("n{result}");
    }
    escape_keyword(result)
}

/// Append `_` to identifiers that collide with a Go keyword.
pub fn escape_keyword(ident: String) -> String {
    if GO_KEYWORDS.contains(ident.as_str()) {
        format!("{ident}_")
    } else {
        ident
    }
}

/// Check that a name is usable as a Go identifier as-is.
pub fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !GO_KEYWORDS.contains(name)
}
