//! `{{name}}` placeholder substitution
//!
//! Unknown names are not an error: the placeholder is left exactly as written
//! so the caller can see what did not resolve.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value as JsonValue;

use crate::variables::VariableStore;

// Non-greedy so `{{a}}{{b}}` is two placeholders, whitespace inside the braces is trimmed
static TEMPLATE_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(.*?)\s*\}\}").expect("template pattern is valid")
});

/// Replace every `{{name}}` in `text` with its value from `variables`.
pub fn resolve(text: &str, variables: &VariableStore) -> String {
    resolve_cow(text, variables).into_owned()
}

fn resolve_cow<'t>(text: &'t str, variables: &VariableStore) -> Cow<'t, str> {
    if text.is_empty() || !text.contains("{{") {
        return Cow::Borrowed(text);
    }

    TEMPLATE_VAR_RE.replace_all(text, |caps: &Captures<'_>| {
        let name = caps.get(1).map_or("", |m| m.as_str());
        match variables.get(name) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// String form of a header value before substitution.
///
/// Header values come from a JSON column, so numbers and booleans are
/// possible; those use their JSON text.
pub fn header_value_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Coerce a header value to text and resolve placeholders in it.
pub fn resolve_header_value(value: &JsonValue, variables: &VariableStore) -> String {
    resolve(&header_value_text(value), variables)
}
