//! Helpers shared by the colon-separated literal grammars.

use serde_json::Value;

/// Split a literal on `:` into at most `max` non-empty components.
///
/// Returns `Err` with a human readable reason when the literal has too many
/// components or any component is empty.
pub fn split_components(literal: &str, max: usize) -> Result<Vec<&str>, String> {
    if literal.is_empty() {
        return Err("empty literal".to_string());
    }

    let tokens: Vec<&str> = literal.split(':').collect();
    if tokens.len() > max {
        return Err(format!(
            "expected at most {} ':'-separated components, found {}",
            max,
            tokens.len()
        ));
    }
    if tokens.iter().any(|t| t.is_empty()) {
        return Err("empty component".to_string());
    }

    Ok(tokens)
}

/// Read a scalar raw value as a literal.
///
/// Strings are taken as-is, numbers are rendered in decimal. Anything else is
/// not a literal.
#[must_use]
pub fn scalar_literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Short name of a raw value's type, for messages
#[must_use]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}
