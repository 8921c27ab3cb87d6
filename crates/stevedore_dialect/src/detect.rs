//! Dialect detection from the shape of a raw tree.

use serde_json::Value;
use stevedore_compose::{FieldError, Scope};
use stevedore_core::literal::scalar_literal;
use stevedore_core::Dialect;

/// Detect the dialect of a raw tree
///
/// An explicit `version` decides by its major number. Without one, a
/// `services` map means V3 and anything else is a flat V1 service map.
///
/// # Errors
///
/// Returns a structural error on the `version` field if it is not a string or
/// number with major version 1, 2 or 3
pub fn detect(raw: &Value) -> Result<Dialect, FieldError> {
    let Some(root) = raw.as_object() else {
        return Ok(Dialect::V1);
    };

    match root.get("version") {
        Some(version) => scalar_literal(version)
            .and_then(|literal| Dialect::from_version(&literal).ok())
            .ok_or_else(|| {
                FieldError::structural(
                    Scope::Document,
                    "",
                    "version",
                    version.clone(),
                    format!("Unknown compose version {}", version),
                )
            }),
        None if root.get("services").is_some_and(Value::is_object) => Ok(Dialect::V3),
        None => Ok(Dialect::V1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_explicit_version() {
        assert_eq!(detect(&json!({"version": "1"})), Ok(Dialect::V1));
        assert_eq!(detect(&json!({"version": "2"})), Ok(Dialect::V2));
        assert_eq!(detect(&json!({"version": "2.4"})), Ok(Dialect::V2));
        assert_eq!(detect(&json!({"version": 2})), Ok(Dialect::V2));
        assert_eq!(detect(&json!({"version": "3.8"})), Ok(Dialect::V3));
        assert_eq!(detect(&json!({"version": 3})), Ok(Dialect::V3));
    }

    #[test]
    fn test_detect_without_version() {
        assert_eq!(detect(&json!({"services": {}})), Ok(Dialect::V3));
        assert_eq!(detect(&json!({"web": {"image": "nginx"}})), Ok(Dialect::V1));
        assert_eq!(detect(&json!({})), Ok(Dialect::V1));
    }

    #[test]
    fn test_detect_unknown_version() {
        let err = detect(&json!({"version": "4"})).unwrap_err();
        assert_eq!(err.field_name, "version");
        assert_eq!(err.field_data, json!("4"));
        assert!(detect(&json!({"version": true})).is_err());
    }
}
