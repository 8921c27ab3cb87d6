//! Core error types for STEVEDORE.

use thiserror::Error;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Image reference does not follow `[owner/]repository[:tag]`
    #[error("Invalid image reference '{input}': {reason}")]
    InvalidImage {
        /// Literal as written
        input: String,
        /// What is wrong with it
        reason: String,
    },

    /// Port literal does not follow `[source:]target[/protocol]`
    #[error("Invalid port '{input}': {reason}")]
    InvalidPort {
        /// Literal as written
        input: String,
        /// What is wrong with it
        reason: String,
    },

    /// Volume literal does not follow `[source:]target[:mode]`
    #[error("Invalid volume '{input}': {reason}")]
    InvalidVolume {
        /// Literal as written
        input: String,
        /// What is wrong with it
        reason: String,
    },

    /// Unknown dialect name or version literal
    #[error("Invalid dialect: {input}")]
    InvalidDialect {
        /// Name or version as written
        input: String,
    },

    /// Unknown capability name
    #[error("Invalid capability: {name}")]
    InvalidCapability {
        /// Name as written
        name: String,
    },
}

impl CoreError {
    /// The literal that failed to parse
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::InvalidImage { input, .. }
            | Self::InvalidPort { input, .. }
            | Self::InvalidVolume { input, .. }
            | Self::InvalidDialect { input } => input,
            Self::InvalidCapability { name } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidPort {
            input: "a:b:c:d".to_string(),
            reason: "too many components".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid port 'a:b:c:d': too many components"
        );
    }

    #[test]
    fn test_error_input() {
        let err = CoreError::InvalidDialect {
            input: "9".to_string(),
        };
        assert_eq!(err.input(), "9");

        let err = CoreError::InvalidCapability {
            name: "root".to_string(),
        };
        assert_eq!(err.input(), "root");
    }

    #[test]
    fn test_error_equality() {
        let a = CoreError::InvalidDialect { input: "x".into() };
        let b = CoreError::InvalidDialect { input: "x".into() };
        assert_eq!(a, b);
        assert_ne!(a, CoreError::InvalidDialect { input: "y".into() });
    }
}
