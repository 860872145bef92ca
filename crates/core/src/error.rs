//! Error types shared across the workspace.

use thiserror::Error;

/// Errors raised while parsing domain values or validating configuration.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A stored or supplied string does not name a known variant.
    #[error("unknown {kind}: {value}")]
    UnknownVariant {
        /// Name of the enum being parsed (e.g. "hedge side").
        kind: &'static str,
        /// The offending input.
        value: String,
    },

    /// A hedge configuration value is out of range.
    #[error("invalid hedge config: {field} {reason}")]
    InvalidConfig {
        /// Field that failed validation.
        field: &'static str,
        /// Human readable explanation.
        reason: String,
    },
}

impl CoreError {
    /// Creates an unknown variant error.
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }

    /// Creates an invalid config error.
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variant_display() {
        let err = CoreError::unknown_variant("hedge side", "SIDEWAYS");
        assert_eq!(err.to_string(), "unknown hedge side: SIDEWAYS");
    }

    #[test]
    fn test_invalid_config_display() {
        let err = CoreError::invalid_config("newsLeadMinutes", "must be positive");
        assert!(err.to_string().contains("newsLeadMinutes"));
        assert!(err.to_string().contains("must be positive"));
    }
}
