//! Error types for hedge evaluation.
//!
//! Only whole-cycle failures are errors: a malformed request, or a failed
//! read from the ledger or hedge registry before any decision is made.
//! Per-decision write failures are logged and counted, never returned.

use hedgebot_core::CoreError;
use thiserror::Error;

/// Errors that abort an evaluation cycle before any decision is emitted.
#[derive(Debug, Error)]
pub enum HedgeError {
    /// Request failed validation; nothing was computed.
    #[error("invalid request: {field} {reason}")]
    InvalidRequest {
        /// Path of the offending field (e.g. `exposures[2].quantity`).
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A start-of-cycle read from an external collaborator failed.
    #[error("collaborator read failed: {0}")]
    Collaborator(String),
}

impl HedgeError {
    /// Creates an invalid request error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a collaborator failure.
    pub fn collaborator(err: &anyhow::Error) -> Self {
        Self::Collaborator(format!("{err:#}"))
    }

    /// Returns true if the caller sent bad input (as opposed to an upstream failure).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. })
    }
}

impl From<CoreError> for HedgeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidConfig { field, reason } => Self::invalid(format!("config.{field}"), reason),
            CoreError::UnknownVariant { kind, value } => {
                Self::invalid(kind, format!("unknown value {value}"))
            }
        }
    }
}

/// Result type alias for hedge evaluation.
pub type Result<T> = std::result::Result<T, HedgeError>;
