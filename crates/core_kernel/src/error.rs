//! Workflow error taxonomy shared by the lifecycle engines
//!
//! Every failed command yields exactly one `WorkflowError`. Its `Display`
//! output is the human-readable message shown to the caller and always names
//! the offending entity.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::ports::PortError;

/// Machine-readable classification of a workflow failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidState,
    RatingUnavailable,
    PricingRequired,
    Transport,
}

impl ErrorKind {
    /// Returns the wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::RatingUnavailable => "rating_unavailable",
            ErrorKind::PricingRequired => "pricing_required",
            ErrorKind::Transport => "transport",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the quote and claim lifecycle engines
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Bad input shape or bounds; never retried
    #[error("{entity}: {message}")]
    Validation { entity: String, message: String },

    /// Unknown identifier
    #[error("{entity} not found")]
    NotFound { entity: String },

    /// Operation not legal in the entity's current lifecycle state
    #[error("{entity} is {state}: cannot {operation}")]
    InvalidState {
        entity: String,
        state: String,
        operation: String,
    },

    /// The backend refused a write because the entity changed underneath it
    #[error("{entity}: cannot {operation}, backend reported a conflict ({detail})")]
    Conflict {
        entity: String,
        operation: String,
        detail: String,
    },

    /// The rating collaborator could not produce a premium
    #[error("{entity}: rating unavailable ({detail})")]
    RatingUnavailable { entity: String, detail: String },

    /// A premium was still missing when confirmation required one
    #[error("{entity}: premium not available, cannot confirm")]
    PricingRequired { entity: String },

    /// Network or backend failure
    #[error("{entity}: backend request failed: {source}")]
    Transport {
        entity: String,
        #[source]
        source: PortError,
    },
}

impl WorkflowError {
    pub fn validation(entity: impl fmt::Display, message: impl Into<String>) -> Self {
        WorkflowError::Validation {
            entity: entity.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl fmt::Display) -> Self {
        WorkflowError::NotFound {
            entity: entity.to_string(),
        }
    }

    pub fn invalid_state(
        entity: impl fmt::Display,
        state: impl fmt::Display,
        operation: impl Into<String>,
    ) -> Self {
        WorkflowError::InvalidState {
            entity: entity.to_string(),
            state: state.to_string(),
            operation: operation.into(),
        }
    }

    pub fn conflict(
        entity: impl fmt::Display,
        operation: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        WorkflowError::Conflict {
            entity: entity.to_string(),
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    pub fn rating_unavailable(entity: impl fmt::Display, detail: impl Into<String>) -> Self {
        WorkflowError::RatingUnavailable {
            entity: entity.to_string(),
            detail: detail.into(),
        }
    }

    pub fn pricing_required(entity: impl fmt::Display) -> Self {
        WorkflowError::PricingRequired {
            entity: entity.to_string(),
        }
    }

    pub fn transport(entity: impl fmt::Display, source: PortError) -> Self {
        WorkflowError::Transport {
            entity: entity.to_string(),
            source,
        }
    }

    /// Translates an adapter failure for the given entity
    ///
    /// `Conflict` means the backend rejected a write because the entity moved
    /// on concurrently. It is classified as an invalid state but the message
    /// carries the backend's detail, since the actual state is unknown here.
    pub fn from_port(entity: impl fmt::Display, operation: &str, error: PortError) -> Self {
        match error {
            PortError::NotFound { .. } => Self::not_found(entity),
            PortError::Validation { message, field } => {
                let message = match field {
                    Some(field) => format!("{field}: {message}"),
                    None => message,
                };
                Self::validation(entity, message)
            }
            PortError::Conflict { message } => Self::conflict(entity, operation, message),
            other => Self::transport(entity, other),
        }
    }

    /// Returns the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Validation { .. } => ErrorKind::Validation,
            WorkflowError::NotFound { .. } => ErrorKind::NotFound,
            WorkflowError::InvalidState { .. } | WorkflowError::Conflict { .. } => {
                ErrorKind::InvalidState
            }
            WorkflowError::RatingUnavailable { .. } => ErrorKind::RatingUnavailable,
            WorkflowError::PricingRequired { .. } => ErrorKind::PricingRequired,
            WorkflowError::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Returns the entity the error refers to
    pub fn entity(&self) -> &str {
        match self {
            WorkflowError::Validation { entity, .. }
            | WorkflowError::NotFound { entity }
            | WorkflowError::InvalidState { entity, .. }
            | WorkflowError::Conflict { entity, .. }
            | WorkflowError::RatingUnavailable { entity, .. }
            | WorkflowError::PricingRequired { entity }
            | WorkflowError::Transport { entity, .. } => entity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_message_names_state() {
        let err = WorkflowError::invalid_state("QTE-1", "CONFIRMED", "update");
        assert_eq!(err.to_string(), "QTE-1 is CONFIRMED: cannot update");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_port_validation_keeps_field() {
        let err = WorkflowError::from_port(
            "QTE-2",
            "update",
            PortError::validation_field("must be positive", "termMonths"),
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("termMonths: must be positive"));
    }

    #[test]
    fn test_port_conflict_is_invalid_state() {
        let err = WorkflowError::from_port("CLM-9", "close", PortError::conflict("stale version"));
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(err.entity(), "CLM-9");
        assert_eq!(
            err.to_string(),
            "CLM-9: cannot close, backend reported a conflict (stale version)"
        );
    }

    #[test]
    fn test_port_timeout_is_transport_with_detail() {
        let err = WorkflowError::from_port(
            "QTE-3",
            "price",
            PortError::Timeout { operation: "POST /quotes/3/price".into(), duration_ms: 30000 },
        );
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("30000ms"));
    }
}
