//! User-facing notices
//!
//! A notice is the one-line outcome message a command produces, with the same
//! severities the front end displays.

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Confirmation,
    Info,
    Warning,
    Error,
}

/// A single outcome message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Notice {
    pub fn new(severity: Severity, detail: impl Into<String>) -> Self {
        let summary = match severity {
            Severity::Confirmation => "CONFIRMATION",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        Self {
            severity,
            summary: summary.to_string(),
            detail: detail.into(),
        }
    }

    pub fn confirmation(detail: impl Into<String>) -> Self {
        Self::new(Severity::Confirmation, detail)
    }

    pub fn info(detail: impl Into<String>) -> Self {
        Self::new(Severity::Info, detail)
    }

    /// Builds the error notice for a failed operation
    ///
    /// `action` is the verb phrase of the command, e.g. "confirm quote".
    pub fn failure(action: &str, error: &WorkflowError) -> Self {
        Self::new(Severity::Error, format!("Failed to {action}: {error}"))
    }
}
