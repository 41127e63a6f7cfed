//! Claim assessment

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Assessment decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentDecision {
    Approved,
    Rejected,
}

impl fmt::Display for AssessmentDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssessmentDecision::Approved => "APPROVED",
            AssessmentDecision::Rejected => "REJECTED",
        })
    }
}

/// The decision an assessor records on an Open claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub decision: AssessmentDecision,
    /// Required for approvals, must be omitted for rejections
    pub approved_amount: Option<Decimal>,
    pub reason: String,
}

impl Assessment {
    pub fn new(
        decision: AssessmentDecision,
        approved_amount: Option<Decimal>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            decision,
            approved_amount,
            reason: reason.into(),
        }
    }

    pub fn approve(amount: Decimal, reason: impl Into<String>) -> Self {
        Self::new(AssessmentDecision::Approved, Some(amount), reason)
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self::new(AssessmentDecision::Rejected, None, reason)
    }

    /// Checks that the amount agrees with the decision
    pub fn validate(&self) -> Result<(), String> {
        match (self.decision, self.approved_amount) {
            (AssessmentDecision::Approved, None) => {
                Err("approvedAmount is required when the decision is APPROVED".to_string())
            }
            (AssessmentDecision::Approved, Some(amount)) if amount.is_sign_negative() && !amount.is_zero() => {
                Err(format!("approvedAmount {amount} must not be negative"))
            }
            (AssessmentDecision::Rejected, Some(_)) => {
                Err("approvedAmount must be omitted when the decision is REJECTED".to_string())
            }
            _ => Ok(()),
        }
    }
}
