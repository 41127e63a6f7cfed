//! Claim aggregate

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ClaimId, PolicyId};

use crate::assessment::{Assessment, AssessmentDecision};

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Filed, details may still change
    Open,
    /// Decision recorded
    Assessed,
    /// Terminal
    Closed,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Open => "OPEN",
            ClaimStatus::Assessed => "ASSESSED",
            ClaimStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A claim against a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: ClaimId,
    pub policy_id: PolicyId,
    pub description: String,
    pub loss_date: NaiveDate,
    pub status: ClaimStatus,
    pub decision: Option<AssessmentDecision>,
    /// Set only by an approving assessment
    pub approved_amount: Option<Decimal>,
    pub reason: Option<String>,
}

impl Claim {
    /// Creates an Open claim
    pub fn open(id: ClaimId, policy_id: PolicyId, description: String, loss_date: NaiveDate) -> Self {
        Self {
            id,
            policy_id,
            description,
            loss_date,
            status: ClaimStatus::Open,
            decision: None,
            approved_amount: None,
            reason: None,
        }
    }

    /// Checks if transition is valid
    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Open, Open) | (Open, Assessed) | (Assessed, Closed)
        )
    }

    /// Checks the assessment bookkeeping invariant
    pub fn is_consistent(&self) -> bool {
        match self.status {
            ClaimStatus::Open => self.decision.is_none() && self.approved_amount.is_none(),
            ClaimStatus::Assessed | ClaimStatus::Closed => match self.decision {
                Some(AssessmentDecision::Approved) => self.approved_amount.is_some(),
                Some(AssessmentDecision::Rejected) => self.approved_amount.is_none(),
                None => false,
            },
        }
    }

    /// Records an assessment and moves the claim to Assessed
    ///
    /// Used by in-memory backends; the engine never mutates claims locally.
    pub fn record_assessment(&mut self, assessment: &Assessment) {
        self.decision = Some(assessment.decision);
        self.approved_amount = assessment.approved_amount;
        self.reason = Some(assessment.reason.clone());
        self.status = ClaimStatus::Assessed;
    }
}

/// Filter for listing claims
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimQuery {
    pub policy_id: Option<PolicyId>,
    pub status: Option<ClaimStatus>,
}

impl ClaimQuery {
    pub fn for_policy(policy_id: PolicyId) -> Self {
        Self {
            policy_id: Some(policy_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, claim: &Claim) -> bool {
        self.policy_id.map_or(true, |p| p == claim.policy_id)
            && self.status.map_or(true, |s| s == claim.status)
    }
}
