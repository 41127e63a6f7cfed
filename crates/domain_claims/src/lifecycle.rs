//! Claim lifecycle engine
//!
//! Open --assess--> Assessed --close--> Closed, with edits allowed only while
//! Open. Like the quote engine it re-reads the claim before every decision
//! and keeps no state between calls.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use core_kernel::{ClaimId, OperationMetadata, PolicyId, PortError, WorkflowError};
use domain_policy::PolicyPort;

use crate::assessment::{Assessment, AssessmentDecision};
use crate::claim::{Claim, ClaimQuery, ClaimStatus};
use crate::ports::{ClaimPort, CreateClaimRequest, UpdateClaimRequest};

/// Stateless orchestrator for claim transitions
pub struct ClaimLifecycleEngine {
    claims: Arc<dyn ClaimPort>,
    policies: Arc<dyn PolicyPort>,
}

impl ClaimLifecycleEngine {
    pub fn new(claims: Arc<dyn ClaimPort>, policies: Arc<dyn PolicyPort>) -> Self {
        Self { claims, policies }
    }

    /// Files an Open claim against an existing policy
    #[instrument(skip(self, description), fields(policy_id = %policy_id))]
    pub async fn create(
        &self,
        policy_id: PolicyId,
        description: String,
        loss_date: NaiveDate,
    ) -> Result<Claim, WorkflowError> {
        self.policies
            .get_policy(policy_id, metadata("create"))
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    WorkflowError::validation("new claim", format!("{policy_id} does not resolve"))
                } else {
                    WorkflowError::from_port("new claim", "resolve policy", e)
                }
            })?;

        let request = CreateClaimRequest {
            policy_id,
            description,
            loss_date,
        };
        let claim = self
            .claims
            .create_claim(request, metadata("create"))
            .await
            .map_err(|e| WorkflowError::from_port("new claim", "create", e))?;

        info!(claim_id = %claim.id, "Claim filed");
        Ok(claim)
    }

    /// Edits the description and loss date of an Open claim
    #[instrument(skip(self, description), fields(claim_id = %id))]
    pub async fn update(
        &self,
        id: ClaimId,
        description: String,
        loss_date: NaiveDate,
    ) -> Result<Claim, WorkflowError> {
        let current = self.load(id, "update").await?;
        self.require(&current, ClaimStatus::Open, "update")?;

        let request = UpdateClaimRequest {
            description,
            loss_date,
        };
        let claim = self
            .claims
            .update_claim(id, request, metadata("update"))
            .await
            .map_err(|e| WorkflowError::from_port(id, "update", e))?;

        info!("Claim updated");
        Ok(claim)
    }

    /// Records the assessment decision on an Open claim
    ///
    /// # Errors
    ///
    /// `Validation` if an approval has no (or a negative) amount or a
    /// rejection carries one; `InvalidState` unless the claim is Open.
    #[instrument(skip(self, reason), fields(claim_id = %id))]
    pub async fn assess(
        &self,
        id: ClaimId,
        decision: AssessmentDecision,
        approved_amount: Option<Decimal>,
        reason: String,
    ) -> Result<Claim, WorkflowError> {
        let assessment = Assessment::new(decision, approved_amount, reason);
        assessment
            .validate()
            .map_err(|message| WorkflowError::validation(id, message))?;

        let current = self.load(id, "assess").await?;
        self.require(&current, ClaimStatus::Open, "assess")?;

        let claim = self
            .claims
            .assess_claim(id, assessment, metadata("assess"))
            .await
            .map_err(|e| WorkflowError::from_port(id, "assess", e))?;
        ensure_consistent(&claim)?;

        info!(approved_amount = ?claim.approved_amount, "Claim assessed");
        Ok(claim)
    }

    /// Closes an Assessed claim
    #[instrument(skip(self), fields(claim_id = %id))]
    pub async fn close(&self, id: ClaimId) -> Result<Claim, WorkflowError> {
        let current = self.load(id, "close").await?;
        self.require(&current, ClaimStatus::Closed, "close")?;

        let claim = self
            .claims
            .close_claim(id, metadata("close"))
            .await
            .map_err(|e| WorkflowError::from_port(id, "close", e))?;

        info!("Claim closed");
        Ok(claim)
    }

    /// Reads a claim
    pub async fn get(&self, id: ClaimId) -> Result<Claim, WorkflowError> {
        self.load(id, "read").await
    }

    /// Lists claims matching the filter
    pub async fn list(&self, query: ClaimQuery) -> Result<Vec<Claim>, WorkflowError> {
        self.claims
            .find_claims(query, metadata("list"))
            .await
            .map_err(|e| WorkflowError::from_port("claims", "list", e))
    }

    async fn load(&self, id: ClaimId, operation: &str) -> Result<Claim, WorkflowError> {
        self.claims
            .get_claim(id, metadata(operation))
            .await
            .map_err(|e| WorkflowError::from_port(id, operation, e))
    }

    /// Fails unless the claim may move to `target`
    fn require(&self, claim: &Claim, target: ClaimStatus, operation: &str) -> Result<(), WorkflowError> {
        if claim.can_transition_to(target) {
            Ok(())
        } else {
            Err(WorkflowError::invalid_state(claim.id, claim.status, operation))
        }
    }
}

fn metadata(operation: &str) -> Option<OperationMetadata> {
    Some(OperationMetadata::generated().with_context("operation", operation))
}

fn ensure_consistent(claim: &Claim) -> Result<(), WorkflowError> {
    if claim.is_consistent() {
        return Ok(());
    }
    Err(WorkflowError::transport(
        claim.id,
        PortError::transformation(format!(
            "backend returned {} claim with decision {:?} and amount {:?}",
            claim.status, claim.decision, claim.approved_amount
        )),
    ))
}
