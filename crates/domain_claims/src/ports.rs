//! Claim Port
//!
//! Maps onto the claim resources of the backend: `GET /claims/{id}`,
//! `GET /claims?policy_id=&status=`, `POST /claims`, `PATCH /claims/{id}`,
//! `POST /claims/{id}/assess` and `POST /claims/{id}/close`.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DomainPort, OperationMetadata, PolicyId, PortError};

use crate::assessment::Assessment;
use crate::claim::{Claim, ClaimQuery};

/// Request for filing a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClaimRequest {
    pub policy_id: PolicyId,
    pub description: String,
    pub loss_date: NaiveDate,
}

/// Request for editing an Open claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClaimRequest {
    pub description: String,
    pub loss_date: NaiveDate,
}

/// Port to the claim resources of the backend
///
/// The backend validates loss dates (not in the future, not before policy
/// inception) and reports violations as `PortError::Validation`.
#[async_trait]
pub trait ClaimPort: DomainPort {
    async fn get_claim(
        &self,
        id: ClaimId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError>;

    async fn find_claims(
        &self,
        query: ClaimQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Claim>, PortError>;

    async fn create_claim(
        &self,
        request: CreateClaimRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError>;

    async fn update_claim(
        &self,
        id: ClaimId,
        request: UpdateClaimRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError>;

    async fn assess_claim(
        &self,
        id: ClaimId,
        assessment: Assessment,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError>;

    async fn close_claim(
        &self,
        id: ClaimId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError>;
}

/// In-memory claims backend for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use chrono::Utc;

    use crate::claim::ClaimStatus;

    #[derive(Debug, Default)]
    struct ClaimState {
        claims: BTreeMap<ClaimId, Claim>,
        next_id: i64,
        calls: Vec<String>,
    }

    /// In-memory implementation of `ClaimPort`
    #[derive(Debug, Clone, Default)]
    pub struct MockClaimBackend {
        state: Arc<RwLock<ClaimState>>,
    }

    impl MockClaimBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Stores a claim as-is, bypassing validation
        pub async fn insert_claim(&self, claim: Claim) {
            let mut state = self.state.write().await;
            state.next_id = state.next_id.max(claim.id.value());
            state.claims.insert(claim.id, claim);
        }

        pub async fn calls(&self) -> Vec<String> {
            self.state.read().await.calls.clone()
        }
    }

    fn check_loss_date(loss_date: NaiveDate) -> Result<(), PortError> {
        if loss_date > Utc::now().date_naive() {
            return Err(PortError::validation_field("must not be in the future", "lossDate"));
        }
        Ok(())
    }

    fn transition(claim: &Claim, target: ClaimStatus) -> Result<(), PortError> {
        if claim.can_transition_to(target) {
            Ok(())
        } else {
            Err(PortError::conflict(format!("claim is {}", claim.status)))
        }
    }

    impl DomainPort for MockClaimBackend {}

    #[async_trait]
    impl ClaimPort for MockClaimBackend {
        async fn get_claim(
            &self,
            id: ClaimId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Claim, PortError> {
            self.state
                .read()
                .await
                .claims
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn find_claims(
            &self,
            query: ClaimQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Claim>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .claims
                .values()
                .filter(|c| query.matches(c))
                .cloned()
                .collect())
        }

        async fn create_claim(
            &self,
            request: CreateClaimRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Claim, PortError> {
            check_loss_date(request.loss_date)?;
            let mut state = self.state.write().await;
            state.next_id += 1;
            let claim = Claim::open(
                ClaimId::new(state.next_id),
                request.policy_id,
                request.description,
                request.loss_date,
            );
            state.calls.push(format!("create {}", claim.id));
            state.claims.insert(claim.id, claim.clone());
            Ok(claim)
        }

        async fn update_claim(
            &self,
            id: ClaimId,
            request: UpdateClaimRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Claim, PortError> {
            check_loss_date(request.loss_date)?;
            let mut state = self.state.write().await;
            state.calls.push(format!("update {id}"));
            let claim = state
                .claims
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Claim", id))?;
            transition(claim, ClaimStatus::Open)?;
            claim.description = request.description;
            claim.loss_date = request.loss_date;
            Ok(claim.clone())
        }

        async fn assess_claim(
            &self,
            id: ClaimId,
            assessment: Assessment,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Claim, PortError> {
            assessment.validate().map_err(PortError::validation)?;
            let mut state = self.state.write().await;
            state.calls.push(format!("assess {id}"));
            let claim = state
                .claims
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Claim", id))?;
            transition(claim, ClaimStatus::Assessed)?;
            claim.record_assessment(&assessment);
            Ok(claim.clone())
        }

        async fn close_claim(
            &self,
            id: ClaimId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Claim, PortError> {
            let mut state = self.state.write().await;
            state.calls.push(format!("close {id}"));
            let claim = state
                .claims
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Claim", id))?;
            transition(claim, ClaimStatus::Closed)?;
            claim.status = ClaimStatus::Closed;
            Ok(claim.clone())
        }
    }
}
