use std::sync::Arc;

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, OperationMetadata, PortError};
use domain_claims::{
    Assessment, Claim, ClaimPort, ClaimQuery, CreateClaimRequest, UpdateClaimRequest,
};

use super::{not_found_as, require_body};
use crate::client::RestClient;
use crate::dto::{AssessBody, ClaimResource, ListResource};

/// `ClaimPort` over `/claims`
#[derive(Debug, Clone)]
pub struct RestClaimAdapter {
    client: Arc<RestClient>,
}

impl RestClaimAdapter {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }

    async fn settle(
        &self,
        id: ClaimId,
        body: Option<ClaimResource>,
        metadata: Option<&OperationMetadata>,
    ) -> Result<Claim, PortError> {
        match body {
            Some(resource) => resource.try_into(),
            None => self.fetch(id, metadata).await,
        }
    }

    async fn fetch(&self, id: ClaimId, metadata: Option<&OperationMetadata>) -> Result<Claim, PortError> {
        self.client
            .get::<ClaimResource>(&claim_path(id), &[], metadata)
            .await
            .map_err(not_found_as("Claim", id))?
            .try_into()
    }
}

fn claim_path(id: ClaimId) -> String {
    format!("/claims/{}", id.value())
}

impl DomainPort for RestClaimAdapter {}

#[async_trait]
impl ClaimPort for RestClaimAdapter {
    async fn get_claim(
        &self,
        id: ClaimId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError> {
        self.fetch(id, metadata.as_ref()).await
    }

    async fn find_claims(
        &self,
        query: ClaimQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Claim>, PortError> {
        let mut params = Vec::new();
        if let Some(policy_id) = query.policy_id {
            params.push(("policy_id", policy_id.value().to_string()));
        }
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }

        self.client
            .get::<ListResource<ClaimResource>>("/claims", &params, metadata.as_ref())
            .await?
            .into_vec()
            .into_iter()
            .map(Claim::try_from)
            .collect()
    }

    async fn create_claim(
        &self,
        request: CreateClaimRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError> {
        let body = self
            .client
            .post::<_, ClaimResource>("/claims", &request, metadata.as_ref())
            .await?;
        require_body(body, "POST /claims")?.try_into()
    }

    async fn update_claim(
        &self,
        id: ClaimId,
        request: UpdateClaimRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError> {
        let body = self
            .client
            .patch::<_, ClaimResource>(&claim_path(id), &request, metadata.as_ref())
            .await
            .map_err(not_found_as("Claim", id))?;
        self.settle(id, body, metadata.as_ref()).await
    }

    async fn assess_claim(
        &self,
        id: ClaimId,
        assessment: Assessment,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError> {
        let body = self
            .client
            .post::<_, ClaimResource>(
                &format!("{}/assess", claim_path(id)),
                &AssessBody::from(assessment),
                metadata.as_ref(),
            )
            .await
            .map_err(not_found_as("Claim", id))?;
        self.settle(id, body, metadata.as_ref()).await
    }

    async fn close_claim(
        &self,
        id: ClaimId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError> {
        let body = self
            .client
            .post_action::<ClaimResource>(&format!("{}/close", claim_path(id)), metadata.as_ref())
            .await
            .map_err(not_found_as("Claim", id))?;
        self.settle(id, body, metadata.as_ref()).await
    }
}
