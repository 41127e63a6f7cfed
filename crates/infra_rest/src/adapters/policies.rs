use std::sync::Arc;

use async_trait::async_trait;

use core_kernel::{DomainPort, OperationMetadata, PolicyId, PortError};
use domain_policy::{Policy, PolicyPort, PolicyQuery};

use super::not_found_as;
use crate::client::RestClient;
use crate::dto::{ListResource, PolicyResource};

/// `PolicyPort` over `/policies`
#[derive(Debug, Clone)]
pub struct RestPolicyAdapter {
    client: Arc<RestClient>,
}

impl RestPolicyAdapter {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

pub(crate) async fn fetch_policy(
    client: &RestClient,
    id: PolicyId,
    metadata: Option<&OperationMetadata>,
) -> Result<Policy, PortError> {
    client
        .get::<PolicyResource>(&format!("/policies/{}", id.value()), &[], metadata)
        .await
        .map_err(not_found_as("Policy", id))?
        .try_into()
}

impl DomainPort for RestPolicyAdapter {}

#[async_trait]
impl PolicyPort for RestPolicyAdapter {
    async fn get_policy(
        &self,
        id: PolicyId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Policy, PortError> {
        fetch_policy(&self.client, id, metadata.as_ref()).await
    }

    async fn find_policies(
        &self,
        query: PolicyQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Policy>, PortError> {
        let mut params = Vec::new();
        if let Some(customer_id) = query.customer_id {
            params.push(("customer_id", customer_id.value().to_string()));
        }
        if let Some(status) = query.status {
            params.push(("status", status.to_string()));
        }

        self.client
            .get::<ListResource<PolicyResource>>("/policies", &params, metadata.as_ref())
            .await?
            .into_vec()
            .into_iter()
            .map(Policy::try_from)
            .collect()
    }
}
