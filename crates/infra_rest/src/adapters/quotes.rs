use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use core_kernel::{CustomerId, DomainPort, OperationMetadata, PortError, ProductId, QuoteId};
use domain_policy::{
    CreateQuoteRequest, Customer, Policy, Product, Quote, QuotePort, QuoteQuery, UpdateQuoteRequest,
};

use super::policies::fetch_policy;
use super::{not_found_as, require_body};
use crate::client::RestClient;
use crate::dto::{ConfirmedPolicy, CustomerResource, ListResource, ProductResource, QuoteResource};

/// `QuotePort` over `/quotes`, `/products` and `/customers`
///
/// Writes that answer with an empty body are followed by a read of the quote,
/// so callers always receive the state the backend settled on.
#[derive(Debug, Clone)]
pub struct RestQuoteAdapter {
    client: Arc<RestClient>,
}

impl RestQuoteAdapter {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }

    async fn settle(
        &self,
        id: QuoteId,
        body: Option<QuoteResource>,
        metadata: Option<&OperationMetadata>,
    ) -> Result<Quote, PortError> {
        match body {
            Some(resource) => resource.try_into(),
            None => self.fetch(id, metadata).await,
        }
    }

    async fn fetch(&self, id: QuoteId, metadata: Option<&OperationMetadata>) -> Result<Quote, PortError> {
        self.client
            .get::<QuoteResource>(&quote_path(id), &[], metadata)
            .await
            .map_err(not_found_as("Quote", id))?
            .try_into()
    }
}

fn quote_path(id: QuoteId) -> String {
    format!("/quotes/{}", id.value())
}

impl DomainPort for RestQuoteAdapter {}

#[async_trait]
impl QuotePort for RestQuoteAdapter {
    async fn get_quote(
        &self,
        id: QuoteId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Quote, PortError> {
        self.fetch(id, metadata.as_ref()).await
    }

    async fn find_quotes(
        &self,
        query: QuoteQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Quote>, PortError> {
        let mut params = Vec::new();
        if let Some(customer_id) = query.customer_id {
            params.push(("customer_id", customer_id.value().to_string()));
        }
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }

        self.client
            .get::<ListResource<QuoteResource>>("/quotes", &params, metadata.as_ref())
            .await?
            .into_vec()
            .into_iter()
            .map(Quote::try_from)
            .collect()
    }

    async fn create_quote(
        &self,
        request: CreateQuoteRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Quote, PortError> {
        let body = self
            .client
            .post::<_, QuoteResource>("/quotes", &request, metadata.as_ref())
            .await?;
        require_body(body, "POST /quotes")?.try_into()
    }

    async fn update_quote(
        &self,
        id: QuoteId,
        request: UpdateQuoteRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Quote, PortError> {
        let body = self
            .client
            .patch::<_, QuoteResource>(&quote_path(id), &request, metadata.as_ref())
            .await
            .map_err(not_found_as("Quote", id))?;
        self.settle(id, body, metadata.as_ref()).await
    }

    async fn delete_quote(
        &self,
        id: QuoteId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        self.client
            .delete(&quote_path(id), metadata.as_ref())
            .await
            .map_err(not_found_as("Quote", id))
    }

    async fn price_quote(
        &self,
        id: QuoteId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Quote, PortError> {
        let body = self
            .client
            .post_action::<QuoteResource>(&format!("{}/price", quote_path(id)), metadata.as_ref())
            .await
            .map_err(not_found_as("Quote", id))?;
        self.settle(id, body, metadata.as_ref()).await
    }

    async fn confirm_quote(
        &self,
        id: QuoteId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Policy, PortError> {
        let body = self
            .client
            .post_action::<Value>(&format!("{}/confirm", quote_path(id)), metadata.as_ref())
            .await
            .map_err(not_found_as("Quote", id))?;
        let body = require_body(body, "confirm")?;

        match ConfirmedPolicy::from_body(body)? {
            ConfirmedPolicy::Complete(policy) => Ok(policy),
            ConfirmedPolicy::Reference(policy_id) => {
                debug!(quote_id = %id, policy_id = %policy_id, "Reading confirmed policy back");
                fetch_policy(&self.client, policy_id, metadata.as_ref()).await
            }
        }
    }

    async fn get_product(
        &self,
        id: ProductId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Product, PortError> {
        self.client
            .get::<ProductResource>(&format!("/products/{}", id.value()), &[], metadata.as_ref())
            .await
            .map_err(not_found_as("Product", id))?
            .try_into()
    }

    async fn get_customer(
        &self,
        id: CustomerId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Customer, PortError> {
        self.client
            .get::<CustomerResource>(&format!("/customers/{}", id.value()), &[], metadata.as_ref())
            .await
            .map_err(not_found_as("Customer", id))
            .map(Customer::from)
    }
}
