//! Quote lifecycle engine
//!
//! Orchestrates the Draft → Priced → Confirmed state machine against the
//! backend. The engine holds no state of its own: every operation starts by
//! re-reading the quote, decides from that snapshot, issues at most the writes
//! the transition needs and returns the backend's authoritative result.
//! Conflicting concurrent writes are rejected by the backend and surface as
//! `WorkflowError::InvalidState`.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use core_kernel::{
    CustomerId, OperationMetadata, PortError, ProductId, QuoteId, WorkflowError,
};

use crate::batch::{apply_to_each, BatchReport};
use crate::policy::Policy;
use crate::ports::{CreateQuoteRequest, QuotePort, UpdateQuoteRequest};
use crate::quote::{Quote, QuoteDimensions, QuoteQuery, QuoteStatus};

/// Lifecycle operation that can be applied to a selection of quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteOperation {
    Price,
    Confirm,
}

impl QuoteOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteOperation::Price => "price",
            QuoteOperation::Confirm => "confirm",
        }
    }
}

/// Successful result of a batch item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
    Priced(Quote),
    Confirmed(Policy),
}

/// Stateless orchestrator for quote transitions
pub struct QuoteLifecycleEngine {
    quotes: Arc<dyn QuotePort>,
}

impl QuoteLifecycleEngine {
    pub fn new(quotes: Arc<dyn QuotePort>) -> Self {
        Self { quotes }
    }

    /// Creates a Draft quote after resolving its customer and product
    ///
    /// # Errors
    ///
    /// `Validation` if the customer or product does not resolve, the product
    /// is inactive, or the dimensions fall outside the product's bounds.
    #[instrument(skip(self), fields(customer_id = %customer_id, product_id = %product_id))]
    pub async fn create(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        sum_assured: u64,
        term_months: u32,
    ) -> Result<Quote, WorkflowError> {
        let dimensions = QuoteDimensions::new(sum_assured, term_months);

        self.quotes
            .get_customer(customer_id, metadata("create"))
            .await
            .map_err(|e| unresolved_reference("new quote", customer_id, e))?;
        let product = self
            .quotes
            .get_product(product_id, metadata("create"))
            .await
            .map_err(|e| unresolved_reference("new quote", product_id, e))?;
        product
            .check_quotable()
            .and_then(|()| product.check_dimensions(&dimensions))
            .map_err(|message| WorkflowError::validation("new quote", message))?;

        let request = CreateQuoteRequest {
            customer_id,
            product_id,
            sum_assured,
            term_months,
        };
        let quote = self
            .quotes
            .create_quote(request, metadata("create"))
            .await
            .map_err(|e| WorkflowError::from_port("new quote", "create", e))?;
        ensure_consistent(&quote)?;

        info!(quote_id = %quote.id, "Quote created");
        Ok(quote)
    }

    /// Changes the rated dimensions, returning the quote to Draft
    ///
    /// Any dimension change invalidates a previously computed premium, so a
    /// Priced quote comes back as Draft with no premium. Quotes on a product
    /// retired since creation stay editable within its bounds.
    #[instrument(skip(self), fields(quote_id = %id))]
    pub async fn update(
        &self,
        id: QuoteId,
        sum_assured: u64,
        term_months: u32,
    ) -> Result<Quote, WorkflowError> {
        let current = self.load(id, "update").await?;
        if current.status.is_terminal() {
            return Err(WorkflowError::invalid_state(id, current.status, "update"));
        }

        let dimensions = QuoteDimensions::new(sum_assured, term_months);
        let product = self
            .quotes
            .get_product(current.product_id, metadata("update"))
            .await
            .map_err(|e| unresolved_reference(id, current.product_id, e))?;
        product
            .check_dimensions(&dimensions)
            .map_err(|message| WorkflowError::validation(id, message))?;

        let updated = self
            .quotes
            .update_quote(id, UpdateQuoteRequest::from(dimensions), metadata("update"))
            .await
            .map_err(|e| WorkflowError::from_port(id, "update", e))?;

        if updated.status != QuoteStatus::Draft || updated.premium.is_some() {
            warn!(status = %updated.status, "Backend kept pricing after a dimension change");
            return Err(WorkflowError::transport(
                id,
                PortError::transformation("backend kept pricing after a dimension change"),
            ));
        }

        info!(from = %current.status, "Quote returned to draft");
        Ok(updated)
    }

    /// Prices a Draft quote
    ///
    /// A Priced quote is returned unchanged without asking the rating
    /// collaborator again; the premium is immutable once set.
    ///
    /// # Errors
    ///
    /// `InvalidState` for a Confirmed quote, `RatingUnavailable` if the rating
    /// collaborator fails or returns no premium. Nothing is retried here.
    #[instrument(skip(self), fields(quote_id = %id))]
    pub async fn price(&self, id: QuoteId) -> Result<Quote, WorkflowError> {
        let current = self.load(id, "price").await?;
        match current.status {
            QuoteStatus::Priced => {
                debug!("Quote already priced");
                return Ok(current);
            }
            QuoteStatus::Confirmed => {
                return Err(WorkflowError::invalid_state(id, current.status, "price"));
            }
            QuoteStatus::Draft => {}
        }

        let priced = self.request_pricing(id).await?;
        if priced.premium.is_none() {
            return Err(WorkflowError::rating_unavailable(id, "no premium was produced"));
        }
        ensure_consistent(&priced)?;

        info!(premium = ?priced.premium, source = ?priced.pricing_source, "Quote priced");
        Ok(priced)
    }

    /// Confirms a quote, issuing its policy
    ///
    /// A Draft quote is priced first. Confirming a Confirmed quote returns
    /// the policy issued the first time; the backend guarantees there is only
    /// one per quote.
    ///
    /// # Errors
    ///
    /// `PricingRequired` if the quote still has no premium after pricing.
    #[instrument(skip(self), fields(quote_id = %id))]
    pub async fn confirm(&self, id: QuoteId) -> Result<Policy, WorkflowError> {
        let mut current = self.load(id, "confirm").await?;

        match current.status {
            QuoteStatus::Confirmed => {
                debug!("Quote already confirmed, fetching existing policy");
                return self.issue_policy(id).await;
            }
            QuoteStatus::Draft => {
                info!("Pricing quote before confirmation");
                self.request_pricing(id).await?;
                // The price response may already be stale; decide on a fresh read.
                current = self.load(id, "confirm").await?;
            }
            QuoteStatus::Priced => {}
        }

        if current.premium.is_none() {
            warn!(status = %current.status, "Premium not available after pricing");
            return Err(WorkflowError::pricing_required(id));
        }

        let policy = self.issue_policy(id).await?;
        info!(policy_id = %policy.id, "Quote confirmed, policy issued");
        Ok(policy)
    }

    /// Deletes a Draft quote
    #[instrument(skip(self), fields(quote_id = %id))]
    pub async fn remove(&self, id: QuoteId) -> Result<(), WorkflowError> {
        let current = self.load(id, "remove").await?;
        if current.status != QuoteStatus::Draft {
            return Err(WorkflowError::invalid_state(id, current.status, "remove"));
        }
        self.quotes
            .delete_quote(id, metadata("remove"))
            .await
            .map_err(|e| WorkflowError::from_port(id, "remove", e))?;

        info!("Quote deleted");
        Ok(())
    }

    /// Reads a quote
    pub async fn get(&self, id: QuoteId) -> Result<Quote, WorkflowError> {
        self.load(id, "read").await
    }

    /// Lists quotes matching the filter
    pub async fn list(&self, query: QuoteQuery) -> Result<Vec<Quote>, WorkflowError> {
        self.quotes
            .find_quotes(query, metadata("list"))
            .await
            .map_err(|e| WorkflowError::from_port("quotes", "list", e))
    }

    /// Applies `operation` to every quote in order, one at a time
    ///
    /// A failing quote is recorded in the report and the batch moves on.
    pub async fn apply_to_each(
        &self,
        ids: impl IntoIterator<Item = QuoteId>,
        operation: QuoteOperation,
    ) -> BatchReport<QuoteId, QuoteOutcome> {
        apply_to_each(ids, operation.as_str(), |id| async move {
            match operation {
                QuoteOperation::Price => self.price(id).await.map(QuoteOutcome::Priced),
                QuoteOperation::Confirm => self.confirm(id).await.map(QuoteOutcome::Confirmed),
            }
        })
        .await
    }

    /// Prices each quote in order
    pub async fn price_each(
        &self,
        ids: impl IntoIterator<Item = QuoteId>,
    ) -> BatchReport<QuoteId, Quote> {
        apply_to_each(ids, "price", |id| self.price(id)).await
    }

    /// Confirms each quote in order
    pub async fn confirm_each(
        &self,
        ids: impl IntoIterator<Item = QuoteId>,
    ) -> BatchReport<QuoteId, Policy> {
        apply_to_each(ids, "confirm", |id| self.confirm(id)).await
    }

    async fn load(&self, id: QuoteId, operation: &str) -> Result<Quote, WorkflowError> {
        self.quotes
            .get_quote(id, metadata(operation))
            .await
            .map_err(|e| WorkflowError::from_port(id, operation, e))
    }

    async fn request_pricing(&self, id: QuoteId) -> Result<Quote, WorkflowError> {
        self.quotes
            .price_quote(id, metadata("price"))
            .await
            .map_err(|e| match e {
                PortError::ServiceUnavailable { service } => {
                    WorkflowError::rating_unavailable(id, service)
                }
                PortError::Internal { message, .. } => {
                    WorkflowError::rating_unavailable(id, message)
                }
                other => WorkflowError::from_port(id, "price", other),
            })
    }

    async fn issue_policy(&self, id: QuoteId) -> Result<Policy, WorkflowError> {
        let policy = self
            .quotes
            .confirm_quote(id, metadata("confirm"))
            .await
            .map_err(|e| WorkflowError::from_port(id, "confirm", e))?;

        if let Some(quote_id) = policy.quote_id {
            if quote_id != id {
                return Err(WorkflowError::transport(
                    id,
                    PortError::transformation(format!(
                        "confirmation returned {} which belongs to {quote_id}",
                        policy.id
                    )),
                ));
            }
        }
        Ok(policy)
    }
}

fn metadata(operation: &str) -> Option<OperationMetadata> {
    Some(OperationMetadata::generated().with_context("operation", operation))
}

/// Maps a failed reference lookup; an unknown reference is bad input
fn unresolved_reference(
    entity: impl std::fmt::Display,
    reference: impl std::fmt::Display,
    error: PortError,
) -> WorkflowError {
    if error.is_not_found() {
        WorkflowError::validation(entity, format!("{reference} does not resolve"))
    } else {
        WorkflowError::from_port(entity, "resolve reference", error)
    }
}

fn ensure_consistent(quote: &Quote) -> Result<(), WorkflowError> {
    if quote.is_consistent() {
        return Ok(());
    }
    Err(WorkflowError::transport(
        quote.id,
        PortError::transformation(format!(
            "backend returned {} quote with premium {:?}",
            quote.status, quote.premium
        )),
    ))
}
