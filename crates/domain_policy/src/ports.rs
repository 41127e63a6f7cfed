//! Quote and Policy Ports
//!
//! The quote lifecycle engine reaches the system of record only through these
//! traits. The backend owns every entity; the port methods map one-to-one onto
//! its resource endpoints:
//!
//! | Method | Endpoint |
//! |---|---|
//! | `get_quote` | `GET /quotes/{id}` |
//! | `find_quotes` | `GET /quotes?customer_id=&status=` |
//! | `create_quote` | `POST /quotes` |
//! | `update_quote` | `PATCH /quotes/{id}` |
//! | `delete_quote` | `DELETE /quotes/{id}` |
//! | `price_quote` | `POST /quotes/{id}/price` |
//! | `confirm_quote` | `POST /quotes/{id}/confirm` |
//! | `get_product` | `GET /products/{id}` |
//! | `get_customer` | `GET /customers/{id}` |
//! | `get_policy` | `GET /policies/{id}` |
//! | `find_policies` | `GET /policies?customer_id=&status=` |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{
    CustomerId, DomainPort, OperationMetadata, PolicyId, PortError, ProductId, QuoteId,
};

use crate::policy::{Policy, PolicyQuery};
use crate::product::{Customer, Product};
use crate::quote::{Quote, QuoteDimensions, QuoteQuery};

/// Request for creating a new quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub sum_assured: u64,
    pub term_months: u32,
}

impl CreateQuoteRequest {
    pub fn dimensions(&self) -> QuoteDimensions {
        QuoteDimensions::new(self.sum_assured, self.term_months)
    }
}

/// Request for changing a quote's rated dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuoteRequest {
    pub sum_assured: u64,
    pub term_months: u32,
}

impl From<QuoteDimensions> for UpdateQuoteRequest {
    fn from(d: QuoteDimensions) -> Self {
        Self {
            sum_assured: d.sum_assured,
            term_months: d.term_months,
        }
    }
}

/// Port to the quote resources of the backend
///
/// Implementations must guarantee that `confirm_quote` creates at most one
/// policy per quote: confirming an already confirmed quote returns the policy
/// created the first time.
#[async_trait]
pub trait QuotePort: DomainPort {
    /// Retrieves a quote, or `PortError::NotFound`
    async fn get_quote(
        &self,
        id: QuoteId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Quote, PortError>;

    /// Lists quotes matching the filter
    async fn find_quotes(
        &self,
        query: QuoteQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Quote>, PortError>;

    /// Creates a Draft quote
    async fn create_quote(
        &self,
        request: CreateQuoteRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Quote, PortError>;

    /// Replaces the rated dimensions; the backend returns the quote to Draft
    async fn update_quote(
        &self,
        id: QuoteId,
        request: UpdateQuoteRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Quote, PortError>;

    /// Deletes a Draft quote
    async fn delete_quote(
        &self,
        id: QuoteId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Asks the rating collaborator to price the quote
    async fn price_quote(
        &self,
        id: QuoteId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Quote, PortError>;

    /// Confirms a priced quote, returning the created or existing policy
    async fn confirm_quote(
        &self,
        id: QuoteId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Policy, PortError>;

    /// Retrieves a product, or `PortError::NotFound`
    async fn get_product(
        &self,
        id: ProductId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Product, PortError>;

    /// Retrieves a customer, or `PortError::NotFound`
    async fn get_customer(
        &self,
        id: CustomerId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Customer, PortError>;
}

/// Read-only port to the policy resources of the backend
#[async_trait]
pub trait PolicyPort: DomainPort {
    async fn get_policy(
        &self,
        id: PolicyId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Policy, PortError>;

    async fn find_policies(
        &self,
        query: PolicyQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Policy>, PortError>;
}

/// In-memory backend for tests
///
/// Behaves like the real backend: prices with a flat rate table, enforces a
/// single policy per quote and rejects writes that are illegal in the quote's
/// state. Faults can be injected per quote.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::policy::PolicyStatus;
    use crate::quote::QuoteStatus;

    /// Pricing source tag written by the mock rating engine
    pub const RATE_TABLE_SOURCE: &str = "RATE_TABLE";

    /// Annual rate per 1000 of sum assured, pro-rated by term
    pub fn rate_premium(product: &Product, dimensions: &QuoteDimensions) -> Decimal {
        let units = Decimal::from(dimensions.sum_assured) / dec!(1000);
        let years = Decimal::from(dimensions.term_months) / dec!(12);
        (units * product.base_rate_per_1000 * years).round_dp(2)
    }

    #[derive(Debug, Default)]
    struct BackendState {
        quotes: BTreeMap<QuoteId, Quote>,
        products: HashMap<ProductId, Product>,
        customers: HashMap<CustomerId, Customer>,
        policies: BTreeMap<PolicyId, Policy>,
        policy_by_quote: HashMap<QuoteId, PolicyId>,
        next_quote_id: i64,
        next_policy_id: i64,
        rating_outage: bool,
        withheld_premiums: HashSet<QuoteId>,
        failing_confirms: HashSet<QuoteId>,
        calls: Vec<String>,
    }

    /// In-memory implementation of `QuotePort` and `PolicyPort`
    #[derive(Debug, Clone, Default)]
    pub struct MockQuoteBackend {
        state: Arc<RwLock<BackendState>>,
    }

    impl MockQuoteBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn add_product(&self, product: Product) {
            self.state.write().await.products.insert(product.id, product);
        }

        pub async fn add_customer(&self, customer: Customer) {
            self.state.write().await.customers.insert(customer.id, customer);
        }

        /// Stores a quote as-is, bypassing validation
        pub async fn insert_quote(&self, quote: Quote) {
            let mut state = self.state.write().await;
            state.next_quote_id = state.next_quote_id.max(quote.id.value());
            state.quotes.insert(quote.id, quote);
        }

        /// Stores a policy as-is, e.g. one issued before the test started
        pub async fn insert_policy(&self, policy: Policy) {
            let mut state = self.state.write().await;
            state.next_policy_id = state.next_policy_id.max(policy.id.value());
            if let Some(quote_id) = policy.quote_id {
                state.policy_by_quote.insert(quote_id, policy.id);
            }
            state.policies.insert(policy.id, policy);
        }

        /// Makes every price call fail as if the rating engine were down
        pub async fn set_rating_outage(&self, down: bool) {
            self.state.write().await.rating_outage = down;
        }

        /// Makes price calls for the quote succeed without producing a premium
        pub async fn withhold_premium(&self, id: QuoteId) {
            self.state.write().await.withheld_premiums.insert(id);
        }

        /// Makes confirm calls for the quote fail with a backend error
        pub async fn fail_confirm(&self, id: QuoteId) {
            self.state.write().await.failing_confirms.insert(id);
        }

        /// Simulates a concurrent edit from another client
        pub async fn external_update(&self, id: QuoteId, dimensions: QuoteDimensions) {
            if let Some(quote) = self.state.write().await.quotes.get_mut(&id) {
                quote.redimension(dimensions);
            }
        }

        /// Returns the write calls received, in order
        pub async fn calls(&self) -> Vec<String> {
            self.state.read().await.calls.clone()
        }

        /// Counts received calls starting with `prefix`, e.g. `"price"`
        pub async fn call_count(&self, prefix: &str) -> usize {
            self.state
                .read()
                .await
                .calls
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }

        pub async fn policy_count(&self) -> usize {
            self.state.read().await.policies.len()
        }

        pub async fn policies_for_quote(&self, id: QuoteId) -> Vec<Policy> {
            self.state
                .read()
                .await
                .policies
                .values()
                .filter(|p| p.quote_id == Some(id))
                .cloned()
                .collect()
        }
    }

    impl DomainPort for MockQuoteBackend {}

    #[async_trait]
    impl QuotePort for MockQuoteBackend {
        async fn get_quote(
            &self,
            id: QuoteId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Quote, PortError> {
            self.state
                .read()
                .await
                .quotes
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Quote", id))
        }

        async fn find_quotes(
            &self,
            query: QuoteQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Quote>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .quotes
                .values()
                .filter(|q| query.matches(q))
                .cloned()
                .collect())
        }

        async fn create_quote(
            &self,
            request: CreateQuoteRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Quote, PortError> {
            let mut state = self.state.write().await;
            if !state.customers.contains_key(&request.customer_id) {
                return Err(PortError::validation_field("unknown customer", "customerId"));
            }
            let product = state
                .products
                .get(&request.product_id)
                .ok_or_else(|| PortError::validation_field("unknown product", "productId"))?;
            product
                .check_quotable()
                .and_then(|()| product.check_dimensions(&request.dimensions()))
                .map_err(PortError::validation)?;

            state.next_quote_id += 1;
            let quote = Quote::draft(
                QuoteId::new(state.next_quote_id),
                request.customer_id,
                request.product_id,
                request.dimensions(),
            );
            state.calls.push(format!("create {}", quote.id));
            state.quotes.insert(quote.id, quote.clone());
            Ok(quote)
        }

        async fn update_quote(
            &self,
            id: QuoteId,
            request: UpdateQuoteRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Quote, PortError> {
            let mut state = self.state.write().await;
            state.calls.push(format!("update {id}"));
            let quote = state
                .quotes
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Quote", id))?;
            if quote.status.is_terminal() {
                return Err(PortError::conflict(format!("quote is {}", quote.status)));
            }
            quote.redimension(QuoteDimensions::new(request.sum_assured, request.term_months));
            Ok(quote.clone())
        }

        async fn delete_quote(
            &self,
            id: QuoteId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            state.calls.push(format!("delete {id}"));
            let quote = state
                .quotes
                .get(&id)
                .ok_or_else(|| PortError::not_found("Quote", id))?;
            if quote.status != QuoteStatus::Draft {
                return Err(PortError::conflict(format!("quote is {}", quote.status)));
            }
            state.quotes.remove(&id);
            Ok(())
        }

        async fn price_quote(
            &self,
            id: QuoteId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Quote, PortError> {
            let mut state = self.state.write().await;
            state.calls.push(format!("price {id}"));
            if state.rating_outage {
                return Err(PortError::unavailable("rating engine"));
            }
            let withheld = state.withheld_premiums.contains(&id);
            let quote = state
                .quotes
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Quote", id))?;
            if quote.status != QuoteStatus::Draft || withheld {
                return Ok(quote);
            }
            let product = state
                .products
                .get(&quote.product_id)
                .cloned()
                .ok_or_else(|| PortError::internal("quote references a missing product"))?;

            let premium = rate_premium(&product, &quote.dimensions());
            let stored = state
                .quotes
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Quote", id))?;
            stored.record_premium(premium, RATE_TABLE_SOURCE);
            Ok(stored.clone())
        }

        async fn confirm_quote(
            &self,
            id: QuoteId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Policy, PortError> {
            let mut state = self.state.write().await;
            state.calls.push(format!("confirm {id}"));
            if state.failing_confirms.contains(&id) {
                return Err(PortError::internal("policy issuance failed"));
            }
            let quote = state
                .quotes
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Quote", id))?;

            match quote.status {
                QuoteStatus::Confirmed => {
                    let policy_id = state
                        .policy_by_quote
                        .get(&id)
                        .copied()
                        .ok_or_else(|| PortError::internal("confirmed quote has no policy"))?;
                    state
                        .policies
                        .get(&policy_id)
                        .cloned()
                        .ok_or_else(|| PortError::not_found("Policy", policy_id))
                }
                QuoteStatus::Draft => Err(PortError::conflict("quote has no premium")),
                QuoteStatus::Priced => {
                    state.next_policy_id += 1;
                    let policy_id = PolicyId::new(state.next_policy_id);
                    let policy = Policy {
                        id: policy_id,
                        policy_number: Some(format!("P{:08}", policy_id.value())),
                        quote_id: Some(id),
                        customer_id: Some(quote.customer_id),
                        product_id: Some(quote.product_id),
                        premium: quote.premium,
                        start_date: Some(Utc::now().date_naive()),
                        status: PolicyStatus::Active,
                    };
                    if let Some(stored) = state.quotes.get_mut(&id) {
                        stored.status = QuoteStatus::Confirmed;
                    }
                    state.policy_by_quote.insert(id, policy_id);
                    state.policies.insert(policy_id, policy.clone());
                    Ok(policy)
                }
            }
        }

        async fn get_product(
            &self,
            id: ProductId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Product, PortError> {
            self.state
                .read()
                .await
                .products
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Product", id))
        }

        async fn get_customer(
            &self,
            id: CustomerId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Customer, PortError> {
            self.state
                .read()
                .await
                .customers
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Customer", id))
        }
    }

    #[async_trait]
    impl PolicyPort for MockQuoteBackend {
        async fn get_policy(
            &self,
            id: PolicyId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Policy, PortError> {
            self.state
                .read()
                .await
                .policies
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Policy", id))
        }

        async fn find_policies(
            &self,
            query: PolicyQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Policy>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .policies
                .values()
                .filter(|p| query.matches(p))
                .cloned()
                .collect())
        }
    }
}
