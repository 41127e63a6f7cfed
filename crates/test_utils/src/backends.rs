//! In-memory backends wired to the lifecycle engines
//!
//! Replaces a live backend in integration tests. Both engines see the same
//! policies, so a policy issued by confirming a quote can be claimed against
//! immediately.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable};
use domain_claims::{ClaimLifecycleEngine, MockClaimBackend};
use domain_policy::{MockQuoteBackend, QuoteLifecycleEngine};

use crate::fixtures::{CustomerFixtures, ProductFixtures};

/// A quote backend holding every fixture product and customer
pub async fn seeded_quote_backend() -> MockQuoteBackend {
    let backend = MockQuoteBackend::new();
    for product in ProductFixtures::all() {
        backend.add_product(product).await;
    }
    for customer in CustomerFixtures::all() {
        backend.add_customer(customer).await;
    }
    backend
}

/// Seeded backends plus the engines running over them
pub struct TestWorld {
    pub quotes: MockQuoteBackend,
    pub claims: MockClaimBackend,
    pub quote_engine: Arc<QuoteLifecycleEngine>,
    pub claim_engine: Arc<ClaimLifecycleEngine>,
}

impl TestWorld {
    pub async fn new() -> Self {
        let quotes = seeded_quote_backend().await;
        let claims = MockClaimBackend::new();
        let quote_engine = Arc::new(QuoteLifecycleEngine::new(Arc::new(quotes.clone())));
        let claim_engine = Arc::new(ClaimLifecycleEngine::new(
            Arc::new(claims.clone()),
            Arc::new(quotes.clone()),
        ));
        Self {
            quotes,
            claims,
            quote_engine,
            claim_engine,
        }
    }
}

/// Health probe reporting a fixed status
#[derive(Debug, Clone, Copy)]
pub struct StaticHealth(pub AdapterHealth);

#[async_trait]
impl HealthCheckable for StaticHealth {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "static".to_string(),
            status: self.0,
            latency_ms: 0,
            message: None,
            checked_at: Utc::now(),
        }
    }
}
