//! HTTP API Layer
//!
//! Command surface over the quote and claim lifecycle engines using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: One module per resource, thin over the engines
//! - **Middleware**: Request ids, tracing, audit logging
//! - **DTOs**: Request bodies and command responses carrying a user notice
//! - **Error Handling**: Workflow error kinds mapped to HTTP statuses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::over_rest(&config)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::{HealthCheckable, PortError};
use domain_claims::ClaimLifecycleEngine;
use domain_policy::{PolicyPort, QuoteLifecycleEngine};
use infra_rest::{RestClaimAdapter, RestClient, RestPolicyAdapter, RestQuoteAdapter};

use crate::config::ApiConfig;
use crate::handlers::{claims, health, policies, quotes};
use crate::middleware::{audit_middleware, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<QuoteLifecycleEngine>,
    pub claims: Arc<ClaimLifecycleEngine>,
    pub policies: Arc<dyn PolicyPort>,
    /// Probed by the readiness check
    pub backend: Arc<dyn HealthCheckable>,
}

impl AppState {
    /// Wires both engines to the REST backend named in `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn over_rest(config: &ApiConfig) -> Result<Self, PortError> {
        let client = Arc::new(RestClient::new(config.backend.clone())?);
        let policies: Arc<dyn PolicyPort> = Arc::new(RestPolicyAdapter::new(client.clone()));
        let quotes = QuoteLifecycleEngine::new(Arc::new(RestQuoteAdapter::new(client.clone())));
        let claims = ClaimLifecycleEngine::new(
            Arc::new(RestClaimAdapter::new(client.clone())),
            policies.clone(),
        );

        Ok(Self {
            quotes: Arc::new(quotes),
            claims: Arc::new(claims),
            policies,
            backend: client,
        })
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let quote_routes = Router::new()
        .route("/", post(quotes::create_quote).get(quotes::list_quotes))
        .route("/batch/price", post(quotes::price_batch))
        .route("/batch/confirm", post(quotes::confirm_batch))
        .route(
            "/:id",
            get(quotes::get_quote)
                .patch(quotes::update_quote)
                .delete(quotes::delete_quote),
        )
        .route("/:id/price", post(quotes::price_quote))
        .route("/:id/confirm", post(quotes::confirm_quote));

    let claims_routes = Router::new()
        .route("/", post(claims::create_claim).get(claims::list_claims))
        .route("/:id", get(claims::get_claim).patch(claims::update_claim))
        .route("/:id/assess", post(claims::assess_claim))
        .route("/:id/close", post(claims::close_claim));

    let policy_routes = Router::new()
        .route("/", get(policies::list_policies))
        .route("/:id", get(policies::get_policy));

    let api_routes = Router::new()
        .nest("/quotes", quote_routes)
        .nest("/claims", claims_routes)
        .nest("/policies", policy_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
