//! REST Infrastructure Layer
//!
//! This crate connects the lifecycle engines to the backend that owns
//! quotes, claims, policies and reference data. The backend is reached over
//! JSON/HTTP; every response is mapped onto the domain types and every
//! failure onto `PortError`.
//!
//! # Architecture
//!
//! One `RestClient` holds the connection pool, correlation headers and the
//! retry policy. The adapters share it and implement the domain ports:
//!
//! - `RestQuoteAdapter` -> `QuotePort`
//! - `RestPolicyAdapter` -> `PolicyPort`
//! - `RestClaimAdapter` -> `ClaimPort`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_rest::{RestClient, RestClientConfig, RestQuoteAdapter};
//!
//! let client = Arc::new(RestClient::new(RestClientConfig::default())?);
//! let quotes = Arc::new(RestQuoteAdapter::new(client.clone()));
//! let engine = QuoteLifecycleEngine::new(quotes);
//! ```

pub mod config;
pub mod client;
pub mod dto;
pub mod adapters;

pub use config::RestClientConfig;
pub use client::RestClient;
pub use adapters::{RestQuoteAdapter, RestPolicyAdapter, RestClaimAdapter};
