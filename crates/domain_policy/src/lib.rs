//! Quote Lifecycle Domain
//!
//! This crate orchestrates quoting and policy issuance against the backend
//! that owns quotes, products and policies.
//!
//! # Quote Lifecycle
//!
//! ```text
//! Draft --price--> Priced --confirm--> Confirmed (policy issued)
//!   \-------------confirm (auto-price)------^
//! Priced --update--> Draft
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_policy::{QuoteLifecycleEngine, QuoteOperation};
//!
//! let engine = QuoteLifecycleEngine::new(quote_port);
//! let quote = engine.create(customer_id, product_id, 100_000, 12).await?;
//! let policy = engine.confirm(quote.id).await?;
//!
//! let report = engine.apply_to_each(selected, QuoteOperation::Price).await;
//! ```

pub mod quote;
pub mod product;
pub mod policy;
pub mod ports;
pub mod lifecycle;
pub mod batch;

pub use quote::{Quote, QuoteStatus, QuoteDimensions, QuoteQuery};
pub use product::{Product, Customer};
pub use policy::{Policy, PolicyStatus, PolicyQuery};
pub use ports::{QuotePort, PolicyPort, CreateQuoteRequest, UpdateQuoteRequest};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockQuoteBackend;
pub use lifecycle::{QuoteLifecycleEngine, QuoteOperation, QuoteOutcome};
pub use batch::{BatchReport, BatchItem, apply_to_each};
