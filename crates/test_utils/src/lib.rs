//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! lifecycle service test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built reference data (products, customers, dates)
//! - `builders`: Builder patterns for quotes, policies and claims
//! - `backends`: In-memory backends seeded with fixtures, wired to engines
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod backends;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use backends::*;
pub use assertions::*;
pub use generators::*;
