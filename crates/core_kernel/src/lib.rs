//! Core Kernel - Foundational types shared by the lifecycle engines
//!
//! This crate provides the building blocks used across all domain modules:
//! - Strongly-typed identifiers for backend resources
//! - Port infrastructure (errors, health checks, operation metadata)
//! - The workflow error taxonomy and user-facing notices

pub mod identifiers;
pub mod ports;
pub mod error;
pub mod notice;

pub use identifiers::{QuoteId, PolicyId, ProductId, CustomerId, ClaimId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
pub use error::{WorkflowError, ErrorKind};
pub use notice::{Notice, Severity};
