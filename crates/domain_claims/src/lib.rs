//! Claims Lifecycle Domain
//!
//! This crate orchestrates claim assessment against the backend that owns
//! claims and policies.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Open -> Assessed (Approved with amount | Rejected) -> Closed
//!  ^__|  (update while Open)
//! ```

pub mod claim;
pub mod assessment;
pub mod ports;
pub mod lifecycle;

pub use claim::{Claim, ClaimStatus, ClaimQuery};
pub use assessment::{Assessment, AssessmentDecision};
pub use ports::{ClaimPort, CreateClaimRequest, UpdateClaimRequest};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockClaimBackend;
pub use lifecycle::ClaimLifecycleEngine;
