//! Custom Test Assertions
//!
//! Assertion helpers for lifecycle types that give more meaningful failure
//! messages than plain `assert!`.

use std::fmt::Debug;

use core_kernel::{ErrorKind, QuoteId, WorkflowError};
use domain_claims::Claim;
use domain_policy::{MockQuoteBackend, Quote};

/// Asserts the premium/status invariant of a quote
pub fn assert_quote_consistent(quote: &Quote) {
    assert!(
        quote.is_consistent(),
        "{} is {} but premium is {:?}",
        quote.id,
        quote.status,
        quote.premium
    );
}

/// Asserts the decision/amount bookkeeping of a claim
pub fn assert_claim_consistent(claim: &Claim) {
    assert!(
        claim.is_consistent(),
        "{} is {} with decision {:?} and amount {:?}",
        claim.id,
        claim.status,
        claim.decision,
        claim.approved_amount
    );
}

/// Asserts that an operation failed with the given error kind
///
/// Returns the error for further inspection.
pub fn assert_error_kind<T: Debug>(result: Result<T, WorkflowError>, expected: ErrorKind) -> WorkflowError {
    match result {
        Ok(value) => panic!("expected {expected} error, got Ok({value:?})"),
        Err(error) => {
            assert_eq!(
                error.kind(),
                expected,
                "expected {expected} error, got {}: {error}",
                error.kind()
            );
            error
        }
    }
}

/// Asserts that the backend holds exactly one policy for the quote
pub async fn assert_single_policy(backend: &MockQuoteBackend, quote_id: QuoteId) {
    let policies = backend.policies_for_quote(quote_id).await;
    assert_eq!(
        policies.len(),
        1,
        "expected exactly one policy for {quote_id}, found {policies:?}"
    );
}
