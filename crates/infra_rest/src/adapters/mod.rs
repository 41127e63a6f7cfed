//! Port adapters over the shared `RestClient`

mod quotes;
mod policies;
mod claims;

pub use quotes::RestQuoteAdapter;
pub use policies::RestPolicyAdapter;
pub use claims::RestClaimAdapter;

use std::fmt::Display;

use core_kernel::PortError;

/// Names the missing entity in a 404 from the client
fn not_found_as(entity: &str, id: impl Display) -> impl FnOnce(PortError) -> PortError {
    let id = id.to_string();
    let entity = entity.to_string();
    move |error| match error {
        PortError::NotFound { .. } => PortError::not_found(entity, id),
        other => other,
    }
}

/// Fails when a write that must answer with an entity answered with nothing
fn require_body<T>(body: Option<T>, operation: &str) -> Result<T, PortError> {
    body.ok_or_else(|| PortError::transformation(format!("{operation} returned an empty body")))
}
