//! Request handlers, one module per resource

pub mod health;
pub mod quotes;
pub mod claims;
pub mod policies;
