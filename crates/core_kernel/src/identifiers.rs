//! Strongly-typed identifiers for domain entities
//!
//! The backend assigns numeric identifiers to every resource. Wrapping them in
//! newtypes keeps a quote id from being passed where a policy id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $prefix:literal, $entity:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from the backend's numeric key
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the numeric key as used in resource paths
            pub fn value(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }

            /// Returns the human-readable entity name used in messages
            pub fn entity() -> &'static str {
                $entity
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.trim().parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// Quoting and issuance
define_id!(QuoteId, "QTE", "Quote");
define_id!(PolicyId, "POL", "Policy");
define_id!(ProductId, "PRD", "Product");
define_id!(CustomerId, "CUS", "Customer");

// Claims
define_id!(ClaimId, "CLM", "Claim");
