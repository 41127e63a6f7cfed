//! Policies issued from confirmed quotes
//!
//! This service never creates or mutates a policy directly: a policy appears
//! as the side effect of confirming a quote and is read-only afterwards.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{CustomerId, PolicyId, ProductId, QuoteId};

/// Policy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyStatus {
    Active,
    Lapsed,
    Cancelled,
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolicyStatus::Active => "ACTIVE",
            PolicyStatus::Lapsed => "LAPSED",
            PolicyStatus::Cancelled => "CANCELLED",
        })
    }
}

/// A policy as held by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: PolicyId,
    pub policy_number: Option<String>,
    /// The quote whose confirmation created this policy
    pub quote_id: Option<QuoteId>,
    pub customer_id: Option<CustomerId>,
    pub product_id: Option<ProductId>,
    pub premium: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub status: PolicyStatus,
}

impl Policy {
    pub fn is_active(&self) -> bool {
        self.status == PolicyStatus::Active
    }
}

/// Filter for listing policies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyQuery {
    pub customer_id: Option<CustomerId>,
    pub status: Option<PolicyStatus>,
}

impl PolicyQuery {
    pub fn matches(&self, policy: &Policy) -> bool {
        self.customer_id.map_or(true, |c| policy.customer_id == Some(c))
            && self.status.map_or(true, |s| s == policy.status)
    }
}
