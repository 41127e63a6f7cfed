//! Quote aggregate
//!
//! A quote is a priced-or-unpriced proposal for cover tied to a customer and a
//! product. It moves forward only:
//!
//! ```text
//! Draft --price--> Priced --confirm--> Confirmed
//!   ^                 |
//!   +----update-------+
//! ```
//!
//! # Invariants
//!
//! - `premium` is present if and only if the status is Priced or Confirmed
//! - Confirmed is terminal
//! - A dimension change (sum assured, term) always returns the quote to Draft

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{CustomerId, ProductId, QuoteId};

/// Quote lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    /// Created, no premium yet
    Draft,
    /// Premium computed by the rating collaborator
    Priced,
    /// Bound into a policy; terminal
    Confirmed,
}

impl QuoteStatus {
    /// Returns the wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "DRAFT",
            QuoteStatus::Priced => "PRICED",
            QuoteStatus::Confirmed => "CONFIRMED",
        }
    }

    /// Returns true if a premium must be present in this state
    pub fn carries_premium(&self) -> bool {
        matches!(self, QuoteStatus::Priced | QuoteStatus::Confirmed)
    }

    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuoteStatus::Confirmed)
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rated dimensions of a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDimensions {
    pub sum_assured: u64,
    pub term_months: u32,
}

impl QuoteDimensions {
    pub fn new(sum_assured: u64, term_months: u32) -> Self {
        Self { sum_assured, term_months }
    }
}

/// A quote as held by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: QuoteId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub sum_assured: u64,
    pub term_months: u32,
    /// Cached premium; cleared whenever the dimensions change
    pub premium: Option<Decimal>,
    /// Tag identifying how the premium was computed
    pub pricing_source: Option<String>,
    pub status: QuoteStatus,
}

impl Quote {
    /// Creates a Draft quote
    pub fn draft(
        id: QuoteId,
        customer_id: CustomerId,
        product_id: ProductId,
        dimensions: QuoteDimensions,
    ) -> Self {
        Self {
            id,
            customer_id,
            product_id,
            sum_assured: dimensions.sum_assured,
            term_months: dimensions.term_months,
            premium: None,
            pricing_source: None,
            status: QuoteStatus::Draft,
        }
    }

    pub fn dimensions(&self) -> QuoteDimensions {
        QuoteDimensions::new(self.sum_assured, self.term_months)
    }

    /// Checks the premium/status invariant
    pub fn is_consistent(&self) -> bool {
        self.premium.is_some() == self.status.carries_premium()
    }

    /// Applies new dimensions, returning the quote to Draft
    ///
    /// Used by in-memory backends; the engines never mutate a quote locally.
    pub fn redimension(&mut self, dimensions: QuoteDimensions) {
        self.sum_assured = dimensions.sum_assured;
        self.term_months = dimensions.term_months;
        self.premium = None;
        self.pricing_source = None;
        self.status = QuoteStatus::Draft;
    }

    /// Records a premium and moves the quote to Priced
    pub fn record_premium(&mut self, premium: Decimal, source: impl Into<String>) {
        self.premium = Some(premium);
        self.pricing_source = Some(source.into());
        self.status = QuoteStatus::Priced;
    }
}

/// Filter for listing quotes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteQuery {
    pub customer_id: Option<CustomerId>,
    pub status: Option<QuoteStatus>,
}

impl QuoteQuery {
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: QuoteStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns true if the quote passes the filter
    pub fn matches(&self, quote: &Quote) -> bool {
        self.customer_id.map_or(true, |c| c == quote.customer_id)
            && self.status.map_or(true, |s| s == quote.status)
    }
}
