//! Test Data Builders
//!
//! Builders for entities that tests insert directly into the in-memory
//! backends. Defaults follow the fixtures, so a test only names the fields
//! it cares about.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{ClaimId, CustomerId, PolicyId, ProductId, QuoteId};
use domain_claims::{Assessment, Claim, ClaimStatus};
use domain_policy::{Policy, PolicyStatus, Quote, QuoteDimensions, QuoteStatus};

use crate::fixtures::{CustomerFixtures, DateFixtures, DimensionFixtures, ProductFixtures};

/// Builder for quotes in any lifecycle state
///
/// `priced` and `confirmed` set the premium together with the status, so the
/// built quote honours the premium/status invariant.
pub struct QuoteBuilder {
    id: QuoteId,
    customer_id: CustomerId,
    product_id: ProductId,
    dimensions: QuoteDimensions,
    premium: Option<Decimal>,
    status: QuoteStatus,
}

impl QuoteBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            id: QuoteId::new(id),
            customer_id: CustomerFixtures::ada_id(),
            product_id: ProductFixtures::term_life_id(),
            dimensions: DimensionFixtures::standard(),
            premium: None,
            status: QuoteStatus::Draft,
        }
    }

    pub fn customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    pub fn product(mut self, product_id: ProductId) -> Self {
        self.product_id = product_id;
        self
    }

    pub fn dimensions(mut self, sum_assured: u64, term_months: u32) -> Self {
        self.dimensions = QuoteDimensions::new(sum_assured, term_months);
        self
    }

    pub fn priced(mut self, premium: Decimal) -> Self {
        self.premium = Some(premium);
        self.status = QuoteStatus::Priced;
        self
    }

    pub fn confirmed(mut self, premium: Decimal) -> Self {
        self.premium = Some(premium);
        self.status = QuoteStatus::Confirmed;
        self
    }

    pub fn build(self) -> Quote {
        let mut quote = Quote::draft(self.id, self.customer_id, self.product_id, self.dimensions);
        if let Some(premium) = self.premium {
            quote.record_premium(premium, "RATE_TABLE");
        }
        quote.status = self.status;
        quote
    }
}

/// Builder for issued policies
pub struct PolicyBuilder {
    id: PolicyId,
    quote_id: Option<QuoteId>,
    customer_id: CustomerId,
    premium: Option<Decimal>,
    start_date: NaiveDate,
    status: PolicyStatus,
}

impl PolicyBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            id: PolicyId::new(id),
            quote_id: None,
            customer_id: CustomerFixtures::ada_id(),
            premium: Some(DimensionFixtures::standard_premium()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status: PolicyStatus::Active,
        }
    }

    pub fn from_quote(mut self, quote: &Quote) -> Self {
        self.quote_id = Some(quote.id);
        self.customer_id = quote.customer_id;
        self.premium = quote.premium;
        self
    }

    pub fn status(mut self, status: PolicyStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Policy {
        Policy {
            id: self.id,
            policy_number: Some(format!("P{:08}", self.id.value())),
            quote_id: self.quote_id,
            customer_id: Some(self.customer_id),
            product_id: Some(ProductFixtures::term_life_id()),
            premium: self.premium,
            start_date: Some(self.start_date),
            status: self.status,
        }
    }
}

/// Builder for claims in any lifecycle state
pub struct ClaimBuilder {
    id: ClaimId,
    policy_id: PolicyId,
    description: String,
    loss_date: NaiveDate,
    assessment: Option<Assessment>,
    closed: bool,
}

impl ClaimBuilder {
    pub fn new(id: i64, policy_id: PolicyId) -> Self {
        Self {
            id: ClaimId::new(id),
            policy_id,
            description: "Water damage".to_string(),
            loss_date: DateFixtures::loss_date(),
            assessment: None,
            closed: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn assessed(mut self, assessment: Assessment) -> Self {
        self.assessment = Some(assessment);
        self
    }

    /// Closed claims are always assessed first
    pub fn closed(mut self, assessment: Assessment) -> Self {
        self.assessment = Some(assessment);
        self.closed = true;
        self
    }

    pub fn build(self) -> Claim {
        let mut claim = Claim::open(self.id, self.policy_id, self.description, self.loss_date);
        if let Some(assessment) = &self.assessment {
            claim.record_assessment(assessment);
        }
        if self.closed {
            claim.status = ClaimStatus::Closed;
        }
        claim
    }
}
