//! Pre-built Test Fixtures
//!
//! Provides ready-to-use reference data. Values are fixed so that premiums
//! computed by the in-memory rating table are predictable:
//! Term Life at 100 000 over 12 months prices at 125.00.

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CustomerId, ProductId};
use domain_policy::{Customer, Product, QuoteDimensions};

/// Fixture for products
pub struct ProductFixtures;

impl ProductFixtures {
    pub fn term_life_id() -> ProductId {
        ProductId::new(1)
    }

    pub fn whole_life_id() -> ProductId {
        ProductId::new(2)
    }

    pub fn retired_id() -> ProductId {
        ProductId::new(3)
    }

    /// Term Life: rate 1.25 per 1000, 10 000..=1 000 000, 12..=360 months
    pub fn term_life() -> Product {
        Product {
            id: Self::term_life_id(),
            name: "Term Life".to_string(),
            code: "TERM".to_string(),
            base_rate_per_1000: dec!(1.25),
            min_sum_assured: 10_000,
            max_sum_assured: 1_000_000,
            min_term_months: 12,
            max_term_months: 360,
            active: true,
        }
    }

    /// Whole Life: rate 3.80 per 1000, 50 000..=5 000 000, 120..=600 months
    pub fn whole_life() -> Product {
        Product {
            id: Self::whole_life_id(),
            name: "Whole Life".to_string(),
            code: "WHOLE".to_string(),
            base_rate_per_1000: dec!(3.80),
            min_sum_assured: 50_000,
            max_sum_assured: 5_000_000,
            min_term_months: 120,
            max_term_months: 600,
            active: true,
        }
    }

    /// A product no longer sold
    pub fn retired() -> Product {
        Product {
            id: Self::retired_id(),
            name: "Legacy Endowment".to_string(),
            code: "ENDOW".to_string(),
            base_rate_per_1000: dec!(2.10),
            min_sum_assured: 10_000,
            max_sum_assured: 500_000,
            min_term_months: 60,
            max_term_months: 240,
            active: false,
        }
    }

    pub fn all() -> Vec<Product> {
        vec![Self::term_life(), Self::whole_life(), Self::retired()]
    }
}

/// Fixture for customers
pub struct CustomerFixtures;

impl CustomerFixtures {
    pub fn ada_id() -> CustomerId {
        CustomerId::new(1)
    }

    pub fn grace_id() -> CustomerId {
        CustomerId::new(2)
    }

    /// An id no backend knows about
    pub fn unknown_id() -> CustomerId {
        CustomerId::new(404)
    }

    pub fn ada() -> Customer {
        Customer {
            id: Self::ada_id(),
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
        }
    }

    pub fn grace() -> Customer {
        Customer {
            id: Self::grace_id(),
            first_name: "Grace".to_string(),
            last_name: Some("Hopper".to_string()),
            email: None,
        }
    }

    pub fn all() -> Vec<Customer> {
        vec![Self::ada(), Self::grace()]
    }
}

/// Fixture for quote dimensions against Term Life
pub struct DimensionFixtures;

impl DimensionFixtures {
    /// 100 000 over 12 months, premium 125.00
    pub fn standard() -> QuoteDimensions {
        QuoteDimensions::new(100_000, 12)
    }

    /// 200 000 over 24 months, premium 500.00
    pub fn doubled() -> QuoteDimensions {
        QuoteDimensions::new(200_000, 24)
    }

    /// Below the Term Life minimum sum assured
    pub fn too_small() -> QuoteDimensions {
        QuoteDimensions::new(5_000, 12)
    }

    pub fn standard_premium() -> Decimal {
        dec!(125.00)
    }
}

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    pub fn loss_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    pub fn tomorrow() -> NaiveDate {
        Self::today() + Days::new(1)
    }
}
