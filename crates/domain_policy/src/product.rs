//! Reference data consulted when quoting

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, ProductId};

use crate::quote::QuoteDimensions;

/// An insurance product with its quoting bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub code: String,
    /// Premium rate per 1000 of sum assured per year
    pub base_rate_per_1000: Decimal,
    pub min_sum_assured: u64,
    pub max_sum_assured: u64,
    pub min_term_months: u32,
    pub max_term_months: u32,
    pub active: bool,
}

impl Product {
    /// Only active products accept new quotes
    pub fn check_quotable(&self) -> Result<(), String> {
        if self.active {
            Ok(())
        } else {
            Err(format!("product {} is not active", self.code))
        }
    }

    /// Checks quote dimensions against the product's configured bounds
    ///
    /// Returns the first violation as a message. Retirement is not a bound;
    /// see [`Product::check_quotable`].
    pub fn check_dimensions(&self, dimensions: &QuoteDimensions) -> Result<(), String> {
        if dimensions.sum_assured == 0 {
            return Err("sumAssured must be positive".to_string());
        }
        if dimensions.term_months == 0 {
            return Err("termMonths must be positive".to_string());
        }
        if dimensions.sum_assured < self.min_sum_assured
            || dimensions.sum_assured > self.max_sum_assured
        {
            return Err(format!(
                "sumAssured {} is outside {}..={} for product {}",
                dimensions.sum_assured, self.min_sum_assured, self.max_sum_assured, self.code
            ));
        }
        if dimensions.term_months < self.min_term_months
            || dimensions.term_months > self.max_term_months
        {
            return Err(format!(
                "termMonths {} is outside {}..={} for product {}",
                dimensions.term_months, self.min_term_months, self.max_term_months, self.code
            ));
        }
        Ok(())
    }
}

/// A customer as far as quoting needs to know
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}
