//! Quote DTOs

use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, Notice, ProductId, QuoteId};
use domain_policy::{BatchReport, Policy, Quote};

use crate::error::ErrorResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteBody {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub sum_assured: u64,
    pub term_months: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuoteBody {
    pub sum_assured: u64,
    pub term_months: u32,
}

/// Selection of quotes for a batch command
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub ids: Vec<QuoteId>,
}

/// Outcome for one quote of a batch
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchItemResponse<T> {
    pub id: QuoteId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

/// Batch report, items in request order
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponse<T> {
    pub operation: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<BatchItemResponse<T>>,
    /// One error notice per failed quote
    pub notices: Vec<Notice>,
}

impl<T> From<BatchReport<QuoteId, T>> for BatchResponse<T> {
    fn from(report: BatchReport<QuoteId, T>) -> Self {
        let operation = report.operation().to_string();
        let total = report.len();
        let failed = report.failure_count();
        let notices = report.failure_notices("quote");

        let items = report
            .into_items()
            .into_iter()
            .map(|item| match item.outcome {
                Ok(result) => BatchItemResponse {
                    id: item.item,
                    success: true,
                    result: Some(result),
                    error: None,
                },
                Err(err) => BatchItemResponse {
                    id: item.item,
                    success: false,
                    result: None,
                    error: Some(ErrorResponse::from_workflow(&err)),
                },
            })
            .collect();

        Self {
            operation,
            total,
            succeeded: total - failed,
            failed,
            items,
            notices,
        }
    }
}

pub fn created_notice() -> Notice {
    Notice::confirmation("Quote created successfully")
}

pub fn updated_notice() -> Notice {
    Notice::confirmation("Quote updated successfully")
}

pub fn deleted_notice() -> Notice {
    Notice::confirmation("Quote deleted")
}

pub fn priced_notice(quote: &Quote) -> Notice {
    match quote.premium {
        Some(premium) => Notice::confirmation(format!("Quote priced — premium: {premium}")),
        None => Notice::confirmation("Quote priced"),
    }
}

pub fn confirmed_notice(policy: &Policy) -> Notice {
    Notice::confirmation(format!(
        "Quote confirmed — policy created (id: {})",
        policy.id.value()
    ))
}
