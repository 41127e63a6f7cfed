//! Property-Based Test Generators
//!
//! Provides proptest strategies for quote dimensions, assessments and
//! sequences of lifecycle operations.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_claims::{Assessment, AssessmentDecision};
use domain_policy::{Product, QuoteDimensions};

/// Dimensions inside the product's bounds
pub fn valid_dimensions_strategy(product: &Product) -> impl Strategy<Value = QuoteDimensions> {
    (
        product.min_sum_assured..=product.max_sum_assured,
        product.min_term_months..=product.max_term_months,
    )
        .prop_map(|(sum_assured, term_months)| QuoteDimensions::new(sum_assured, term_months))
}

/// Dimensions that may fall outside any product's bounds, including zero
pub fn any_dimensions_strategy() -> impl Strategy<Value = QuoteDimensions> {
    (0u64..=2_000_000, 0u32..=720)
        .prop_map(|(sum_assured, term_months)| QuoteDimensions::new(sum_assured, term_months))
}

/// A lifecycle command applied to one quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteCommand {
    Price,
    Confirm,
    Update(QuoteDimensions),
    Remove,
    /// Another client edits the quote between our calls
    ExternalEdit(QuoteDimensions),
    /// The rating engine goes down or comes back
    RatingOutage(bool),
}

/// Sequences of commands against quotes of the given product
pub fn command_sequence_strategy(
    product: &Product,
    max_len: usize,
) -> impl Strategy<Value = Vec<QuoteCommand>> {
    let command = prop_oneof![
        4 => Just(QuoteCommand::Price),
        3 => Just(QuoteCommand::Confirm),
        2 => valid_dimensions_strategy(product).prop_map(QuoteCommand::Update),
        1 => Just(QuoteCommand::Remove),
        1 => valid_dimensions_strategy(product).prop_map(QuoteCommand::ExternalEdit),
        1 => any::<bool>().prop_map(QuoteCommand::RatingOutage),
    ];
    prop::collection::vec(command, 1..=max_len)
}

/// Amounts with two decimal places, 0.00 to 100 000.00
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Assessments that pass validation
pub fn valid_assessment_strategy() -> impl Strategy<Value = Assessment> {
    prop_oneof![
        amount_strategy().prop_map(|amount| Assessment::approve(amount, "covered")),
        Just(Assessment::reject("excluded peril")),
    ]
}

/// Assessments whose amount disagrees with the decision
pub fn invalid_assessment_strategy() -> impl Strategy<Value = Assessment> {
    prop_oneof![
        Just(Assessment::new(AssessmentDecision::Approved, None, "covered")),
        (1i64..=10_000_000).prop_map(|cents| Assessment::approve(Decimal::new(-cents, 2), "covered")),
        amount_strategy().prop_map(|amount| Assessment::new(
            AssessmentDecision::Rejected,
            Some(amount),
            "excluded"
        )),
    ]
}
