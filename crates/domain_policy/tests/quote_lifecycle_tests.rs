//! Quote Lifecycle Engine Tests
//!
//! Runs the engine against the in-memory backend.
//!
//! # Test Organization
//!
//! - `creation` - Reference resolution and product bounds
//! - `pricing` - Draft to Priced, idempotence, rating failures
//! - `confirmation` - Policy issuance, auto-pricing, idempotence
//! - `editing` - Updates and deletion, Confirmed as terminal
//! - `batches` - Best-effort batch application

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{ErrorKind, QuoteId};
use domain_policy::{
    MockQuoteBackend, QuoteLifecycleEngine, QuoteOperation, QuoteOutcome, QuoteQuery, QuoteStatus,
};
use test_utils::{
    assert_error_kind, assert_quote_consistent, assert_single_policy, seeded_quote_backend,
    CustomerFixtures, DimensionFixtures, PolicyBuilder, ProductFixtures, QuoteBuilder,
};

async fn setup() -> (MockQuoteBackend, QuoteLifecycleEngine) {
    let backend = seeded_quote_backend().await;
    let engine = QuoteLifecycleEngine::new(Arc::new(backend.clone()));
    (backend, engine)
}

async fn with_quotes(quotes: Vec<domain_policy::Quote>) -> (MockQuoteBackend, QuoteLifecycleEngine) {
    let (backend, engine) = setup().await;
    for quote in quotes {
        backend.insert_quote(quote).await;
    }
    (backend, engine)
}

// ============================================================================
// CREATION
// ============================================================================

mod creation {
    use super::*;

    #[tokio::test]
    async fn test_create_returns_draft_without_premium() {
        let (_backend, engine) = setup().await;

        let quote = engine
            .create(CustomerFixtures::ada_id(), ProductFixtures::term_life_id(), 100_000, 12)
            .await
            .unwrap();

        assert_eq!(quote.status, QuoteStatus::Draft);
        assert!(quote.premium.is_none());
        assert_eq!(quote.dimensions(), DimensionFixtures::standard());
        assert_quote_consistent(&quote);
    }

    #[tokio::test]
    async fn test_unknown_customer_is_validation_error() {
        let (backend, engine) = setup().await;

        let result = engine
            .create(CustomerFixtures::unknown_id(), ProductFixtures::term_life_id(), 100_000, 12)
            .await;

        let error = assert_error_kind(result, ErrorKind::Validation);
        assert!(error.to_string().contains("CUS-404"));
        assert_eq!(backend.call_count("create").await, 0);
    }

    #[tokio::test]
    async fn test_out_of_bounds_dimensions_are_rejected_before_writing() {
        let (backend, engine) = setup().await;
        let dims = DimensionFixtures::too_small();

        let result = engine
            .create(
                CustomerFixtures::ada_id(),
                ProductFixtures::term_life_id(),
                dims.sum_assured,
                dims.term_months,
            )
            .await;

        let error = assert_error_kind(result, ErrorKind::Validation);
        assert!(error.to_string().contains("sumAssured"));
        assert!(backend.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_retired_product_is_rejected() {
        let (_backend, engine) = setup().await;

        let result = engine
            .create(CustomerFixtures::ada_id(), ProductFixtures::retired_id(), 100_000, 120)
            .await;

        assert_error_kind(result, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_zero_term_is_rejected() {
        let (_backend, engine) = setup().await;

        let result = engine
            .create(CustomerFixtures::ada_id(), ProductFixtures::term_life_id(), 100_000, 0)
            .await;

        assert_error_kind(result, ErrorKind::Validation);
    }
}

// ============================================================================
// PRICING
// ============================================================================

mod pricing {
    use super::*;

    #[tokio::test]
    async fn test_price_draft() {
        let (_backend, engine) = with_quotes(vec![QuoteBuilder::new(1).build()]).await;

        let quote = engine.price(QuoteId::new(1)).await.unwrap();

        assert_eq!(quote.status, QuoteStatus::Priced);
        assert_eq!(quote.premium, Some(dec!(125.00)));
        assert_eq!(quote.pricing_source.as_deref(), Some("RATE_TABLE"));
        assert_quote_consistent(&quote);
    }

    #[tokio::test]
    async fn test_price_is_idempotent() {
        let (backend, engine) = with_quotes(vec![QuoteBuilder::new(1).build()]).await;

        let first = engine.price(QuoteId::new(1)).await.unwrap();
        let second = engine.price(QuoteId::new(1)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.call_count("price").await, 1);
    }

    #[tokio::test]
    async fn test_price_confirmed_quote_is_invalid_state() {
        let quote = QuoteBuilder::new(1).confirmed(dec!(125.00)).build();
        let (backend, engine) = with_quotes(vec![quote]).await;

        let error = assert_error_kind(engine.price(QuoteId::new(1)).await, ErrorKind::InvalidState);

        assert!(error.to_string().contains("CONFIRMED"));
        assert_eq!(backend.call_count("price").await, 0);
    }

    #[tokio::test]
    async fn test_rating_outage_leaves_quote_in_draft() {
        let (backend, engine) = with_quotes(vec![QuoteBuilder::new(1).build()]).await;
        backend.set_rating_outage(true).await;

        assert_error_kind(engine.price(QuoteId::new(1)).await, ErrorKind::RatingUnavailable);

        let quote = engine.get(QuoteId::new(1)).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Draft);
        assert_quote_consistent(&quote);
    }

    #[tokio::test]
    async fn test_missing_premium_is_rating_unavailable() {
        let (backend, engine) = with_quotes(vec![QuoteBuilder::new(1).build()]).await;
        backend.withhold_premium(QuoteId::new(1)).await;

        assert_error_kind(engine.price(QuoteId::new(1)).await, ErrorKind::RatingUnavailable);
    }

    #[tokio::test]
    async fn test_price_unknown_quote_is_not_found() {
        let (_backend, engine) = setup().await;

        let error = assert_error_kind(engine.price(QuoteId::new(77)).await, ErrorKind::NotFound);

        assert_eq!(error.entity(), "QTE-77");
    }
}

// ============================================================================
// CONFIRMATION
// ============================================================================

mod confirmation {
    use super::*;

    #[tokio::test]
    async fn test_confirm_priced_quote_issues_one_policy() {
        let quote = QuoteBuilder::new(1).priced(dec!(125.00)).build();
        let (backend, engine) = with_quotes(vec![quote]).await;

        let policy = engine.confirm(QuoteId::new(1)).await.unwrap();

        assert_eq!(policy.quote_id, Some(QuoteId::new(1)));
        assert_eq!(policy.premium, Some(dec!(125.00)));
        assert!(policy.is_active());
        assert_single_policy(&backend, QuoteId::new(1)).await;

        let quote = engine.get(QuoteId::new(1)).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Confirmed);
        assert_quote_consistent(&quote);
    }

    #[tokio::test]
    async fn test_confirm_draft_prices_first() {
        let (backend, engine) = setup().await;
        let quote = engine
            .create(CustomerFixtures::ada_id(), ProductFixtures::term_life_id(), 100_000, 12)
            .await
            .unwrap();

        let policy = engine.confirm(quote.id).await.unwrap();

        assert_eq!(policy.premium, Some(dec!(125.00)));
        assert_single_policy(&backend, quote.id).await;
        let calls = backend.calls().await;
        assert_eq!(
            calls,
            vec![
                format!("create {}", quote.id),
                format!("price {}", quote.id),
                format!("confirm {}", quote.id),
            ]
        );
    }

    #[tokio::test]
    async fn test_confirm_twice_returns_same_policy() {
        let quote = QuoteBuilder::new(1).priced(dec!(125.00)).build();
        let (backend, engine) = with_quotes(vec![quote]).await;

        let first = engine.confirm(QuoteId::new(1)).await.unwrap();
        let second = engine.confirm(QuoteId::new(1)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(backend.policy_count().await, 1);
    }

    #[tokio::test]
    async fn test_confirm_returns_policy_issued_earlier() {
        let quote = QuoteBuilder::new(1).confirmed(dec!(125.00)).build();
        let policy = PolicyBuilder::new(40).from_quote(&quote).build();
        let (backend, engine) = with_quotes(vec![quote]).await;
        backend.insert_policy(policy.clone()).await;

        let confirmed = engine.confirm(QuoteId::new(1)).await.unwrap();

        assert_eq!(confirmed, policy);
        assert_eq!(backend.policy_count().await, 1);
    }

    #[tokio::test]
    async fn test_confirm_without_premium_is_pricing_required() {
        let (backend, engine) = with_quotes(vec![QuoteBuilder::new(1).build()]).await;
        backend.withhold_premium(QuoteId::new(1)).await;

        assert_error_kind(engine.confirm(QuoteId::new(1)).await, ErrorKind::PricingRequired);

        assert_eq!(backend.call_count("confirm").await, 0);
        assert_eq!(backend.policy_count().await, 0);
    }

    #[tokio::test]
    async fn test_confirm_during_rating_outage() {
        let (backend, engine) = with_quotes(vec![QuoteBuilder::new(1).build()]).await;
        backend.set_rating_outage(true).await;

        assert_error_kind(engine.confirm(QuoteId::new(1)).await, ErrorKind::RatingUnavailable);
        assert_eq!(backend.policy_count().await, 0);
    }

    #[tokio::test]
    async fn test_backend_failure_on_confirm_is_transport() {
        let quote = QuoteBuilder::new(1).priced(dec!(125.00)).build();
        let (backend, engine) = with_quotes(vec![quote]).await;
        backend.fail_confirm(QuoteId::new(1)).await;

        assert_error_kind(engine.confirm(QuoteId::new(1)).await, ErrorKind::Transport);

        let quote = engine.get(QuoteId::new(1)).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Priced);
    }
}

// ============================================================================
// EDITING
// ============================================================================

mod editing {
    use super::*;

    #[tokio::test]
    async fn test_update_priced_quote_returns_to_draft() {
        let quote = QuoteBuilder::new(1).priced(dec!(125.00)).build();
        let (_backend, engine) = with_quotes(vec![quote]).await;

        let updated = engine.update(QuoteId::new(1), 200_000, 24).await.unwrap();

        assert_eq!(updated.status, QuoteStatus::Draft);
        assert!(updated.premium.is_none());
        assert_eq!(updated.dimensions(), DimensionFixtures::doubled());
        assert_quote_consistent(&updated);

        let repriced = engine.price(QuoteId::new(1)).await.unwrap();
        assert_eq!(repriced.premium, Some(dec!(500.00)));
    }

    #[tokio::test]
    async fn test_confirmed_quote_is_terminal() {
        let quote = QuoteBuilder::new(1).confirmed(dec!(125.00)).build();
        let (backend, engine) = with_quotes(vec![quote]).await;
        let id = QuoteId::new(1);

        assert_error_kind(engine.update(id, 200_000, 24).await, ErrorKind::InvalidState);
        assert_error_kind(engine.price(id).await, ErrorKind::InvalidState);
        assert_error_kind(engine.remove(id).await, ErrorKind::InvalidState);

        assert!(backend.calls().await.is_empty());
        let quote = engine.get(id).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Confirmed);
        assert_eq!(quote.premium, Some(dec!(125.00)));
    }

    #[tokio::test]
    async fn test_update_checks_product_bounds() {
        let (backend, engine) = with_quotes(vec![QuoteBuilder::new(1).build()]).await;

        assert_error_kind(engine.update(QuoteId::new(1), 100_000, 480).await, ErrorKind::Validation);
        assert_eq!(backend.call_count("update").await, 0);
    }

    #[tokio::test]
    async fn test_update_on_retired_product_within_bounds() {
        let quote = QuoteBuilder::new(1)
            .product(ProductFixtures::retired_id())
            .dimensions(50_000, 60)
            .priced(dec!(80.00))
            .build();
        let (backend, engine) = with_quotes(vec![quote]).await;

        let updated = engine.update(QuoteId::new(1), 100_000, 120).await.unwrap();

        assert_eq!(updated.status, QuoteStatus::Draft);
        assert!(updated.premium.is_none());
        assert_eq!(updated.product_id, ProductFixtures::retired_id());
        assert_eq!(backend.call_count("update").await, 1);

        assert_error_kind(engine.update(QuoteId::new(1), 100_000, 360).await, ErrorKind::Validation);
        assert_eq!(backend.call_count("update").await, 1);
    }

    #[tokio::test]
    async fn test_remove_draft() {
        let (_backend, engine) = with_quotes(vec![QuoteBuilder::new(1).build()]).await;

        engine.remove(QuoteId::new(1)).await.unwrap();

        assert_error_kind(engine.get(QuoteId::new(1)).await, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_remove_priced_is_invalid_state() {
        let quote = QuoteBuilder::new(1).priced(dec!(125.00)).build();
        let (_backend, engine) = with_quotes(vec![quote]).await;

        assert_error_kind(engine.remove(QuoteId::new(1)).await, ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_list_filters_by_customer_and_status() {
        let (_backend, engine) = with_quotes(vec![
            QuoteBuilder::new(1).build(),
            QuoteBuilder::new(2).priced(dec!(125.00)).build(),
            QuoteBuilder::new(3)
                .customer(CustomerFixtures::grace_id())
                .priced(dec!(125.00))
                .build(),
        ])
        .await;

        let priced = engine
            .list(QuoteQuery::for_customer(CustomerFixtures::ada_id()).with_status(QuoteStatus::Priced))
            .await
            .unwrap();

        assert_eq!(priced.len(), 1);
        assert_eq!(priced[0].id, QuoteId::new(2));
    }
}

// ============================================================================
// BATCHES
// ============================================================================

mod batches {
    use super::*;

    #[tokio::test]
    async fn test_failure_does_not_stop_batch_confirm() {
        let (backend, engine) = with_quotes(vec![
            QuoteBuilder::new(1).priced(dec!(125.00)).build(),
            QuoteBuilder::new(2).priced(dec!(125.00)).build(),
            QuoteBuilder::new(3).build(),
        ])
        .await;
        backend.fail_confirm(QuoteId::new(2)).await;

        let ids = vec![QuoteId::new(1), QuoteId::new(2), QuoteId::new(3)];
        let report = engine.confirm_each(ids.clone()).await;

        let order: Vec<_> = report.items().iter().map(|i| i.item).collect();
        assert_eq!(order, ids);
        assert!(report.items()[0].is_success());
        assert!(!report.items()[1].is_success());
        assert!(report.items()[2].is_success());
        assert_eq!(backend.policy_count().await, 2);
        assert!(backend.policies_for_quote(QuoteId::new(2)).await.is_empty());

        let notices = report.failure_notices("quote");
        assert_eq!(notices.len(), 1);
        assert!(notices[0].detail.starts_with("Failed to confirm quote: QTE-2"));
    }

    #[tokio::test]
    async fn test_batch_price_reports_each_quote() {
        let (_backend, engine) = with_quotes(vec![
            QuoteBuilder::new(1).build(),
            QuoteBuilder::new(2).confirmed(dec!(125.00)).build(),
        ])
        .await;

        let report = engine
            .apply_to_each(vec![QuoteId::new(1), QuoteId::new(2), QuoteId::new(9)], QuoteOperation::Price)
            .await;

        assert_eq!(report.operation(), "price");
        assert_eq!(report.success_count(), 1);
        let kinds: Vec<_> = report.failed().map(|(_, e)| e.kind()).collect();
        assert_eq!(kinds, vec![ErrorKind::InvalidState, ErrorKind::NotFound]);
        match &report.items()[0].outcome {
            Ok(QuoteOutcome::Priced(quote)) => assert_quote_consistent(quote),
            other => panic!("expected a priced quote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (backend, engine) = setup().await;

        let report = engine.apply_to_each(Vec::new(), QuoteOperation::Confirm).await;

        assert!(report.is_empty());
        assert!(backend.calls().await.is_empty());
    }
}
