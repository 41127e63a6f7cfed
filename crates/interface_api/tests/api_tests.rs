//! HTTP API Tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot` over the
//! in-memory backends.
//!
//! # Test Organization
//!
//! - `health` - Liveness and backend readiness
//! - `quotes` - Quote commands, notices and error statuses
//! - `batches` - Batch commands over a selection of quotes
//! - `claims` - Claim commands
//! - `policies` - Read-only policy views

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use core_kernel::{AdapterHealth, PolicyId, QuoteId};
use infra_rest::RestClientConfig;
use interface_api::{config::ApiConfig, create_router, AppState};
use test_utils::{
    assert_single_policy, CustomerFixtures, DimensionFixtures, PolicyBuilder, QuoteBuilder,
    StaticHealth, TestWorld,
};

fn app_with_health(world: &TestWorld, health: AdapterHealth) -> Router {
    create_router(AppState {
        quotes: world.quote_engine.clone(),
        claims: world.claim_engine.clone(),
        policies: Arc::new(world.quotes.clone()),
        backend: Arc::new(StaticHealth(health)),
    })
}

fn app(world: &TestWorld) -> Router {
    app_with_health(world, AdapterHealth::Healthy)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn world_with_quotes(quotes: Vec<domain_policy::Quote>) -> TestWorld {
    let world = TestWorld::new().await;
    for quote in quotes {
        world.quotes.insert_quote(quote).await;
    }
    world
}

// ============================================================================
// HEALTH
// ============================================================================

mod health {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let world = TestWorld::new().await;
        let (status, body) = send(&app(&world), Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body.get("backend").is_none());
    }

    #[tokio::test]
    async fn test_ready_when_backend_healthy() {
        let world = TestWorld::new().await;
        let (status, body) = send(&app(&world), Method::GET, "/health/ready", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["backend"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_not_ready_when_backend_down() {
        let world = TestWorld::new().await;
        let app = app_with_health(&world, AdapterHealth::Unhealthy);

        let (status, body) = send(&app, Method::GET, "/health/ready", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
    }

    #[tokio::test]
    async fn test_state_over_rest_reports_unreachable_backend() {
        let config = ApiConfig {
            backend: RestClientConfig::new("http://127.0.0.1:1/api/v1")
                .with_retries(0, 1)
                .with_timeout(1),
            ..ApiConfig::default()
        };
        let app = create_router(AppState::over_rest(&config).unwrap());

        let (status, body) = send(&app, Method::GET, "/health/ready", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["backend"]["adapter_id"], "backend-rest");
    }
}

// ============================================================================
// QUOTES
// ============================================================================

mod quotes {
    use super::*;

    #[tokio::test]
    async fn test_create_quote() {
        let world = TestWorld::new().await;
        let body = json!({
            "customerId": CustomerFixtures::ada_id().value(),
            "productId": 1,
            "sumAssured": 100_000,
            "termMonths": 12
        });

        let (status, body) = send(&app(&world), Method::POST, "/api/v1/quotes", Some(body)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "DRAFT");
        assert!(body["data"]["premium"].is_null());
        assert_eq!(body["notice"]["severity"], "confirmation");
        assert_eq!(body["notice"]["detail"], "Quote created successfully");
    }

    #[tokio::test]
    async fn test_create_for_unknown_customer_is_unprocessable() {
        let world = TestWorld::new().await;
        let body = json!({
            "customerId": CustomerFixtures::unknown_id().value(),
            "productId": 1,
            "sumAssured": 100_000,
            "termMonths": 12
        });

        let (status, body) = send(&app(&world), Method::POST, "/api/v1/quotes", Some(body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation");
        assert!(body["message"].as_str().unwrap().contains("CUS-404"));
        assert!(world.quotes.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let world = TestWorld::new().await;
        let (status, body) = send(
            &app(&world),
            Method::POST,
            "/api/v1/quotes",
            Some(json!({ "customerId": "ada" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let world = TestWorld::new().await;
        let (status, body) = send(&app(&world), Method::GET, "/api/v1/quotes/abc", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_price_reports_premium_in_notice() {
        let world = world_with_quotes(vec![QuoteBuilder::new(1).build()]).await;

        let (status, body) =
            send(&app(&world), Method::POST, "/api/v1/quotes/1/price", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "PRICED");
        let premium = body["data"]["premium"].as_str().unwrap();
        assert_eq!(
            Decimal::from_str(premium).unwrap(),
            DimensionFixtures::standard_premium()
        );
        assert_eq!(
            body["notice"]["detail"],
            format!("Quote priced — premium: {premium}")
        );
    }

    #[tokio::test]
    async fn test_rating_outage_is_service_unavailable() {
        let world = world_with_quotes(vec![QuoteBuilder::new(1).build()]).await;
        world.quotes.set_rating_outage(true).await;

        let (status, body) =
            send(&app(&world), Method::POST, "/api/v1/quotes/1/price", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "rating_unavailable");
    }

    #[tokio::test]
    async fn test_confirm_issues_one_policy() {
        let world = world_with_quotes(vec![QuoteBuilder::new(1).build()]).await;
        let app = app(&world);

        let (status, body) = send(&app, Method::POST, "/api/v1/quotes/1/confirm", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["quoteId"], 1);
        let policy_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(
            body["notice"]["detail"],
            format!("Quote confirmed — policy created (id: {policy_id})")
        );
        assert_single_policy(&world.quotes, QuoteId::new(1)).await;

        let (status, quote) = send(&app, Method::GET, "/api/v1/quotes/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quote["status"], "CONFIRMED");
    }

    #[tokio::test]
    async fn test_confirm_without_premium_is_conflict() {
        let world = world_with_quotes(vec![QuoteBuilder::new(1).build()]).await;
        world.quotes.withhold_premium(QuoteId::new(1)).await;

        let (status, body) =
            send(&app(&world), Method::POST, "/api/v1/quotes/1/confirm", None).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "pricing_required");
        assert!(world.quotes.policies_for_quote(QuoteId::new(1)).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_returns_quote_to_draft() {
        let premium = DimensionFixtures::standard_premium();
        let world = world_with_quotes(vec![QuoteBuilder::new(1).priced(premium).build()]).await;
        let dims = DimensionFixtures::doubled();

        let (status, body) = send(
            &app(&world),
            Method::PATCH,
            "/api/v1/quotes/1",
            Some(json!({ "sumAssured": dims.sum_assured, "termMonths": dims.term_months })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "DRAFT");
        assert!(body["data"]["premium"].is_null());
        assert_eq!(body["notice"]["detail"], "Quote updated successfully");
    }

    #[tokio::test]
    async fn test_update_confirmed_quote_is_conflict() {
        let premium = DimensionFixtures::standard_premium();
        let world =
            world_with_quotes(vec![QuoteBuilder::new(1).confirmed(premium).build()]).await;

        let (status, body) = send(
            &app(&world),
            Method::PATCH,
            "/api/v1/quotes/1",
            Some(json!({ "sumAssured": 200_000, "termMonths": 24 })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "invalid_state");
    }

    #[tokio::test]
    async fn test_delete_draft_then_not_found() {
        let world = world_with_quotes(vec![QuoteBuilder::new(1).build()]).await;
        let app = app(&world);

        let (status, body) = send(&app, Method::DELETE, "/api/v1/quotes/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notice"]["detail"], "Quote deleted");

        let (status, body) = send(&app, Method::GET, "/api/v1/quotes/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_list_filters_by_customer_and_status() {
        let premium = DimensionFixtures::standard_premium();
        let world = world_with_quotes(vec![
            QuoteBuilder::new(1).priced(premium).build(),
            QuoteBuilder::new(2).build(),
            QuoteBuilder::new(3)
                .customer(CustomerFixtures::grace_id())
                .priced(premium)
                .build(),
        ])
        .await;

        let (status, body) = send(
            &app(&world),
            Method::GET,
            "/api/v1/quotes?customer_id=1&status=PRICED",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1]);
    }
}

// ============================================================================
// BATCHES
// ============================================================================

mod batches {
    use super::*;

    #[tokio::test]
    async fn test_batch_price_keeps_input_order() {
        let world =
            world_with_quotes(vec![QuoteBuilder::new(1).build(), QuoteBuilder::new(2).build()])
                .await;

        let (status, body) = send(
            &app(&world),
            Method::POST,
            "/api/v1/quotes/batch/price",
            Some(json!({ "ids": [2, 99, 1] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["operation"], "price");
        assert_eq!(body["total"], 3);
        assert_eq!(body["succeeded"], 2);
        assert_eq!(body["failed"], 1);

        let items = body["items"].as_array().unwrap();
        let ids: Vec<i64> = items.iter().map(|i| i["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![2, 99, 1]);
        assert_eq!(items[0]["result"]["status"], "PRICED");
        assert_eq!(items[1]["success"], false);
        assert_eq!(items[1]["error"]["error"], "not_found");

        let notices = body["notices"].as_array().unwrap();
        assert_eq!(notices.len(), 1);
        assert!(notices[0]["detail"]
            .as_str()
            .unwrap()
            .starts_with("Failed to price quote"));
    }

    #[tokio::test]
    async fn test_batch_confirm_continues_past_failure() {
        let world = world_with_quotes(vec![
            QuoteBuilder::new(1).build(),
            QuoteBuilder::new(2).build(),
            QuoteBuilder::new(3).build(),
        ])
        .await;
        world.quotes.fail_confirm(QuoteId::new(2)).await;

        let (status, body) = send(
            &app(&world),
            Method::POST,
            "/api/v1/quotes/batch/confirm",
            Some(json!({ "ids": [1, 2, 3] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["succeeded"], 2);
        assert_eq!(body["items"][1]["error"]["error"], "transport");
        assert_eq!(body["items"][2]["result"]["quoteId"], 3);
        assert_single_policy(&world.quotes, QuoteId::new(1)).await;
        assert_single_policy(&world.quotes, QuoteId::new(3)).await;
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let world = TestWorld::new().await;

        let (status, body) = send(
            &app(&world),
            Method::POST,
            "/api/v1/quotes/batch/price",
            Some(json!({ "ids": [] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        assert!(body["items"].as_array().unwrap().is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn runtime() -> tokio::runtime::Runtime {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            #[test]
            fn prop_batch_items_follow_request_order(
                ids in prop::collection::vec(1i64..=6, 0..8)
            ) {
                runtime().block_on(async {
                    let world = world_with_quotes(
                        (1..=4).map(|id| QuoteBuilder::new(id).build()).collect(),
                    )
                    .await;

                    let (status, body) = send(
                        &app(&world),
                        Method::POST,
                        "/api/v1/quotes/batch/price",
                        Some(json!({ "ids": ids })),
                    )
                    .await;

                    prop_assert_eq!(status, StatusCode::OK);
                    let items = body["items"].as_array().unwrap();
                    let returned: Vec<i64> =
                        items.iter().map(|i| i["id"].as_i64().unwrap()).collect();
                    prop_assert_eq!(&returned, &ids);
                    for item in items {
                        let known = item["id"].as_i64().unwrap() <= 4;
                        prop_assert_eq!(item["success"].as_bool().unwrap(), known);
                    }
                    Ok(())
                })?;
            }
        }
    }
}

// ============================================================================
// CLAIMS
// ============================================================================

mod claims {
    use super::*;

    async fn world_with_policy() -> TestWorld {
        let world = TestWorld::new().await;
        world.quotes.insert_policy(PolicyBuilder::new(10).build()).await;
        world
    }

    #[tokio::test]
    async fn test_claim_lifecycle_over_http() {
        let world = world_with_policy().await;
        let app = app(&world);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/claims",
            Some(json!({ "policyId": 10, "description": "Burst pipe", "lossDate": "2024-03-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "OPEN");
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/claims/{id}/assess"),
            Some(json!({ "decision": "APPROVED", "approvedAmount": "1500.00", "reason": "covered" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ASSESSED");
        assert_eq!(
            body["notice"]["detail"],
            "Claim assessed — APPROVED, amount: 1500.00"
        );

        let (status, body) =
            send(&app, Method::POST, &format!("/api/v1/claims/{id}/close"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "CLOSED");
        assert_eq!(body["notice"]["detail"], "Claim closed");

        let (status, body) =
            send(&app, Method::GET, "/api/v1/claims?policy_id=10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_approval_without_amount_is_unprocessable() {
        let world = world_with_policy().await;
        let app = app(&world);
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/v1/claims",
            Some(json!({ "policyId": 10, "description": "Storm", "lossDate": "2024-03-01" })),
        )
        .await;
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/claims/{id}/assess"),
            Some(json!({ "decision": "APPROVED", "reason": "covered" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation");
    }

    #[tokio::test]
    async fn test_close_open_claim_is_conflict() {
        let world = world_with_policy().await;
        let app = app(&world);
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/v1/claims",
            Some(json!({ "policyId": 10, "description": "Theft", "lossDate": "2024-03-01" })),
        )
        .await;
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) =
            send(&app, Method::POST, &format!("/api/v1/claims/{id}/close"), None).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "invalid_state");
    }

    #[tokio::test]
    async fn test_claim_against_unknown_policy() {
        let world = TestWorld::new().await;

        let (status, body) = send(
            &app(&world),
            Method::POST,
            "/api/v1/claims",
            Some(json!({ "policyId": 999, "description": "Fire", "lossDate": "2024-03-01" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["message"].as_str().unwrap().contains("POL-999"));
    }
}

// ============================================================================
// POLICIES
// ============================================================================

mod policies {
    use super::*;

    #[tokio::test]
    async fn test_get_and_list_policies() {
        let world = TestWorld::new().await;
        world.quotes.insert_policy(PolicyBuilder::new(10).build()).await;
        let app = app(&world);

        let (status, body) = send(&app, Method::GET, "/api/v1/policies/10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 10);

        let (status, body) = send(&app, Method::GET, "/api/v1/policies?customer_id=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_policy_is_not_found() {
        let world = TestWorld::new().await;

        let (status, body) = send(&app(&world), Method::GET, "/api/v1/policies/5", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains(&PolicyId::new(5).to_string()));
    }
}
