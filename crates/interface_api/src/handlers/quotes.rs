//! Quote handlers

use axum::{extract::State, http::StatusCode, Json};

use core_kernel::QuoteId;
use domain_policy::{Policy, Quote, QuoteQuery};

use crate::dto::quotes::*;
use crate::dto::CommandResponse;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::{error::ApiError, AppState};

/// Creates a Draft quote
pub async fn create_quote(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateQuoteBody>,
) -> Result<(StatusCode, Json<CommandResponse<Quote>>), ApiError> {
    let quote = state
        .quotes
        .create(body.customer_id, body.product_id, body.sum_assured, body.term_months)
        .await?;
    Ok((StatusCode::CREATED, Json(CommandResponse::new(quote, created_notice()))))
}

/// Lists quotes, optionally by customer and status
pub async fn list_quotes(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<QuoteQuery>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    Ok(Json(state.quotes.list(query).await?))
}

/// Gets a quote by ID
pub async fn get_quote(
    State(state): State<AppState>,
    AppPath(id): AppPath<QuoteId>,
) -> Result<Json<Quote>, ApiError> {
    Ok(Json(state.quotes.get(id).await?))
}

/// Changes the rated dimensions; the quote returns to Draft
pub async fn update_quote(
    State(state): State<AppState>,
    AppPath(id): AppPath<QuoteId>,
    AppJson(body): AppJson<UpdateQuoteBody>,
) -> Result<Json<CommandResponse<Quote>>, ApiError> {
    let quote = state.quotes.update(id, body.sum_assured, body.term_months).await?;
    Ok(Json(CommandResponse::new(quote, updated_notice())))
}

/// Removes a Draft quote
pub async fn delete_quote(
    State(state): State<AppState>,
    AppPath(id): AppPath<QuoteId>,
) -> Result<Json<CommandResponse<QuoteId>>, ApiError> {
    state.quotes.remove(id).await?;
    Ok(Json(CommandResponse::new(id, deleted_notice())))
}

pub async fn price_quote(
    State(state): State<AppState>,
    AppPath(id): AppPath<QuoteId>,
) -> Result<Json<CommandResponse<Quote>>, ApiError> {
    let quote = state.quotes.price(id).await?;
    let notice = priced_notice(&quote);
    Ok(Json(CommandResponse::new(quote, notice)))
}

/// Confirms a quote, pricing it first if needed
pub async fn confirm_quote(
    State(state): State<AppState>,
    AppPath(id): AppPath<QuoteId>,
) -> Result<Json<CommandResponse<Policy>>, ApiError> {
    let policy = state.quotes.confirm(id).await?;
    let notice = confirmed_notice(&policy);
    Ok(Json(CommandResponse::new(policy, notice)))
}

/// Prices each selected quote in order
pub async fn price_batch(
    State(state): State<AppState>,
    AppJson(body): AppJson<BatchRequest>,
) -> Json<BatchResponse<Quote>> {
    Json(state.quotes.price_each(body.ids).await.into())
}

/// Confirms each selected quote in order
pub async fn confirm_batch(
    State(state): State<AppState>,
    AppJson(body): AppJson<BatchRequest>,
) -> Json<BatchResponse<Policy>> {
    Json(state.quotes.confirm_each(body.ids).await.into())
}
