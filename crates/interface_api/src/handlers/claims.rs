//! Claims handlers

use axum::{extract::State, http::StatusCode, Json};

use core_kernel::ClaimId;
use domain_claims::{Assessment, Claim, ClaimQuery};

use crate::dto::claims::*;
use crate::dto::CommandResponse;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::{error::ApiError, AppState};

/// Files a claim against a policy
pub async fn create_claim(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateClaimBody>,
) -> Result<(StatusCode, Json<CommandResponse<Claim>>), ApiError> {
    let claim = state
        .claims
        .create(body.policy_id, body.description, body.loss_date)
        .await?;
    let notice = filed_notice(&claim);
    Ok((StatusCode::CREATED, Json(CommandResponse::new(claim, notice))))
}

/// Lists claims
pub async fn list_claims(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ClaimQuery>,
) -> Result<Json<Vec<Claim>>, ApiError> {
    Ok(Json(state.claims.list(query).await?))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    AppPath(id): AppPath<ClaimId>,
) -> Result<Json<Claim>, ApiError> {
    Ok(Json(state.claims.get(id).await?))
}

pub async fn update_claim(
    State(state): State<AppState>,
    AppPath(id): AppPath<ClaimId>,
    AppJson(body): AppJson<UpdateClaimBody>,
) -> Result<Json<CommandResponse<Claim>>, ApiError> {
    let claim = state
        .claims
        .update(id, body.description, body.loss_date)
        .await?;
    Ok(Json(CommandResponse::new(claim, updated_notice())))
}

/// Records an assessment decision
pub async fn assess_claim(
    State(state): State<AppState>,
    AppPath(id): AppPath<ClaimId>,
    AppJson(body): AppJson<Assessment>,
) -> Result<Json<CommandResponse<Claim>>, ApiError> {
    let claim = state
        .claims
        .assess(id, body.decision, body.approved_amount, body.reason)
        .await?;
    let notice = assessed_notice(&claim);
    Ok(Json(CommandResponse::new(claim, notice)))
}

pub async fn close_claim(
    State(state): State<AppState>,
    AppPath(id): AppPath<ClaimId>,
) -> Result<Json<CommandResponse<Claim>>, ApiError> {
    let claim = state.claims.close(id).await?;
    Ok(Json(CommandResponse::new(claim, closed_notice())))
}
