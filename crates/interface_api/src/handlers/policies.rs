//! Policy handlers
//!
//! Policies are read-only here; they are issued by confirming a quote.

use axum::{extract::State, Json};

use core_kernel::{PolicyId, WorkflowError};
use domain_policy::{Policy, PolicyQuery};

use crate::extract::{AppPath, AppQuery};
use crate::{error::ApiError, AppState};

/// Lists policies
pub async fn list_policies(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PolicyQuery>,
) -> Result<Json<Vec<Policy>>, ApiError> {
    let policies = state
        .policies
        .find_policies(query, None)
        .await
        .map_err(|e| WorkflowError::from_port("policies", "list", e))?;
    Ok(Json(policies))
}

/// Gets a policy by ID
pub async fn get_policy(
    State(state): State<AppState>,
    AppPath(id): AppPath<PolicyId>,
) -> Result<Json<Policy>, ApiError> {
    let policy = state
        .policies
        .get_policy(id, None)
        .await
        .map_err(|e| WorkflowError::from_port(id, "get", e))?;
    Ok(Json(policy))
}
