//! Investment account routes.
//!
//! Account identifiers are taken from the path as raw strings; a malformed
//! identifier is answered with 403, the same as a policy denial.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use investa_core::account::{AccountDetail, AccountUpdateRequest, InvestmentAccount, NewAccountRequest};
use investa_core::policy::parse_account_id;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError, extractors::JsonBody, middleware::AuthUser};

/// Confirmation returned by a successful delete.
pub const DELETED_MESSAGE: &str = "Successfully deleted";

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account))
        .route(
            "/accounts/{account_id}",
            get(get_account).put(update_account).delete(delete_account),
        )
}

/// POST /accounts
async fn create_account(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(payload): JsonBody<NewAccountRequest>,
) -> Result<(StatusCode, Json<InvestmentAccount>), ApiError> {
    let account = state.accounts.create(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /accounts/{account_id}
async fn get_account(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(account_id): Path<String>,
) -> Result<Json<AccountDetail>, ApiError> {
    let id = parse_account_id(&account_id)?;
    Ok(Json(state.accounts.read(&principal, id).await?))
}

/// PUT /accounts/{account_id}
async fn update_account(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(account_id): Path<String>,
    JsonBody(payload): JsonBody<AccountUpdateRequest>,
) -> Result<Json<InvestmentAccount>, ApiError> {
    let id = parse_account_id(&account_id)?;
    Ok(Json(state.accounts.update(&principal, id, payload).await?))
}

/// DELETE /accounts/{account_id}
async fn delete_account(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(account_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_account_id(&account_id)?;
    state.accounts.delete(&principal, id).await?;
    Ok(Json(json!({ "message": DELETED_MESSAGE })))
}
