//! Admin reporting routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use investa_core::ledger::LedgerError;
use investa_core::reports::{ReportQuery, UserReport};
use investa_shared::AppError;
use investa_shared::types::UserId;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the admin routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/users/{user_id}", get(user_report))
}

/// GET /admin/users/{user_id}?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD
async fn user_report(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(user_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<UserReport>, ApiError> {
    if !principal.is_staff {
        return Err(LedgerError::permission_denied().into());
    }
    let user_id = user_id
        .parse::<UserId>()
        .map_err(|_| AppError::Validation(format!("\"{user_id}\" is not a valid user id.")))?;
    Ok(Json(state.reports.report(&principal, user_id, &query).await?))
}
