//! Registration, login and token refresh.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use investa_core::auth::{PublicUser, RegisterUser};
use investa_shared::auth::{LoginRequest, RefreshRequest};
use investa_shared::types::UserId;
use investa_shared::{TokenKind, TokenPair};
use tracing::info;

use crate::{AppState, error::ApiError, extractors::JsonBody};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/login", post(login))
        .route("/token/refresh", post(refresh))
}

/// POST /users - Register a new user.
async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterUser>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let user = state.users.register(payload).await?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

/// POST /login - Authenticate and return a token pair.
async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let user = state
        .users
        .authenticate(&payload.username, &payload.password)
        .await?;
    let pair = state
        .jwt_service
        .issue_pair(user.id.into_inner(), &user.username)?;

    info!(user_id = %user.id, "User logged in successfully");
    Ok(Json(pair))
}

/// POST /token/refresh - Exchange a refresh token for a new pair.
async fn refresh(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let claims = state
        .jwt_service
        .validate_kind(&payload.refresh_token, TokenKind::Refresh)?;
    let user = state
        .users
        .find_active(UserId::from_uuid(claims.user_id()))
        .await?;

    Ok(Json(
        state
            .jwt_service
            .issue_pair(user.id.into_inner(), &user.username)?,
    ))
}
