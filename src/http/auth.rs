use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::http::AppError;
use crate::AppState;

/// Caller identity resolved from an opaque, pre-verified session token.
/// Token issuance and verification live in the auth service; this
/// extractor only maps token -> user id.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("invalid Authorization header"))?;

        let user_id: Option<i64> =
            sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = $1")
                .bind(token)
                .fetch_optional(state.db.pool())
                .await
                .map_err(|err| {
                    tracing::error!(error = ?err, "failed to resolve session");
                    AppError::internal("failed to resolve session")
                })?;

        let user_id = user_id.ok_or_else(|| AppError::unauthorized("invalid token"))?;
        Ok(AuthUser { user_id })
    }
}
