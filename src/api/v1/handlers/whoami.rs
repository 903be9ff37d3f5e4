/*
 * Responsibility
 * - GET /whoami
 * - Policy lives here, not in the JWT layer: a valid token → 200 + claims,
 *   anything else → 401
 */
use axum::{Json, extract::State};
use jwt_context::{ContextMap, TokenError};

use crate::{api::v1::dto::whoami::WhoamiResponse, error::AppError, state::AppState};

pub async fn whoami(
    State(state): State<AppState>,
    ctx: ContextMap,
) -> Result<Json<WhoamiResponse>, AppError> {
    let Some(record) = ctx.token_record(state.context_key()) else {
        // JWT layer not applied to this route
        tracing::error!(context_key = state.context_key(), "token record missing");
        return Err(AppError::Internal);
    };

    let token = match record.as_result() {
        Ok(token) => token,
        Err(TokenError::Absent) => return Err(AppError::Unauthorized),
        Err(err) => {
            tracing::warn!(error = %err, "rejecting request with unusable token");
            return Err(AppError::Unauthorized);
        }
    };

    Ok(Json(WhoamiResponse {
        subject: token.subject().map(str::to_owned),
        algorithm: format!("{:?}", token.header.alg),
        expires_at: token.expires_at().map(|t| t.to_rfc3339()),
        claims: token.claims.clone(),
    }))
}
