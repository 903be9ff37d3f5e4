/*
 * Responsibility
 * - v1 URL structure
 * - The JWT layer is applied by the caller (app.rs) to everything returned here;
 *   each handler decides what to do with the token record
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{health::health, whoami::whoami};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/whoami", get(whoami))
}
