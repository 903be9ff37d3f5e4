use jwt_context::Claims;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    pub subject: Option<String>,
    pub algorithm: String,
    pub expires_at: Option<String>,
    pub claims: Claims,
}
