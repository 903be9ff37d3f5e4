//! Bearer-token parsing middleware for axum/tower.
//!
//! [`JwtLayer`] finds a token in each request, verifies it with a
//! caller-supplied [`KeyResolver`], and records the outcome in the request's
//! [`ContextMap`]. It never rejects a request; handlers inspect the
//! [`TokenRecord`] and apply their own policy.
//!
//! ```no_run
//! use axum::{Router, routing::get};
//! use jwt_context::{ContextMap, JwtLayer, StaticKey};
//!
//! async fn me(ctx: ContextMap) -> String {
//!     match ctx.token_record("jwt").and_then(|r| r.token()) {
//!         Some(token) => format!("hello {:?}", token.subject()),
//!         None => "anonymous".to_string(),
//!     }
//! }
//!
//! let app: Router = Router::new()
//!     .route("/me", get(me))
//!     .layer(JwtLayer::authorization_header("jwt", StaticKey::hmac("secret")));
//! ```

pub mod context;
pub mod locator;
pub mod middleware;
pub mod token;

pub use context::ContextMap;
pub use locator::{AuthorizationHeader, Cookie, QueryParameter, TokenLocator};
pub use middleware::{JwtLayer, JwtService};
pub use token::{
    BoxError, Claims, KeyResolver, Parser, StaticKey, Token, TokenError, TokenRecord,
    default_validation,
};
