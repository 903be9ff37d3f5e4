//! Transport layers wrapped around the whole router.
//!
//! Every request gets an `x-request-id` (kept if the client sent one) which is
//! echoed on the response and recorded on the access-log span. The span logs
//! the path only: tokens may arrive in the query string.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::http::{Request, StatusCode, header::HeaderName};
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::config::Config;

pub const REQUEST_ID: &str = "x-request-id";

#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    /// Bounds the whole request, handler included. Token parsing runs
    /// synchronously inside the JWT layer and is not preempted by it.
    pub timeout: Duration,
    pub body_limit: usize,
}

impl From<&Config> for HttpLimits {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.request_timeout,
            body_limit: config.body_limit_bytes,
        }
    }
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

async fn timeout_or_internal(err: BoxError) -> StatusCode {
    if err.is::<Elapsed>() {
        StatusCode::REQUEST_TIMEOUT
    } else {
        tracing::error!(error = %err, "unhandled service error");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub fn apply(router: Router, limits: HttpLimits) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID);

    // The span is opened after the id is assigned, and before the body
    // limit rewraps the request body.
    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(timeout_or_internal))
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(RequestBodyLimitLayer::new(limits.body_limit))
        .layer(TimeoutLayer::new(limits.timeout));

    router.layer(layers)
}
