//! Parse-and-attach JWT middleware.
//!
//! For each request:
//! - locate the raw token (see [`crate::locator`])
//! - parse/verify it with the configured key resolver
//! - store the outcome as a [`TokenRecord`] in the request's [`ContextMap`]
//! - call the inner service, whatever the outcome
//!
//! Nothing is rejected here. Handlers (or a later layer) read the record and
//! decide. Parsing is synchronous and has no timeout of its own; a slow key
//! resolver stalls the request that called it.

use std::{
    fmt,
    sync::Arc,
    task::{Context, Poll},
};

use axum::http::{Request, request::Parts};
use jsonwebtoken::Validation;
use tower::{Layer, Service};

use crate::context::ContextMap;
use crate::locator::{AuthorizationHeader, TokenLocator};
use crate::token::{KeyResolver, Parser, TokenError, TokenRecord};

/// Tower layer that attaches a [`TokenRecord`] to every request.
///
/// ```no_run
/// use axum::{Router, routing::get};
/// use jwt_context::{ContextMap, JwtLayer, StaticKey};
///
/// async fn me(ctx: ContextMap) -> String {
///     let valid = ctx.token_record("jwt").is_some_and(|r| r.is_valid());
///     format!("valid: {valid}")
/// }
///
/// let app: Router = Router::new()
///     .route("/me", get(me))
///     .layer(JwtLayer::authorization_header("jwt", StaticKey::hmac("secret")));
/// ```
#[derive(Clone)]
pub struct JwtLayer {
    context_key: Arc<str>,
    resolver: Arc<dyn KeyResolver>,
    locator: Arc<dyn TokenLocator>,
    parser: Arc<Parser>,
}

impl fmt::Debug for JwtLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtLayer")
            .field("context_key", &self.context_key)
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

impl JwtLayer {
    /// Store the record under `context_key`, locating tokens with `locator`.
    pub fn new(
        context_key: impl Into<String>,
        resolver: impl KeyResolver,
        locator: impl TokenLocator,
    ) -> Self {
        Self {
            context_key: Arc::from(context_key.into()),
            resolver: Arc::new(resolver),
            locator: Arc::new(locator),
            parser: Arc::new(Parser::default()),
        }
    }

    /// Tokens from `Authorization: Bearer <token>`.
    pub fn authorization_header(context_key: impl Into<String>, resolver: impl KeyResolver) -> Self {
        Self::new(context_key, resolver, AuthorizationHeader)
    }

    /// Replace the default validation (accepted algorithms, leeway, iss/aud).
    #[must_use]
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.parser = Arc::new(Parser::new(validation));
        self
    }

    pub fn context_key(&self) -> &str {
        &self.context_key
    }

    fn attach(&self, parts: &mut Parts) {
        let mut ctx = parts.extensions.remove::<ContextMap>().unwrap_or_default();

        let record = match self.locator.locate(&ctx, parts) {
            Some(raw) if !raw.is_empty() => {
                TokenRecord::from(self.parser.parse(&raw, self.resolver.as_ref()))
            }
            _ => TokenRecord::absent(),
        };

        match record.as_result() {
            Ok(token) => tracing::trace!(
                context_key = %self.context_key,
                alg = ?token.header.alg,
                "token verified"
            ),
            Err(TokenError::Absent) => {
                tracing::debug!(context_key = %self.context_key, "no token in request")
            }
            Err(err) => tracing::debug!(
                context_key = %self.context_key,
                error = %err,
                "token rejected"
            ),
        }

        ctx.insert(&*self.context_key, record);
        parts.extensions.insert(ctx);
    }
}

impl<S> Layer<S> for JwtLayer {
    type Service = JwtService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        JwtService {
            inner,
            layer: self.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct JwtService<S> {
    inner: S,
    layer: JwtLayer,
}

impl<S, B> Service<Request<B>> for JwtService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let (mut parts, body) = request.into_parts();
        self.layer.attach(&mut parts);
        self.inner.call(Request::from_parts(parts, body))
    }
}
