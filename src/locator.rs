//! Where a request's raw token comes from.
//!
//! A locator only finds a candidate string; it never validates it. `None` (or
//! an empty string) means the request carries no token.

use axum::http::{header, request::Parts};

use crate::context::ContextMap;

pub trait TokenLocator: Send + Sync + 'static {
    fn locate(&self, ctx: &ContextMap, parts: &Parts) -> Option<String>;

    /// Try `other` when `self` finds nothing.
    fn or<L>(self, other: L) -> Or<Self, L>
    where
        Self: Sized,
        L: TokenLocator,
    {
        Or(self, other)
    }
}

impl<F> TokenLocator for F
where
    F: Fn(&ContextMap, &Parts) -> Option<String> + Send + Sync + 'static,
{
    fn locate(&self, ctx: &ContextMap, parts: &Parts) -> Option<String> {
        self(ctx, parts)
    }
}

/// `Authorization: Bearer <token>`; the scheme is matched case-insensitively.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationHeader;

impl TokenLocator for AuthorizationHeader {
    fn locate(&self, _ctx: &ContextMap, parts: &Parts) -> Option<String> {
        let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        bearer_token(value).map(str::to_owned)
    }
}

/// The credential of a `Bearer` authorization value.
///
/// Exactly one space separates scheme and token; the token is returned as-is.
pub fn bearer_token(value: &str) -> Option<&str> {
    let scheme = value.get(..6)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = value.get(6..)?.strip_prefix(' ')?;
    (!token.is_empty()).then_some(token)
}

/// A URL query parameter, e.g. `?access_token=...`.
#[derive(Debug, Clone)]
pub struct QueryParameter(String);

impl QueryParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl TokenLocator for QueryParameter {
    fn locate(&self, _ctx: &ContextMap, parts: &Parts) -> Option<String> {
        let query = parts.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| name == self.0.as_str())
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }
}

/// A cookie, searched across every `Cookie` header.
#[derive(Debug, Clone)]
pub struct Cookie(String);

impl Cookie {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl TokenLocator for Cookie {
    fn locate(&self, _ctx: &ContextMap, parts: &Parts) -> Option<String> {
        parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.0)
            .map(|(_, value)| unquote(value).to_owned())
            .filter(|value| !value.is_empty())
    }
}

// RFC 6265 allows one pair of double quotes around a cookie value
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// First non-empty result of two locators.
#[derive(Debug, Clone)]
pub struct Or<A, B>(A, B);

impl<A, B> TokenLocator for Or<A, B>
where
    A: TokenLocator,
    B: TokenLocator,
{
    fn locate(&self, ctx: &ContextMap, parts: &Parts) -> Option<String> {
        self.0
            .locate(ctx, parts)
            .filter(|token| !token.is_empty())
            .or_else(|| self.1.locate(ctx, parts))
    }
}
