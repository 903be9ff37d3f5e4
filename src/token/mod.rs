//! Parsed tokens and the per-request result record.
//!
//! - `Token` is what the parser hands to key resolvers (unverified) and to
//!   downstream handlers (verified).
//! - `TokenRecord` is the value the middleware stores in the `ContextMap`.

mod error;
mod parser;

use chrono::{DateTime, Utc};
use jsonwebtoken::Header;
use serde_json::{Map, Value};

pub use error::TokenError;
pub use parser::{BoxError, KeyResolver, Parser, StaticKey, default_validation};

/// Claims carried by a token, keyed by claim name.
pub type Claims = Map<String, Value>;

/// A decoded JWT.
///
/// `valid` is only `true` once the signature and time-based claims have been
/// checked. Key resolvers always see `valid == false`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub raw: String,
    pub header: Header,
    pub claims: Claims,
    pub signature: String,
    pub valid: bool,
}

impl Token {
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// `sub` when it is a string.
    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    /// `kid` from the header, the usual input for key lookup.
    pub fn key_id(&self) -> Option<&str> {
        self.header.kid.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.numeric_date("exp")
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.numeric_date("nbf")
    }

    fn numeric_date(&self, name: &str) -> Option<DateTime<Utc>> {
        let secs = self.claims.get(name)?.as_f64()?;
        DateTime::from_timestamp(secs as i64, 0)
    }
}

/// Outcome of locating and parsing a request's token.
///
/// Always present in the context after the middleware ran; a failure is
/// recorded, never skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord(Result<Token, TokenError>);

impl TokenRecord {
    pub fn absent() -> Self {
        Self(Err(TokenError::Absent))
    }

    pub fn token(&self) -> Option<&Token> {
        self.0.as_ref().ok()
    }

    pub fn error(&self) -> Option<&TokenError> {
        self.0.as_ref().err()
    }

    /// `true` for a verified token.
    pub fn is_valid(&self) -> bool {
        self.token().is_some_and(|t| t.valid)
    }

    pub fn as_result(&self) -> Result<&Token, &TokenError> {
        self.0.as_ref()
    }

    pub fn into_result(self) -> Result<Token, TokenError> {
        self.0
    }
}

impl From<Result<Token, TokenError>> for TokenRecord {
    fn from(result: Result<Token, TokenError>) -> Self {
        Self(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_with(claims: Value) -> Token {
        let Value::Object(claims) = claims else {
            panic!("claims must be an object");
        };
        Token {
            raw: "a.b.c".to_string(),
            header: Header::default(),
            claims,
            signature: "c".to_string(),
            valid: true,
        }
    }

    #[test]
    fn claim_accessors() {
        let token = token_with(json!({
            "sub": "user-1",
            "exp": 1_700_000_000,
            "nbf": 1_600_000_000,
            "admin": true,
        }));

        assert_eq!(token.subject(), Some("user-1"));
        assert_eq!(token.claim("admin"), Some(&json!(true)));
        assert_eq!(token.expires_at().map(|t| t.timestamp()), Some(1_700_000_000));
        assert_eq!(token.not_before().map(|t| t.timestamp()), Some(1_600_000_000));
        assert_eq!(token.key_id(), None);
    }

    #[test]
    fn numeric_subject_is_not_a_string_subject() {
        let token = token_with(json!({ "sub": 1234567890 }));
        assert_eq!(token.subject(), None);
        assert_eq!(token.claim("sub"), Some(&json!(1234567890)));
    }

    #[test]
    fn record_accessors() {
        let ok = TokenRecord::from(Ok(token_with(json!({}))));
        assert!(ok.is_valid());
        assert!(ok.token().is_some());
        assert!(ok.error().is_none());

        let absent = TokenRecord::absent();
        assert!(!absent.is_valid());
        assert!(absent.token().is_none());
        assert_eq!(absent.error(), Some(&TokenError::Absent));
        assert_eq!(absent.into_result(), Err(TokenError::Absent));
    }
}
