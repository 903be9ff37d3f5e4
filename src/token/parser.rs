use std::{error::Error as StdError, fmt};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use super::{Claims, Token, TokenError};

pub type BoxError = Box<dyn StdError + Send + Sync>;

const ALL_ALGORITHMS: [Algorithm; 12] = [
    Algorithm::HS256,
    Algorithm::HS384,
    Algorithm::HS512,
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::EdDSA,
];

/// Supplies the verification key for a token.
///
/// Called once per request with the *unverified* token, so the header
/// (`kid`, `alg`) and claims (`iss`) can steer the lookup. Implementations are
/// shared across concurrent requests.
pub trait KeyResolver: Send + Sync + 'static {
    fn resolve(&self, token: &Token) -> Result<DecodingKey, BoxError>;
}

impl<F> KeyResolver for F
where
    F: Fn(&Token) -> Result<DecodingKey, BoxError> + Send + Sync + 'static,
{
    fn resolve(&self, token: &Token) -> Result<DecodingKey, BoxError> {
        self(token)
    }
}

/// The same key for every token.
#[derive(Clone)]
pub struct StaticKey(DecodingKey);

impl StaticKey {
    pub fn new(key: DecodingKey) -> Self {
        Self(key)
    }

    /// Shared-secret key for the HS* family.
    pub fn hmac(secret: impl AsRef<[u8]>) -> Self {
        Self(DecodingKey::from_secret(secret.as_ref()))
    }
}

impl fmt::Debug for StaticKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("StaticKey").finish_non_exhaustive()
    }
}

impl KeyResolver for StaticKey {
    fn resolve(&self, _token: &Token) -> Result<DecodingKey, BoxError> {
        Ok(self.0.clone())
    }
}

/// Validation used when the caller does not supply one.
///
/// - every algorithm is accepted; the key's family must still match
/// - no claim is required
/// - `exp` / `nbf` are checked only when present (60s leeway)
/// - `aud` / `iss` are not checked
pub fn default_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = ALL_ALGORITHMS.to_vec();
    validation.required_spec_claims.clear();
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation
}

/// Decodes a compact JWS and verifies it with `jsonwebtoken`.
#[derive(Clone)]
pub struct Parser {
    validation: Validation,
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("validation", &self.validation)
            .finish()
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(default_validation())
    }
}

impl Parser {
    /// `validation.algorithms` is the set of accepted header algorithms.
    pub fn new(validation: Validation) -> Self {
        Self { validation }
    }

    /// Parse and verify `raw`.
    ///
    /// Order: structure, accepted algorithm, key resolution, then signature
    /// and claims. The first failure wins.
    pub fn parse(&self, raw: &str, resolver: &dyn KeyResolver) -> Result<Token, TokenError> {
        let mut token = Self::decode_unverified(raw)?;

        let alg = token.header.alg;
        if !self.validation.algorithms.contains(&alg) {
            return Err(TokenError::AlgorithmNotAllowed(alg));
        }

        let key = resolver
            .resolve(&token)
            .map_err(|e| TokenError::KeyResolution(e.to_string()))?;

        // jsonwebtoken requires every listed algorithm to match the key family,
        // so verify against the header's algorithm alone.
        let mut validation = self.validation.clone();
        validation.algorithms = vec![alg];

        let data = jsonwebtoken::decode::<Claims>(raw, &key, &validation)?;

        token.claims = data.claims;
        token.valid = true;
        Ok(token)
    }

    /// Split and decode a token without checking anything cryptographic.
    pub fn decode_unverified(raw: &str) -> Result<Token, TokenError> {
        let segments: Vec<&str> = raw.split('.').collect();
        let [_, payload, signature] = segments.as_slice() else {
            return Err(TokenError::Malformed(
                "token contains an invalid number of segments".to_string(),
            ));
        };

        let header = jsonwebtoken::decode_header(raw)?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| TokenError::Malformed(format!("invalid claims encoding: {e}")))?;
        let claims: Claims = serde_json::from_slice(&bytes)
            .map_err(|e| TokenError::Malformed(format!("invalid claims: {e}")))?;

        Ok(Token {
            raw: raw.to_string(),
            header,
            claims,
            signature: signature.to_string(),
            valid: false,
        })
    }
}
