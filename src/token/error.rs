use jsonwebtoken::{Algorithm, errors::ErrorKind};
use thiserror::Error;

/// Why a request carries no usable token.
///
/// Every outcome other than a verified token lands here, including the
/// locator finding nothing at all (`Absent`). Consumers branch on the variant;
/// the detail strings are for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("no token present in request")]
    Absent,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("signing algorithm {0:?} is not accepted")]
    AlgorithmNotAllowed(Algorithm),

    #[error("key resolution failed: {0}")]
    KeyResolution(String),

    #[error("token could not be verified: {0}")]
    Unverifiable(String),

    #[error("signature is invalid")]
    SignatureInvalid,

    #[error("token is expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("token claims are invalid: {0}")]
    ClaimsInvalid(String),

    #[error("{0}")]
    Other(String),
}

impl TokenError {
    /// `true` when the request simply did not present a token.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Self::Malformed(e.to_string()),
            ErrorKind::InvalidSignature => Self::SignatureInvalid,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::MissingRequiredClaim(_) => Self::ClaimsInvalid(e.to_string()),
            // Key/algorithm family mismatch or unusable key material.
            ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingAlgorithm
            | ErrorKind::InvalidKeyFormat => Self::Unverifiable(e.to_string()),
            _ => Self::Other(e.to_string()),
        }
    }
}
