/*
 * Responsibility
 * - Read the demo server's settings from the environment (PORT, JWT_* ...)
 * - Validate them up front (missing or contradictory values fail startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

// jsonwebtoken adds/subtracts the leeway from the current time unchecked
const MAX_LEEWAY_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    Conflict(&'static str, &'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::Conflict(a, b) => write!(f, "{} and {} are mutually exclusive", a, b),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Verification key material.
#[derive(Clone, PartialEq, Eq)]
pub enum KeyConfig {
    /// HS256/HS384/HS512 shared secret.
    Hmac { secret: String },
    /// PEM public key for a single asymmetric algorithm.
    PublicKey { algorithm: Algorithm, pem: String },
}

impl fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            KeyConfig::Hmac { .. } => f.write_str("Hmac"),
            KeyConfig::PublicKey { algorithm, .. } => {
                f.debug_struct("PublicKey").field("algorithm", algorithm).finish()
            }
        }
    }
}

impl KeyConfig {
    /// Algorithms a token may declare for this key.
    pub fn algorithms(&self) -> Vec<Algorithm> {
        match self {
            KeyConfig::Hmac { .. } => vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512],
            KeyConfig::PublicKey { algorithm, .. } => vec![*algorithm],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub context_key: String,
    pub key: KeyConfig,
    pub leeway_seconds: u64,
    pub issuer: Option<String>,
    pub audience: Option<String>,

    // Extra places to look for a token after the Authorization header
    pub query_param: Option<String>,
    pub cookie: Option<String>,

    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match non_empty("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let context_key = non_empty("JWT_CONTEXT_KEY").unwrap_or_else(|| "jwt".to_string());

        let key = match (non_empty("JWT_HMAC_SECRET"), non_empty("JWT_PUBLIC_KEY_PEM")) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Conflict("JWT_HMAC_SECRET", "JWT_PUBLIC_KEY_PEM"));
            }
            (Some(secret), None) => KeyConfig::Hmac { secret },
            (None, Some(pem)) => {
                let algorithm = non_empty("JWT_ALGORITHM")
                    .ok_or(ConfigError::Missing("JWT_ALGORITHM"))?
                    .parse::<Algorithm>()
                    .map_err(|_| ConfigError::Invalid("JWT_ALGORITHM"))?;
                if matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
                    return Err(ConfigError::Invalid("JWT_ALGORITHM"));
                }
                KeyConfig::PublicKey {
                    algorithm,
                    pem: pem.replace("\\n", "\n"),
                }
            }
            (None, None) => return Err(ConfigError::Missing("JWT_HMAC_SECRET")),
        };

        let leeway_seconds = match non_empty("JWT_LEEWAY_SECONDS") {
            Some(v) => v
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs <= MAX_LEEWAY_SECONDS)
                .ok_or(ConfigError::Invalid("JWT_LEEWAY_SECONDS"))?,
            None => 60,
        };

        let request_timeout = match non_empty("HTTP_TIMEOUT_SECONDS") {
            Some(v) => v
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("HTTP_TIMEOUT_SECONDS"))?,
            None => Duration::from_secs(30),
        };

        let body_limit_bytes = match non_empty("HTTP_BODY_LIMIT_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid("HTTP_BODY_LIMIT_BYTES"))?,
            None => 1024 * 1024,
        };

        Ok(Self {
            addr,
            app_env,
            context_key,
            key,
            leeway_seconds,
            issuer: non_empty("JWT_ISSUER"),
            audience: non_empty("JWT_AUDIENCE"),
            query_param: non_empty("JWT_QUERY_PARAM"),
            cookie: non_empty("JWT_COOKIE"),
            request_timeout,
            body_limit_bytes,
        })
    }
}
