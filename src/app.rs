/*
 * Responsibility
 * - Config → JwtLayer → Router
 * - Apply HTTP-level middleware
 * - Serve with axum::serve()
 */
mod http;

use anyhow::{Context as _, Result};
use axum::{Router, http::request::Parts};
use jsonwebtoken::{Algorithm, DecodingKey};
use jwt_context::{
    AuthorizationHeader, ContextMap, Cookie, JwtLayer, QueryParameter, StaticKey, TokenLocator,
    default_validation,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::{AppEnv, Config, KeyConfig},
    state::AppState,
};

use self::http::HttpLimits;

/// Default filter when RUST_LOG is unset. Rejected tokens are logged at
/// debug by `jwt_context`, so development shows them.
fn default_filter(app_env: AppEnv) -> &'static str {
    if app_env.is_production() {
        "info"
    } else {
        "info,jwt_context=debug,tower_http=debug"
    }
}

fn init_tracing(app_env: AppEnv) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(app_env)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(!app_env.is_production()))
        .init();
}

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.app_env);

    tracing::info!(
        context_key = %config.context_key,
        key = ?config.key,
        leeway = config.leeway_seconds,
        timeout = ?config.request_timeout,
        "starting in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let jwt = build_jwt_layer(&config)?;
    let app = build_router(jwt, HttpLimits::from(&config));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(jwt: JwtLayer, limits: HttpLimits) -> Router {
    // Handlers look the record up under the same key the layer writes it to
    let state = AppState::new(jwt.context_key());
    let router = Router::new()
        .nest("/api/v1", api::v1::routes().layer(jwt))
        .with_state(state);

    http::apply(router, limits)
}

pub(crate) fn build_jwt_layer(config: &Config) -> Result<JwtLayer> {
    let key = match &config.key {
        KeyConfig::Hmac { secret } => DecodingKey::from_secret(secret.as_bytes()),
        KeyConfig::PublicKey { algorithm, pem } => decoding_key_from_pem(*algorithm, pem)
            .context("JWT_PUBLIC_KEY_PEM does not match JWT_ALGORITHM")?,
    };

    let mut validation = default_validation();
    validation.algorithms = config.key.algorithms();
    validation.leeway = config.leeway_seconds;
    if let Some(issuer) = &config.issuer {
        validation.set_issuer(&[issuer]);
    }
    if let Some(audience) = &config.audience {
        validation.set_audience(&[audience]);
        validation.validate_aud = true;
    }

    let query = config.query_param.clone().map(QueryParameter::new);
    let cookie = config.cookie.clone().map(Cookie::new);
    let locator = move |ctx: &ContextMap, parts: &Parts| {
        AuthorizationHeader
            .locate(ctx, parts)
            .or_else(|| query.as_ref()?.locate(ctx, parts))
            .or_else(|| cookie.as_ref()?.locate(ctx, parts))
    };

    Ok(
        JwtLayer::new(config.context_key.clone(), StaticKey::new(key), locator)
            .with_validation(validation),
    )
}

fn decoding_key_from_pem(
    algorithm: Algorithm,
    pem: &str,
) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
    match algorithm {
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem.as_bytes()),
        Algorithm::EdDSA => DecodingKey::from_ed_pem(pem.as_bytes()),
        _ => DecodingKey::from_rsa_pem(pem.as_bytes()),
    }
}
