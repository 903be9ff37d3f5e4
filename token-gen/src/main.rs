use std::{fs, path::PathBuf};

use clap::Parser;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Map, Value};

/// Mint a JWT for exercising the jwt-context server.
///
/// - HS* tokens are signed with `--secret`
/// - RS*/PS*/ES*/EdDSA tokens with a PKCS#8 PEM private key (`--private-pem`)
/// - Prints the token and the claims that went into it
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Signing algorithm, e.g. HS256, RS256, ES256, EdDSA
    #[arg(long, default_value = "HS256")]
    alg: Algorithm,

    /// Shared secret (HS256/HS384/HS512)
    #[arg(long, conflicts_with = "private_pem")]
    secret: Option<String>,

    /// Private key in PEM (RS*/PS*/ES*/EdDSA)
    #[arg(long, value_name = "FILE")]
    private_pem: Option<PathBuf>,

    /// Header `kid`
    #[arg(long)]
    kid: Option<String>,

    #[arg(long)]
    sub: Option<String>,

    #[arg(long)]
    iss: Option<String>,

    #[arg(long)]
    aud: Option<String>,

    /// Lifetime in seconds; 0 omits `exp`
    #[arg(long, default_value_t = 3600)]
    ttl: i64,

    /// Extra claim as key=value (value parsed as JSON, else taken as a string). Repeatable.
    #[arg(long = "claim", value_name = "KEY=VALUE", value_parser = parse_claim)]
    claims: Vec<(String, Value)>,

    /// Print only the token
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn parse_claim(input: &str) -> Result<(String, Value), String> {
    let (key, raw) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {input:?}"))?;
    if key.is_empty() {
        return Err("claim name must not be empty".to_string());
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn is_hmac(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

fn encoding_key(args: &Args) -> Result<EncodingKey, Box<dyn std::error::Error>> {
    if is_hmac(args.alg) {
        let secret = args.secret.as_deref().ok_or("--secret is required for HS*")?;
        return Ok(EncodingKey::from_secret(secret.as_bytes()));
    }

    let path = args
        .private_pem
        .as_ref()
        .ok_or("--private-pem is required for asymmetric algorithms")?;
    let pem = fs::read(path)?;

    let key = match args.alg {
        Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(&pem)?,
        Algorithm::EdDSA => EncodingKey::from_ed_pem(&pem)?,
        _ => EncodingKey::from_rsa_pem(&pem)?,
    };
    Ok(key)
}

fn build_claims(args: &Args, now: i64) -> Map<String, Value> {
    let mut claims = Map::new();

    for (name, value) in [("sub", &args.sub), ("iss", &args.iss), ("aud", &args.aud)] {
        if let Some(value) = value {
            claims.insert(name.to_string(), Value::String(value.clone()));
        }
    }

    claims.insert("iat".to_string(), Value::Number(now.into()));
    if args.ttl > 0 {
        claims.insert("exp".to_string(), Value::Number((now + args.ttl).into()));
    }

    // Explicit --claim values win over the flags above.
    for (name, value) in &args.claims {
        claims.insert(name.clone(), value.clone());
    }

    claims
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let key = encoding_key(&args)?;

    let mut header = Header::new(args.alg);
    header.kid = args.kid.clone();

    let claims = build_claims(&args, chrono::Utc::now().timestamp());
    let token = jsonwebtoken::encode(&header, &claims, &key)?;

    if args.quiet {
        println!("{}", token);
        return Ok(());
    }

    println!("token: {}", token);
    println!("claims: {}", Value::Object(claims));
    println!("header: Authorization: Bearer {}", token);

    Ok(())
}
