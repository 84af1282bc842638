use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Bearer token payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User email at the time of login.
    pub sub: String,
    pub uid: i32,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a token for `user_id` that expires `ttl_hours` from now.
pub fn sign(user_id: i32, email: &str, secret: &str, ttl_hours: i64) -> Result<String> {
    let issued = Utc::now();
    let expires = issued
        .checked_add_signed(Duration::hours(ttl_hours))
        .context("token expiry out of range")?;

    let claims = Claims {
        sub: email.to_owned(),
        uid: user_id,
        iat: issued.timestamp(),
        exp: expires.timestamp(),
    };
    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("failed to encode token")
}

/// Check signature and expiry, returning the claims on success.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(ALGORITHM);
    validation.set_required_spec_claims(&["exp", "sub"]);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}
