use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Display name
    pub uid: Uuid,   // Account ID
    pub exp: usize,  // Expiration timestamp
}

/// Sign a session token for an account.
pub fn sign(account_id: Uuid, username: &str, secret: &str, ttl_days: i64) -> Result<String> {
    let expiration = (Utc::now() + Duration::days(ttl_days)).timestamp();

    let claims = Claims {
        sub: username.to_owned(),
        uid: account_id,
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a session token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
