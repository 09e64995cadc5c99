use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};

/// Session claims carried in `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,        // users.id
    pub email: String,
    pub is_admin: bool,
    pub exp: i64,        // expiration timestamp
}

/// Signs a session token for `user_id`, valid for `ttl`.
pub fn generate_token(
    secret: &str,
    user_id: i32,
    email: &str,
    is_admin: bool,
    ttl: Duration,
) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        is_admin,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
        .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Checks the signature and expiry and returns the claims.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid token: {}", e))
}
