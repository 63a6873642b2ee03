//! Validation of the access tokens the authentication provider issues.
//!
//! Tokens are HS256 with the user's profile id as `sub`. This service never
//! mints them; it only needs to learn who, if anyone, is signed in.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use hotspot_core::types::DbId;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's profile id.
    pub sub: DbId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Token id assigned by the issuer.
    pub jti: String,
}

/// Clock skew tolerated on `exp`, in seconds.
const DEFAULT_LEEWAY_SECS: u64 = 60;

/// Shared-secret settings for token validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the issuer.
    pub secret: String,
    /// Clock skew tolerated when checking expiry.
    pub leeway_secs: u64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required) and `JWT_LEEWAY_SECS` (default `60`).
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is unset or empty, or the leeway is not a
    /// number.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let leeway_secs = std::env::var("JWT_LEEWAY_SECS")
            .map(|v| v.parse().expect("JWT_LEEWAY_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_LEEWAY_SECS);

        Self {
            secret,
            leeway_secs,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        validation
    }
}

/// Check signature and expiry, returning the embedded [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

    fn config(leeway_secs: u64) -> JwtConfig {
        JwtConfig {
            secret: SECRET.to_string(),
            leeway_secs,
        }
    }

    /// Sign a token for `sub` expiring `expires_in` seconds from now.
    fn sign(sub: DbId, expires_in: i64, secret: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub,
            exp: now + expires_in,
            iat: now,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encoding should succeed")
    }

    #[test]
    fn valid_token_yields_subject() {
        let claims = validate_token(&sign(42, 900, SECRET), &config(60))
            .expect("token validation should succeed");
        assert_eq!(claims.sub, 42);
    }

    #[test]
    fn expired_token_is_rejected() {
        assert!(validate_token(&sign(1, -300, SECRET), &config(60)).is_err());
    }

    #[test]
    fn leeway_covers_small_skew() {
        let token = sign(1, -30, SECRET);
        assert!(validate_token(&token, &config(60)).is_ok());
        assert!(validate_token(&token, &config(0)).is_err());
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = sign(1, 900, "some-other-secret");
        assert!(validate_token(&token, &config(60)).is_err());
    }
}
