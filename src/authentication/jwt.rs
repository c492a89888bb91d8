use chrono::Duration;
use chrono::Utc;
use hmac::{Hmac, Mac};
use jwt::SignWithKey;
use jwt::VerifyWithKey;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;

use crate::database::error::ApiError;
use crate::database::schema::{User, Uuid};

const INVALID_TOKEN: &str = "Invalid token.";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: String,
    iat: i64,
    exp: i64,
}

impl TokenClaims {
    pub fn new(id: Uuid, email: String, lifetime: Duration) -> Self {
        let now = Utc::now();
        let iat = now.timestamp();
        let exp = (now + lifetime).timestamp();

        Self {
            user_id: id,
            email,
            iat,
            exp,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

/// Signing key and token lifetime shared by the token endpoint and the
/// authentication filter.
#[derive(Clone)]
pub struct AuthKeys {
    key: Hmac<Sha256>,
    lifetime: Duration,
}

impl AuthKeys {
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, ApiError> {
        let key = Hmac::new_from_slice(secret)
            .map_err(|e| ApiError::Internal(format!("invalid signing key: {e}")))?;

        Ok(Self { key, lifetime })
    }

    pub fn generate_token(&self, user: &User) -> Result<String, ApiError> {
        let claims = TokenClaims::new(user.id, user.email.to_owned(), self.lifetime);

        claims
            .sign_with_key(&self.key)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
    }

    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, ApiError> {
        let claims: TokenClaims = token
            .verify_with_key(&self.key)
            .map_err(|_| ApiError::AuthenticationFailed(INVALID_TOKEN))?;

        if claims.is_expired() {
            return Err(ApiError::AuthenticationFailed(INVALID_TOKEN));
        }

        Ok(claims)
    }
}
