use super::model::{AuthenticatedUser, Claims};
use crate::core::error::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use uuid::Uuid;

/// Verifies HS256 bearer tokens signed with the shared secret
pub struct JwtValidator {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    leeway: u64,
}

impl JwtValidator {
    pub fn new(secret: &str, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(format!("Could not validate credentials: {}", e)))?;

        let claims = token_data.claims;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Auth("Token subject is not a valid user id".to_string()))?;

        Ok(AuthenticatedUser {
            user_id,
            roles: claims.roles,
        })
    }

    /// Signs an access token for `user_id`
    pub fn issue_token(
        &self,
        user_id: Uuid,
        roles: Vec<String>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + ttl.as_secs(),
            iat: Some(now),
            roles,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }
}
