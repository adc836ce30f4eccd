//! JWT access tokens
//!
//! Session-less by design: a token carries the user id and role, and a
//! request is authenticated by signature and expiry alone. There is no
//! server-side session or revocation list.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use petbridge::{Error, Result};

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (hex ObjectId)
    pub sub: String,
    /// "owner" or "carer"
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl TokenManager {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    /// Sign a token for a user
    pub fn issue(&self, user_id: &str, role: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.ttl_hours)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a token's signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| Error::Unauthorized("Invalid or expired token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let manager = TokenManager::new("test-secret", 24);
        let token = manager.issue("507f1f77bcf86cd799439011", "owner").unwrap();
        let claims = manager.verify(&token).unwrap();
        assert_eq!(claims.sub, "507f1f77bcf86cd799439011");
        assert_eq!(claims.role, "owner");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let issuer = TokenManager::new("secret-a", 24);
        let verifier = TokenManager::new("secret-b", 24);
        let token = issuer.issue("u1", "carer").unwrap();
        assert!(matches!(verifier.verify(&token), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_rejects_expired_token() {
        // Negative TTL produces a token that is already expired
        let manager = TokenManager::new("test-secret", -1);
        let token = manager.issue("u1", "owner").unwrap();
        assert!(matches!(manager.verify(&token), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        let manager = TokenManager::new("test-secret", 24);
        assert!(manager.verify("not-a-token").is_err());
    }
}
