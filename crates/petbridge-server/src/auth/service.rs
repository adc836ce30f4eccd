//! Registration and login over the owners/carers collections
//!
//! There is no separate accounts collection: an account IS an owner or
//! carer document, and the role in the token decides which collection a
//! user lives in.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use mongodb::bson::doc;
use serde::Deserialize;
use validator::Validate;

use petbridge::db::{collections, MongoDb};
use petbridge::models::{Carer, Owner};
use petbridge::{Error, Result};

/// Account roles
pub mod roles {
    pub const OWNER: &str = "owner";
    pub const CARER: &str = "carer";
}

pub fn validate_role(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if value == roles::OWNER || value == roles::CARER {
        Ok(())
    } else {
        Err(validator::ValidationError::new("unknown_role"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 200))]
    pub password: String,
    #[serde(rename = "displayName")]
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Authenticated account resolved by email
pub struct Account {
    pub user_id: String,
    pub role: String,
    pub display_name: String,
    pub email: String,
}

pub struct AuthService {
    db: MongoDb,
}

impl AuthService {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    /// Create an owner or carer account. Email uniqueness is checked across
    /// both collections; the partial unique index backs this up per
    /// collection.
    pub async fn register(&self, req: RegisterRequest) -> Result<Account> {
        req.validate()?;
        let email = req.email.trim().to_lowercase();

        if self.email_exists(&email).await? {
            return Err(Error::EmailTaken { email });
        }

        let password_hash = hash_password(&req.password)?;

        let user_id = match req.role.as_str() {
            roles::OWNER => {
                let owner = Owner::new(&email, &password_hash, &req.display_name);
                let result = self
                    .db
                    .collection::<Owner>(collections::OWNERS)
                    .insert_one(&owner, None)
                    .await?;
                result
                    .inserted_id
                    .as_object_id()
                    .ok_or_else(|| Error::Internal("Insert returned no id".to_string()))?
                    .to_hex()
            }
            _ => {
                let carer = Carer::new(&email, &password_hash, &req.display_name);
                let result = self
                    .db
                    .collection::<Carer>(collections::CARERS)
                    .insert_one(&carer, None)
                    .await?;
                result
                    .inserted_id
                    .as_object_id()
                    .ok_or_else(|| Error::Internal("Insert returned no id".to_string()))?
                    .to_hex()
            }
        };

        tracing::info!("Registered {} account for {}", req.role, email);

        Ok(Account {
            user_id,
            role: req.role,
            display_name: req.display_name,
            email,
        })
    }

    /// Verify credentials, probing owners first, then carers
    pub async fn login(&self, req: LoginRequest) -> Result<Account> {
        req.validate()?;
        let email = req.email.trim().to_lowercase();
        let filter = doc! { "email": &email, "is_deleted": { "$ne": true } };

        let login_stamp = doc! { "$set": {
            "last_login_at": mongodb::bson::DateTime::from_chrono(chrono::Utc::now()),
        } };

        let owners = self.db.collection::<Owner>(collections::OWNERS);
        if let Some(owner) = owners.find_one(filter.clone(), None).await? {
            verify_password(&req.password, &owner.password_hash)?;
            if let Err(e) = owners
                .update_one(doc! { "_id": owner.id }, login_stamp.clone(), None)
                .await
            {
                tracing::warn!("Failed to record login time: {}", e);
            }
            return Ok(Account {
                user_id: owner.id.map(|id| id.to_hex()).unwrap_or_default(),
                role: roles::OWNER.to_string(),
                display_name: owner.display_name,
                email: owner.email,
            });
        }

        let carers = self.db.collection::<Carer>(collections::CARERS);
        if let Some(carer) = carers.find_one(filter, None).await? {
            verify_password(&req.password, &carer.password_hash)?;
            if let Err(e) = carers
                .update_one(doc! { "_id": carer.id }, login_stamp, None)
                .await
            {
                tracing::warn!("Failed to record login time: {}", e);
            }
            return Ok(Account {
                user_id: carer.id.map(|id| id.to_hex()).unwrap_or_default(),
                role: roles::CARER.to_string(),
                display_name: carer.display_name,
                email: carer.email,
            });
        }

        // Same error for unknown email and bad password
        Err(Error::Unauthorized("Invalid email or password".to_string()))
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let filter = doc! { "email": email, "is_deleted": { "$ne": true } };
        let owners = self
            .db
            .collection::<Owner>(collections::OWNERS)
            .count_documents(filter.clone(), None)
            .await?;
        if owners > 0 {
            return Ok(true);
        }
        let carers = self
            .db
            .collection::<Carer>(collections::CARERS)
            .count_documents(filter, None)
            .await?;
        Ok(carers > 0)
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against its Argon2 hash
pub fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| Error::Unauthorized("Invalid email or password".to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| Error::Unauthorized("Invalid email or password".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "longenough".to_string(),
            display_name: "Alice".to_string(),
            role: "owner".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "longenough".to_string(),
            display_name: "Alice".to_string(),
            role: "owner".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "short".to_string(),
            display_name: "Alice".to_string(),
            role: "carer".to_string(),
        };
        assert!(short_password.validate().is_err());

        let bad_role = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "longenough".to_string(),
            display_name: "Alice".to_string(),
            role: "admin".to_string(),
        };
        assert!(bad_role.validate().is_err());
    }
}
