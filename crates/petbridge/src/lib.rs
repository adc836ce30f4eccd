//! PetBridge domain library
//!
//! Owners post care requests for their pets, carers respond to open requests
//! or receive direct offers, and both sides exchange feedback. This crate
//! holds the document models, the MongoDB persistence services, the REST
//! routes, and the read-only GraphQL schema. Authentication middleware lives
//! in the server crate and injects [`AuthUser`] into request extensions.

pub mod db;
pub mod error;
pub mod graphql;
pub mod models;
pub mod routes;
pub mod services;

pub use db::MongoDb;
pub use error::{Error, Result};

/// Authenticated user injected by the auth middleware
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    /// "owner" or "carer"
    pub role: String,
}

impl AuthUser {
    pub fn is_owner(&self) -> bool {
        self.role == "owner"
    }

    pub fn is_carer(&self) -> bool {
        self.role == "carer"
    }
}
