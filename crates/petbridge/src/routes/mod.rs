//! REST routes
//!
//! One module per aggregate, each exposing a `*_routes()` function merged
//! here. Handlers expect the auth middleware to have inserted [`AuthUser`]
//! into request extensions.

pub mod carers;
pub mod images;
pub mod owners;
pub mod pets;
pub mod users;

use axum::Router;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::MongoDb;
use crate::error::{Error, Result};
use crate::services::ImageStore;
use crate::AuthUser;

/// App state shared by the route handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<MongoDb>,
    pub images: Arc<ImageStore>,
}

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationQuery {
    /// Clamped page/limit pair
    pub fn resolve(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        (page, limit)
    }
}

/// Reject callers acting on another user's resources
pub(crate) fn ensure_self(auth: &AuthUser, user_id: &str, action: &str) -> Result<()> {
    if auth.user_id != user_id {
        return Err(Error::PermissionDenied {
            action: action.to_string(),
        });
    }
    Ok(())
}

/// Configure all REST routes
pub fn configure(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(owners::owner_routes())
        .merge(carers::carer_routes())
        .merge(pets::pet_routes())
        .merge(users::user_routes())
        .merge(images::image_routes())
        .merge(crate::graphql::graphql_routes(state.clone()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let q = PaginationQuery {
            page: None,
            limit: None,
        };
        assert_eq!(q.resolve(), (1, 20));

        let q = PaginationQuery {
            page: Some(0),
            limit: Some(0),
        };
        assert_eq!(q.resolve(), (1, 1));

        let q = PaginationQuery {
            page: Some(3),
            limit: Some(500),
        };
        assert_eq!(q.resolve(), (3, 100));
    }

    #[test]
    fn test_ensure_self() {
        let auth = AuthUser {
            user_id: "u1".to_string(),
            role: "owner".to_string(),
        };
        assert!(ensure_self(&auth, "u1", "update owner").is_ok());
        assert!(ensure_self(&auth, "u2", "update owner").is_err());
    }
}
