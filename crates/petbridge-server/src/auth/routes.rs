//! Auth endpoints: register, login, me

use axum::{
    extract::{Extension, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use petbridge::models::UserSummary;
use petbridge::services::UserService;
use petbridge::{AuthUser, Result};

use crate::auth::service::{Account, AuthService, LoginRequest, RegisterRequest};
use crate::state::ServerState;

/// Token plus the account it belongs to
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountView,
}

#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: String,
    pub role: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub email: String,
}

impl From<Account> for AccountView {
    fn from(a: Account) -> Self {
        Self {
            id: a.user_id,
            role: a.role,
            display_name: a.display_name,
            email: a.email,
        }
    }
}

/// Routes that require a valid token
pub fn protected_router() -> Router<Arc<ServerState>> {
    Router::new().route("/me", get(me))
}

pub async fn register(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let service = AuthService::new((*state.db).clone());
    let account = service.register(req).await?;
    let token = state.tokens.issue(&account.user_id, &account.role)?;
    Ok(Json(AuthResponse {
        token,
        user: AccountView::from(account),
    }))
}

pub async fn login(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let service = AuthService::new((*state.db).clone());
    let account = service.login(req).await?;
    let token = state.tokens.issue(&account.user_id, &account.role)?;
    Ok(Json(AuthResponse {
        token,
        user: AccountView::from(account),
    }))
}

async fn me(
    State(state): State<Arc<ServerState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserSummary>> {
    let service = UserService::new((*state.db).clone());
    Ok(Json(service.get_summary(&auth.user_id).await?))
}
