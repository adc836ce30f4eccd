//! Role-agnostic user profile and notification endpoints

use axum::{
    extract::{Extension, Path, State},
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;

use super::{ensure_self, AppState};
use crate::error::Result;
use crate::models::{NotificationView, UserSummary};
use crate::services::UserService;
use crate::AuthUser;

pub fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/notifications", get(list_notifications))
        .route(
            "/users/{id}/notifications/{notification_id}/read",
            put(mark_read),
        )
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserSummary>> {
    let service = UserService::new((*state.db).clone());
    Ok(Json(service.get_summary(&id).await?))
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<NotificationView>>> {
    ensure_self(&auth, &id, "list notifications")?;
    let service = UserService::new((*state.db).clone());
    Ok(Json(service.notifications(&id).await?))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, notification_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    ensure_self(&auth, &id, "mark notification read")?;
    let service = UserService::new((*state.db).clone());
    service.mark_notification_read(&id, &notification_id).await?;
    Ok(Json(serde_json::json!({ "read": true })))
}
