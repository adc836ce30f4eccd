//! Pet lookup and pet feedback, addressed by pet id alone

use axum::{
    extract::{Extension, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use super::AppState;
use crate::error::Result;
use crate::models::{
    CommentView, CreateCommentRequest, CreateFeedbackRequest, FeedbackView, PetView,
};
use crate::services::{FeedbackService, PetService};
use crate::AuthUser;

/// Pet with its resolved owner
#[derive(Debug, Serialize)]
pub struct PetResponse {
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub pet: PetView,
}

pub fn pet_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pets/{pet_id}", get(get_pet))
        .route("/pets/{pet_id}/feedback", post(add_feedback))
        .route("/pets/{pet_id}/feedback/{feedback_id}/like", post(like_feedback))
        .route(
            "/pets/{pet_id}/feedback/{feedback_id}/comments",
            post(comment_feedback),
        )
}

async fn get_pet(
    State(state): State<Arc<AppState>>,
    Path(pet_id): Path<String>,
) -> Result<Json<PetResponse>> {
    let service = PetService::new((*state.db).clone());
    let (owner_id, pet) = service.find(&pet_id).await?;
    Ok(Json(PetResponse {
        owner_id,
        pet: PetView::from(pet),
    }))
}

async fn add_feedback(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(pet_id): Path<String>,
    Json(req): Json<CreateFeedbackRequest>,
) -> Result<Json<FeedbackView>> {
    req.validate()?;
    let service = FeedbackService::new((*state.db).clone());
    Ok(Json(service.add_to_pet(&pet_id, &auth, req).await?))
}

async fn like_feedback(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((pet_id, feedback_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    let service = FeedbackService::new((*state.db).clone());
    service
        .like_pet_feedback(&pet_id, &feedback_id, &auth.user_id)
        .await?;
    Ok(Json(serde_json::json!({ "liked": true })))
}

async fn comment_feedback(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((pet_id, feedback_id)): Path<(String, String)>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Json<CommentView>> {
    req.validate()?;
    let service = FeedbackService::new((*state.db).clone());
    let comment = service
        .comment_pet_feedback(&pet_id, &feedback_id, &auth.user_id, req)
        .await?;
    Ok(Json(CommentView::from(comment)))
}
