//! Owner API: profiles, pets, care requests, and feedback

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use super::{ensure_self, AppState, PaginationQuery};
use crate::db::collections;
use crate::error::Result;
use crate::models::{
    CommentView, CreateCareRequest, CreateCommentRequest, CreateFeedbackRequest, CreatePetRequest,
    FeedbackView, OwnerSummary, PaginatedResponse, PetView, RequestView, UpdateOwnerRequest,
    UpdatePetRequest,
};
use crate::services::{FeedbackService, OwnerService, PetService, RequestService};
use crate::AuthUser;

/// Owner response wrapper
#[derive(Debug, Serialize)]
pub struct OwnerResponse {
    pub owner: OwnerSummary,
}

pub fn owner_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/owners", get(list_owners))
        .route(
            "/owners/{id}",
            get(get_owner).put(update_owner).delete(delete_owner),
        )
        .route("/owners/{id}/pets", get(list_pets).post(add_pet))
        .route(
            "/owners/{id}/pets/{pet_id}",
            put(update_pet).delete(remove_pet),
        )
        .route(
            "/owners/{id}/requests",
            get(list_requests).post(create_request),
        )
        .route("/owners/{id}/requests/{request_id}", delete(cancel_request))
        .route(
            "/owners/{id}/requests/{request_id}/respondents/{carer_id}/accept",
            post(accept_respondent),
        )
        .route(
            "/owners/{id}/requests/{request_id}/respondents/{carer_id}/reject",
            post(reject_respondent),
        )
        .route(
            "/owners/{id}/feedback",
            get(list_feedback).post(add_feedback),
        )
        .route("/owners/{id}/feedback/{feedback_id}/like", post(like_feedback))
        .route(
            "/owners/{id}/feedback/{feedback_id}/comments",
            post(comment_feedback),
        )
}

async fn list_owners(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<OwnerSummary>>> {
    let (page, limit) = query.resolve();
    let service = OwnerService::new((*state.db).clone());
    Ok(Json(service.list(page, limit).await?))
}

async fn get_owner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OwnerResponse>> {
    let service = OwnerService::new((*state.db).clone());
    let owner = service.get(&id).await?;
    Ok(Json(OwnerResponse {
        owner: OwnerSummary::from(owner),
    }))
}

async fn update_owner(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOwnerRequest>,
) -> Result<Json<OwnerResponse>> {
    ensure_self(&auth, &id, "update owner")?;
    req.validate()?;
    let service = OwnerService::new((*state.db).clone());
    let owner = service.update(&id, req).await?;
    Ok(Json(OwnerResponse {
        owner: OwnerSummary::from(owner),
    }))
}

async fn delete_owner(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    ensure_self(&auth, &id, "delete owner")?;
    let service = OwnerService::new((*state.db).clone());
    service.delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn list_pets(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PetView>>> {
    let service = PetService::new((*state.db).clone());
    Ok(Json(service.list(&id).await?))
}

async fn add_pet(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<CreatePetRequest>,
) -> Result<Json<PetView>> {
    ensure_self(&auth, &id, "add pet")?;
    req.validate()?;
    let service = PetService::new((*state.db).clone());
    Ok(Json(service.add(&id, req).await?))
}

async fn update_pet(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, pet_id)): Path<(String, String)>,
    Json(req): Json<UpdatePetRequest>,
) -> Result<Json<PetView>> {
    ensure_self(&auth, &id, "update pet")?;
    req.validate()?;
    let service = PetService::new((*state.db).clone());
    Ok(Json(service.update(&id, &pet_id, req).await?))
}

async fn remove_pet(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, pet_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    ensure_self(&auth, &id, "remove pet")?;
    let service = PetService::new((*state.db).clone());
    service.remove(&id, &pet_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn list_requests(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RequestView>>> {
    ensure_self(&auth, &id, "list requests")?;
    let service = RequestService::new((*state.db).clone());
    Ok(Json(service.list_for_owner(&id).await?))
}

async fn create_request(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<CreateCareRequest>,
) -> Result<Json<RequestView>> {
    ensure_self(&auth, &id, "create request")?;
    req.validate()?;
    let service = RequestService::new((*state.db).clone());
    Ok(Json(service.create(&id, req).await?))
}

async fn cancel_request(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, request_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    ensure_self(&auth, &id, "cancel request")?;
    let service = RequestService::new((*state.db).clone());
    service.cancel(&id, &request_id).await?;
    Ok(Json(serde_json::json!({ "cancelled": true })))
}

async fn accept_respondent(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, request_id, carer_id)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>> {
    ensure_self(&auth, &id, "accept respondent")?;
    let service = RequestService::new((*state.db).clone());
    service.accept_respondent(&id, &request_id, &carer_id).await?;
    Ok(Json(serde_json::json!({ "accepted": true })))
}

async fn reject_respondent(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, request_id, carer_id)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>> {
    ensure_self(&auth, &id, "reject respondent")?;
    let service = RequestService::new((*state.db).clone());
    service.reject_respondent(&id, &request_id, &carer_id).await?;
    Ok(Json(serde_json::json!({ "rejected": true })))
}

async fn list_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<FeedbackView>>> {
    let service = FeedbackService::new((*state.db).clone());
    Ok(Json(service.list_for_user(collections::OWNERS, &id).await?))
}

async fn add_feedback(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<CreateFeedbackRequest>,
) -> Result<Json<FeedbackView>> {
    req.validate()?;
    let service = FeedbackService::new((*state.db).clone());
    Ok(Json(
        service
            .add_to_user(collections::OWNERS, &id, &auth, req)
            .await?,
    ))
}

async fn like_feedback(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, feedback_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    let service = FeedbackService::new((*state.db).clone());
    service
        .like_user_feedback(collections::OWNERS, &id, &feedback_id, &auth.user_id)
        .await?;
    Ok(Json(serde_json::json!({ "liked": true })))
}

async fn comment_feedback(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, feedback_id)): Path<(String, String)>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Json<CommentView>> {
    req.validate()?;
    let service = FeedbackService::new((*state.db).clone());
    let comment = service
        .comment_user_feedback(collections::OWNERS, &id, &feedback_id, &auth.user_id, req)
        .await?;
    Ok(Json(CommentView::from(comment)))
}
