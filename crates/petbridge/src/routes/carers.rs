//! Carer API: profiles, discovery, offers, open requests, and availability

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::{ensure_self, AppState, PaginationQuery};
use crate::db::collections;
use crate::error::Result;
use crate::models::{
    AddUnavailabilityRequest, CarerSummary, CommentView, CreateCommentRequest,
    CreateFeedbackRequest, FeedbackView, OfferView, OpenRequestView, PaginatedResponse,
    UnavailabilityView, UpdateCarerRequest,
};
use crate::services::{CarerFilter, CarerService, FeedbackService, OfferService, RequestService};
use crate::AuthUser;

/// Carer response wrapper
#[derive(Debug, Serialize)]
pub struct CarerResponse {
    pub carer: CarerSummary,
}

/// Discovery filters accepted by the carer listing
#[derive(Debug, Deserialize)]
pub struct CarerListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(rename = "petType")]
    pub pet_type: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(rename = "maxDistanceM")]
    pub max_distance_m: Option<f64>,
}

impl CarerListQuery {
    fn filter(&self) -> CarerFilter {
        let near = match (self.lng, self.lat) {
            (Some(lng), Some(lat)) => {
                Some(([lng, lat], self.max_distance_m.unwrap_or(10_000.0)))
            }
            _ => None,
        };
        CarerFilter {
            pet_type: self.pet_type.clone(),
            near,
        }
    }
}

/// Optional body for responding to an open request
#[derive(Debug, Deserialize)]
pub struct RespondBody {
    pub message: Option<String>,
}

pub fn carer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/carers", get(list_carers))
        .route(
            "/carers/{id}",
            get(get_carer).put(update_carer).delete(delete_carer),
        )
        .route("/carers/{id}/offers", get(list_offers))
        .route("/carers/{id}/offers/{offer_id}/accept", post(accept_offer))
        .route("/carers/{id}/offers/{offer_id}/reject", post(reject_offer))
        .route("/carers/{id}/requests", get(list_open_requests))
        .route(
            "/carers/{id}/requests/{request_id}/respond",
            post(respond_to_request),
        )
        .route(
            "/carers/{id}/unavailability",
            post(add_unavailability),
        )
        .route(
            "/carers/{id}/unavailability/{range_id}",
            delete(remove_unavailability),
        )
        .route(
            "/carers/{id}/feedback",
            get(list_feedback).post(add_feedback),
        )
        .route("/carers/{id}/feedback/{feedback_id}/like", post(like_feedback))
        .route(
            "/carers/{id}/feedback/{feedback_id}/comments",
            post(comment_feedback),
        )
}

async fn list_carers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CarerListQuery>,
) -> Result<Json<PaginatedResponse<CarerSummary>>> {
    let pagination = PaginationQuery {
        page: query.page,
        limit: query.limit,
    };
    let (page, limit) = pagination.resolve();
    let service = CarerService::new((*state.db).clone());
    Ok(Json(service.list(page, limit, query.filter()).await?))
}

async fn get_carer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CarerResponse>> {
    let service = CarerService::new((*state.db).clone());
    let carer = service.get(&id).await?;
    Ok(Json(CarerResponse {
        carer: CarerSummary::from(carer),
    }))
}

async fn update_carer(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCarerRequest>,
) -> Result<Json<CarerResponse>> {
    ensure_self(&auth, &id, "update carer")?;
    req.validate()?;
    let service = CarerService::new((*state.db).clone());
    let carer = service.update(&id, req).await?;
    Ok(Json(CarerResponse {
        carer: CarerSummary::from(carer),
    }))
}

async fn delete_carer(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    ensure_self(&auth, &id, "delete carer")?;
    let service = CarerService::new((*state.db).clone());
    service.delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn list_offers(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OfferView>>> {
    ensure_self(&auth, &id, "list offers")?;
    let service = OfferService::new((*state.db).clone());
    Ok(Json(service.list_for_carer(&id).await?))
}

async fn accept_offer(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, offer_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    ensure_self(&auth, &id, "accept offer")?;
    let service = OfferService::new((*state.db).clone());
    service.accept(&id, &offer_id).await?;
    Ok(Json(serde_json::json!({ "accepted": true })))
}

async fn reject_offer(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, offer_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    ensure_self(&auth, &id, "reject offer")?;
    let service = OfferService::new((*state.db).clone());
    service.reject(&id, &offer_id).await?;
    Ok(Json(serde_json::json!({ "rejected": true })))
}

async fn list_open_requests(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<OpenRequestView>>> {
    let (page, limit) = query.resolve();
    let service = RequestService::new((*state.db).clone());
    Ok(Json(service.list_open(page, limit).await?))
}

async fn respond_to_request(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, request_id)): Path<(String, String)>,
    body: Option<Json<RespondBody>>,
) -> Result<Json<serde_json::Value>> {
    ensure_self(&auth, &id, "respond to request")?;
    let message = body.and_then(|Json(b)| b.message);
    let service = RequestService::new((*state.db).clone());
    service.respond(&id, &request_id, message).await?;
    Ok(Json(serde_json::json!({ "responded": true })))
}

async fn add_unavailability(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<AddUnavailabilityRequest>,
) -> Result<Json<UnavailabilityView>> {
    ensure_self(&auth, &id, "add unavailability")?;
    req.validate()?;
    let service = CarerService::new((*state.db).clone());
    Ok(Json(service.add_unavailability(&id, req).await?))
}

async fn remove_unavailability(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, range_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    ensure_self(&auth, &id, "remove unavailability")?;
    let service = CarerService::new((*state.db).clone());
    service.remove_unavailability(&id, &range_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn list_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<FeedbackView>>> {
    let service = FeedbackService::new((*state.db).clone());
    Ok(Json(service.list_for_user(collections::CARERS, &id).await?))
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
            .add_to_user(collections::CARERS, &id, &auth, req)
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
        .like_user_feedback(collections::CARERS, &id, &feedback_id, &auth.user_id)
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
        .comment_user_feedback(collections::CARERS, &id, &feedback_id, &auth.user_id, req)
        .await?;
    Ok(Json(CommentView::from(comment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_requires_both_coordinates() {
        let q = CarerListQuery {
            page: None,
            limit: None,
            pet_type: None,
            lat: Some(52.0),
            lng: None,
            max_distance_m: Some(5000.0),
        };
        assert!(q.filter().near.is_none());
    }

    #[test]
    fn test_filter_defaults_distance() {
        let q = CarerListQuery {
            page: None,
            limit: None,
            pet_type: Some("dog".to_string()),
            lat: Some(52.37),
            lng: Some(4.89),
            max_distance_m: None,
        };
        let filter = q.filter();
        let (coords, distance) = filter.near.unwrap();
        assert_eq!(coords, [4.89, 52.37]);
        assert_eq!(distance, 10_000.0);
        assert_eq!(filter.pet_type.as_deref(), Some("dog"));
    }
}
