//! Image upload and serving

use axum::{
    body::Body,
    extract::{Extension, Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use super::AppState;
use crate::error::{Error, Result};
use crate::models::ImageView;
use crate::services::ImageService;
use crate::AuthUser;

pub fn image_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/images", post(upload_image))
        .route("/images/{id}", get(serve_image).delete(delete_image))
}

/// Accept a multipart upload. The first field named `file` wins; other
/// fields are ignored.
async fn upload_image(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<ImageView>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or("upload")
            .to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(format!("Failed to read upload: {}", e)))?;
        if bytes.is_empty() {
            return Err(Error::Validation("Uploaded file is empty".to_string()));
        }

        let service = ImageService::new((*state.db).clone(), (*state.images).clone());
        let view = service
            .upload(
                &auth.user_id,
                &filename,
                content_type.as_deref(),
                bytes.to_vec(),
            )
            .await?;
        return Ok(Json(view));
    }

    Err(Error::Validation("Missing 'file' field".to_string()))
}

async fn serve_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response> {
    let service = ImageService::new((*state.db).clone(), (*state.images).clone());
    let (image, bytes) = service.fetch(&id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, image.content_type)
        .header(header::CONTENT_LENGTH, bytes.len())
        .body(Body::from(bytes))
        .map_err(|e| Error::Internal(format!("Failed to build image response: {}", e)))
}

async fn delete_image(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let service = ImageService::new((*state.db).clone(), (*state.images).clone());
    service.delete(&id, &auth.user_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
