//! Bearer-token authentication middleware

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use petbridge::AuthUser;

use crate::state::ServerState;

/// Verify the `Authorization: Bearer` token and inject [`AuthUser`] into
/// request extensions for the downstream handlers
pub async fn auth_middleware(
    State(state): State<Arc<ServerState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        debug!("Missing bearer token for {}", request.uri().path());
        return unauthorized();
    };

    match state.tokens.verify(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                user_id: claims.sub,
                role: claims.role,
            });
            next.run(request).await
        }
        Err(_) => {
            debug!("Token verification failed for {}", request.uri().path());
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "code": "UNAUTHORIZED",
            "message": "Authentication required",
        })),
    )
        .into_response()
}
