//! PetBridge server
//!
//! Standalone marketplace backend: REST + GraphQL over MongoDB, with
//! JWT bearer authentication in front of the domain routes.

mod auth;
mod config;
mod state;

use anyhow::Result;
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use petbridge::routes::AppState;
use petbridge::services::ImageStore;
use petbridge::MongoDb;

use crate::auth::middleware::auth_middleware;
use crate::auth::token::TokenManager;
use crate::config::Config;
use crate::state::ServerState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "petbridge_server=info,petbridge=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Starting PetBridge server on {}:{}", config.host, config.port);

    // Connect to MongoDB (pings and creates indexes)
    info!("Connecting to database: {}", config.database_url);
    let db = Arc::new(MongoDb::connect(&config.database_url, &config.database_name).await?);

    // Blob store for uploaded images
    let images = Arc::new(ImageStore::new(&config.image_root));
    images.ensure_root().await?;

    let tokens = Arc::new(TokenManager::new(
        &config.jwt_secret,
        config.token_ttl_hours,
    ));

    let server_state = Arc::new(ServerState {
        db: db.clone(),
        config: config.clone(),
        tokens,
    });
    let api_state = Arc::new(AppState { db, images });

    // Build router
    let app = build_router(server_state, api_state, &config);

    // Start server
    let addr = SocketAddr::new(config.host.parse()?, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(
    server_state: Arc<ServerState>,
    api_state: Arc<AppState>,
    config: &Config,
) -> Router {
    let cors = cors_layer(config);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(auth::routes::register))
        .route("/api/auth/login", post(auth::routes::login))
        .with_state(server_state.clone());

    // Protected auth routes (require a valid token)
    let protected_auth_routes = auth::routes::protected_router()
        .layer(axum::middleware::from_fn_with_state(
            server_state.clone(),
            auth_middleware,
        ))
        .with_state(server_state.clone());

    // Domain routes behind the auth middleware
    let api_routes = petbridge::routes::configure(api_state).layer(
        axum::middleware::from_fn_with_state(server_state, auth_middleware),
    );

    Router::new()
        .merge(public_routes)
        .nest("/api/auth", protected_auth_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_allowed_origins {
        Some(origins) if !origins.trim().is_empty() => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

async fn health_check(
    State(state): State<Arc<ServerState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "degraded",
                "error": e.to_string(),
            })),
        ),
    }
}
