//! Configuration management for the server

use anyhow::{Context, Result};
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database URL (default: mongodb://localhost:27017)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Database name (default: petbridge)
    #[serde(default = "default_database_name")]
    pub database_name: String,

    /// Secret used to sign JWT access tokens (required)
    pub jwt_secret: String,

    /// Access token lifetime in hours (default: 24)
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// Root directory for uploaded image blobs (default: ./data/images)
    #[serde(default = "default_image_root")]
    pub image_root: String,

    /// CORS allowed origins (comma-separated). If unset, any origin is
    /// allowed (dev mode).
    pub cors_allowed_origins: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database_name() -> String {
    "petbridge".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_image_root() -> String {
    "./data/images".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_port);
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("MONGODB_URL"))
            .unwrap_or_else(|_| default_database_url());
        let database_name = std::env::var("DATABASE_NAME")
            .or_else(|_| std::env::var("MONGODB_DATABASE"))
            .unwrap_or_else(|_| default_database_name());
        let jwt_secret =
            std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let token_ttl_hours = std::env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_token_ttl_hours);
        let image_root =
            std::env::var("IMAGE_ROOT").unwrap_or_else(|_| default_image_root());
        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS").ok();

        Ok(Self {
            host,
            port,
            database_url,
            database_name,
            jwt_secret,
            token_ttl_hours,
            image_root,
            cors_allowed_origins,
        })
    }
}
