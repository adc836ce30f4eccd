//! Application state

use std::sync::Arc;

use petbridge::MongoDb;

use crate::auth::token::TokenManager;
use crate::config::Config;

/// Shared state for the auth layer and the health endpoint. The domain
/// routes carry their own [`petbridge::routes::AppState`].
#[derive(Clone)]
pub struct ServerState {
    pub db: Arc<MongoDb>,
    pub config: Config,
    pub tokens: Arc<TokenManager>,
}
