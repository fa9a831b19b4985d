use std::sync::Arc;

use stockwise_db::Database;
use stockwise_engine::Engine;

use crate::auth::JwtManager;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub engine: Engine,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, engine: Engine, jwt: JwtManager) -> Self {
        AppState {
            db,
            engine,
            jwt: Arc::new(jwt),
        }
    }
}
