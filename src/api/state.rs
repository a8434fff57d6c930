use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::domain::KanbanError;
use crate::infrastructure::CardGateway;
use crate::services::TopologyCache;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Option<SqlitePool>,
    pub topologies: TopologyCache,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Option<SqlitePool>, config: Arc<Config>) -> Self {
        Self {
            db,
            topologies: TopologyCache::new(),
            config,
        }
    }

    pub fn require_db(&self) -> Result<&SqlitePool, KanbanError> {
        self.db
            .as_ref()
            .ok_or_else(|| KanbanError::Internal("Database not available".into()))
    }

    pub fn require_gateway(&self) -> Result<CardGateway, KanbanError> {
        self.require_db().map(|pool| CardGateway::new(pool.clone()))
    }
}
