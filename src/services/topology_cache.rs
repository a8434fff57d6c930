use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::domain::{ColumnTopology, KanbanError};
use crate::services::QueryService;

/// Validated board topologies, built once per board and shared afterwards.
///
/// Columns are fixed at board creation, so an entry only goes away when
/// its board is deleted.
#[derive(Debug, Clone, Default)]
pub struct TopologyCache {
    inner: Arc<RwLock<HashMap<i64, Arc<ColumnTopology>>>>,
}

impl TopologyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load(
        &self,
        pool: &SqlitePool,
        board_id: i64,
    ) -> Result<Arc<ColumnTopology>, KanbanError> {
        if let Some(topology) = self.inner.read().await.get(&board_id) {
            return Ok(Arc::clone(topology));
        }

        let columns = QueryService::list_columns(pool, board_id).await?;
        if columns.is_empty() {
            return Err(KanbanError::NotFound(format!("Board not found: {}", board_id)));
        }
        let topology = Arc::new(ColumnTopology::new(columns)?);

        tracing::debug!(
            board_id,
            columns = topology.columns().len(),
            "Board topology validated"
        );

        let mut entries = self.inner.write().await;
        Ok(Arc::clone(entries.entry(board_id).or_insert(topology)))
    }

    pub async fn invalidate(&self, board_id: i64) {
        self.inner.write().await.remove(&board_id);
    }

    pub async fn is_cached(&self, board_id: i64) -> bool {
        self.inner.read().await.contains_key(&board_id)
    }
}
