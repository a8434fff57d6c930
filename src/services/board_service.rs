use chrono::Utc;
use sqlx::SqlitePool;

use crate::api::dto::{BoardResponse, CreateBoardRequest};
use crate::domain::lifecycle::require_text;
use crate::domain::{Board, Column, ColumnKind, ColumnTopology, KanbanError};

pub struct BoardService;

impl BoardService {
    /// Lays the requested columns out as INITIAL, PENDING*, FINAL, CANCEL.
    fn layout(req: &CreateBoardRequest) -> Vec<(String, ColumnKind)> {
        let mut columns = vec![(req.initial_column.clone(), ColumnKind::Initial)];
        columns.extend(
            req.pending_columns
                .iter()
                .map(|name| (name.clone(), ColumnKind::Pending)),
        );
        columns.push((req.final_column.clone(), ColumnKind::Final));
        columns.push((req.cancel_column.clone(), ColumnKind::Cancel));
        columns
    }

    pub async fn create_board(
        pool: &SqlitePool,
        req: CreateBoardRequest,
    ) -> Result<BoardResponse, KanbanError> {
        require_text("board name", &req.name)?;

        let layout = Self::layout(&req);
        for (name, kind) in &layout {
            require_text(&format!("{} column name", kind), name)?;
        }

        // Reject a bad layout before anything is written.
        let draft: Vec<Column> = layout
            .iter()
            .enumerate()
            .map(|(order, (name, kind))| Column {
                id: order as i64,
                board_id: 0,
                name: name.clone(),
                kind: *kind,
                order: order as i64,
            })
            .collect();
        ColumnTopology::new(draft)?;

        let now = Utc::now().to_rfc3339();
        let mut tx = pool.begin().await?;

        let board_id = sqlx::query("INSERT INTO boards (name, created_at) VALUES (?, ?)")
            .bind(&req.name)
            .bind(&now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        let mut columns = Vec::with_capacity(layout.len());
        for (order, (name, kind)) in layout.into_iter().enumerate() {
            let order = order as i64;
            let id = sqlx::query(
                "INSERT INTO board_columns (board_id, name, kind, position) VALUES (?, ?, ?, ?)",
            )
            .bind(board_id)
            .bind(&name)
            .bind(kind.as_str())
            .bind(order)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            columns.push(Column {
                id,
                board_id,
                name,
                kind,
                order,
            });
        }

        tx.commit().await?;

        tracing::info!(
            board_id,
            columns = columns.len(),
            "Board created"
        );

        Ok(BoardResponse {
            id: board_id,
            name: req.name,
            created_at: now,
            columns,
        })
    }

    pub async fn list_boards(pool: &SqlitePool) -> Result<Vec<Board>, KanbanError> {
        let boards: Vec<Board> =
            sqlx::query_as("SELECT id, name, created_at FROM boards ORDER BY id ASC")
                .fetch_all(pool)
                .await?;

        Ok(boards)
    }

    pub async fn find_board(pool: &SqlitePool, id: i64) -> Result<Board, KanbanError> {
        let board: Board = sqlx::query_as("SELECT id, name, created_at FROM boards WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| KanbanError::NotFound(format!("Board not found: {}", id)))?;

        Ok(board)
    }

    /// Deletes the board together with its columns, cards and block history.
    pub async fn delete_board(pool: &SqlitePool, id: i64) -> Result<(), KanbanError> {
        let result = sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(KanbanError::NotFound(format!("Board not found: {}", id)));
        }

        tracing::info!(board_id = id, "Board deleted");
        Ok(())
    }
}
