use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::api::dto::{
    BoardDetails, BoardStatistics, CardDetails, CardSummary, ColumnDetails, ColumnStatistics,
    ColumnSummary,
};
use crate::domain::card::BlockRow;
use crate::domain::column::ColumnRow;
use crate::domain::{BlockEvent, Column, ColumnKind, KanbanError};
use crate::services::BoardService;

/// Read-only lookups for display. None of these take part in a transition.
pub struct QueryService;

struct ColumnCounts {
    column: Column,
    cards: i64,
    blocked: i64,
}

impl QueryService {
    pub async fn find_card(pool: &SqlitePool, card_id: i64) -> Result<CardDetails, KanbanError> {
        let row = sqlx::query(
            r#"
            SELECT
                c.id, c.title, c.description, c.is_blocked, c.board_column_id,
                bc.name AS column_name, bc.kind AS column_kind, bc.board_id,
                (SELECT COUNT(*) FROM blocks b WHERE b.card_id = c.id) AS blocks_amount,
                (SELECT b.block_reason FROM blocks b
                    WHERE b.card_id = c.id AND b.unblocked_at IS NULL) AS block_reason
            FROM cards c
            JOIN board_columns bc ON bc.id = c.board_column_id
            WHERE c.id = ?
            "#,
        )
        .bind(card_id)
        .fetch_optional(pool)
        .await?
        .ok_or(KanbanError::CardNotFound(card_id))?;

        let blocks: Vec<BlockRow> = sqlx::query_as(
            "SELECT blocked_at, block_reason, unblocked_at, unblock_reason FROM blocks WHERE card_id = ? ORDER BY blocked_at ASC, id ASC",
        )
        .bind(card_id)
        .fetch_all(pool)
        .await?;
        let block_history = blocks
            .into_iter()
            .map(BlockEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let column_kind: String = row.get("column_kind");

        Ok(CardDetails {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            blocked: row.get("is_blocked"),
            block_reason: row.get("block_reason"),
            blocks_amount: row.get("blocks_amount"),
            column_id: row.get("board_column_id"),
            column_name: row.get("column_name"),
            column_kind: column_kind.parse().map_err(KanbanError::Internal)?,
            board_id: row.get("board_id"),
            block_history,
        })
    }

    pub async fn find_column(
        pool: &SqlitePool,
        column_id: i64,
    ) -> Result<ColumnDetails, KanbanError> {
        let row: ColumnRow = sqlx::query_as(
            "SELECT id, board_id, name, kind, position FROM board_columns WHERE id = ?",
        )
        .bind(column_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| KanbanError::NotFound(format!("Column not found: {}", column_id)))?;
        let column = Column::try_from(row).map_err(KanbanError::Internal)?;

        let rows = sqlx::query(
            "SELECT id, title, description, is_blocked FROM cards WHERE board_column_id = ? ORDER BY id ASC",
        )
        .bind(column_id)
        .fetch_all(pool)
        .await?;

        let cards = rows
            .into_iter()
            .map(|row| CardSummary {
                id: row.get("id"),
                title: row.get("title"),
                description: row.get("description"),
                blocked: row.get("is_blocked"),
            })
            .collect();

        Ok(ColumnDetails {
            id: column.id,
            board_id: column.board_id,
            name: column.name,
            kind: column.kind,
            order: column.order,
            cards,
        })
    }

    pub async fn list_columns(pool: &SqlitePool, board_id: i64) -> Result<Vec<Column>, KanbanError> {
        let rows: Vec<ColumnRow> = sqlx::query_as(
            "SELECT id, board_id, name, kind, position FROM board_columns WHERE board_id = ? ORDER BY position ASC",
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter()
            .map(|row| Column::try_from(row).map_err(KanbanError::Internal))
            .collect()
    }

    async fn column_counts(
        pool: &SqlitePool,
        board_id: i64,
    ) -> Result<Vec<ColumnCounts>, KanbanError> {
        let rows = sqlx::query(
            r#"
            SELECT
                bc.id, bc.board_id, bc.name, bc.kind, bc.position,
                COUNT(c.id) AS cards,
                COALESCE(SUM(c.is_blocked), 0) AS blocked
            FROM board_columns bc
            LEFT JOIN cards c ON c.board_column_id = bc.id
            WHERE bc.board_id = ?
            GROUP BY bc.id
            ORDER BY bc.position ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let column = Column::try_from(ColumnRow {
                    id: row.get("id"),
                    board_id: row.get("board_id"),
                    name: row.get("name"),
                    kind: row.get("kind"),
                    position: row.get("position"),
                })
                .map_err(KanbanError::Internal)?;

                Ok(ColumnCounts {
                    column,
                    cards: row.get("cards"),
                    blocked: row.get("blocked"),
                })
            })
            .collect()
    }

    pub async fn board_details(
        pool: &SqlitePool,
        board_id: i64,
    ) -> Result<BoardDetails, KanbanError> {
        let board = BoardService::find_board(pool, board_id).await?;
        let columns = Self::column_counts(pool, board_id)
            .await?
            .into_iter()
            .map(|counts| ColumnSummary {
                id: counts.column.id,
                name: counts.column.name,
                kind: counts.column.kind,
                order: counts.column.order,
                cards_amount: counts.cards,
            })
            .collect();

        Ok(BoardDetails {
            id: board.id,
            name: board.name,
            columns,
        })
    }

    pub async fn board_statistics(
        pool: &SqlitePool,
        board_id: i64,
    ) -> Result<BoardStatistics, KanbanError> {
        BoardService::find_board(pool, board_id).await?;
        let counts = Self::column_counts(pool, board_id).await?;

        let of_kind = |kind: ColumnKind| counts.iter().filter(|c| c.column.kind == kind).count();

        let stats = BoardStatistics {
            board_id,
            total_columns: counts.len(),
            initial_columns: of_kind(ColumnKind::Initial),
            pending_columns: of_kind(ColumnKind::Pending),
            final_columns: of_kind(ColumnKind::Final),
            cancel_columns: of_kind(ColumnKind::Cancel),
            total_cards: counts.iter().map(|c| c.cards).sum(),
            blocked_cards: counts.iter().map(|c| c.blocked).sum(),
            columns: Vec::new(),
            generated_at: Utc::now().to_rfc3339(),
        };

        Ok(BoardStatistics {
            columns: counts
                .into_iter()
                .map(|c| ColumnStatistics {
                    id: c.column.id,
                    name: c.column.name,
                    kind: c.column.kind,
                    order: c.column.order,
                    cards: c.cards,
                    blocked_cards: c.blocked,
                })
                .collect(),
            ..stats
        })
    }
}
