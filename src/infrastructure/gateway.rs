//! Transactional persistence boundary for the card lifecycle.
//!
//! A [`UnitOfWork`] wraps one sqlx transaction. It commits only through
//! [`UnitOfWork::commit`]; dropping it on any other path (an early `?`, a
//! cancelled request future) rolls every statement back.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::domain::card::{BlockRow, CardRow};
use crate::domain::column::ColumnRow;
use crate::domain::{Card, Column, KanbanError, Mutation};

#[derive(Debug, Clone)]
pub struct CardGateway {
    pool: SqlitePool,
}

impl CardGateway {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<UnitOfWork, KanbanError> {
        let tx = self.pool.begin().await?;
        Ok(UnitOfWork { tx })
    }
}

pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    /// Claims the card for the rest of this unit of work.
    ///
    /// Writing first takes SQLite's write lock, so a second operation on
    /// the same card waits here and then reads the committed result.
    pub async fn lock_card(&mut self, card_id: i64) -> Result<(), KanbanError> {
        let result = sqlx::query("UPDATE cards SET version = version + 1 WHERE id = ?")
            .bind(card_id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(KanbanError::CardNotFound(card_id));
        }
        Ok(())
    }

    pub async fn load_card(&mut self, card_id: i64) -> Result<Card, KanbanError> {
        let row: CardRow = sqlx::query_as(
            "SELECT id, title, description, board_column_id, is_blocked FROM cards WHERE id = ?",
        )
        .bind(card_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(KanbanError::CardNotFound(card_id))?;

        let blocks: Vec<BlockRow> = sqlx::query_as(
            "SELECT blocked_at, block_reason, unblocked_at, unblock_reason FROM blocks WHERE card_id = ? ORDER BY blocked_at ASC, id ASC",
        )
        .bind(card_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Card::from_rows(row, blocks)
    }

    /// Claims the board before any card is added to it.
    ///
    /// Like [`UnitOfWork::lock_card`] this writes before reading. A deferred
    /// transaction that reads first cannot wait for the write lock later and
    /// fails with `SQLITE_BUSY` instead.
    pub async fn lock_board(&mut self, board_id: i64) -> Result<(), KanbanError> {
        let result = sqlx::query("UPDATE boards SET version = version + 1 WHERE id = ?")
            .bind(board_id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(KanbanError::NotFound(format!("Board not found: {}", board_id)));
        }
        Ok(())
    }

    pub async fn load_columns(&mut self, board_id: i64) -> Result<Vec<Column>, KanbanError> {
        let rows: Vec<ColumnRow> = sqlx::query_as(
            "SELECT id, board_id, name, kind, position FROM board_columns WHERE board_id = ? ORDER BY position ASC",
        )
        .bind(board_id)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter()
            .map(|row| Column::try_from(row).map_err(KanbanError::Internal))
            .collect()
    }

    /// Inserts an unblocked card and returns its id.
    pub async fn insert_card(
        &mut self,
        title: &str,
        description: &str,
        column_id: i64,
    ) -> Result<i64, KanbanError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO cards (title, description, board_column_id, is_blocked, version, created_at, updated_at) VALUES (?, ?, ?, 0, 0, ?, ?)",
        )
        .bind(title)
        .bind(description)
        .bind(column_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn apply(&mut self, card_id: i64, mutation: &Mutation) -> Result<(), KanbanError> {
        let now = Utc::now().to_rfc3339();

        match mutation {
            Mutation::MoveTo { column_id } => {
                sqlx::query("UPDATE cards SET board_column_id = ?, updated_at = ? WHERE id = ?")
                    .bind(column_id)
                    .bind(&now)
                    .bind(card_id)
                    .execute(&mut *self.tx)
                    .await?;
            }
            Mutation::OpenBlock { at, reason } => {
                sqlx::query(
                    "INSERT INTO blocks (card_id, blocked_at, block_reason) VALUES (?, ?, ?)",
                )
                .bind(card_id)
                .bind(at.to_rfc3339())
                .bind(reason)
                .execute(&mut *self.tx)
                .await?;

                self.set_blocked(card_id, true, &now).await?;
            }
            Mutation::CloseBlock { at, reason } => {
                let result = sqlx::query(
                    "UPDATE blocks SET unblocked_at = ?, unblock_reason = ? WHERE card_id = ? AND unblocked_at IS NULL",
                )
                .bind(at.to_rfc3339())
                .bind(reason)
                .bind(card_id)
                .execute(&mut *self.tx)
                .await?;

                if result.rows_affected() != 1 {
                    return Err(KanbanError::Internal(format!(
                        "card {} had {} open blocks to close",
                        card_id,
                        result.rows_affected()
                    )));
                }

                self.set_blocked(card_id, false, &now).await?;
            }
        }
        Ok(())
    }

    async fn set_blocked(&mut self, card_id: i64, blocked: bool, now: &str) -> Result<(), KanbanError> {
        sqlx::query("UPDATE cards SET is_blocked = ?, updated_at = ? WHERE id = ?")
            .bind(blocked)
            .bind(now)
            .bind(card_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    pub async fn commit(self) -> Result<(), KanbanError> {
        self.tx.commit().await?;
        Ok(())
    }
}
