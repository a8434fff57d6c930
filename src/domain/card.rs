use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::domain::KanbanError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub column_id: i64,
    pub blocked: bool,
    pub block_history: Vec<BlockEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEvent {
    pub blocked_at: DateTime<Utc>,
    pub block_reason: String,
    pub unblocked_at: Option<DateTime<Utc>>,
    pub unblock_reason: Option<String>,
}

impl BlockEvent {
    pub fn is_open(&self) -> bool {
        self.unblocked_at.is_none()
    }
}

impl Card {
    /// The block that is still holding the card, if any.
    pub fn open_block(&self) -> Option<&BlockEvent> {
        self.block_history.iter().find(|b| b.is_open())
    }

    fn open_block_mut(&mut self) -> Option<&mut BlockEvent> {
        self.block_history.iter_mut().find(|b| b.is_open())
    }

    /// Replays a mutation on the in-memory aggregate.
    pub fn apply(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::MoveTo { column_id } => self.column_id = *column_id,
            Mutation::OpenBlock { at, reason } => {
                self.blocked = true;
                self.block_history.push(BlockEvent {
                    blocked_at: *at,
                    block_reason: reason.clone(),
                    unblocked_at: None,
                    unblock_reason: None,
                });
            }
            Mutation::CloseBlock { at, reason } => {
                self.blocked = false;
                if let Some(open) = self.open_block_mut() {
                    open.unblocked_at = Some(*at);
                    open.unblock_reason = Some(reason.clone());
                }
            }
        }
    }
}

/// One row-level change inside a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    MoveTo { column_id: i64 },
    OpenBlock { at: DateTime<Utc>, reason: String },
    CloseBlock { at: DateTime<Utc>, reason: String },
}

#[derive(Debug, Clone, FromRow)]
pub struct CardRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub board_column_id: i64,
    pub is_blocked: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct BlockRow {
    pub blocked_at: String,
    pub block_reason: String,
    pub unblocked_at: Option<String>,
    pub unblock_reason: Option<String>,
}

impl TryFrom<BlockRow> for BlockEvent {
    type Error = KanbanError;

    fn try_from(row: BlockRow) -> Result<Self, Self::Error> {
        Ok(Self {
            blocked_at: parse_timestamp(&row.blocked_at)?,
            block_reason: row.block_reason,
            unblocked_at: row
                .unblocked_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            unblock_reason: row.unblock_reason,
        })
    }
}

impl Card {
    pub fn from_rows(row: CardRow, blocks: Vec<BlockRow>) -> Result<Self, KanbanError> {
        let block_history = blocks
            .into_iter()
            .map(BlockEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let card = Self {
            id: row.id,
            title: row.title,
            description: row.description,
            column_id: row.board_column_id,
            blocked: row.is_blocked,
            block_history,
        };

        let open = card.block_history.iter().filter(|b| b.is_open()).count();
        if open > 1 || (open == 1) != card.blocked {
            return Err(KanbanError::Internal(format!(
                "card {} has {} open blocks but is_blocked = {}",
                card.id, open, card.blocked
            )));
        }

        Ok(card)
    }
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, KanbanError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| KanbanError::Internal(format!("Invalid timestamp '{}': {}", value, e)))
}
