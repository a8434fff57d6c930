use serde::{Deserialize, Serialize};

use crate::domain::{BlockEvent, Card, ColumnKind, KanbanError};

pub const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
    pub title: String,
    pub description: String,
}

impl CreateCardRequest {
    pub fn validate(&self) -> Result<(), KanbanError> {
        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(KanbanError::Validation(format!(
                "description must be at most {} characters",
                MAX_DESCRIPTION_CHARS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct BlockCardRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct UnblockCardRequest {
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelCardRequest {
    /// Defaults to the board's CANCEL column.
    #[serde(default)]
    pub cancel_column_id: Option<i64>,
}

/// A card as returned by the lifecycle operations.
#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub column_id: i64,
    pub blocked: bool,
    pub block_history: Vec<BlockEvent>,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            title: card.title,
            description: card.description,
            column_id: card.column_id,
            blocked: card.blocked,
            block_history: card.block_history,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CardDetails {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub blocks_amount: i64,
    pub column_id: i64,
    pub column_name: String,
    pub column_kind: ColumnKind,
    pub board_id: i64,
    pub block_history: Vec<BlockEvent>,
}

#[derive(Debug, Serialize)]
pub struct CardSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub blocked: bool,
}
