use serde::{Deserialize, Serialize};

use crate::api::dto::CardSummary;
use crate::domain::{Column, ColumnKind, KanbanError};

#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    pub name: String,
    #[serde(default = "default_initial_column")]
    pub initial_column: String,
    #[serde(default)]
    pub pending_columns: Vec<String>,
    #[serde(default = "default_final_column")]
    pub final_column: String,
    #[serde(default = "default_cancel_column")]
    pub cancel_column: String,
}

impl CreateBoardRequest {
    /// Board and column names are 2-50 letters and spaces.
    pub fn validate(&self) -> Result<(), KanbanError> {
        validate_name("board name", &self.name)?;
        validate_name("initial column name", &self.initial_column)?;
        for name in &self.pending_columns {
            validate_name("pending column name", name)?;
        }
        validate_name("final column name", &self.final_column)?;
        validate_name("cancel column name", &self.cancel_column)
    }
}

fn validate_name(field: &str, value: &str) -> Result<(), KanbanError> {
    let value = value.trim();
    let length = value.chars().count();
    if !(2..=50).contains(&length)
        || !value.chars().all(|c| c.is_alphabetic() || c.is_whitespace())
    {
        return Err(KanbanError::Validation(format!(
            "{} must be 2-50 letters and spaces",
            field
        )));
    }
    Ok(())
}

fn default_initial_column() -> String {
    "To Do".into()
}

fn default_final_column() -> String {
    "Done".into()
}

fn default_cancel_column() -> String {
    "Cancelled".into()
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Serialize)]
pub struct ColumnSummary {
    pub id: i64,
    pub name: String,
    pub kind: ColumnKind,
    pub order: i64,
    pub cards_amount: i64,
}

#[derive(Debug, Serialize)]
pub struct BoardDetails {
    pub id: i64,
    pub name: String,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Serialize)]
pub struct ColumnDetails {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub kind: ColumnKind,
    pub order: i64,
    pub cards: Vec<CardSummary>,
}

#[derive(Debug, Serialize)]
pub struct ColumnStatistics {
    pub id: i64,
    pub name: String,
    pub kind: ColumnKind,
    pub order: i64,
    pub cards: i64,
    pub blocked_cards: i64,
}

#[derive(Debug, Serialize)]
pub struct BoardStatistics {
    pub board_id: i64,
    pub total_columns: usize,
    pub initial_columns: usize,
    pub pending_columns: usize,
    pub final_columns: usize,
    pub cancel_columns: usize,
    pub total_cards: i64,
    pub blocked_cards: i64,
    pub columns: Vec<ColumnStatistics>,
    pub generated_at: String,
}
