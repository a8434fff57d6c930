use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::domain::ColumnKind;

#[derive(Debug, thiserror::Error)]
pub enum KanbanError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("card not found: {0}")]
    CardNotFound(i64),

    #[error("card {0} is blocked and cannot be moved; unblock it first")]
    CardBlocked(i64),

    #[error("card {0} is already blocked")]
    CardAlreadyBlocked(i64),

    #[error("card {0} is not blocked")]
    CardNotBlocked(i64),

    #[error("card {card_id} is in a {kind} column and can no longer change")]
    CardInFinalOrCancel { card_id: i64, kind: ColumnKind },

    #[error("card {0} is already in the final column")]
    NoNextColumn(i64),

    #[error("invalid board topology: {0}")]
    InvalidTopology(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl KanbanError {
    /// Only transport failures may succeed when retried unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, KanbanError::Persistence(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            KanbanError::Validation(_) => "validation_error",
            KanbanError::CardNotFound(_) => "card_not_found",
            KanbanError::CardBlocked(_) => "card_blocked",
            KanbanError::CardAlreadyBlocked(_) => "card_already_blocked",
            KanbanError::CardNotBlocked(_) => "card_not_blocked",
            KanbanError::CardInFinalOrCancel { .. } => "card_in_final_or_cancel",
            KanbanError::NoNextColumn(_) => "no_next_column",
            KanbanError::InvalidTopology(_) => "invalid_topology",
            KanbanError::NotFound(_) => "not_found",
            KanbanError::Internal(_) => "internal_error",
            KanbanError::Persistence(_) => "persistence_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            KanbanError::Validation(_) => StatusCode::BAD_REQUEST,
            KanbanError::CardNotFound(_) | KanbanError::NotFound(_) => StatusCode::NOT_FOUND,
            KanbanError::CardBlocked(_)
            | KanbanError::CardAlreadyBlocked(_)
            | KanbanError::CardNotBlocked(_)
            | KanbanError::CardInFinalOrCancel { .. }
            | KanbanError::NoNextColumn(_) => StatusCode::CONFLICT,
            KanbanError::InvalidTopology(_) => StatusCode::UNPROCESSABLE_ENTITY,
            KanbanError::Internal(_) | KanbanError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for KanbanError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            KanbanError::Persistence(err) => {
                tracing::error!("Database error: {:?}", err);
                "Internal server error".to_string()
            }
            KanbanError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "code": self.code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
