use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::dto::ColumnDetails;
use crate::api::state::AppState;
use crate::domain::KanbanError;
use crate::services::QueryService;

pub async fn get_column(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ColumnDetails>, KanbanError> {
    let db = state.require_db()?;
    let column = QueryService::find_column(db, id).await?;
    Ok(Json(column))
}
