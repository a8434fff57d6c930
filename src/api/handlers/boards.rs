use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::dto::{BoardDetails, BoardResponse, BoardStatistics, CreateBoardRequest};
use crate::api::state::AppState;
use crate::domain::{Board, Column, KanbanError};
use crate::services::{BoardService, QueryService};

pub async fn list_boards(State(state): State<AppState>) -> Result<Json<Vec<Board>>, KanbanError> {
    let db = state.require_db()?;
    let boards = BoardService::list_boards(db).await?;
    Ok(Json(boards))
}

pub async fn create_board(
    State(state): State<AppState>,
    Json(req): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<BoardResponse>), KanbanError> {
    req.validate()?;
    let db = state.require_db()?;
    let board = BoardService::create_board(db, req).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn get_board(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BoardDetails>, KanbanError> {
    let db = state.require_db()?;
    let board = QueryService::board_details(db, id).await?;
    Ok(Json(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, KanbanError> {
    let db = state.require_db()?;
    BoardService::delete_board(db, id).await?;
    state.topologies.invalidate(id).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_columns(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Column>>, KanbanError> {
    let db = state.require_db()?;
    BoardService::find_board(db, id).await?;
    let columns = QueryService::list_columns(db, id).await?;
    Ok(Json(columns))
}

pub async fn board_statistics(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BoardStatistics>, KanbanError> {
    let db = state.require_db()?;
    let stats = QueryService::board_statistics(db, id).await?;
    Ok(Json(stats))
}
