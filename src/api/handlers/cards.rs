use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::dto::{
    BlockCardRequest, CancelCardRequest, CardDetails, CardResponse, CreateCardRequest,
    UnblockCardRequest,
};
use crate::api::AppState;
use crate::domain::KanbanError;
use crate::services::{CardService, QueryService};

pub async fn create_card(
    State(state): State<AppState>,
    Path(board_id): Path<i64>,
    Json(req): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<CardResponse>), KanbanError> {
    req.validate()?;
    let gateway = state.require_gateway()?;
    let card = CardService::create_card(&gateway, board_id, &req.title, &req.description).await?;
    Ok((StatusCode::CREATED, Json(card.into())))
}

pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CardDetails>, KanbanError> {
    let db = state.require_db()?;
    let card = QueryService::find_card(db, id).await?;
    Ok(Json(card))
}

pub async fn move_card(
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(i64, i64)>,
) -> Result<Json<CardResponse>, KanbanError> {
    let gateway = state.require_gateway()?;
    let topology = state.topologies.get_or_load(gateway.pool(), board_id).await?;
    let card = CardService::move_to_next_column(&gateway, card_id, &topology).await?;
    Ok(Json(card.into()))
}

pub async fn block_card(
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(i64, i64)>,
    Json(req): Json<BlockCardRequest>,
) -> Result<Json<CardResponse>, KanbanError> {
    let gateway = state.require_gateway()?;
    let topology = state.topologies.get_or_load(gateway.pool(), board_id).await?;
    let card = CardService::block(&gateway, card_id, &req.reason, &topology).await?;
    Ok(Json(card.into()))
}

pub async fn unblock_card(
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(i64, i64)>,
    Json(req): Json<UnblockCardRequest>,
) -> Result<Json<CardResponse>, KanbanError> {
    let gateway = state.require_gateway()?;
    let topology = state.topologies.get_or_load(gateway.pool(), board_id).await?;
    let card = CardService::unblock(&gateway, card_id, &req.reason, &topology).await?;
    Ok(Json(card.into()))
}

pub async fn cancel_card(
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(i64, i64)>,
    Json(req): Json<CancelCardRequest>,
) -> Result<Json<CardResponse>, KanbanError> {
    let gateway = state.require_gateway()?;
    let topology = state.topologies.get_or_load(gateway.pool(), board_id).await?;
    let cancel_column_id = req
        .cancel_column_id
        .unwrap_or_else(|| topology.cancel_column().id);
    let card = CardService::cancel(&gateway, card_id, cancel_column_id, &topology).await?;
    Ok(Json(card.into()))
}
