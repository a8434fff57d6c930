#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tower::ServiceExt;

use kanban_board::api::dto::{BoardResponse, CreateBoardRequest};
use kanban_board::api::{create_router, AppState};
use kanban_board::config::Config;
use kanban_board::domain::{ColumnKind, ColumnTopology};
use kanban_board::infrastructure::db::MIGRATOR;
use kanban_board::services::BoardService;

/// Single-connection in-memory database with the full schema applied.
pub async fn setup_test_db() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create test database");

    MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to create test schema");

    pool
}

pub fn board_request(name: &str, pending: &[&str]) -> CreateBoardRequest {
    CreateBoardRequest {
        name: name.to_string(),
        initial_column: "Backlog".to_string(),
        pending_columns: pending.iter().map(|s| s.to_string()).collect(),
        final_column: "Done".to_string(),
        cancel_column: "Cancelled".to_string(),
    }
}

/// Creates a board and returns it with its validated topology.
pub async fn seed_board(pool: &SqlitePool, pending: &[&str]) -> (BoardResponse, ColumnTopology) {
    let board = BoardService::create_board(pool, board_request("Release", pending))
        .await
        .expect("board should be created");
    let topology = ColumnTopology::new(board.columns.clone()).expect("valid topology");
    (board, topology)
}

pub fn column_of_kind(board: &BoardResponse, kind: ColumnKind) -> i64 {
    board
        .columns
        .iter()
        .find(|c| c.kind == kind)
        .map(|c| c.id)
        .expect("board has a column of every singleton kind")
}

pub fn test_app(pool: SqlitePool) -> Router {
    let config = Arc::new(Config {
        port: 3000,
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        cors_origin: "http://localhost:5173".to_string(),
    });
    let state = AppState::new(Some(pool), config.clone());
    create_router(state, &config)
}

pub async fn make_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, String) {
    let mut request = Request::builder().uri(uri).method(method);

    if body.is_some() {
        request = request.header("content-type", "application/json");
    }

    let request = request
        .body(Body::from(body.unwrap_or_default()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();

    (status, body_str)
}
