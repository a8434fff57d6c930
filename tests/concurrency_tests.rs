mod common;

use std::collections::HashSet;
use std::sync::Arc;

use sqlx::SqlitePool;
use tempfile::TempDir;

use kanban_board::config::Config;
use kanban_board::domain::{ColumnKind, KanbanError};
use kanban_board::infrastructure::{db, CardGateway};
use kanban_board::services::{CardService, QueryService};

/// File-backed database so that several pooled connections share one store.
async fn setup_file_db(dir: &TempDir) -> SqlitePool {
    let config = Config {
        database_url: format!("sqlite://{}", dir.path().join("board.db").display()),
        max_connections: 8,
        ..Config::default()
    };
    db::init_db(&config).await.expect("database should initialize")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_database_runs_in_wal_mode() {
    let dir = TempDir::new().unwrap();
    let pool = setup_file_db(&dir).await;

    let mode = db::verify_wal_mode(&pool).await.unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_moves_never_double_advance() {
    let dir = TempDir::new().unwrap();
    let pool = setup_file_db(&dir).await;
    let (board, topology) = common::seed_board(&pool, &["Design", "Build", "Test"]).await;
    let topology = Arc::new(topology);
    let gateway = CardGateway::new(pool.clone());

    let card = CardService::create_card(&gateway, board.id, "Feature", "Big one")
        .await
        .unwrap();
    let card_id = card.id;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let gateway = gateway.clone();
        let topology = Arc::clone(&topology);
        handles.push(tokio::spawn(async move {
            CardService::move_to_next_column(&gateway, card_id, &topology).await
        }));
    }

    let mut reached = HashSet::new();
    let mut exhausted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(moved) => assert!(reached.insert(moved.column_id), "column visited twice"),
            Err(KanbanError::NoNextColumn(_)) => exhausted += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    // INITIAL → Design → Build → Test → FINAL
    assert_eq!(reached.len(), topology.pending_count() + 1);
    assert_eq!(exhausted, 10 - reached.len());

    let details = QueryService::find_card(&pool, card.id).await.unwrap();
    assert_eq!(details.column_kind, ColumnKind::Final);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_block_racing_cancel_has_one_consistent_outcome() {
    let dir = TempDir::new().unwrap();
    let pool = setup_file_db(&dir).await;
    let (board, topology) = common::seed_board(&pool, &["Doing"]).await;
    let topology = Arc::new(topology);
    let gateway = CardGateway::new(pool.clone());
    let cancel_id = common::column_of_kind(&board, ColumnKind::Cancel);

    for round in 0..5 {
        let card = CardService::create_card(&gateway, board.id, &format!("Race {round}"), "Contended")
            .await
            .unwrap();
        let card_id = card.id;

        let block = {
            let gateway = gateway.clone();
            let topology = Arc::clone(&topology);
            tokio::spawn(async move {
                CardService::block(&gateway, card_id, "hold", &topology).await
            })
        };
        let cancel = {
            let gateway = gateway.clone();
            let topology = Arc::clone(&topology);
            tokio::spawn(async move {
                CardService::cancel(&gateway, card_id, cancel_id, &topology).await
            })
        };

        let cancelled = cancel.await.unwrap().expect("cancel always wins eventually");
        assert_eq!(cancelled.column_id, cancel_id);

        match block.await.unwrap() {
            // Block committed first; cancel then closed its event.
            Ok(_) => {
                let details = QueryService::find_card(&pool, card.id).await.unwrap();
                assert_eq!(details.blocks_amount, 1);
                assert_eq!(
                    details.block_history[0].unblock_reason.as_deref(),
                    Some("cancelled")
                );
            }
            Err(KanbanError::CardInFinalOrCancel { kind, .. }) => {
                assert_eq!(kind, ColumnKind::Cancel);
            }
            Err(other) => panic!("unexpected error: {other}"),
        }

        let details = QueryService::find_card(&pool, card.id).await.unwrap();
        assert!(!details.blocked);
        assert!(details.block_history.iter().all(|b| !b.is_open()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_on_one_board_all_commit() {
    let dir = TempDir::new().unwrap();
    let pool = setup_file_db(&dir).await;
    let (board, _) = common::seed_board(&pool, &["Doing"]).await;
    let gateway = CardGateway::new(pool.clone());

    let mut handles = Vec::new();
    for i in 0..40 {
        let gateway = gateway.clone();
        let board_id = board.id;
        handles.push(tokio::spawn(async move {
            CardService::create_card(&gateway, board_id, &format!("Task {i}"), "Parallel intake")
                .await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let card = handle.await.unwrap().expect("create should wait for the write lock");
        assert!(ids.insert(card.id));
    }
    assert_eq!(ids.len(), 40);

    let initial = common::column_of_kind(&board, ColumnKind::Initial);
    let column = QueryService::find_column(&pool, initial).await.unwrap();
    assert_eq!(column.cards.len(), 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_transitions_on_different_cards_proceed_independently() {
    let dir = TempDir::new().unwrap();
    let pool = setup_file_db(&dir).await;
    let (board, topology) = common::seed_board(&pool, &["Doing", "Review"]).await;
    let topology = Arc::new(topology);
    let gateway = CardGateway::new(pool.clone());

    let mut card_ids = Vec::new();
    for i in 0..12 {
        let card = CardService::create_card(&gateway, board.id, &format!("Item {i}"), "Own path")
            .await
            .unwrap();
        card_ids.push(card.id);
    }

    let mut handles = Vec::new();
    for card_id in card_ids.iter().copied() {
        let gateway = gateway.clone();
        let topology = Arc::clone(&topology);
        handles.push(tokio::spawn(async move {
            CardService::move_to_next_column(&gateway, card_id, &topology).await?;
            CardService::block(&gateway, card_id, "waiting", &topology).await?;
            CardService::unblock(&gateway, card_id, "resumed", &topology).await?;
            CardService::move_to_next_column(&gateway, card_id, &topology).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().expect("independent cards should not interfere");
    }

    for card_id in card_ids {
        let details = QueryService::find_card(&pool, card_id).await.unwrap();
        assert_eq!(details.column_name, "Review");
        assert!(!details.blocked);
        assert_eq!(details.blocks_amount, 1);
    }
}
