use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::api::state::AppState;
use crate::config::Config;

pub fn create_router(state: AppState, config: &Config) -> Router {
    let origins: Vec<HeaderValue> = config
        .cors_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let board_routes = Router::new()
        .route(
            "/",
            get(handlers::boards::list_boards).post(handlers::boards::create_board),
        )
        .route(
            "/{id}",
            get(handlers::boards::get_board).delete(handlers::boards::delete_board),
        )
        .route("/{id}/columns", get(handlers::boards::list_columns))
        .route("/{id}/statistics", get(handlers::boards::board_statistics))
        .route("/{id}/cards", post(handlers::cards::create_card))
        .route("/{id}/cards/{card_id}/move", post(handlers::cards::move_card))
        .route("/{id}/cards/{card_id}/block", post(handlers::cards::block_card))
        .route(
            "/{id}/cards/{card_id}/unblock",
            post(handlers::cards::unblock_card),
        )
        .route(
            "/{id}/cards/{card_id}/cancel",
            post(handlers::cards::cancel_card),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::liveness))
        .nest("/api/boards", board_routes)
        .route("/api/cards/{id}", get(handlers::cards::get_card))
        .route("/api/columns/{id}", get(handlers::columns::get_column))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
