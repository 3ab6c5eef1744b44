use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::core_state::CoreState;

use super::handlers;

/// Build the service router. All routes live under `/api`.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/process", post(handlers::process))
        .route("/save", post(handlers::save))
        .route("/session/workspace", post(handlers::select_workspace))
        .route("/transcripts", get(handlers::list_transcripts))
        .route("/transcripts/:id", delete(handlers::delete_transcript))
        .route("/items", post(handlers::add_item))
        .route(
            "/items/:id",
            patch(handlers::update_item).delete(handlers::delete_item),
        )
        .route(
            "/workspaces",
            get(handlers::list_workspaces).post(handlers::create_workspace),
        )
        .route("/users", post(handlers::create_user))
        .with_state(core);

    Router::new()
        .nest("/api", routes)
        .layer(CorsLayer::permissive())
}
