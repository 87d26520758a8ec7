use super::{AppState, handlers};
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the Axum router with all routes and shared state.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .route("/book", get(handlers::book))
        .route("/summary", get(handlers::summary))
        .route("/depth", get(handlers::depth))
        .route("/history", get(handlers::history))
        .route("/events", get(handlers::events))
        .route("/view", get(handlers::view))
        .route("/orders", post(handlers::submit_order))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // the renderer is a browser page served from elsewhere
        .layer(CorsLayer::permissive())
}
