use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/books/search", get(handlers::search_books))
        .route("/books/:isbn", get(handlers::get_book))
        // Behavioral signals
        .route("/users/:user_id/signals", post(handlers::record_signal))
        .route("/users/:user_id/signals", get(handlers::list_signals))
        .route(
            "/users/:user_id/signals/:book_id",
            delete(handlers::delete_signal),
        )
        // Declared preferences
        .route("/users/:user_id/preferences", get(handlers::get_preferences))
        .route("/users/:user_id/preferences", put(handlers::put_preferences))
        // Recommendations
        .route(
            "/users/:user_id/recommendations",
            get(handlers::recommendations),
        )
}
