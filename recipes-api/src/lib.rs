//! recipes-api library - HTTP service for the family recipe catalog
//!
//! Exposes the CRUD REST surface over the shared SQLite store plus an
//! embedded RTL browse UI. Notification email is handled out of process
//! by recipes-worker via the notification job queue.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database connection pool
    pub db: SqlitePool,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route(
            "/api/recipes",
            get(api::list_recipes)
                .post(api::create_recipe)
                .put(api::update_recipe_compat)
                .delete(api::delete_recipe_compat),
        )
        .route(
            "/api/recipes/:id",
            get(api::get_recipe)
                .put(api::update_recipe)
                .delete(api::delete_recipe),
        )
        .route("/api/health", get(api::health_check))
        .merge(api::health_routes())
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
