// --- File: crates/appointly_common/src/routes.rs ---
use axum::{routing::get, Router};

/// Creates a router with the routes shared by every deployment.
pub fn routes() -> Router {
    Router::new()
        .route("/", get(|| async { "Hello World" }))
        .route("/health", get(|| async { "ok" }))
}
