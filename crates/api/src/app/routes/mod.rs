use axum::Router;

pub mod admin;
pub mod common;
pub mod quotes;
pub mod shipments;
pub mod system;
pub mod tracking;

/// Router for every endpoint behind the auth-resolving middleware.
pub fn router() -> Router {
    Router::new()
        .nest("/quotes", quotes::router())
        .nest("/tracking", tracking::router())
        .nest("/shipments", shipments::router())
        .nest("/admin", admin::router())
}
