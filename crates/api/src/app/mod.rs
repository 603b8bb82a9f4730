//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (store selection, collaborators,
//!   the four application services)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from the environment (public entrypoint used
/// by `main.rs`). `DATABASE_URL` selects the Postgres store; without it the
/// process runs on the in-memory store.
pub async fn build_app(jwt_secret: String) -> Router {
    let services = services::build_services().await;
    build_app_with(jwt_secret, Arc::new(services))
}

/// Build the router around pre-wired services. Tests use this to inject the
/// in-memory store and null collaborators directly.
pub fn build_app_with(jwt_secret: String, services: Arc<services::AppServices>) -> Router {
    let jwt = Arc::new(dovic_auth::Hs256JwtValidator::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Outermost first: auth resolves the caller before any handler or
    // extension extraction runs.
    let api = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
}
