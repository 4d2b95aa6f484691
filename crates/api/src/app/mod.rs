//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: service construction (directory, engine, audit log)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use sqlx::PgPool;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(pool: PgPool, jwt_secret: String) -> Router {
    let verifier = Arc::new(oxbank_auth::Hs256TokenVerifier::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { verifier };

    let services = Arc::new(services::build_services(pool));

    // Protected routes: require an authenticated principal.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
