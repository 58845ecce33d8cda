//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repositories shared by handlers
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and their field checks
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use hireboard_auth::Hs256Verifier;
use hireboard_infra::Storage;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(storage: Arc<dyn Storage>, jwt_secret: &[u8]) -> Router {
    let verifier = Arc::new(Hs256Verifier::new(jwt_secret));
    let identity_state = middleware::IdentityState { verifier };

    let services = Arc::new(services::AppServices::new(storage));

    // Every route sees an `Identity`; guards inside each handler decide access.
    let api = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                identity_state,
                middleware::identity_middleware,
            ))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
}
