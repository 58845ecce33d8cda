use axum::{routing::get, Router};

pub mod organizations;
pub mod postings;
pub mod system;
pub mod users;

/// Router for every endpoint behind the identity middleware.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/organizations", organizations::router())
        .nest("/postings", postings::router())
        .nest("/users", users::router())
}
