use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::authz;
use crate::context::Identity;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(identity): Extension<Identity>) -> axum::response::Response {
    let claims = match authz::require_authenticated(&identity) {
        Ok(claims) => claims,
        Err(denied) => return denied,
    };
    Json(serde_json::json!({
        "username": claims.username,
        "isAdmin": claims.is_admin,
    }))
    .into_response()
}
