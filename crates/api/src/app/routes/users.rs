//! Per-user application endpoints (`/users/:username/postings`).

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use hireboard_auth::{Guard, RequestContext};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::Identity;

pub fn router() -> Router {
    Router::new()
        .route("/:username/postings", get(list_applications))
        .route("/:username/postings/:id", post(apply))
}

pub async fn apply(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path((username, id)): Path<(String, String)>,
) -> axum::response::Response {
    let ctx = RequestContext::for_user(&username);
    if let Err(denied) = authz::require(&[Guard::AdminOrResourceOwner], &identity, &ctx) {
        return denied;
    }

    match services.postings.apply(&username, &id).await {
        Ok(applied) => Json(json!({ "applied": applied })).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn list_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(username): Path<String>,
) -> axum::response::Response {
    let ctx = RequestContext::for_user(&username);
    if let Err(denied) = authz::require(&[Guard::AdminOrResourceOwner], &identity, &ctx) {
        return denied;
    }

    match services.postings.applications(&username).await {
        Ok(postings) => Json(json!({ "postings": postings })).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}
