use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};

use hireboard_auth::{Guard, RequestContext};
use hireboard_core::PostingFilter;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::Identity;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_posting).get(list_postings))
        .route(
            "/:id",
            get(get_posting).patch(update_posting).delete(remove_posting),
        )
}

pub async fn create_posting(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    body: Result<Json<dto::NewPostingRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(denied) = authz::require(&[Guard::AdminOnly], &identity, &RequestContext::new()) {
        return denied;
    }
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::validation_error(vec![e.body_text()]),
    };
    let new = match body.validate() {
        Ok(new) => new,
        Err(messages) => return errors::validation_error(messages),
    };

    match services.postings.create(&new).await {
        Ok(posting) => (StatusCode::CREATED, Json(json!({ "posting": posting }))).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn list_postings(
    Extension(services): Extension<Arc<AppServices>>,
    filter: Result<Query<PostingFilter>, QueryRejection>,
) -> axum::response::Response {
    let Query(filter) = match filter {
        Ok(filter) => filter,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", e.body_text()),
    };

    match services.postings.list(Some(&filter)).await {
        Ok(postings) => Json(json!({ "postings": postings })).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

// Ids stay as raw path text; the repository rejects non-integers.
pub async fn get_posting(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.postings.get(&id).await {
        Ok(posting) => Json(json!({ "posting": posting })).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn update_posting(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> axum::response::Response {
    if let Err(denied) = authz::require(&[Guard::AdminOnly], &identity, &RequestContext::new()) {
        return denied;
    }
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::validation_error(vec![e.body_text()]),
    };
    let update = match dto::posting_patch(body) {
        Ok(update) => update,
        Err(messages) => return errors::validation_error(messages),
    };

    match services.postings.update(&id, &update).await {
        Ok(posting) => Json(json!({ "posting": posting })).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn remove_posting(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = authz::require(&[Guard::AdminOnly], &identity, &RequestContext::new()) {
        return denied;
    }

    match services.postings.remove(&id).await {
        Ok(()) => Json(json!({ "deleted": id.trim() })).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}
