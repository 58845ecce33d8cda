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
use hireboard_core::OrganizationFilter;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::Identity;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_organization).get(list_organizations))
        .route(
            "/:handle",
            get(get_organization)
                .patch(update_organization)
                .delete(remove_organization),
        )
}

pub async fn create_organization(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    body: Result<Json<dto::NewOrganizationRequest>, JsonRejection>,
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

    match services.organizations.create(&new).await {
        Ok(organization) => (
            StatusCode::CREATED,
            Json(json!({ "organization": organization })),
        )
            .into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn list_organizations(
    Extension(services): Extension<Arc<AppServices>>,
    filter: Result<Query<OrganizationFilter>, QueryRejection>,
) -> axum::response::Response {
    let Query(filter) = match filter {
        Ok(filter) => filter,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", e.body_text()),
    };

    match services.organizations.list(Some(&filter)).await {
        Ok(organizations) => Json(json!({ "organizations": organizations })).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn get_organization(
    Extension(services): Extension<Arc<AppServices>>,
    Path(handle): Path<String>,
) -> axum::response::Response {
    match services.organizations.get(&handle).await {
        Ok(organization) => Json(json!({ "organization": organization })).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn update_organization(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(handle): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> axum::response::Response {
    if let Err(denied) = authz::require(&[Guard::AdminOnly], &identity, &RequestContext::new()) {
        return denied;
    }
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::validation_error(vec![e.body_text()]),
    };
    let update = match dto::organization_patch(body) {
        Ok(update) => update,
        Err(messages) => return errors::validation_error(messages),
    };

    match services.organizations.update(&handle, &update).await {
        Ok(organization) => Json(json!({ "organization": organization })).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn remove_organization(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(handle): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = authz::require(&[Guard::AdminOnly], &identity, &RequestContext::new()) {
        return denied;
    }

    match services.organizations.remove(&handle).await {
        Ok(()) => Json(json!({ "deleted": handle })).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}
