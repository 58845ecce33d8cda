use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use hireboard_core::RepoError;

pub fn repo_error_to_response(err: RepoError) -> axum::response::Response {
    let (status, code) = match &err {
        RepoError::EmptyInput => (StatusCode::BAD_REQUEST, "empty_input"),
        RepoError::InvalidRange { .. } => (StatusCode::BAD_REQUEST, "invalid_range"),
        RepoError::NegativeBound { .. } => (StatusCode::BAD_REQUEST, "negative_bound"),
        RepoError::InvalidKey(_) => (StatusCode::BAD_REQUEST, "invalid_key"),
        RepoError::Duplicate { .. } => (StatusCode::BAD_REQUEST, "duplicate"),
        RepoError::MissingParent { .. } => (StatusCode::BAD_REQUEST, "missing_parent"),
        RepoError::ImmutableField(_) => (StatusCode::BAD_REQUEST, "immutable_field"),
        RepoError::UnknownField(_) => (StatusCode::BAD_REQUEST, "unknown_field"),
        RepoError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        RepoError::Storage(e) => {
            tracing::error!(error = %e, "storage failure");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                "internal storage error",
            );
        }
    };
    json_error(status, code, err.to_string())
}

/// 400 carrying every schema complaint about a request body.
pub fn validation_error(messages: Vec<String>) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "validation_error",
        messages.join("; "),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hireboard_core::StorageError;

    #[test]
    fn repo_errors_map_to_statuses() {
        let cases = [
            (RepoError::EmptyInput, StatusCode::BAD_REQUEST),
            (
                RepoError::InvalidRange { dimension: "employees", min: 10, max: 5 },
                StatusCode::BAD_REQUEST,
            ),
            (
                RepoError::NegativeBound { filter: "minSalary", value: -1 },
                StatusCode::BAD_REQUEST,
            ),
            (RepoError::invalid_key("abc"), StatusCode::BAD_REQUEST),
            (RepoError::duplicate("organization", "c1"), StatusCode::BAD_REQUEST),
            (RepoError::missing_parent("organization", "c9"), StatusCode::BAD_REQUEST),
            (RepoError::ImmutableField("handle".into()), StatusCode::BAD_REQUEST),
            (RepoError::UnknownField("color".into()), StatusCode::BAD_REQUEST),
            (RepoError::not_found("posting", "0"), StatusCode::NOT_FOUND),
            (
                RepoError::Storage(StorageError::Database("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(repo_error_to_response(err.clone()).status(), status, "{err:?}");
        }
    }
}
