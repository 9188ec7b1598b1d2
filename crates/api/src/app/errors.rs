use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use codecamp_camps::moniker::MONIKER_FIELD;
use codecamp_core::{DomainError, ValidationErrors};
use codecamp_infra::{RepositoryError, StoreError};

pub const MONIKER_IN_USE: &str = "Moniker in use";

/// Everything a handler can fail with, mapped onto HTTP semantics.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 with field-level detail.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// 404 with an empty body.
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    UnsupportedVersion(String),

    /// A route parameter or query string value could not be parsed.
    #[error("{0}")]
    InvalidParameter(String),

    #[error("{0}")]
    InvalidBody(String),

    /// The commit went through without touching a row.
    #[error("no rows affected")]
    CommitFailed,

    #[error("storage fault: {0}")]
    Storage(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn moniker_in_use() -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(MONIKER_FIELD, MONIKER_IN_USE);
        ApiError::Validation(errors)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => ApiError::Validation(errors),
            DomainError::InvalidId(msg) => ApiError::InvalidParameter(msg),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // The moniker is the only unique key that a commit can trip over.
            RepositoryError::Store(StoreError::UniqueViolation(_)) => ApiError::moniker_in_use(),
            RepositoryError::Store(e) => ApiError::Storage(e.to_string()),
            RepositoryError::Unpersisted(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(fields) => {
                let message = fields.to_string();
                (
                    StatusCode::BAD_REQUEST,
                    axum::Json(json!({
                        "error": "validation_error",
                        "message": message,
                        "fields": fields,
                    })),
                )
                    .into_response()
            }
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::UnsupportedVersion(msg) => json_error(StatusCode::BAD_REQUEST, "unsupported_api_version", msg),
            ApiError::InvalidParameter(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_parameter", msg),
            ApiError::InvalidBody(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_body", msg),
            ApiError::CommitFailed => {
                tracing::error!("commit affected no rows");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "commit_failed", "no rows affected")
            }
            ApiError::Storage(msg) => {
                tracing::error!(error = %msg, "storage fault");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
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

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_carries_field_messages() {
        let response = ApiError::moniker_in_use().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["fields"]["moniker"][0], MONIKER_IN_USE);
    }

    #[tokio::test]
    async fn not_found_has_an_empty_body() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn commit_without_rows_is_a_server_error() {
        let response = ApiError::CommitFailed.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "commit_failed");
    }

    #[test]
    fn unique_violation_reads_as_moniker_in_use() {
        let err = ApiError::from(RepositoryError::Store(StoreError::UniqueViolation("dup".into())));
        let ApiError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.get("moniker"), Some(&[MONIKER_IN_USE.to_string()][..]));
    }

    #[test]
    fn other_store_faults_are_storage_errors() {
        let err = ApiError::from(RepositoryError::Store(StoreError::Database("down".into())));
        assert!(matches!(err, ApiError::Storage(msg) if msg.contains("down")));
    }
}
