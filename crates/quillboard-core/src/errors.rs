//! Application error type.
//!
//! Every fallible handler and service returns [`AppError`]. It carries the HTTP
//! status to answer with, the underlying cause, and, for validation failures, a
//! field to message map that forms re-render next to the offending inputs.
//!
//! # Response Body
//!
//! ```json
//! { "error": "Validation failed", "errors": { "title": "Title is required" } }
//! ```
//!
//! Server errors (5xx) never leak their cause: the detail is logged and the
//! body carries a generic message.

use std::collections::BTreeMap;

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Field name to human readable message.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub fields: Option<FieldErrors>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            fields: None,
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal_error(message: String) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, anyhow!(message))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized(message: String) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow!(message))
    }

    /// The "access denied" outcome of a failed permission check.
    pub fn forbidden(message: String) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow!(message))
    }

    /// A 422 carrying one message per offending field.
    pub fn validation(fields: FieldErrors) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            error: anyhow!("Validation failed"),
            fields: Some(fields),
        }
    }

    /// Single-field validation failure, e.g. a server-side existence check.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), message.into());
        Self::validation(fields)
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = ?self.error, "Request failed");
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let body = match self.fields {
            Some(fields) => json!({ "error": message, "errors": fields }),
            None => json!({ "error": message }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        let err = AppError::not_found(anyhow!("Blog not found"));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.error.to_string(), "Blog not found");
        assert!(err.fields.is_none());
    }

    #[test]
    fn test_validation_carries_fields() {
        let mut fields = FieldErrors::new();
        fields.insert("title".into(), "Title is required".into());
        let err = AppError::validation(fields);
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.fields.unwrap().get("title").map(String::as_str),
            Some("Title is required")
        );
    }

    #[test]
    fn test_field_helper() {
        let err = AppError::field("category_id", "Selected category does not exist");
        let fields = err.fields.unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("category_id"));
    }

    #[test]
    fn test_from_anyhow_is_internal() {
        let err: AppError = anyhow!("boom").into();
        assert!(err.is_server_error());
    }

    #[test]
    fn test_forbidden_status() {
        let err = AppError::forbidden("Access denied".to_string());
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_server_error_response_hides_detail() {
        let response = AppError::internal(anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
