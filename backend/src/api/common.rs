//! Error handling utilities for API responses.
//!
//! Provides the response envelope shared by the JSON endpoints and the
//! conversion from service-layer errors to HTTP responses.
//!
//! # Response Format
//! Errors return consistent JSON responses containing:
//! - `message`: Human-readable message
//! - `error.error_type`: Machine-readable error category
//!
//! Internal failures are logged and reported with a generic message only.

use crate::errors::ServiceError;
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Request timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a successful response with default message
    pub fn ok(data: T) -> Self {
        Self::success(data, "Request successful")
    }

    /// Create an error response
    pub fn error(message: impl Into<String>, error_type: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>, error_type: &str) -> ApiError {
    (status, Json(ApiResponse::<()>::error(message, error_type)))
}

/// 401 returned by the auth gate whatever the concrete reason was.
pub fn unauthenticated_response() -> ApiError {
    error_response(StatusCode::UNAUTHORIZED, "Unauthenticated", "unauthenticated")
}

/// 500 returned by the auth gate on infrastructure failures.
pub fn server_error_response() -> ApiError {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server error", "internal_error")
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> ApiError {
    let (status, error_type, message) = match error {
        ServiceError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "validation_error", message)
        }
        ServiceError::NotFound { entity, identifier } => {
            tracing::debug!("{} not found: {}", entity, identifier);
            (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} not found", entity),
            )
        }
        ServiceError::AlreadyExists { entity, identifier } => (
            StatusCode::CONFLICT,
            "already_exists",
            format!("{} '{}' already exists", entity, identifier),
        ),
        ServiceError::Unauthenticated { message } => {
            (StatusCode::UNAUTHORIZED, "unauthenticated", message)
        }
        ServiceError::Unauthorized { message } => {
            (StatusCode::FORBIDDEN, "unauthorized", message)
        }
        internal @ (ServiceError::Database { .. }
        | ServiceError::Cache { .. }
        | ServiceError::Signing { .. }
        | ServiceError::Hash { .. }
        | ServiceError::InternalError { .. }) => {
            tracing::error!("Internal error: {}", internal);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
    };

    error_response(status, message, error_type)
}
