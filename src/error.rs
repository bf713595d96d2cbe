// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::RecordKind;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Optimistic-concurrency mismatch on a conditional write.
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// The activity record was stored, but points/streak were not updated.
    #[error("{} {id} saved but engagement was not updated: {source}", .kind.label())]
    EngagementNotRecorded {
        kind: RecordKind,
        id: String,
        #[source]
        source: Box<AppError>,
    },

    /// The activity record has already earned its points.
    #[error("Already credited: {0}")]
    AlreadyCredited(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    /// Body to send to `POST /api/engagement/check-in` to finish the save.
    #[serde(skip_serializing_if = "Option::is_none")]
    retry: Option<RetryCredit>,
}

#[derive(Serialize)]
struct RetryCredit {
    kind: RecordKind,
    id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retry = match &self {
            AppError::EngagementNotRecorded { kind, id, .. } => Some(RetryCredit {
                kind: *kind,
                id: id.clone(),
            }),
            _ => None,
        };

        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Conflict(msg) => {
                tracing::error!(error = %msg, "Unresolved write conflict");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::EngagementNotRecorded { kind, id, source } => {
                tracing::error!(?kind, id = %id, error = %source, "Engagement update failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "engagement_not_recorded",
                    Some(format!(
                        "{} {id} was saved, but points and streak were not updated; \
                         retry with POST /api/engagement/check-in",
                        kind.label()
                    )),
                )
            }
            AppError::AlreadyCredited(msg) => {
                (StatusCode::CONFLICT, "already_credited", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            retry,
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_messages(&errors, &mut messages);
        messages.sort();
        messages.dedup();
        AppError::Validation(messages.join("; "))
    }
}

/// Flatten field errors, including those of nested structs and lists.
fn collect_messages(errors: &validator::ValidationErrors, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for {field}"),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_messages(inner, out);
                }
            }
        }
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
