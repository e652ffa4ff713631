use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::error::DomainError;

/// Every error body is `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Status + message pair rendered as an `ErrorBody`.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// The endpoint an error is reported from; create and update word the same failures differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Query,
    Update,
    Delete,
}

/// Map domain error to the `{error}` response of the given endpoint
pub fn map_domain_error(e: &DomainError, op: Operation) -> ErrorResponse {
    match e {
        DomainError::MissingFields => ErrorResponse::bad_request("Please fill all fields"),
        DomainError::InactiveManager { .. } => match op {
            Operation::Update => ErrorResponse::bad_request("Manager inactive"),
            _ => ErrorResponse::bad_request("Manager is not active"),
        },
        DomainError::InvalidMobile { .. } => match op {
            Operation::Update => ErrorResponse::bad_request("Invalid mobile"),
            _ => ErrorResponse::bad_request("Invalid mobile number"),
        },
        DomainError::InvalidPan { .. } => match op {
            Operation::Update => ErrorResponse::bad_request("Invalid PAN"),
            _ => ErrorResponse::bad_request("Invalid PAN number"),
        },
        DomainError::InvalidUserIds => ErrorResponse::bad_request("Invalid user_ids"),
        DomainError::NoUpdateData => ErrorResponse::bad_request("No update data provided"),
        DomainError::MissingLookupKey => ErrorResponse::bad_request("Provide user_id or mob_num"),
        DomainError::UserNotFound => ErrorResponse::new(StatusCode::NOT_FOUND, "User not found"),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            ErrorResponse::internal()
        }
    }
}
