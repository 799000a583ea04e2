//! Response types for the leave engine API.
//!
//! This module defines the success and error bodies and maps engine errors
//! onto HTTP statuses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{Allocation, LeaveBalance, LeaveStatus};
use crate::workflow::TransitionOutcome;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message, shown to the approver verbatim.
    pub error: String,
    /// Error code for programmatic handling.
    pub code: String,
    /// Optional structured details about the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        error: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: Some(details),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an error for a missing or unknown actor role header.
    pub fn invalid_actor(message: impl Into<String>) -> Self {
        Self::new("INVALID_ACTOR", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Pairs an error body with a status.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, body) = match &error {
            EngineError::ConfigNotFound { path } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", message, serde_json::json!({ "path": path })),
            ),
            EngineError::ConfigParseError { path, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", message, serde_json::json!({ "path": path })),
            ),
            EngineError::NotFound { leave_id } => (
                StatusCode::NOT_FOUND,
                ApiError::with_details(
                    "NOT_FOUND",
                    message,
                    serde_json::json!({ "LeaveID": leave_id }),
                ),
            ),
            EngineError::InvalidTransition { status, action, .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "INVALID_TRANSITION",
                    message,
                    serde_json::json!({ "status": status, "action": action }),
                ),
            ),
            EngineError::ActorNotPermitted { role, status, .. } => (
                StatusCode::FORBIDDEN,
                ApiError::with_details(
                    "ACTOR_NOT_PERMITTED",
                    message,
                    serde_json::json!({ "role": role, "status": status }),
                ),
            ),
            EngineError::InvalidAllocation { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INVALID_ALLOCATION", message),
            ),
            EngineError::InsufficientBalance { shortfalls } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "INSUFFICIENT_BALANCE",
                    message,
                    serde_json::json!({ "shortfalls": shortfalls }),
                ),
            ),
            EngineError::CommitInFlight { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("COMMIT_IN_FLIGHT", message),
            ),
            EngineError::CommitFailure { .. } => (
                StatusCode::BAD_GATEWAY,
                ApiError::new("COMMIT_FAILURE", message),
            ),
        };
        ApiErrorResponse::new(status, body)
    }
}

/// Response body for a committed decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    /// The leave id.
    #[serde(rename = "LeaveID")]
    pub leave_id: String,
    /// The stored status.
    pub status: LeaveStatus,
    /// The committed breakup, once approved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakup: Option<Allocation>,
    /// The employee's pool after the commit, when it changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<LeaveBalance>,
}

impl From<&TransitionOutcome> for DecisionResponse {
    fn from(outcome: &TransitionOutcome) -> Self {
        Self {
            leave_id: outcome.leave_id.clone(),
            status: outcome.to,
            breakup: outcome.breakup,
            balance: (!outcome.mutation.is_noop()).then_some(outcome.balance_after),
        }
    }
}
