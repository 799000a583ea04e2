//! HTTP request handlers for the leave engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::workflow::{ActorRole, Decision};

use super::request::{DecisionRequest, PreviewRequest};
use super::response::{ApiError, ApiErrorResponse, DecisionResponse};
use super::state::AppState;

/// Header carrying the caller's role, set by the authenticating proxy.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/leave/admin/history", get(history_handler))
        .route("/leave/preview", post(preview_handler))
        .route("/leave/approve", post(approve_handler))
        .with_state(state)
}

/// Handler for GET /leave/admin/history.
async fn history_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Fetching leave history");

    match state.service().history() {
        Ok(history) => {
            info!(
                correlation_id = %correlation_id,
                entries = history.len(),
                "History fetched"
            );
            (StatusCode::OK, Json(history)).into_response()
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "History fetch failed");
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Handler for POST /leave/preview.
///
/// Computes what a decision with the submitted numbers would do without
/// committing anything.
async fn preview_handler(
    State(state): State<AppState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    info!(
        correlation_id = %correlation_id,
        leave_id = %request.leave_id,
        "Processing preview request"
    );

    match state.service().preview(
        &request.leave_id,
        request.cpl,
        request.sl,
        request.sandwich_applied,
    ) {
        Ok(preview) => (StatusCode::OK, Json(preview)).into_response(),
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                leave_id = %request.leave_id,
                error = %err,
                "Preview failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Handler for POST /leave/approve.
///
/// Applies an `APPROVE` or `REJECT` decision on behalf of the role named in
/// the `X-Actor-Role` header and commits it.
async fn approve_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let actor = match actor_role(&headers) {
        Ok(actor) => actor,
        Err(error) => {
            warn!(
                correlation_id = %correlation_id,
                leave_id = %request.leave_id,
                error = %error.error,
                "Rejected decision without a valid actor role"
            );
            return ApiErrorResponse::new(StatusCode::BAD_REQUEST, error).into_response();
        }
    };

    info!(
        correlation_id = %correlation_id,
        leave_id = %request.leave_id,
        action = %request.action,
        actor = %actor,
        "Processing decision"
    );

    if request.has_ignored_breakup() {
        warn!(
            correlation_id = %correlation_id,
            leave_id = %request.leave_id,
            "Ignoring breakup sent with a rejection"
        );
    }

    let decision = Decision::from(&request);
    let start_time = Instant::now();

    match state.service().decide(&request.leave_id, actor, &decision) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                leave_id = %outcome.leave_id,
                employee_id = %outcome.employee_id,
                status = %outcome.to,
                duration_us = start_time.elapsed().as_micros(),
                "Decision completed successfully"
            );
            (StatusCode::OK, Json(DecisionResponse::from(&outcome))).into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                leave_id = %request.leave_id,
                error = %err,
                "Decision failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

fn actor_role(headers: &HeaderMap) -> Result<ActorRole, ApiError> {
    let value = headers
        .get(ACTOR_ROLE_HEADER)
        .ok_or_else(|| ApiError::invalid_actor("X-Actor-Role header is required"))?;
    let value = value
        .to_str()
        .map_err(|_| ApiError::invalid_actor("X-Actor-Role header is not valid text"))?;
    value
        .parse::<ActorRole>()
        .map_err(|err| ApiError::invalid_actor(err.to_string()))
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") || body_text.contains("unknown variant") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::new(StatusCode::BAD_REQUEST, error).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeavePolicy;
    use crate::models::{HistoryEntry, LeaveBalance, LeaveRequest, LeaveStatus};
    use crate::service::ReviewService;
    use crate::store::InMemoryLeaveStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let request = LeaveRequest {
            id: "leave_001".to_string(),
            employee_id: "emp_001".to_string(),
            employee_name: "Asha Rao".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 6).unwrap(),
            total_days: 5,
            status: LeaveStatus::PendingHr,
            reason: String::new(),
            sandwich_eligible: false,
            sandwich_weekend_days: 0,
            sandwich_applied: false,
            breakup: None,
        };
        let store = InMemoryLeaveStore::from_history(vec![HistoryEntry::new(
            request,
            LeaveBalance::new(Decimal::from(5), Decimal::from(5)),
        )]);
        AppState::new(ReviewService::new(Arc::new(store), LeavePolicy::default()))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post_json(uri: &str, role: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(role) = role {
            builder = builder.header("X-Actor-Role", role);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_api_001_history_returns_200() {
        let router = create_router(create_test_state());
        let request = Request::builder()
            .uri("/leave/admin/history")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["LeaveID"], "leave_001");
        assert_eq!(body[0]["employeeLeaveBalance"]["CPL"], "5");
    }

    #[tokio::test]
    async fn test_api_002_malformed_json_returns_400() {
        let router = create_router(create_test_state());
        let (status, body) = send(
            router,
            post_json("/leave/approve", Some("hr"), "{invalid json".to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_api_003_missing_role_returns_400() {
        let router = create_router(create_test_state());
        let body = json!({ "LeaveID": "leave_001", "action": "REJECT" });
        let (status, body) = send(router, post_json("/leave/approve", None, body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ACTOR");
    }

    #[tokio::test]
    async fn test_api_004_unknown_role_returns_400() {
        let router = create_router(create_test_state());
        let body = json!({ "LeaveID": "leave_001", "action": "REJECT" });
        let (status, body) =
            send(router, post_json("/leave/approve", Some("manager"), body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("manager"));
    }

    #[tokio::test]
    async fn test_api_005_approve_returns_status_and_balance() {
        let router = create_router(create_test_state());
        let body = json!({
            "LeaveID": "leave_001",
            "action": "APPROVE",
            "breakup": { "CPL": 2, "SL": 1, "LOP": 2 },
            "sandwichApplied": false
        });
        let (status, body) = send(router, post_json("/leave/approve", Some("hr"), body.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "APPROVED");
        assert_eq!(body["balance"]["CPL"], "3");
        assert_eq!(body["balance"]["SL"], "4");
    }

    #[tokio::test]
    async fn test_api_006_missing_action_returns_400() {
        let router = create_router(create_test_state());
        let body = json!({ "LeaveID": "leave_001" });
        let (status, body) = send(router, post_json("/leave/approve", Some("hr"), body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_api_007_preview_returns_200() {
        let router = create_router(create_test_state());
        let body = json!({ "LeaveID": "leave_001", "CPL": 4, "SL": 2 });
        let (status, body) = send(router, post_json("/leave/preview", None, body.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overAllocation"], "1");
        assert_eq!(body["balanced"], false);
        assert_eq!(body["balanceSufficient"], true);
    }
}
