//! Request types for the leave engine API.
//!
//! This module defines the JSON bodies of the `/leave/approve` and
//! `/leave/preview` endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Allocation;
use crate::workflow::{Decision, ReviewAction};

/// Request body for the `/leave/approve` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    /// The leave request being decided.
    #[serde(rename = "LeaveID")]
    pub leave_id: String,
    /// `APPROVE` or `REJECT`.
    pub action: ReviewAction,
    /// The proposed split, required for HR approval and re-allocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakup: Option<Allocation>,
    /// The sandwich toggle. Absent keeps the request's current flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandwich_applied: Option<bool>,
}

impl DecisionRequest {
    /// Returns true if an allocation was sent with a rejection.
    pub fn has_ignored_breakup(&self) -> bool {
        self.action == ReviewAction::Reject && self.breakup.is_some()
    }
}

impl From<&DecisionRequest> for Decision {
    fn from(req: &DecisionRequest) -> Self {
        match (req.action, req.breakup) {
            (ReviewAction::Reject, _) => Decision::Reject,
            (ReviewAction::Approve, None) => Decision::approve_without_allocation(),
            (ReviewAction::Approve, Some(breakup)) => match req.sandwich_applied {
                Some(applied) => Decision::approve(breakup, applied),
                None => Decision::approve_keeping_sandwich(breakup),
            },
        }
    }
}

/// Request body for the `/leave/preview` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    /// The leave request being reviewed.
    #[serde(rename = "LeaveID")]
    pub leave_id: String,
    /// Proposed CPL days.
    #[serde(rename = "CPL", default)]
    pub cpl: Decimal,
    /// Proposed SL days.
    #[serde(rename = "SL", default)]
    pub sl: Decimal,
    /// The sandwich toggle. Absent keeps the request's current flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandwich_applied: Option<bool>,
}
