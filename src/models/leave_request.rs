//! Leave request model and lifecycle status.
//!
//! This module defines the [`LeaveRequest`] struct and the closed
//! [`LeaveStatus`] set that the workflow state machine advances.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Allocation;

/// The lifecycle status of a leave request.
///
/// `PendingTl` and `PendingHr` are pre-terminal. `Approved` and `Rejected`
/// are terminal, except that `Approved` admits a re-allocation that keeps
/// the status and replaces the committed breakup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    /// Waiting for the team lead.
    PendingTl,
    /// Waiting for HR to allocate and approve.
    PendingHr,
    /// Approved with a committed breakup.
    Approved,
    /// Rejected by HR. Never resurrected.
    Rejected,
}

impl LeaveStatus {
    /// Returns the wire representation of the status.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_engine::models::LeaveStatus;
    ///
    /// assert_eq!(LeaveStatus::PendingHr.as_str(), "PENDING_HR");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::PendingTl => "PENDING_TL",
            LeaveStatus::PendingHr => "PENDING_HR",
            LeaveStatus::Approved => "APPROVED",
            LeaveStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leave request as held by the external request store.
///
/// The engine never mutates a request in place. Transitions produce a
/// new status and breakup which the store commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    /// Unique identifier of the request.
    #[serde(rename = "LeaveID")]
    pub id: String,
    /// The employee who raised the request. Immutable after creation.
    #[serde(rename = "EmployeeID")]
    pub employee_id: String,
    /// Display name of the employee.
    #[serde(default)]
    pub employee_name: String,
    /// First day of leave (local calendar date).
    pub start_date: NaiveDate,
    /// Last day of leave (local calendar date).
    pub end_date: NaiveDate,
    /// Requested working days, computed upstream.
    pub total_days: u32,
    /// Current lifecycle status.
    pub status: LeaveStatus,
    /// Free text supplied by the employee.
    #[serde(default)]
    pub reason: String,
    /// Whether intervening weekend days qualify for deduction.
    #[serde(default)]
    pub sandwich_eligible: bool,
    /// Number of qualifying weekend days.
    #[serde(default)]
    pub sandwich_weekend_days: u32,
    /// Whether the weekend days are currently folded into the payable total.
    #[serde(default)]
    pub sandwich_applied: bool,
    /// The committed allocation, present once approved at least once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakup: Option<Allocation>,
}
