//! Leave history entries returned by the request store.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{LeaveBalance, LeaveRequest};

/// A leave request together with the employee's current balance.
///
/// The balance may arrive under `employeeLeaveBalance` or `leaveBalance`.
/// Both are accepted; [`HistoryEntry::balance`] prefers the former and
/// falls back to an empty pool when neither is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// The leave request.
    #[serde(flatten)]
    pub request: LeaveRequest,
    /// The employee's balance under its specific name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_leave_balance: Option<LeaveBalance>,
    /// The employee's balance under its generic name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_balance: Option<LeaveBalance>,
}

impl HistoryEntry {
    /// Creates an entry embedding the balance under its specific name.
    pub fn new(request: LeaveRequest, balance: LeaveBalance) -> Self {
        Self {
            request,
            employee_leave_balance: Some(balance),
            leave_balance: None,
        }
    }

    /// Returns the embedded balance, preferring `employeeLeaveBalance`.
    pub fn balance(&self) -> LeaveBalance {
        self.employee_leave_balance
            .or(self.leave_balance)
            .unwrap_or_default()
    }
}

/// Finds the entry for a leave id in an ordered history.
pub fn find_entry<'a>(entries: &'a [HistoryEntry], leave_id: &str) -> EngineResult<&'a HistoryEntry> {
    entries
        .iter()
        .find(|e| e.request.id == leave_id)
        .ok_or_else(|| EngineError::NotFound {
            leave_id: leave_id.to_string(),
        })
}
