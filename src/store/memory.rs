//! In-memory leave store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{HistoryEntry, LeaveBalance, LeaveRequest, LeaveStatus};
use crate::workflow::CommitRequest;

use super::LeaveStore;

#[derive(Debug, Default)]
struct Records {
    requests: Vec<LeaveRequest>,
    balances: HashMap<String, LeaveBalance>,
}

/// A [`LeaveStore`] holding everything behind one mutex.
///
/// Commits are serialized, and each one is checked against the record and
/// pool it was computed from before anything is written.
#[derive(Debug, Default)]
pub struct InMemoryLeaveStore {
    records: Mutex<Records>,
}

impl InMemoryLeaveStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store from history entries.
    ///
    /// Requests keep their order. The first balance seen for an employee
    /// becomes that employee's pool.
    pub fn from_history(entries: Vec<HistoryEntry>) -> Self {
        let mut records = Records::default();
        for entry in entries {
            let balance = entry.balance();
            records
                .balances
                .entry(entry.request.employee_id.clone())
                .or_insert(balance);
            records.requests.push(entry.request);
        }
        Self {
            records: Mutex::new(records),
        }
    }

    /// Seeds a store from a JSON array of history entries.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let entries: Vec<HistoryEntry> = serde_json::from_str(json)?;
        Ok(Self::from_history(entries))
    }

    /// Adds or replaces a request.
    pub fn insert_request(&self, request: LeaveRequest) {
        let mut records = self.lock();
        match records.requests.iter_mut().find(|r| r.id == request.id) {
            Some(existing) => *existing = request,
            None => records.requests.push(request),
        }
    }

    /// Sets an employee's pool.
    pub fn set_balance(&self, employee_id: impl Into<String>, balance: LeaveBalance) {
        self.lock().balances.insert(employee_id.into(), balance);
    }

    /// Returns an employee's pool, zero if unknown.
    pub fn balance(&self, employee_id: &str) -> LeaveBalance {
        self.lock()
            .balances
            .get(employee_id)
            .copied()
            .unwrap_or_default()
    }

    /// Returns a request by id.
    pub fn request(&self, leave_id: &str) -> Option<LeaveRequest> {
        self.lock()
            .requests
            .iter()
            .find(|r| r.id == leave_id)
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        // Every write is applied in full before the guard drops, so a
        // poisoned lock still guards consistent data.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LeaveStore for InMemoryLeaveStore {
    fn history(&self) -> EngineResult<Vec<HistoryEntry>> {
        let records = self.lock();
        Ok(records
            .requests
            .iter()
            .map(|request| {
                let balance = records
                    .balances
                    .get(&request.employee_id)
                    .copied()
                    .unwrap_or_default();
                HistoryEntry::new(request.clone(), balance)
            })
            .collect())
    }

    fn commit(&self, commit: &CommitRequest) -> EngineResult<LeaveStatus> {
        let mut records = self.lock();
        let Records { requests, balances } = &mut *records;

        let request = requests
            .iter_mut()
            .find(|r| r.id == commit.leave_id)
            .ok_or_else(|| EngineError::NotFound {
                leave_id: commit.leave_id.clone(),
            })?;

        if request.employee_id != commit.employee_id {
            return Err(EngineError::CommitFailure {
                leave_id: commit.leave_id.clone(),
                message: format!(
                    "request belongs to employee {}, not {}",
                    request.employee_id, commit.employee_id
                ),
            });
        }

        if request.status != commit.expected_status || request.breakup != commit.expected_breakup {
            return Err(EngineError::CommitFailure {
                leave_id: commit.leave_id.clone(),
                message: format!(
                    "request changed since the decision was computed (now {})",
                    request.status
                ),
            });
        }

        let pool = balances.get(&commit.employee_id).copied().unwrap_or_default();
        let balance_after = if commit.mutation.is_noop() {
            None
        } else {
            if pool != commit.expected_balance {
                return Err(EngineError::CommitFailure {
                    leave_id: commit.leave_id.clone(),
                    message: format!(
                        "balance for {} changed since the decision was computed (now CPL {}, SL {})",
                        commit.employee_id,
                        pool.cpl.normalize(),
                        pool.sl.normalize()
                    ),
                });
            }
            let after = pool.apply(&commit.mutation).ok_or_else(|| EngineError::CommitFailure {
                leave_id: commit.leave_id.clone(),
                message: "balance mutation is out of range".to_string(),
            })?;
            Some(after)
        };

        request.status = commit.status;
        request.breakup = commit.breakup;
        request.sandwich_applied = commit.sandwich_applied;
        if let Some(after) = balance_after {
            balances.insert(commit.employee_id.clone(), after);
        }

        debug!(
            leave_id = %commit.leave_id,
            employee_id = %commit.employee_id,
            status = %commit.status,
            "Committed decision"
        );

        Ok(commit.status)
    }
}
