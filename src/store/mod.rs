//! The persistence seam.
//!
//! The engine never writes directly. It reads history from a [`LeaveStore`]
//! and hands it a [`CommitRequest`] once a decision has been accepted.

mod memory;

pub use memory::InMemoryLeaveStore;

use crate::error::EngineResult;
use crate::models::{HistoryEntry, LeaveStatus};
use crate::workflow::CommitRequest;

/// Storage for leave requests and balance pools.
pub trait LeaveStore: Send + Sync {
    /// Returns every leave request with the employee's embedded balance.
    fn history(&self) -> EngineResult<Vec<HistoryEntry>>;

    /// Commits a decision and returns the stored status.
    ///
    /// Implementations must refuse the commit with
    /// [`crate::error::EngineError::CommitFailure`] if the record no longer
    /// matches `expected_status` and `expected_breakup`, or if the commit
    /// mutates the pool and the pool no longer matches `expected_balance`.
    /// The status change and the pool mutation are applied together or not
    /// at all.
    fn commit(&self, request: &CommitRequest) -> EngineResult<LeaveStatus>;
}
