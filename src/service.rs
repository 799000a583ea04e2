//! Review service: history lookup, decision and commit.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{HistoryEntry, find_entry};
use crate::store::LeaveStore;
use crate::workflow::{ActorRole, AllocationPreview, Decision, TransitionOutcome, preview, transition};

/// Runs review decisions against a [`LeaveStore`].
///
/// At most one decision per leave id is in flight at a time. A second
/// submission while the first is still running fails with
/// [`EngineError::CommitInFlight`].
pub struct ReviewService {
    store: Arc<dyn LeaveStore>,
    policy: LeavePolicy,
    in_flight: Mutex<HashSet<String>>,
}

/// Releases a leave id from the in-flight set on drop.
struct InFlightGuard<'a> {
    registry: &'a Mutex<HashSet<String>>,
    leave_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.leave_id);
    }
}

impl ReviewService {
    /// Creates a service over a store with the given policy.
    pub fn new(store: Arc<dyn LeaveStore>, policy: LeavePolicy) -> Self {
        Self {
            store,
            policy,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Returns the policy decisions are checked against.
    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    /// Returns the full leave history.
    pub fn history(&self) -> EngineResult<Vec<HistoryEntry>> {
        self.store.history()
    }

    /// Previews an allocation for a request without committing anything.
    pub fn preview(
        &self,
        leave_id: &str,
        cpl: Decimal,
        sl: Decimal,
        sandwich_applied: Option<bool>,
    ) -> EngineResult<AllocationPreview> {
        let history = self.store.history()?;
        let entry = find_entry(&history, leave_id)?;
        let sandwich_applied = sandwich_applied.unwrap_or(entry.request.sandwich_applied);
        preview(&entry.request, &entry.balance(), sandwich_applied, cpl, sl)
    }

    /// Applies a decision and commits it.
    ///
    /// Nothing is written unless the transition is accepted. The store's
    /// answer is returned as the outcome's `to` status.
    ///
    /// # Errors
    ///
    /// Any error from [`transition`], plus [`EngineError::NotFound`],
    /// [`EngineError::CommitInFlight`] and [`EngineError::CommitFailure`].
    pub fn decide(
        &self,
        leave_id: &str,
        actor: ActorRole,
        decision: &Decision,
    ) -> EngineResult<TransitionOutcome> {
        let _guard = self.claim(leave_id)?;
        let start_time = Instant::now();

        let history = self.store.history()?;
        let entry = find_entry(&history, leave_id)?;

        let mut outcome = transition(
            &entry.request,
            &entry.balance(),
            actor,
            decision,
            &self.policy,
        )?;

        debug!(
            leave_id = %leave_id,
            from = %outcome.from,
            to = %outcome.to,
            "Transition accepted; committing"
        );

        let status = self.store.commit(&outcome.commit_request())?;
        if status != outcome.to {
            warn!(
                leave_id = %leave_id,
                expected = %outcome.to,
                stored = %status,
                "Store reported a different status than the transition target"
            );
        }
        outcome.to = status;

        info!(
            leave_id = %leave_id,
            employee_id = %outcome.employee_id,
            actor = %actor,
            status = %status,
            cpl_delta = %outcome.mutation.cpl_delta,
            sl_delta = %outcome.mutation.sl_delta,
            duration_us = start_time.elapsed().as_micros(),
            "Decision committed"
        );

        Ok(outcome)
    }

    fn claim(&self, leave_id: &str) -> EngineResult<InFlightGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(leave_id.to_string()) {
            warn!(leave_id = %leave_id, "Duplicate submission while a decision is in flight");
            return Err(EngineError::CommitInFlight {
                leave_id: leave_id.to_string(),
            });
        }
        Ok(InFlightGuard {
            registry: &self.in_flight,
            leave_id: leave_id.to_string(),
        })
    }
}
