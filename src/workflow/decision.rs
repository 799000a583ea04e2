//! Review decisions and the outcomes of applying them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Allocation, AuditTrace, BalanceMutation, LeaveBalance, LeaveStatus};

use super::ApprovalStage;

/// The verb of a review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewAction {
    /// Approve, or re-allocate an approved request.
    Approve,
    /// Reject a request waiting for HR.
    Reject,
}

impl ReviewAction {
    /// Returns the lowercase verb used in messages.
    pub fn verb(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// The allocation an approver proposes for the current action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// The proposed split.
    pub allocation: Allocation,
    /// Whether the weekend days are folded into the payable total. `None`
    /// keeps the request's current flag.
    pub sandwich_applied: Option<bool>,
}

impl Candidate {
    /// Resolves the sandwich flag against the request's stored one.
    pub fn sandwich_applied_or(&self, stored: bool) -> bool {
        self.sandwich_applied.unwrap_or(stored)
    }
}

/// A review decision submitted by an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Approve. HR-stage approvals and re-allocations need a candidate.
    Approve {
        /// The proposed allocation, if any.
        candidate: Option<Candidate>,
    },
    /// Reject.
    Reject,
}

impl Decision {
    /// An approval carrying a candidate allocation.
    pub fn approve(allocation: Allocation, sandwich_applied: bool) -> Self {
        Decision::Approve {
            candidate: Some(Candidate {
                allocation,
                sandwich_applied: Some(sandwich_applied),
            }),
        }
    }

    /// An approval carrying a candidate allocation that keeps the request's
    /// sandwich flag.
    pub fn approve_keeping_sandwich(allocation: Allocation) -> Self {
        Decision::Approve {
            candidate: Some(Candidate {
                allocation,
                sandwich_applied: None,
            }),
        }
    }

    /// An approval without an allocation, as given by a team lead.
    pub fn approve_without_allocation() -> Self {
        Decision::Approve { candidate: None }
    }

    /// Returns the verb of the decision.
    pub fn action(&self) -> ReviewAction {
        match self {
            Decision::Approve { .. } => ReviewAction::Approve,
            Decision::Reject => ReviewAction::Reject,
        }
    }

    /// Returns the candidate allocation, if the decision carries one.
    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            Decision::Approve { candidate } => candidate.as_ref(),
            Decision::Reject => None,
        }
    }
}

/// The legal transitions of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// `PENDING_TL → PENDING_HR`.
    TeamLeadApproval,
    /// `PENDING_HR → APPROVED` with a fresh debit.
    FreshApproval,
    /// `PENDING_HR → REJECTED`.
    Rejection,
    /// `APPROVED → APPROVED` with a signed delta.
    Reallocation,
}

impl TransitionKind {
    /// Returns the stage whose roles may perform the transition.
    pub fn stage(&self) -> ApprovalStage {
        match self {
            TransitionKind::TeamLeadApproval => ApprovalStage::TeamLead,
            _ => ApprovalStage::Hr,
        }
    }

    /// Returns the status the transition leads to.
    pub fn target(&self) -> LeaveStatus {
        match self {
            TransitionKind::TeamLeadApproval => LeaveStatus::PendingHr,
            TransitionKind::FreshApproval | TransitionKind::Reallocation => LeaveStatus::Approved,
            TransitionKind::Rejection => LeaveStatus::Rejected,
        }
    }

    /// Returns true if the transition commits an allocation.
    pub fn commits_allocation(&self) -> bool {
        matches!(
            self,
            TransitionKind::FreshApproval | TransitionKind::Reallocation
        )
    }
}

/// The result of an accepted transition.
///
/// Nothing has been written when this is returned. The store applies it
/// via [`TransitionOutcome::commit_request`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    /// The leave id.
    pub leave_id: String,
    /// The employee whose pool is affected.
    pub employee_id: String,
    /// The transition taken.
    pub kind: TransitionKind,
    /// The status before the transition.
    pub from: LeaveStatus,
    /// The status after the transition.
    pub to: LeaveStatus,
    /// The breakup the decision was computed from.
    pub previous_breakup: Option<Allocation>,
    /// The breakup after the transition.
    pub breakup: Option<Allocation>,
    /// The sandwich flag after the transition.
    pub sandwich_applied: bool,
    /// The pool mutation to apply.
    pub mutation: BalanceMutation,
    /// The pool the decision was validated against.
    pub balance_before: LeaveBalance,
    /// The pool once the mutation is applied.
    pub balance_after: LeaveBalance,
    /// The audit trace of the decision.
    pub audit_trace: AuditTrace,
}

impl TransitionOutcome {
    /// Builds the commit request for the store.
    pub fn commit_request(&self) -> CommitRequest {
        CommitRequest {
            leave_id: self.leave_id.clone(),
            employee_id: self.employee_id.clone(),
            expected_status: self.from,
            expected_breakup: self.previous_breakup,
            expected_balance: self.balance_before,
            status: self.to,
            breakup: self.breakup,
            sandwich_applied: self.sandwich_applied,
            mutation: self.mutation,
        }
    }
}

/// The write the store performs to commit a transition.
///
/// `expected_status`, `expected_breakup` and `expected_balance` describe the
/// record and pool the decision was computed from. A store must refuse the
/// commit if the record has changed since, and must refuse a commit that
/// mutates the pool if the pool has changed since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    /// The leave id.
    #[serde(rename = "LeaveID")]
    pub leave_id: String,
    /// The employee whose pool is mutated.
    #[serde(rename = "EmployeeID")]
    pub employee_id: String,
    /// The status the decision was computed from.
    pub expected_status: LeaveStatus,
    /// The breakup the decision was computed from.
    pub expected_breakup: Option<Allocation>,
    /// The pool the decision was validated against.
    pub expected_balance: LeaveBalance,
    /// The new status.
    pub status: LeaveStatus,
    /// The new committed breakup.
    pub breakup: Option<Allocation>,
    /// The new sandwich flag.
    pub sandwich_applied: bool,
    /// The pool mutation.
    pub mutation: BalanceMutation,
}
