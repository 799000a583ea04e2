//! The leave approval state machine.
//!
//! [`transition`] is the only way a request's status moves. It checks the
//! action against the transition table, checks the actor's role against the
//! policy, and for allocating transitions runs the calculator and the
//! balance validator. It never writes: the returned outcome describes the
//! commit for the store to perform.

use tracing::{debug, warn};

use crate::calculation::{
    AllocationInput, ValidationRegime, check_submitted_allocation, normalize, validate_allocation,
};
use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditTrace, BalanceMutation, LeaveBalance, LeaveRequest, LeaveStatus};

use super::{ActorRole, Decision, ReviewAction, TransitionKind, TransitionOutcome};

/// Looks up the transition for a status and action.
///
/// # Examples
///
/// ```
/// use leave_engine::models::LeaveStatus;
/// use leave_engine::workflow::{ReviewAction, TransitionKind, transition_for};
///
/// assert_eq!(
///     transition_for(LeaveStatus::PendingHr, ReviewAction::Reject),
///     Some(TransitionKind::Rejection)
/// );
/// assert_eq!(transition_for(LeaveStatus::PendingTl, ReviewAction::Reject), None);
/// ```
pub fn transition_for(status: LeaveStatus, action: ReviewAction) -> Option<TransitionKind> {
    match (status, action) {
        (LeaveStatus::PendingTl, ReviewAction::Approve) => Some(TransitionKind::TeamLeadApproval),
        (LeaveStatus::PendingHr, ReviewAction::Approve) => Some(TransitionKind::FreshApproval),
        (LeaveStatus::PendingHr, ReviewAction::Reject) => Some(TransitionKind::Rejection),
        (LeaveStatus::Approved, ReviewAction::Approve) => Some(TransitionKind::Reallocation),
        _ => None,
    }
}

/// Applies a review decision to a leave request.
///
/// # Arguments
///
/// * `request` - The request as currently stored
/// * `balance` - The employee's pool as currently stored
/// * `actor` - The role of the caller
/// * `decision` - The decision to apply
/// * `policy` - The leave policy (approvers and allocation rules)
///
/// # Errors
///
/// - [`EngineError::InvalidTransition`] if the action is illegal for the status
/// - [`EngineError::ActorNotPermitted`] if the role may not act at this stage
/// - [`EngineError::InvalidAllocation`] if the candidate is missing or breaks a bucket rule
/// - [`EngineError::InsufficientBalance`] if the pool cannot cover the candidate
///
/// # Examples
///
/// ```
/// use leave_engine::config::LeavePolicy;
/// use leave_engine::models::{Allocation, LeaveBalance, LeaveRequest, LeaveStatus};
/// use leave_engine::workflow::{ActorRole, Decision, transition};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let request = LeaveRequest {
///     id: "leave_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     employee_name: "Asha Rao".to_string(),
///     start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 3, 6).unwrap(),
///     total_days: 5,
///     status: LeaveStatus::PendingHr,
///     reason: String::new(),
///     sandwich_eligible: false,
///     sandwich_weekend_days: 0,
///     sandwich_applied: false,
///     breakup: None,
/// };
/// let pool = LeaveBalance::new(Decimal::from(5), Decimal::from(5));
/// let decision = Decision::approve(
///     Allocation::new(Decimal::from(2), Decimal::from(1), Decimal::from(2)),
///     false,
/// );
///
/// let outcome = transition(&request, &pool, ActorRole::Hr, &decision, &LeavePolicy::default()).unwrap();
/// assert_eq!(outcome.to, LeaveStatus::Approved);
/// assert_eq!(outcome.balance_after, LeaveBalance::new(Decimal::from(3), Decimal::from(4)));
/// ```
pub fn transition(
    request: &LeaveRequest,
    balance: &LeaveBalance,
    actor: ActorRole,
    decision: &Decision,
    policy: &LeavePolicy,
) -> EngineResult<TransitionOutcome> {
    let action = decision.action();

    let kind = transition_for(request.status, action).ok_or_else(|| {
        EngineError::InvalidTransition {
            leave_id: request.id.clone(),
            status: request.status,
            action: action.verb().to_string(),
        }
    })?;

    if !policy.is_permitted(actor, kind.stage()) {
        return Err(EngineError::ActorNotPermitted {
            leave_id: request.id.clone(),
            role: actor,
            status: request.status,
            action: action.verb().to_string(),
        });
    }

    let mut audit_trace = AuditTrace::default();
    audit_trace.push(AuditStep {
        step_number: audit_trace.next_step_number(),
        rule_id: "status_transition".to_string(),
        rule_name: "Status Transition".to_string(),
        input: serde_json::json!({
            "status": request.status,
            "action": action,
            "actor": actor
        }),
        output: serde_json::json!({
            "transition": kind,
            "status": kind.target()
        }),
        reasoning: format!(
            "{} may {} a {} request: {} → {}",
            actor,
            action,
            request.status,
            request.status,
            kind.target()
        ),
    });

    if !kind.commits_allocation() {
        if decision.candidate().is_some() {
            debug!(leave_id = %request.id, transition = ?kind, "Ignoring allocation on non-allocating transition");
        }
        return Ok(TransitionOutcome {
            leave_id: request.id.clone(),
            employee_id: request.employee_id.clone(),
            kind,
            from: request.status,
            to: kind.target(),
            previous_breakup: request.breakup,
            breakup: request.breakup,
            sandwich_applied: request.sandwich_applied,
            mutation: BalanceMutation::none(),
            balance_before: *balance,
            balance_after: *balance,
            audit_trace,
        });
    }

    let candidate = decision.candidate().ok_or_else(|| {
        EngineError::invalid_allocation(format!(
            "an allocation is required to {} a {} request",
            action, request.status
        ))
    })?;

    let sandwich_applied = candidate.sandwich_applied_or(request.sandwich_applied);
    let input = AllocationInput::for_request(
        request,
        sandwich_applied,
        candidate.allocation.cpl,
        candidate.allocation.sl,
    );
    let normalized = normalize(&input, audit_trace.next_step_number())?;
    audit_trace.push(normalized.audit_step.clone());

    let check = check_submitted_allocation(
        &candidate.allocation,
        &normalized,
        policy.allocation(),
        audit_trace.next_step_number(),
    )?;
    audit_trace.push(check);

    let regime = ValidationRegime::for_request(request);
    if matches!(regime, ValidationRegime::Update { .. }) && request.breakup.is_none() {
        warn!(leave_id = %request.id, "Approved request has no committed breakup; reconciling from zero");
        audit_trace.warn(
            "MISSING_BREAKUP",
            "Approved request had no committed breakup; treated as zero",
        );
    }

    let validation = validate_allocation(
        &regime,
        &normalized.allocation,
        balance,
        audit_trace.next_step_number(),
    )?;
    for step in validation.audit_steps {
        audit_trace.push(step);
    }

    if kind == TransitionKind::Reallocation && validation.mutation.is_noop() {
        audit_trace.warn(
            "NO_BALANCE_CHANGE",
            "Re-allocation leaves CPL and SL unchanged; the pool is not adjusted",
        );
    }

    debug!(
        leave_id = %request.id,
        transition = ?kind,
        cpl_delta = %validation.mutation.cpl_delta,
        sl_delta = %validation.mutation.sl_delta,
        "Allocation accepted"
    );

    Ok(TransitionOutcome {
        leave_id: request.id.clone(),
        employee_id: request.employee_id.clone(),
        kind,
        from: request.status,
        to: kind.target(),
        previous_breakup: request.breakup,
        breakup: Some(normalized.allocation),
        sandwich_applied,
        mutation: validation.mutation,
        balance_before: *balance,
        balance_after: validation.balance_after,
        audit_trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allocation, LeaveType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn pool(cpl: &str, sl: &str) -> LeaveBalance {
        LeaveBalance::new(dec(cpl), dec(sl))
    }

    fn alloc(cpl: &str, sl: &str, lop: &str) -> Allocation {
        Allocation::new(dec(cpl), dec(sl), dec(lop))
    }

    fn create_test_request(status: LeaveStatus, breakup: Option<Allocation>) -> LeaveRequest {
        LeaveRequest {
            id: "leave_001".to_string(),
            employee_id: "emp_001".to_string(),
            employee_name: "Asha Rao".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 6).unwrap(),
            total_days: 5,
            status,
            reason: "Family function".to_string(),
            sandwich_eligible: false,
            sandwich_weekend_days: 0,
            sandwich_applied: false,
            breakup,
        }
    }

    fn apply(
        request: &LeaveRequest,
        balance: &LeaveBalance,
        actor: ActorRole,
        decision: Decision,
    ) -> EngineResult<TransitionOutcome> {
        transition(request, balance, actor, &decision, &LeavePolicy::default())
    }

    /// WF-001: team lead approval moves to HR without touching the pool
    #[test]
    fn test_team_lead_approval() {
        let request = create_test_request(LeaveStatus::PendingTl, None);
        let outcome = apply(
            &request,
            &pool("5", "5"),
            ActorRole::TeamLead,
            Decision::approve_without_allocation(),
        )
        .unwrap();

        assert_eq!(outcome.kind, TransitionKind::TeamLeadApproval);
        assert_eq!(outcome.from, LeaveStatus::PendingTl);
        assert_eq!(outcome.to, LeaveStatus::PendingHr);
        assert!(outcome.mutation.is_noop());
        assert!(outcome.breakup.is_none());
        assert_eq!(outcome.balance_after, pool("5", "5"));
        assert_eq!(outcome.audit_trace.steps.len(), 1);
        assert_eq!(outcome.audit_trace.steps[0].rule_id, "status_transition");
    }

    /// WF-002: team lead approval ignores a stray allocation
    #[test]
    fn test_team_lead_approval_ignores_allocation() {
        let request = create_test_request(LeaveStatus::PendingTl, None);
        let outcome = apply(
            &request,
            &pool("0", "0"),
            ActorRole::TeamLead,
            Decision::approve(alloc("5", "0", "0"), false),
        )
        .unwrap();

        assert_eq!(outcome.to, LeaveStatus::PendingHr);
        assert!(outcome.mutation.is_noop());
    }

    /// WF-003: HR fresh approval commits breakup and debits pool
    #[test]
    fn test_fresh_approval() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let outcome = apply(
            &request,
            &pool("5", "5"),
            ActorRole::Hr,
            Decision::approve(alloc("2", "1", "2"), false),
        )
        .unwrap();

        assert_eq!(outcome.kind, TransitionKind::FreshApproval);
        assert_eq!(outcome.to, LeaveStatus::Approved);
        assert_eq!(outcome.breakup, Some(alloc("2", "1", "2")));
        assert_eq!(outcome.mutation, BalanceMutation::new(dec("2"), dec("1")));
        assert_eq!(outcome.balance_after, pool("3", "4"));

        let rule_ids: Vec<&str> = outcome
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            rule_ids,
            vec![
                "status_transition",
                "lop_derivation",
                "allocation_check",
                "fresh_balance_validation"
            ]
        );
    }

    /// WF-004: fresh approval with insufficient balance fails without mutation
    #[test]
    fn test_fresh_approval_insufficient_balance() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let result = apply(
            &request,
            &pool("1", "5"),
            ActorRole::Hr,
            Decision::approve(alloc("2", "1", "2"), false),
        );

        match result {
            Err(EngineError::InsufficientBalance { shortfalls }) => {
                assert_eq!(shortfalls[0].leave_type, LeaveType::Cpl);
            }
            other => panic!("Expected InsufficientBalance, got {:?}", other),
        }
    }

    /// WF-005: fresh approval with the sandwich applied
    #[test]
    fn test_fresh_approval_with_sandwich() {
        let mut request = create_test_request(LeaveStatus::PendingHr, None);
        request.sandwich_eligible = true;
        request.sandwich_weekend_days = 2;

        let outcome = apply(
            &request,
            &pool("0", "0"),
            ActorRole::Admin,
            Decision::approve(alloc("0", "0", "7"), true),
        )
        .unwrap();

        assert_eq!(outcome.breakup, Some(alloc("0", "0", "7")));
        assert!(outcome.sandwich_applied);
        assert!(outcome.mutation.is_noop());
    }

    /// WF-006: sandwich on an ineligible request is rejected
    #[test]
    fn test_sandwich_on_ineligible_request_rejected() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let result = apply(
            &request,
            &pool("5", "5"),
            ActorRole::Hr,
            Decision::approve(alloc("0", "0", "5"), true),
        );
        assert!(matches!(result, Err(EngineError::InvalidAllocation { .. })));
    }

    /// WF-007: HR approval without an allocation is rejected
    #[test]
    fn test_fresh_approval_requires_allocation() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let result = apply(
            &request,
            &pool("5", "5"),
            ActorRole::Hr,
            Decision::approve_without_allocation(),
        );

        match result {
            Err(EngineError::InvalidAllocation { message }) => {
                assert!(message.contains("allocation is required"));
            }
            other => panic!("Expected InvalidAllocation, got {:?}", other),
        }
    }

    /// WF-008: rejection from PENDING_HR
    #[test]
    fn test_reject_from_pending_hr() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let outcome = apply(&request, &pool("5", "5"), ActorRole::Hr, Decision::Reject).unwrap();

        assert_eq!(outcome.kind, TransitionKind::Rejection);
        assert_eq!(outcome.to, LeaveStatus::Rejected);
        assert!(outcome.mutation.is_noop());
    }

    /// WF-009: rejection outside PENDING_HR is an invalid transition
    #[test]
    fn test_reject_guard() {
        for (status, breakup) in [
            (LeaveStatus::PendingTl, None),
            (LeaveStatus::Approved, Some(alloc("2", "0", "3"))),
            (LeaveStatus::Rejected, None),
        ] {
            let request = create_test_request(status, breakup);
            let result = apply(&request, &pool("5", "5"), ActorRole::Admin, Decision::Reject);

            match result {
                Err(EngineError::InvalidTransition {
                    status: s, action, ..
                }) => {
                    assert_eq!(s, status);
                    assert_eq!(action, "reject");
                }
                other => panic!("Expected InvalidTransition for {}, got {:?}", status, other),
            }
        }
    }

    /// WF-010: a rejected request is never resurrected
    #[test]
    fn test_approve_rejected_request_fails() {
        let request = create_test_request(LeaveStatus::Rejected, None);
        let result = apply(
            &request,
            &pool("5", "5"),
            ActorRole::Admin,
            Decision::approve(alloc("2", "1", "2"), false),
        );
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    /// WF-011: roles outside the stage are refused
    #[test]
    fn test_actor_not_permitted() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let result = apply(
            &request,
            &pool("5", "5"),
            ActorRole::TeamLead,
            Decision::approve(alloc("2", "1", "2"), false),
        );
        match result {
            Err(EngineError::ActorNotPermitted { role, .. }) => {
                assert_eq!(role, ActorRole::TeamLead);
            }
            other => panic!("Expected ActorNotPermitted, got {:?}", other),
        }

        let request = create_test_request(LeaveStatus::PendingTl, None);
        let result = apply(
            &request,
            &pool("5", "5"),
            ActorRole::Hr,
            Decision::approve_without_allocation(),
        );
        assert!(matches!(result, Err(EngineError::ActorNotPermitted { .. })));
    }

    /// WF-012: legality is checked before permission
    #[test]
    fn test_invalid_transition_reported_before_permission() {
        let request = create_test_request(LeaveStatus::PendingTl, None);
        let result = apply(&request, &pool("5", "5"), ActorRole::TeamLead, Decision::Reject);
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    /// WF-013: re-allocation reduction returns leave
    #[test]
    fn test_reallocation_reduction() {
        let request = create_test_request(LeaveStatus::Approved, Some(alloc("3", "0", "2")));
        let outcome = apply(
            &request,
            &pool("2", "5"),
            ActorRole::Hr,
            Decision::approve(alloc("1", "0", "4"), false),
        )
        .unwrap();

        assert_eq!(outcome.kind, TransitionKind::Reallocation);
        assert_eq!(outcome.to, LeaveStatus::Approved);
        assert_eq!(outcome.previous_breakup, Some(alloc("3", "0", "2")));
        assert_eq!(outcome.breakup, Some(alloc("1", "0", "4")));
        assert_eq!(outcome.mutation, BalanceMutation::new(dec("-2"), Decimal::ZERO));
        assert_eq!(outcome.balance_after, pool("4", "5"));
    }

    /// WF-014: re-allocation increase beyond absolute pool is rejected
    #[test]
    fn test_reallocation_increase_rejected() {
        let request = create_test_request(LeaveStatus::Approved, Some(alloc("3", "0", "2")));
        let result = apply(
            &request,
            &pool("2", "5"),
            ActorRole::Hr,
            Decision::approve(alloc("5", "0", "0"), false),
        );

        match result {
            Err(EngineError::InsufficientBalance { shortfalls }) => {
                assert_eq!(shortfalls[0].requested, dec("5"));
                assert_eq!(shortfalls[0].available, dec("2"));
                assert_eq!(shortfalls[0].previous, Some(dec("3")));
            }
            other => panic!("Expected InsufficientBalance, got {:?}", other),
        }
    }

    /// WF-015: re-applying the same breakup is a no-op
    #[test]
    fn test_reallocation_identical_breakup() {
        let request = create_test_request(LeaveStatus::Approved, Some(alloc("2", "1", "2")));
        let outcome = apply(
            &request,
            &pool("0", "0"),
            ActorRole::Hr,
            Decision::approve(alloc("2", "1", "2"), false),
        )
        .unwrap();

        assert!(outcome.mutation.is_noop());
        assert_eq!(outcome.balance_after, pool("0", "0"));
        assert_eq!(outcome.audit_trace.warnings[0].code, "NO_BALANCE_CHANGE");
    }

    /// WF-016: toggling the sandwich on an approved request moves only LOP
    #[test]
    fn test_reallocation_applies_sandwich() {
        let mut request = create_test_request(LeaveStatus::Approved, Some(alloc("2", "1", "2")));
        request.sandwich_eligible = true;
        request.sandwich_weekend_days = 2;

        let outcome = apply(
            &request,
            &pool("3", "4"),
            ActorRole::Hr,
            Decision::approve(alloc("2", "1", "4"), true),
        )
        .unwrap();

        assert_eq!(outcome.breakup, Some(alloc("2", "1", "4")));
        assert!(outcome.sandwich_applied);
        assert!(outcome.mutation.is_noop());
    }

    /// WF-019: an omitted sandwich flag keeps the stored one
    #[test]
    fn test_reallocation_keeps_stored_sandwich() {
        let mut request = create_test_request(LeaveStatus::Approved, Some(alloc("2", "1", "4")));
        request.sandwich_eligible = true;
        request.sandwich_weekend_days = 2;
        request.sandwich_applied = true;

        let outcome = apply(
            &request,
            &pool("3", "4"),
            ActorRole::Hr,
            Decision::approve_keeping_sandwich(alloc("1", "1", "5")),
        )
        .unwrap();

        assert!(outcome.sandwich_applied);
        assert_eq!(outcome.breakup, Some(alloc("1", "1", "5")));
        assert_eq!(outcome.mutation, BalanceMutation::new(dec("-1"), Decimal::ZERO));
    }

    /// WF-017: approved request missing its breakup reconciles from zero
    #[test]
    fn test_reallocation_without_breakup() {
        let request = create_test_request(LeaveStatus::Approved, None);
        let outcome = apply(
            &request,
            &pool("5", "5"),
            ActorRole::Hr,
            Decision::approve(alloc("2", "0", "3"), false),
        )
        .unwrap();

        assert_eq!(outcome.mutation, BalanceMutation::new(dec("2"), Decimal::ZERO));
        assert_eq!(outcome.audit_trace.warnings[0].code, "MISSING_BREAKUP");
    }

    /// WF-018: over-allocation is refused at commit
    #[test]
    fn test_over_allocation_refused() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let result = apply(
            &request,
            &pool("10", "10"),
            ActorRole::Hr,
            Decision::approve(alloc("4", "2", "0"), false),
        );
        assert!(matches!(result, Err(EngineError::InvalidAllocation { .. })));
    }

    #[test]
    fn test_out_of_range_allocation_refused() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let result = apply(
            &request,
            &pool("5", "5"),
            ActorRole::Hr,
            Decision::approve(Allocation::new(Decimal::MAX, Decimal::MAX, Decimal::ZERO), false),
        );

        match result {
            Err(EngineError::InvalidAllocation { message }) => {
                assert!(message.contains("out of range"));
            }
            other => panic!("Expected InvalidAllocation, got {:?}", other),
        }
    }

    #[test]
    fn test_commit_request_mirrors_outcome() {
        let request = create_test_request(LeaveStatus::Approved, Some(alloc("3", "0", "2")));
        let outcome = apply(
            &request,
            &pool("2", "5"),
            ActorRole::Hr,
            Decision::approve(alloc("1", "0", "4"), false),
        )
        .unwrap();

        let commit = outcome.commit_request();
        assert_eq!(commit.leave_id, "leave_001");
        assert_eq!(commit.employee_id, "emp_001");
        assert_eq!(commit.expected_status, LeaveStatus::Approved);
        assert_eq!(commit.expected_breakup, Some(alloc("3", "0", "2")));
        assert_eq!(commit.expected_balance, pool("2", "5"));
        assert_eq!(commit.status, LeaveStatus::Approved);
        assert_eq!(commit.breakup, Some(alloc("1", "0", "4")));
        assert_eq!(commit.mutation, outcome.mutation);
    }

    #[test]
    fn test_transition_table_is_closed() {
        use ReviewAction::*;
        let legal = [
            (LeaveStatus::PendingTl, Approve),
            (LeaveStatus::PendingHr, Approve),
            (LeaveStatus::PendingHr, Reject),
            (LeaveStatus::Approved, Approve),
        ];
        for status in [
            LeaveStatus::PendingTl,
            LeaveStatus::PendingHr,
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
        ] {
            for action in [Approve, Reject] {
                assert_eq!(
                    transition_for(status, action).is_some(),
                    legal.contains(&(status, action)),
                    "{} / {}",
                    status,
                    action
                );
            }
        }
    }
}
