//! Non-committing allocation preview.
//!
//! Used while an approver edits numbers: shows the derived LOP, whether the
//! split over-allocates, whether the pool covers it and what would remain.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculation::{AllocationDelta, AllocationInput, ValidationRegime, find_shortfalls, normalize, reconcile};
use crate::error::{BalanceShortfall, EngineError, EngineResult};
use crate::models::{Allocation, AuditTrace, BalanceMutation, LeaveBalance, LeaveRequest};

/// What a decision with the given numbers would do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPreview {
    /// The leave id.
    #[serde(rename = "LeaveID")]
    pub leave_id: String,
    /// The normalized split with derived LOP.
    pub allocation: Allocation,
    /// `totalDays` plus the weekend days if the sandwich is applied.
    pub adjusted_total: Decimal,
    /// How far CPL and SL exceed the payable total.
    pub over_allocation: Decimal,
    /// True if the buckets sum exactly to the payable total.
    pub balanced: bool,
    /// The pool as stored.
    pub balance: LeaveBalance,
    /// The pool if the allocation were committed.
    pub balance_after: LeaveBalance,
    /// The mutation a commit would apply.
    pub mutation: BalanceMutation,
    /// The per-type adjustment from the committed breakup, for approved requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<AllocationDelta>,
    /// Every type the pool cannot cover.
    pub shortfalls: Vec<BalanceShortfall>,
    /// True if no shortfall was found.
    pub balance_sufficient: bool,
    /// The calculation steps.
    pub audit_trace: AuditTrace,
}

/// Computes an [`AllocationPreview`] for a request with the reviewer's edits.
///
/// An approved request is previewed under the update regime against its
/// committed breakup; anything else under the fresh regime. Nothing is
/// rejected for insufficient balance here: shortfalls are reported instead.
///
/// # Errors
///
/// Returns [`EngineError::InvalidAllocation`] if the sandwich is applied to a
/// request that is not eligible for it, or if the numbers are outside the
/// decimal range.
pub fn preview(
    request: &LeaveRequest,
    balance: &LeaveBalance,
    sandwich_applied: bool,
    cpl: Decimal,
    sl: Decimal,
) -> EngineResult<AllocationPreview> {
    let mut audit_trace = AuditTrace::default();

    let input = AllocationInput::for_request(request, sandwich_applied, cpl, sl);
    let normalized = normalize(&input, audit_trace.next_step_number())?;
    audit_trace.push(normalized.audit_step.clone());

    if normalized.over_allocation > Decimal::ZERO {
        audit_trace.warn(
            "OVER_ALLOCATION",
            format!(
                "CPL + SL exceeds the payable total by {}",
                normalized.over_allocation.normalize()
            ),
        );
    }

    let regime = ValidationRegime::for_request(request);

    let (mutation, delta) = match regime {
        ValidationRegime::Fresh => (
            BalanceMutation::new(normalized.allocation.cpl, normalized.allocation.sl),
            None,
        ),
        ValidationRegime::Update { previous } => {
            let reconciliation = reconcile(
                &previous,
                &normalized.allocation,
                audit_trace.next_step_number(),
            )?;
            audit_trace.push(reconciliation.audit_step);
            (reconciliation.mutation, Some(reconciliation.delta))
        }
    };

    let shortfalls = find_shortfalls(&regime, &normalized.allocation, balance);
    for shortfall in &shortfalls {
        audit_trace.warn("INSUFFICIENT_BALANCE", shortfall.to_string());
    }

    let balance_after = balance.apply(&mutation).ok_or_else(|| {
        EngineError::invalid_allocation("the resulting balance is out of range")
    })?;

    Ok(AllocationPreview {
        leave_id: request.id.clone(),
        allocation: normalized.allocation,
        adjusted_total: normalized.adjusted_total,
        over_allocation: normalized.over_allocation,
        balanced: normalized.is_balanced(),
        balance: *balance,
        balance_after,
        mutation,
        delta,
        balance_sufficient: shortfalls.is_empty(),
        shortfalls,
        audit_trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeaveStatus, LeaveType};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_request(status: LeaveStatus, breakup: Option<Allocation>) -> LeaveRequest {
        LeaveRequest {
            id: "leave_002".to_string(),
            employee_id: "emp_002".to_string(),
            employee_name: "Vikram Shah".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 4, 16).unwrap(),
            total_days: 5,
            status,
            reason: String::new(),
            sandwich_eligible: true,
            sandwich_weekend_days: 2,
            sandwich_applied: false,
            breakup,
        }
    }

    /// PV-001: preview of a fresh split with enough balance
    #[test]
    fn test_preview_fresh() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let pool = LeaveBalance::new(dec("5"), dec("5"));
        let result = preview(&request, &pool, false, dec("2"), dec("1")).unwrap();

        assert_eq!(result.allocation, Allocation::new(dec("2"), dec("1"), dec("2")));
        assert!(result.balanced);
        assert!(result.balance_sufficient);
        assert!(result.delta.is_none());
        assert_eq!(result.balance_after, LeaveBalance::new(dec("3"), dec("4")));
        assert!(result.audit_trace.warnings.is_empty());
    }

    /// PV-002: over-allocation and shortfall are reported, not rejected
    #[test]
    fn test_preview_reports_problems() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let pool = LeaveBalance::new(dec("2"), dec("5"));
        let result = preview(&request, &pool, false, dec("4"), dec("2")).unwrap();

        assert_eq!(result.over_allocation, dec("1"));
        assert_eq!(result.allocation.lop, Decimal::ZERO);
        assert!(!result.balanced);
        assert!(!result.balance_sufficient);
        assert_eq!(result.shortfalls.len(), 1);
        assert_eq!(result.shortfalls[0].leave_type, LeaveType::Cpl);

        let codes: Vec<&str> = result
            .audit_trace
            .warnings
            .iter()
            .map(|w| w.code.as_str())
            .collect();
        assert_eq!(codes, vec!["OVER_ALLOCATION", "INSUFFICIENT_BALANCE"]);
    }

    /// PV-003: approved requests preview the adjustment
    #[test]
    fn test_preview_update_shows_delta() {
        let request = create_test_request(
            LeaveStatus::Approved,
            Some(Allocation::new(dec("3"), dec("0"), dec("2"))),
        );
        let pool = LeaveBalance::new(dec("2"), dec("5"));
        let result = preview(&request, &pool, false, dec("1"), dec("0")).unwrap();

        let delta = result.delta.unwrap();
        assert_eq!(delta.cpl, dec("-2"));
        assert_eq!(delta.lop, dec("2"));
        assert_eq!(result.balance_after, LeaveBalance::new(dec("4"), dec("5")));
        assert!(result.balance_sufficient);
        assert_eq!(result.audit_trace.steps.len(), 2);
    }

    /// PV-004: applying the sandwich raises LOP
    #[test]
    fn test_preview_with_sandwich() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let result = preview(&request, &LeaveBalance::default(), true, dec("0"), dec("0")).unwrap();

        assert_eq!(result.adjusted_total, dec("7"));
        assert_eq!(result.allocation.lop, dec("7"));
    }

    #[test]
    fn test_preview_rejects_ineligible_sandwich() {
        let mut request = create_test_request(LeaveStatus::PendingHr, None);
        request.sandwich_eligible = false;
        let result = preview(&request, &LeaveBalance::default(), true, dec("0"), dec("0"));
        assert!(matches!(result, Err(EngineError::InvalidAllocation { .. })));
    }

    #[test]
    fn test_preview_rejects_out_of_range_split() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let result = preview(&request, &LeaveBalance::default(), false, Decimal::MAX, Decimal::MAX);
        assert!(matches!(result, Err(EngineError::InvalidAllocation { .. })));
    }

    #[test]
    fn test_preview_approved_without_breakup_reconciles_from_zero() {
        let request = create_test_request(LeaveStatus::Approved, None);
        let pool = LeaveBalance::new(dec("5"), dec("5"));
        let result = preview(&request, &pool, false, dec("2"), dec("0")).unwrap();

        assert_eq!(result.delta.unwrap().cpl, dec("2"));
        assert_eq!(result.balance_after, LeaveBalance::new(dec("3"), dec("5")));
    }

    #[test]
    fn test_preview_serializes_wire_names() {
        let request = create_test_request(LeaveStatus::PendingHr, None);
        let pool = LeaveBalance::new(dec("5"), dec("5"));
        let result = preview(&request, &pool, false, dec("2"), dec("1")).unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["LeaveID"], "leave_002");
        assert_eq!(json["balanceSufficient"], true);
        assert!(json.get("delta").is_none());
        assert!(json["allocation"].get("LOP").is_some());
    }
}
