//! Reconciliation of an approved allocation against its replacement.
//!
//! When an approved request is re-allocated, the pool has already been
//! debited by the old breakup. Only the signed difference between the old
//! and new allocation is applied, never a full re-debit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{Allocation, AuditStep, BalanceMutation, LeaveType};

/// Signed per-type differences between two allocations (`new - old`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocationDelta {
    /// Change in CPL days.
    #[serde(rename = "CPL")]
    pub cpl: Decimal,
    /// Change in SL days.
    #[serde(rename = "SL")]
    pub sl: Decimal,
    /// Change in LOP days. Reported for audit only.
    #[serde(rename = "LOP")]
    pub lop: Decimal,
}

impl AllocationDelta {
    /// Returns the pool mutation for this delta. LOP carries no pool.
    pub fn balance_mutation(&self) -> BalanceMutation {
        BalanceMutation::new(self.cpl, self.sl)
    }

    /// Returns true if no bucket changed.
    pub fn is_zero(&self) -> bool {
        self.cpl.is_zero() && self.sl.is_zero() && self.lop.is_zero()
    }
}

/// The result of reconciling two allocations.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// The signed per-type delta.
    pub delta: AllocationDelta,
    /// The pool mutation to commit if the update is accepted.
    pub mutation: BalanceMutation,
    /// The audit step recording this reconciliation.
    pub audit_step: AuditStep,
}

fn signed(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{}", value.normalize())
    } else {
        value.normalize().to_string()
    }
}

fn bucket_delta(
    previous: &Allocation,
    next: &Allocation,
    leave_type: LeaveType,
) -> EngineResult<Decimal> {
    let old = previous.get(leave_type);
    let new = next.get(leave_type);
    new.checked_sub(old).ok_or_else(|| {
        EngineError::invalid_allocation(format!(
            "{} change from {} to {} is out of range",
            leave_type,
            old.normalize(),
            new.normalize()
        ))
    })
}

/// Computes the delta between the committed and the new allocation.
///
/// # Errors
///
/// Returns [`EngineError::InvalidAllocation`] if a per-type difference is
/// outside the decimal range.
///
/// # Examples
///
/// ```
/// use leave_engine::calculation::reconcile;
/// use leave_engine::models::Allocation;
/// use rust_decimal::Decimal;
///
/// let previous = Allocation::new(Decimal::from(3), Decimal::ZERO, Decimal::ZERO);
/// let next = Allocation::new(Decimal::from(1), Decimal::ZERO, Decimal::from(2));
///
/// let result = reconcile(&previous, &next, 1).unwrap();
/// assert_eq!(result.delta.cpl, Decimal::from(-2));
/// assert_eq!(result.mutation.cpl_delta, Decimal::from(-2));
/// ```
pub fn reconcile(
    previous: &Allocation,
    next: &Allocation,
    step_number: u32,
) -> EngineResult<Reconciliation> {
    let delta = AllocationDelta {
        cpl: bucket_delta(previous, next, LeaveType::Cpl)?,
        sl: bucket_delta(previous, next, LeaveType::Sl)?,
        lop: bucket_delta(previous, next, LeaveType::Lop)?,
    };
    let mutation = delta.balance_mutation();

    let reasoning = if mutation.is_noop() {
        format!(
            "Allocation unchanged for CPL {} and SL {}; no balance adjustment",
            next.cpl.normalize(),
            next.sl.normalize()
        )
    } else {
        format!(
            "Adjusting from {} CPL, {} SL to {} CPL, {} SL: CPL {}, SL {}",
            previous.cpl.normalize(),
            previous.sl.normalize(),
            next.cpl.normalize(),
            next.sl.normalize(),
            signed(delta.cpl),
            signed(delta.sl)
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "allocation_reconciliation".to_string(),
        rule_name: "Allocation Reconciliation".to_string(),
        input: serde_json::json!({
            "previous": {
                "cpl": previous.cpl.normalize().to_string(),
                "sl": previous.sl.normalize().to_string(),
                "lop": previous.lop.normalize().to_string()
            },
            "next": {
                "cpl": next.cpl.normalize().to_string(),
                "sl": next.sl.normalize().to_string(),
                "lop": next.lop.normalize().to_string()
            }
        }),
        output: serde_json::json!({
            "cpl_delta": delta.cpl.normalize().to_string(),
            "sl_delta": delta.sl.normalize().to_string(),
            "lop_delta": delta.lop.normalize().to_string()
        }),
        reasoning,
    };

    Ok(Reconciliation {
        delta,
        mutation,
        audit_step,
    })
}
