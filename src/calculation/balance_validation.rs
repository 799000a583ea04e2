//! Balance validation for leave allocations.
//!
//! Two regimes apply. A fresh approval compares the candidate CPL and SL
//! directly against the pool. An update of an approved allocation accepts
//! any type whose delta is zero or negative, and otherwise compares the new
//! absolute value against the pool as stored, which already reflects the
//! prior debit.

use rust_decimal::Decimal;

use crate::error::{BalanceShortfall, EngineError, EngineResult};
use crate::models::{
    Allocation, AuditStep, BalanceMutation, LeaveBalance, LeaveRequest, LeaveStatus, LeaveType,
};

use super::reconciliation::{AllocationDelta, reconcile};

/// Which validation rule applies to a candidate allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRegime {
    /// First approval; the pool has not been debited for this request.
    Fresh,
    /// Re-allocation of an approved request with the given committed breakup.
    Update {
        /// The currently committed breakup.
        previous: Allocation,
    },
}

impl ValidationRegime {
    /// Selects the regime for an allocation on a request.
    ///
    /// An approved request is re-allocated against its committed breakup,
    /// which is taken as zero when missing. Anything else validates fresh.
    pub fn for_request(request: &LeaveRequest) -> Self {
        match request.status {
            LeaveStatus::Approved => ValidationRegime::Update {
                previous: request.breakup.unwrap_or_default(),
            },
            _ => ValidationRegime::Fresh,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ValidationRegime::Fresh => "fresh",
            ValidationRegime::Update { .. } => "update",
        }
    }
}

/// The outcome of an accepted balance validation.
#[derive(Debug, Clone)]
pub struct BalanceValidation {
    /// The pool mutation to commit.
    pub mutation: BalanceMutation,
    /// The pool after the mutation.
    pub balance_after: LeaveBalance,
    /// The per-type delta, for updates.
    pub delta: Option<AllocationDelta>,
    /// The audit steps recorded (reconciliation first, for updates).
    pub audit_steps: Vec<AuditStep>,
}

/// Lists every balance-backed type the pool cannot cover.
///
/// An empty result means the candidate is acceptable under the regime.
pub fn find_shortfalls(
    regime: &ValidationRegime,
    candidate: &Allocation,
    balance: &LeaveBalance,
) -> Vec<BalanceShortfall> {
    let mut shortfalls = Vec::new();

    for leave_type in [LeaveType::Cpl, LeaveType::Sl] {
        let requested = candidate.get(leave_type);
        let available = balance.available(leave_type).unwrap_or(Decimal::ZERO);

        let (accepted, previous) = match regime {
            ValidationRegime::Fresh => (requested <= available, None),
            ValidationRegime::Update { previous } => {
                let old = previous.get(leave_type);
                // a zero or negative delta never needs the pool
                (requested <= old || requested <= available, Some(old))
            }
        };

        if !accepted {
            shortfalls.push(BalanceShortfall {
                leave_type,
                requested,
                available,
                previous,
            });
        }
    }

    shortfalls
}

/// Validates a candidate allocation against the pool.
///
/// # Errors
///
/// Returns [`EngineError::InsufficientBalance`] listing every failing type.
/// No partial mutation is ever produced. Returns
/// [`EngineError::InvalidAllocation`] if the delta or the resulting pool is
/// outside the decimal range.
///
/// # Examples
///
/// ```
/// use leave_engine::calculation::{validate_allocation, ValidationRegime};
/// use leave_engine::models::{Allocation, LeaveBalance};
/// use rust_decimal::Decimal;
///
/// let pool = LeaveBalance::new(Decimal::from(5), Decimal::from(5));
/// let candidate = Allocation::new(Decimal::from(2), Decimal::from(1), Decimal::from(2));
///
/// let result = validate_allocation(&ValidationRegime::Fresh, &candidate, &pool, 1).unwrap();
/// assert_eq!(result.balance_after, LeaveBalance::new(Decimal::from(3), Decimal::from(4)));
/// ```
pub fn validate_allocation(
    regime: &ValidationRegime,
    candidate: &Allocation,
    balance: &LeaveBalance,
    step_number: u32,
) -> EngineResult<BalanceValidation> {
    let mut audit_steps = Vec::new();
    let mut step_number = step_number;

    let (mutation, delta) = match regime {
        ValidationRegime::Fresh => (BalanceMutation::new(candidate.cpl, candidate.sl), None),
        ValidationRegime::Update { previous } => {
            let reconciliation = reconcile(previous, candidate, step_number)?;
            audit_steps.push(reconciliation.audit_step);
            step_number += 1;
            (reconciliation.mutation, Some(reconciliation.delta))
        }
    };

    let shortfalls = find_shortfalls(regime, candidate, balance);
    if !shortfalls.is_empty() {
        return Err(EngineError::InsufficientBalance { shortfalls });
    }

    let balance_after = balance.apply(&mutation).ok_or_else(|| {
        EngineError::invalid_allocation("the resulting balance is out of range")
    })?;

    audit_steps.push(AuditStep {
        step_number,
        rule_id: format!("{}_balance_validation", regime.name()),
        rule_name: match regime {
            ValidationRegime::Fresh => "Fresh Balance Validation".to_string(),
            ValidationRegime::Update { .. } => "Update Balance Validation".to_string(),
        },
        input: serde_json::json!({
            "regime": regime.name(),
            "cpl": candidate.cpl.normalize().to_string(),
            "sl": candidate.sl.normalize().to_string(),
            "available_cpl": balance.cpl.normalize().to_string(),
            "available_sl": balance.sl.normalize().to_string()
        }),
        output: serde_json::json!({
            "accepted": true,
            "cpl_debit": mutation.cpl_delta.normalize().to_string(),
            "sl_debit": mutation.sl_delta.normalize().to_string(),
            "remaining_cpl": balance_after.cpl.normalize().to_string(),
            "remaining_sl": balance_after.sl.normalize().to_string()
        }),
        reasoning: format!(
            "Remaining after: CPL {} - {} = {}, SL {} - {} = {}",
            balance.cpl.normalize(),
            mutation.cpl_delta.normalize(),
            balance_after.cpl.normalize(),
            balance.sl.normalize(),
            mutation.sl_delta.normalize(),
            balance_after.sl.normalize()
        ),
    });

    Ok(BalanceValidation {
        mutation,
        balance_after,
        delta,
        audit_steps,
    })
}
