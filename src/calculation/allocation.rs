//! Allocation normalization.
//!
//! This module derives the loss-of-pay share of a leave request from the
//! requested CPL and SL days and the sandwich-adjusted payable total, and
//! checks a submitted allocation against the bucket rules before commit.

use rust_decimal::Decimal;

use crate::config::AllocationRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{Allocation, AuditStep, LeaveRequest, LeaveType};

/// The inputs to [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationInput {
    /// Requested working days, computed upstream.
    pub total_days: u32,
    /// Whether the request qualifies for the sandwich adjustment.
    pub sandwich_eligible: bool,
    /// Weekend days bracketed by the leave.
    pub sandwich_weekend_days: u32,
    /// Whether the weekend days are folded into the payable total.
    pub sandwich_applied: bool,
    /// Requested casual paid leave days.
    pub cpl: Decimal,
    /// Requested sick leave days.
    pub sl: Decimal,
}

impl AllocationInput {
    /// Builds the input for a request with the reviewer's current edits.
    pub fn for_request(
        request: &LeaveRequest,
        sandwich_applied: bool,
        cpl: Decimal,
        sl: Decimal,
    ) -> Self {
        Self {
            total_days: request.total_days,
            sandwich_eligible: request.sandwich_eligible,
            sandwich_weekend_days: request.sandwich_weekend_days,
            sandwich_applied,
            cpl,
            sl,
        }
    }

    /// Returns `totalDays` plus the weekend days when the sandwich is applied.
    pub fn adjusted_total(&self) -> Decimal {
        let weekend = if self.sandwich_applied {
            self.sandwich_weekend_days
        } else {
            0
        };
        Decimal::from(self.total_days) + Decimal::from(weekend)
    }
}

/// The result of normalizing an allocation.
#[derive(Debug, Clone)]
pub struct NormalizedAllocation {
    /// The clamped CPL and SL with the derived LOP.
    pub allocation: Allocation,
    /// The payable total the allocation is measured against.
    pub adjusted_total: Decimal,
    /// How far `cpl + sl` exceeds the payable total, or zero.
    pub over_allocation: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

impl NormalizedAllocation {
    /// Returns true if the buckets sum exactly to the payable total.
    pub fn is_balanced(&self) -> bool {
        self.allocation.total() == Some(self.adjusted_total)
    }
}

/// Normalizes a candidate allocation and derives its LOP.
///
/// Negative CPL and SL are clamped to zero; there is no upper clamp. LOP is
/// `max(0, adjustedTotal - (cpl + sl))`, so an over-allocation is reported
/// in [`NormalizedAllocation::over_allocation`] rather than corrected.
///
/// # Errors
///
/// Returns [`EngineError::InvalidAllocation`] if the sandwich adjustment is
/// applied to a request that is not eligible for it, or if `cpl + sl` is
/// outside the decimal range.
///
/// # Examples
///
/// ```
/// use leave_engine::calculation::{normalize, AllocationInput};
/// use rust_decimal::Decimal;
///
/// let input = AllocationInput {
///     total_days: 5,
///     sandwich_eligible: true,
///     sandwich_weekend_days: 2,
///     sandwich_applied: true,
///     cpl: Decimal::ZERO,
///     sl: Decimal::ZERO,
/// };
/// let result = normalize(&input, 1).unwrap();
/// assert_eq!(result.adjusted_total, Decimal::from(7));
/// assert_eq!(result.allocation.lop, Decimal::from(7));
/// ```
pub fn normalize(input: &AllocationInput, step_number: u32) -> EngineResult<NormalizedAllocation> {
    if input.sandwich_applied && !input.sandwich_eligible {
        return Err(EngineError::invalid_allocation(
            "sandwich adjustment applied to a request that is not sandwich eligible",
        ));
    }

    let cpl = input.cpl.max(Decimal::ZERO);
    let sl = input.sl.max(Decimal::ZERO);
    let adjusted_total = input.adjusted_total();
    let paid = cpl.checked_add(sl).ok_or_else(|| {
        EngineError::invalid_allocation(format!(
            "CPL {} + SL {} is out of range",
            cpl.normalize(),
            sl.normalize()
        ))
    })?;
    // cpl, sl and adjusted_total are non-negative here
    let lop = (adjusted_total - paid).max(Decimal::ZERO);
    let over_allocation = (paid - adjusted_total).max(Decimal::ZERO);

    let reasoning = if over_allocation > Decimal::ZERO {
        format!(
            "CPL {} + SL {} exceeds payable total {} by {}; LOP floors at 0",
            cpl.normalize(),
            sl.normalize(),
            adjusted_total.normalize(),
            over_allocation.normalize()
        )
    } else {
        format!(
            "{} - ({} + {}) = {} LOP",
            adjusted_total.normalize(),
            cpl.normalize(),
            sl.normalize(),
            lop.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "lop_derivation".to_string(),
        rule_name: "LOP Derivation".to_string(),
        input: serde_json::json!({
            "total_days": input.total_days,
            "sandwich_applied": input.sandwich_applied,
            "sandwich_weekend_days": input.sandwich_weekend_days,
            "cpl": input.cpl.normalize().to_string(),
            "sl": input.sl.normalize().to_string()
        }),
        output: serde_json::json!({
            "adjusted_total": adjusted_total.normalize().to_string(),
            "cpl": cpl.normalize().to_string(),
            "sl": sl.normalize().to_string(),
            "lop": lop.normalize().to_string(),
            "over_allocation": over_allocation.normalize().to_string()
        }),
        reasoning,
    };

    Ok(NormalizedAllocation {
        allocation: Allocation::new(cpl, sl, lop),
        adjusted_total,
        over_allocation,
        audit_step,
    })
}

/// Checks a submitted allocation against the bucket rules.
///
/// `normalized` must come from normalizing the submitted CPL and SL. The
/// submitted allocation is rejected when any bucket is negative, when a
/// bucket is not a multiple of the configured granularity, when CPL and SL
/// exceed the payable total, or when the submitted LOP differs from the
/// derived one (if the policy requires an exact LOP). A granularity of zero
/// or less disables the multiple check.
pub fn check_submitted_allocation(
    submitted: &Allocation,
    normalized: &NormalizedAllocation,
    rules: &AllocationRules,
    step_number: u32,
) -> EngineResult<AuditStep> {
    if let Some(leave_type) = submitted.first_negative() {
        return Err(EngineError::invalid_allocation(format!(
            "{} must not be negative, got {}",
            leave_type,
            submitted.get(leave_type).normalize()
        )));
    }

    let granularity = rules.granularity;
    if granularity > Decimal::ZERO {
        for leave_type in [LeaveType::Cpl, LeaveType::Sl, LeaveType::Lop] {
            let value = submitted.get(leave_type);
            if !(value % granularity).is_zero() {
                return Err(EngineError::invalid_allocation(format!(
                    "{} {} is not a multiple of {} days",
                    leave_type,
                    value.normalize(),
                    granularity.normalize()
                )));
            }
        }
    }

    if normalized.over_allocation > Decimal::ZERO {
        return Err(EngineError::invalid_allocation(format!(
            "CPL + SL ({}) exceeds payable total {}",
            (normalized.adjusted_total + normalized.over_allocation).normalize(),
            normalized.adjusted_total.normalize()
        )));
    }

    if rules.require_exact_lop && submitted.lop != normalized.allocation.lop {
        return Err(EngineError::invalid_allocation(format!(
            "LOP {} does not match derived LOP {}",
            submitted.lop.normalize(),
            normalized.allocation.lop.normalize()
        )));
    }

    Ok(AuditStep {
        step_number,
        rule_id: "allocation_check".to_string(),
        rule_name: "Allocation Check".to_string(),
        input: serde_json::json!({
            "cpl": submitted.cpl.normalize().to_string(),
            "sl": submitted.sl.normalize().to_string(),
            "lop": submitted.lop.normalize().to_string(),
            "granularity": rules.granularity.normalize().to_string()
        }),
        output: serde_json::json!({
            "accepted": true,
            "total": normalized.adjusted_total.normalize().to_string()
        }),
        reasoning: format!(
            "{} days allocated across CPL, SL and LOP",
            normalized.adjusted_total.normalize()
        ),
    })
}
