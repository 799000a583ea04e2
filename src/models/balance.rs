//! Employee leave balance pool and the mutations applied to it.
//!
//! The pool is external shared state. The engine reads it as a value and
//! returns a [`BalanceMutation`]; only the store applies it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LeaveType;

/// Available CPL and SL units for an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Available casual paid leave.
    #[serde(rename = "CPL", default)]
    pub cpl: Decimal,
    /// Available sick leave.
    #[serde(rename = "SL", default)]
    pub sl: Decimal,
}

impl LeaveBalance {
    /// Creates a balance from its CPL and SL units.
    pub fn new(cpl: Decimal, sl: Decimal) -> Self {
        Self { cpl, sl }
    }

    /// Returns the available units for a balance-backed type.
    ///
    /// Returns `None` for [`LeaveType::Lop`], which carries no pool.
    pub fn available(&self, leave_type: LeaveType) -> Option<Decimal> {
        match leave_type {
            LeaveType::Cpl => Some(self.cpl),
            LeaveType::Sl => Some(self.sl),
            LeaveType::Lop => None,
        }
    }

    /// Returns the balance that results from applying a mutation, or `None`
    /// if either type would leave the decimal range.
    ///
    /// The receiver is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_engine::models::{BalanceMutation, LeaveBalance};
    /// use rust_decimal::Decimal;
    ///
    /// let pool = LeaveBalance::new(Decimal::from(5), Decimal::from(5));
    /// let debit = BalanceMutation::new(Decimal::from(2), Decimal::from(1));
    /// assert_eq!(pool.apply(&debit), Some(LeaveBalance::new(Decimal::from(3), Decimal::from(4))));
    /// ```
    pub fn apply(&self, mutation: &BalanceMutation) -> Option<LeaveBalance> {
        Some(LeaveBalance {
            cpl: self.cpl.checked_sub(mutation.cpl_delta)?,
            sl: self.sl.checked_sub(mutation.sl_delta)?,
        })
    }
}

/// An employee's balance pool as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeLeaveBalance {
    /// The employee the pool belongs to.
    #[serde(rename = "EmployeeID")]
    pub employee_id: String,
    /// The available units.
    #[serde(flatten)]
    pub balance: LeaveBalance,
}

/// A signed debit against the balance pool.
///
/// Positive deltas consume leave, negative deltas return it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceMutation {
    /// Units to subtract from CPL.
    pub cpl_delta: Decimal,
    /// Units to subtract from SL.
    pub sl_delta: Decimal,
}

impl BalanceMutation {
    /// Creates a mutation from its CPL and SL deltas.
    pub fn new(cpl_delta: Decimal, sl_delta: Decimal) -> Self {
        Self {
            cpl_delta,
            sl_delta,
        }
    }

    /// The mutation that leaves the pool unchanged.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if applying the mutation changes nothing.
    pub fn is_noop(&self) -> bool {
        self.cpl_delta.is_zero() && self.sl_delta.is_zero()
    }
}
