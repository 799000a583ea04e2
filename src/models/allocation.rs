//! Leave types and per-type allocations.
//!
//! An [`Allocation`] is the split of a request's payable days across the
//! CPL, SL and LOP buckets. The same shape is used for a candidate under
//! review and for the committed breakup stored on a request.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A leave-type bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveType {
    /// Casual paid leave, backed by the balance pool.
    #[serde(rename = "CPL")]
    Cpl,
    /// Sick leave, backed by the balance pool.
    #[serde(rename = "SL")]
    Sl,
    /// Loss of pay. Never backed by a pool.
    #[serde(rename = "LOP")]
    Lop,
}

impl LeaveType {
    /// Returns the short code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            LeaveType::Cpl => "CPL",
            LeaveType::Sl => "SL",
            LeaveType::Lop => "LOP",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A per-type split of leave days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Allocation {
    /// Casual paid leave days.
    #[serde(rename = "CPL", default)]
    pub cpl: Decimal,
    /// Sick leave days.
    #[serde(rename = "SL", default)]
    pub sl: Decimal,
    /// Loss-of-pay days.
    #[serde(rename = "LOP", default)]
    pub lop: Decimal,
}

impl Allocation {
    /// Creates an allocation from its three buckets.
    pub fn new(cpl: Decimal, sl: Decimal, lop: Decimal) -> Self {
        Self { cpl, sl, lop }
    }

    /// Returns the days allocated to a single bucket.
    pub fn get(&self, leave_type: LeaveType) -> Decimal {
        match leave_type {
            LeaveType::Cpl => self.cpl,
            LeaveType::Sl => self.sl,
            LeaveType::Lop => self.lop,
        }
    }

    /// Returns the balance-backed days (`cpl + sl`), or `None` on overflow.
    pub fn paid_days(&self) -> Option<Decimal> {
        self.cpl.checked_add(self.sl)
    }

    /// Returns the sum of all three buckets, or `None` on overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_engine::models::Allocation;
    /// use rust_decimal::Decimal;
    ///
    /// let allocation = Allocation::new(Decimal::from(2), Decimal::from(1), Decimal::from(2));
    /// assert_eq!(allocation.total(), Some(Decimal::from(5)));
    ///
    /// let huge = Allocation::new(Decimal::MAX, Decimal::MAX, Decimal::ZERO);
    /// assert_eq!(huge.total(), None);
    /// ```
    pub fn total(&self) -> Option<Decimal> {
        self.paid_days()?.checked_add(self.lop)
    }

    /// Returns the first bucket holding a negative value, if any.
    pub fn first_negative(&self) -> Option<LeaveType> {
        [LeaveType::Cpl, LeaveType::Sl, LeaveType::Lop]
            .into_iter()
            .find(|t| self.get(*t) < Decimal::ZERO)
    }
}
