//! Calculation logic for the leave engine.
//!
//! This module contains the pure functions behind every decision: LOP
//! derivation and bucket checks for a candidate allocation, balance
//! validation under the fresh and update regimes, and reconciliation of an
//! approved breakup against its replacement.

mod allocation;
mod balance_validation;
mod reconciliation;

pub use allocation::{
    AllocationInput, NormalizedAllocation, check_submitted_allocation, normalize,
};
pub use balance_validation::{
    BalanceValidation, ValidationRegime, find_shortfalls, validate_allocation,
};
pub use reconciliation::{AllocationDelta, Reconciliation, reconcile};
