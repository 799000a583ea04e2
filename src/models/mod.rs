//! Core data models for the leave engine.
//!
//! This module contains all the domain models used throughout the engine.

mod allocation;
mod audit;
mod balance;
mod history;
mod leave_request;

pub use allocation::{Allocation, LeaveType};
pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use balance::{BalanceMutation, EmployeeLeaveBalance, LeaveBalance};
pub use history::{HistoryEntry, find_entry};
pub use leave_request::{LeaveRequest, LeaveStatus};
