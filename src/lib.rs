//! Leave Allocation and Approval Reconciliation Engine
//!
//! This crate splits approved leave into casual paid leave (CPL), sick leave
//! (SL) and loss of pay (LOP), validates the split against the employee's
//! balance pool, and reconciles re-allocations of already approved leave as
//! signed adjustments to that pool.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod workflow;
