//! Error types for the leave engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while allocating, validating
//! and committing leave decisions.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::{LeaveStatus, LeaveType};
use crate::workflow::ActorRole;

/// One leave type that the balance pool cannot cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceShortfall {
    /// The leave type that failed validation.
    pub leave_type: LeaveType,
    /// The units the candidate allocation asks for.
    pub requested: Decimal,
    /// The units available in the pool.
    pub available: Decimal,
    /// The previously committed units, for updates of an approved request.
    pub previous: Option<Decimal>,
}

impl fmt::Display for BalanceShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requested {}, available {}",
            self.leave_type,
            self.requested.normalize(),
            self.available.normalize()
        )?;
        if let Some(previous) = self.previous {
            write!(f, " (previously allocated {})", previous.normalize())?;
        }
        Ok(())
    }
}

fn join_shortfalls(shortfalls: &[BalanceShortfall]) -> String {
    shortfalls
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The main error type for the leave engine.
///
/// Every variant is recoverable at the call boundary and carries enough
/// context to render a user-facing message.
///
/// # Example
///
/// ```
/// use leave_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     leave_id: "leave_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "Leave request not found: leave_404");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The referenced leave id is absent from history.
    #[error("Leave request not found: {leave_id}")]
    NotFound {
        /// The leave id that was looked up.
        leave_id: String,
    },

    /// The action is not legal for the request's current status.
    #[error("Cannot {action} leave request '{leave_id}' in status {status}")]
    InvalidTransition {
        /// The leave id.
        leave_id: String,
        /// The status the request is in.
        status: LeaveStatus,
        /// The attempted action.
        action: String,
    },

    /// The transition is legal but the actor's role may not perform it.
    #[error("Role '{role}' may not {action} leave request '{leave_id}' in status {status}")]
    ActorNotPermitted {
        /// The leave id.
        leave_id: String,
        /// The actor's role.
        role: ActorRole,
        /// The status the request is in.
        status: LeaveStatus,
        /// The attempted action.
        action: String,
    },

    /// The allocation breaks a bucket or sandwich rule.
    #[error("Invalid allocation: {message}")]
    InvalidAllocation {
        /// A description of the violated rule.
        message: String,
    },

    /// The balance pool cannot cover the allocation.
    #[error("Insufficient leave balance: {}", join_shortfalls(.shortfalls))]
    InsufficientBalance {
        /// Every leave type that failed, in CPL, SL order.
        shortfalls: Vec<BalanceShortfall>,
    },

    /// A decision for this leave id is already being committed.
    #[error("A decision for leave request '{leave_id}' is already in flight")]
    CommitInFlight {
        /// The leave id.
        leave_id: String,
    },

    /// The external store rejected or failed the commit.
    #[error("Failed to commit decision for leave request '{leave_id}': {message}")]
    CommitFailure {
        /// The leave id.
        leave_id: String,
        /// A description of the store failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidAllocation`].
    pub fn invalid_allocation(message: impl Into<String>) -> Self {
        EngineError::InvalidAllocation {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
