//! Audit trace models.
//!
//! Every calculator, validator and reconciliation step records what it read,
//! what it produced and a human-readable explanation, so a reviewer can see
//! exactly why an allocation was accepted or rejected.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording an engine decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated while evaluating a decision.
///
/// Warnings flag conditions that do not block the decision, such as an
/// approval that leaves the pool unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
}

/// The complete audit trace for one transition or preview.
///
/// # Example
///
/// ```
/// use leave_engine::models::AuditTrace;
///
/// let trace = AuditTrace::default();
/// assert_eq!(trace.next_step_number(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Returns the number the next recorded step should carry.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Appends a step.
    pub fn push(&mut self, step: AuditStep) {
        self.steps.push(step);
    }

    /// Appends a warning.
    pub fn warn(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(AuditWarning {
            code: code.into(),
            message: message.into(),
        });
    }
}
