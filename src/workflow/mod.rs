//! The leave approval workflow.
//!
//! Statuses advance only through [`transition`]; [`preview`] answers the
//! same question without producing a commit.

mod actor;
mod decision;
mod preview;
mod state_machine;

pub use actor::{ActorRole, ApprovalStage, UnknownRole};
pub use decision::{
    Candidate, CommitRequest, Decision, ReviewAction, TransitionKind, TransitionOutcome,
};
pub use preview::{AllocationPreview, preview};
pub use state_machine::{transition, transition_for};
