//! Actor roles and approval stages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The role of the caller performing a review action.
///
/// Authentication happens upstream; the engine only receives the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// The employee's team lead.
    TeamLead,
    /// Human resources.
    Hr,
    /// Administrator.
    Admin,
}

impl ActorRole {
    /// Returns the snake_case name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::TeamLead => "team_lead",
            ActorRole::Hr => "hr",
            ActorRole::Admin => "admin",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown actor role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for ActorRole {
    type Err = UnknownRole;

    /// Parses a role name, ignoring case and accepting `-` for `_`.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_engine::workflow::ActorRole;
    ///
    /// assert_eq!("team-lead".parse::<ActorRole>().unwrap(), ActorRole::TeamLead);
    /// assert_eq!("HR".parse::<ActorRole>().unwrap(), ActorRole::Hr);
    /// assert!("manager".parse::<ActorRole>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "team_lead" | "tl" => Ok(ActorRole::TeamLead),
            "hr" => Ok(ActorRole::Hr),
            "admin" => Ok(ActorRole::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// The approval authority responsible for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApprovalStage {
    /// The team lead stage (`PENDING_TL`).
    TeamLead,
    /// The HR stage (`PENDING_HR` and re-allocation of `APPROVED`).
    Hr,
}
