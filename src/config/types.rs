//! Configuration types for the leave policy.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::workflow::{ActorRole, ApprovalStage};

/// Metadata about the policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PolicyMetadata {
    /// The human-readable name of the policy.
    pub name: String,
    /// The version or effective date of the policy.
    pub version: String,
}

/// Rules applied to a candidate allocation at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AllocationRules {
    /// The smallest unit of leave; every bucket must be a multiple of it.
    pub granularity: Decimal,
    /// Whether a submitted LOP must equal the derived LOP.
    #[serde(default = "default_require_exact_lop")]
    pub require_exact_lop: bool,
}

fn default_require_exact_lop() -> bool {
    true
}

impl Default for AllocationRules {
    fn default() -> Self {
        Self {
            granularity: Decimal::new(5, 1),
            require_exact_lop: true,
        }
    }
}

/// Policy configuration file structure (`policy.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Policy metadata.
    pub policy: PolicyMetadata,
    /// Allocation rules.
    pub allocation: AllocationRules,
}

/// Roles permitted at each approval stage (`approvers.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApproverRules {
    /// Roles that may approve a request waiting for the team lead.
    pub team_lead: Vec<ActorRole>,
    /// Roles that may approve, reject or re-allocate at the HR stage.
    pub hr: Vec<ActorRole>,
}

impl Default for ApproverRules {
    fn default() -> Self {
        Self {
            team_lead: vec![ActorRole::TeamLead, ActorRole::Admin],
            hr: vec![ActorRole::Hr, ActorRole::Admin],
        }
    }
}

/// The complete leave policy loaded from YAML files.
///
/// The [`Default`] policy matches the files shipped in `config/default`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeavePolicy {
    /// Policy metadata.
    metadata: PolicyMetadata,
    /// Allocation rules.
    allocation: AllocationRules,
    /// Approver rules.
    approvers: ApproverRules,
}

impl LeavePolicy {
    /// Creates a new LeavePolicy from its component parts.
    pub fn new(
        metadata: PolicyMetadata,
        allocation: AllocationRules,
        approvers: ApproverRules,
    ) -> Self {
        Self {
            metadata,
            allocation,
            approvers,
        }
    }

    /// Returns the policy metadata.
    pub fn metadata(&self) -> &PolicyMetadata {
        &self.metadata
    }

    /// Returns the allocation rules.
    pub fn allocation(&self) -> &AllocationRules {
        &self.allocation
    }

    /// Returns the roles permitted to act at a stage.
    pub fn approvers_for(&self, stage: ApprovalStage) -> &[ActorRole] {
        match stage {
            ApprovalStage::TeamLead => &self.approvers.team_lead,
            ApprovalStage::Hr => &self.approvers.hr,
        }
    }

    /// Returns true if the role may act at the stage.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_engine::config::LeavePolicy;
    /// use leave_engine::workflow::{ActorRole, ApprovalStage};
    ///
    /// let policy = LeavePolicy::default();
    /// assert!(policy.is_permitted(ActorRole::Hr, ApprovalStage::Hr));
    /// assert!(!policy.is_permitted(ActorRole::TeamLead, ApprovalStage::Hr));
    /// ```
    pub fn is_permitted(&self, role: ActorRole, stage: ApprovalStage) -> bool {
        self.approvers_for(stage).contains(&role)
    }
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            metadata: PolicyMetadata {
                name: "Default Leave Policy".to_string(),
                version: "2026-01-01".to_string(),
            },
            allocation: AllocationRules::default(),
            approvers: ApproverRules::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_permissions() {
        let policy = LeavePolicy::default();

        assert!(policy.is_permitted(ActorRole::TeamLead, ApprovalStage::TeamLead));
        assert!(policy.is_permitted(ActorRole::Admin, ApprovalStage::TeamLead));
        assert!(!policy.is_permitted(ActorRole::Hr, ApprovalStage::TeamLead));
        assert!(policy.is_permitted(ActorRole::Hr, ApprovalStage::Hr));
        assert!(policy.is_permitted(ActorRole::Admin, ApprovalStage::Hr));
        assert!(!policy.is_permitted(ActorRole::TeamLead, ApprovalStage::Hr));
    }

    #[test]
    fn test_default_allocation_rules() {
        let rules = AllocationRules::default();
        assert_eq!(rules.granularity, Decimal::new(5, 1));
        assert!(rules.require_exact_lop);
    }

    #[test]
    fn test_deserialize_policy_yaml() {
        let yaml = r#"
policy:
  name: Test Policy
  version: "2026-07-01"
allocation:
  granularity: 1
"#;
        let config: PolicyConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.policy.name, "Test Policy");
        assert_eq!(config.allocation.granularity, Decimal::ONE);
        assert!(config.allocation.require_exact_lop);
    }

    #[test]
    fn test_deserialize_approvers_yaml() {
        let yaml = r#"
team_lead: [team_lead]
hr: [hr, admin]
"#;
        let rules: ApproverRules = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.team_lead, vec![ActorRole::TeamLead]);
        assert_eq!(rules.hr, vec![ActorRole::Hr, ActorRole::Admin]);
    }
}
