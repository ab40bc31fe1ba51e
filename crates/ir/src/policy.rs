//! Row-level-security notes
//!
//! Policies are descriptive: a free-text rule per operation, exported as-is.
//! The structured `condition` is an opaque JSON object that is echoed through
//! unchanged; this system always creates it empty.

use blueprint_core::{
    EngineResult, Identifiable, ModelId, PolicyId, PolicyOperation, Validatable, require_name,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque structured condition of a policy
pub type PolicyCondition = Map<String, Value>;

/// A row-level-security note attached to a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RlsPolicy {
    /// Unique identifier for this policy
    pub id: PolicyId,

    /// The model this policy documents
    pub model_id: ModelId,

    /// Operation the rule applies to
    pub operation: PolicyOperation,

    /// Plain-language description of the rule
    pub rule_description: String,

    /// Structured condition placeholder
    #[serde(default)]
    pub condition: PolicyCondition,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl RlsPolicy {
    /// Create a new policy with an empty condition
    pub fn new(
        model_id: ModelId,
        operation: PolicyOperation,
        rule_description: impl Into<String>,
    ) -> Self {
        Self {
            id: PolicyId::new_v4(),
            model_id,
            operation,
            rule_description: rule_description.into(),
            condition: PolicyCondition::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl Identifiable for RlsPolicy {
    fn id(&self) -> uuid::Uuid {
        self.id
    }
}

/// Insert payload for the `rls_policies` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPolicy {
    pub model_id: ModelId,
    pub operation: PolicyOperation,
    pub rule_description: String,
    pub condition: PolicyCondition,
}

impl NewPolicy {
    /// A policy as submitted by the security editor: the condition is empty
    pub fn described(
        model_id: ModelId,
        operation: PolicyOperation,
        rule_description: impl Into<String>,
    ) -> Self {
        Self {
            model_id,
            operation,
            rule_description: rule_description.into(),
            condition: PolicyCondition::new(),
        }
    }
}

impl Validatable for NewPolicy {
    fn validate(&self) -> EngineResult<()> {
        require_name("Policy description", &self.rule_description)
    }
}

/// Partial update for a policy
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<PolicyOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<PolicyCondition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_policy_has_empty_condition() {
        let payload = NewPolicy::described(
            ModelId::new_v4(),
            PolicyOperation::Read,
            "Users can read their own orders",
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["condition"], json!({}));
        assert_eq!(value["operation"], json!("READ"));
        assert!(payload.is_valid());
    }

    #[test]
    fn test_blank_description_rejected() {
        let payload = NewPolicy::described(ModelId::new_v4(), PolicyOperation::Delete, " ");
        assert!(!payload.is_valid());
    }

    #[test]
    fn test_condition_passes_through() {
        let row = json!({
            "id": "5e7a0f60-0a5b-4e87-9f71-98e5f2bf7154",
            "model_id": "6f8b1a71-1b6c-4f98-a082-a9f6a3c08265",
            "operation": "UPDATE",
            "rule_description": "Owners only",
            "condition": {"column": "owner_id", "equals": "auth.uid()"}
        });
        let policy: RlsPolicy = serde_json::from_value(row).unwrap();
        assert_eq!(policy.operation, PolicyOperation::Update);
        assert_eq!(policy.condition["column"], json!("owner_id"));
    }
}
