//! Field definitions
//!
//! A `DataField` is a named, typed attribute living in the project's field
//! library. It only becomes part of a model through a `ModelField`
//! attachment, which carries the per-model configuration: order, required and
//! unique flags, and business rules.

use blueprint_core::{
    DataType, EngineResult, FieldId, Identifiable, ModelFieldId, ModelId, Named, ProjectId,
    Validatable, require_name,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// DataField
// ============================================================================

/// A library field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataField {
    /// Unique identifier for this field
    pub id: FieldId,

    /// Owning project
    pub project_id: ProjectId,

    /// Field name (e.g., "Email")
    pub name: String,

    /// Data type from the fixed toolbox set
    pub data_type: DataType,

    /// Reusable fields are offered in the library for attachment to any
    /// model; one-off fields are created from a model's field editor.
    #[serde(default)]
    pub is_reusable: bool,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl DataField {
    /// Create a new field
    pub fn new(project_id: ProjectId, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: FieldId::new_v4(),
            project_id,
            name: name.into(),
            data_type,
            is_reusable: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Mark the field as reusable
    pub fn reusable(mut self) -> Self {
        self.is_reusable = true;
        self
    }
}

impl Identifiable for DataField {
    fn id(&self) -> uuid::Uuid {
        self.id
    }
}

impl Named for DataField {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Insert payload for the `data_fields` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewField {
    pub project_id: ProjectId,
    pub name: String,
    pub data_type: DataType,
    pub is_reusable: bool,
}

impl NewField {
    /// A reusable library field
    pub fn reusable(project_id: ProjectId, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            project_id,
            name: name.into(),
            data_type,
            is_reusable: true,
        }
    }

    /// A one-off field created for a single model
    pub fn private(project_id: ProjectId, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            project_id,
            name: name.into(),
            data_type,
            is_reusable: false,
        }
    }
}

impl Validatable for NewField {
    fn validate(&self) -> EngineResult<()> {
        require_name("Field", &self.name)
    }
}

/// Partial update for a library field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_reusable: Option<bool>,
}

impl Validatable for FieldUpdate {
    fn validate(&self) -> EngineResult<()> {
        match &self.name {
            Some(name) => require_name("Field", name),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Business Rules
// ============================================================================

/// Kind of a business rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Min,
    Max,
    Pattern,
    Custom,
}

/// Rule operand: either a number or a string, kept exactly as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Number(serde_json::Number),
    Text(String),
}

impl std::fmt::Display for RuleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleValue::Number(n) => write!(f, "{}", n),
            RuleValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RuleValue {
    fn from(value: i64) -> Self {
        RuleValue::Number(value.into())
    }
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        RuleValue::Text(value.to_string())
    }
}

/// A business rule attached to a model field (display/export only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub value: RuleValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BusinessRule {
    /// Create a rule without a message
    pub fn new(kind: RuleKind, value: impl Into<RuleValue>) -> Self {
        Self {
            kind,
            value: value.into(),
            message: None,
        }
    }

    /// Attach a message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ============================================================================
// ModelField (attachment)
// ============================================================================

/// Binding of a library field to a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelField {
    /// Unique identifier for this attachment
    pub id: ModelFieldId,

    /// The model the field is attached to
    pub model_id: ModelId,

    /// The attached library field
    pub field_id: FieldId,

    /// Display/export order within the model
    pub order_index: i64,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default)]
    pub is_unique: bool,

    #[serde(default)]
    pub business_rules: Vec<BusinessRule>,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// The joined `data_fields` row, when resolved by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<DataField>,
}

impl ModelField {
    /// Create a new attachment
    pub fn new(model_id: ModelId, field_id: FieldId, order_index: i64) -> Self {
        Self {
            id: ModelFieldId::new_v4(),
            model_id,
            field_id,
            order_index,
            is_required: false,
            is_unique: false,
            business_rules: Vec::new(),
            created_at: Utc::now(),
            field: None,
        }
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Mark as unique
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Add a business rule
    pub fn with_rule(mut self, rule: BusinessRule) -> Self {
        self.business_rules.push(rule);
        self
    }

    /// Attach the resolved field row
    pub fn with_field(mut self, field: DataField) -> Self {
        self.field = Some(field);
        self
    }
}

impl Identifiable for ModelField {
    fn id(&self) -> uuid::Uuid {
        self.id
    }
}

/// Per-attachment settings chosen when a field is attached
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentConfig {
    pub is_required: bool,
    pub is_unique: bool,
    pub business_rules: Vec<BusinessRule>,
}

impl AttachmentConfig {
    /// Settings from the required/unique checkboxes, with no rules
    pub fn flags(is_required: bool, is_unique: bool) -> Self {
        Self {
            is_required,
            is_unique,
            business_rules: Vec::new(),
        }
    }
}

/// Insert payload for the `model_fields` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModelField {
    pub model_id: ModelId,
    pub field_id: FieldId,
    pub order_index: i64,
    #[serde(flatten)]
    pub config: AttachmentConfig,
}

/// Partial update for an attachment
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelFieldUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_rules: Option<Vec<BusinessRule>>,
}

impl ModelFieldUpdate {
    /// Set the required flag
    pub fn required(value: bool) -> Self {
        Self {
            is_required: Some(value),
            ..Self::default()
        }
    }

    /// Set the unique flag
    pub fn unique(value: bool) -> Self {
        Self {
            is_unique: Some(value),
            ..Self::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_field_constructors() {
        let project_id = ProjectId::new_v4();
        let field = DataField::new(project_id, "Email", DataType::Email).reusable();
        assert!(field.is_reusable);
        assert_eq!(field.data_type, DataType::Email);

        assert!(NewField::reusable(project_id, "Email", DataType::Email).is_reusable);
        assert!(!NewField::private(project_id, "Email", DataType::Email).is_reusable);
        assert!(!NewField::private(project_id, "", DataType::Text).is_valid());
    }

    #[test]
    fn test_business_rule_values_kept_verbatim() {
        let rules: Vec<BusinessRule> = serde_json::from_value(json!([
            {"type": "min", "value": 3},
            {"type": "max", "value": 2.5, "message": "too big"},
            {"type": "pattern", "value": "^[a-z]+$"}
        ]))
        .unwrap();

        assert_eq!(rules[0].kind, RuleKind::Min);
        assert_eq!(rules[2].value, RuleValue::Text("^[a-z]+$".to_string()));

        let back = serde_json::to_value(&rules).unwrap();
        assert_eq!(
            back,
            json!([
                {"type": "min", "value": 3},
                {"type": "max", "value": 2.5, "message": "too big"},
                {"type": "pattern", "value": "^[a-z]+$"}
            ])
        );
    }

    #[test]
    fn test_rule_builder() {
        let rule = BusinessRule::new(RuleKind::Min, 8_i64).with_message("At least 8");
        assert_eq!(rule.value.to_string(), "8");
        assert_eq!(rule.message.as_deref(), Some("At least 8"));
    }

    #[test]
    fn test_new_model_field_payload_is_flat() {
        let model_id = ModelId::new_v4();
        let field_id = FieldId::new_v4();
        let payload = NewModelField {
            model_id,
            field_id,
            order_index: 2,
            config: AttachmentConfig::flags(true, false),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["order_index"], json!(2));
        assert_eq!(value["is_required"], json!(true));
        assert_eq!(value["business_rules"], json!([]));
    }

    #[test]
    fn test_model_field_joined_row() {
        let row = json!({
            "id": "1a3cdb2c-6c17-4a43-9b3d-54a1b87b3f10",
            "model_id": "2b4ddc3d-7d28-4b54-8c4e-65b2c98c4f21",
            "field_id": "3c5eed4e-8e39-4c65-9d5f-76c3d09d5f32",
            "order_index": 0,
            "is_required": true,
            "is_unique": true,
            "business_rules": [],
            "field": {
                "id": "3c5eed4e-8e39-4c65-9d5f-76c3d09d5f32",
                "project_id": "4d6ffe5f-9f4a-4d76-8e60-87d4e1ae6043",
                "name": "Email",
                "data_type": "email",
                "is_reusable": false
            }
        });
        let attachment: ModelField = serde_json::from_value(row).unwrap();
        assert!(attachment.is_required);
        assert_eq!(attachment.field.unwrap().name, "Email");
    }

    #[test]
    fn test_model_field_update_payload() {
        let json = serde_json::to_value(ModelFieldUpdate::unique(true)).unwrap();
        assert_eq!(json, json!({"is_unique": true}));
    }
}
