//! The exported blueprint document
//!
//! Field names here are the file format: consumers feed this JSON straight
//! into code generators, so renaming anything is a breaking change.

use blueprint_core::{Cardinality, DataType, PolicyOperation};
use blueprint_ir::{BusinessRule, CrudActions, PolicyCondition};
use serde::{Deserialize, Serialize};

/// Format version written to `meta.version`
pub const BLUEPRINT_VERSION: &str = "1.0.0";

/// Name used for references that no longer resolve
pub const UNKNOWN_NAME: &str = "Unknown";

/// Root of an exported blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub meta: BlueprintMeta,
    pub models: Vec<ExportModel>,
    pub relationships: Vec<ExportRelationship>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintMeta {
    pub version: String,
    /// ISO-8601 UTC with millisecond precision
    pub exported_at: String,
    pub project_name: String,
    pub project_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportModel {
    pub name: String,
    pub fields: Vec<ExportField>,
    pub nested_models: Vec<ExportNestedModel>,
    pub actions: CrudActions,
    pub security_policies: Vec<ExportPolicy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportField {
    pub name: String,
    /// Absent when the underlying field no longer exists
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    pub required: bool,
    pub unique: bool,
    pub validation_rules: Vec<BusinessRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNestedModel {
    pub model_name: String,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPolicy {
    pub operation: PolicyOperation,
    pub description: String,
    pub condition: PolicyCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRelationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub cardinality: Cardinality,
}

impl Blueprint {
    pub fn model(&self, name: &str) -> Option<&ExportModel> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Render as JSON with a two-space indent
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
