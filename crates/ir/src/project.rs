//! Project definitions for Blueprint Studio
//!
//! This module contains the `Project` row, its persisted canvas state, and
//! `ProjectGraph`: the in-memory snapshot of one project's whole subgraph
//! (models, fields, attachments, relationships, policies, nestings) that the
//! canvas, the editors and the exporter read from.

use crate::field::{DataField, ModelField};
use crate::model::DataModel;
use crate::nesting::ModelNesting;
use crate::policy::RlsPolicy;
use crate::relationship::Relationship;
use blueprint_core::{
    EngineResult, FieldId, GroupId, Identifiable, ModelFieldId, ModelId, Named, PolicyId,
    PolicyOperation, Position, ProjectId, RelationshipId, UserId, Validatable, Viewport,
    find_by_id, require_name,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Canvas State
// ============================================================================

/// A cosmetic rectangle drawn behind a set of blocks. Never exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualGroup {
    pub id: GroupId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    pub color: String,
}

impl VisualGroup {
    /// Create a new group
    pub fn new(label: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: GroupId::new_v4(),
            x,
            y,
            width,
            height,
            label: label.into(),
            color: "#64748b".to_string(),
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Check if a canvas point falls inside the group
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Canvas state persisted on the project row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub groups: Vec<VisualGroup>,
}

// ============================================================================
// Project
// ============================================================================

/// A project row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,

    /// Owning user
    pub user_id: UserId,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub canvas_state: CanvasState,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new_v4(),
            user_id,
            name: name.into(),
            description: String::new(),
            canvas_state: CanvasState::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Identifiable for Project {
    fn id(&self) -> uuid::Uuid {
        self.id
    }
}

impl Named for Project {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Insert payload for the `projects` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub canvas_state: CanvasState,
}

impl NewProject {
    pub fn new(user_id: UserId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            description: description.into(),
            canvas_state: CanvasState::default(),
        }
    }
}

impl Validatable for NewProject {
    fn validate(&self) -> EngineResult<()> {
        require_name("Project", &self.name)
    }
}

/// Partial update for a project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas_state: Option<CanvasState>,
}

impl ProjectUpdate {
    /// Replace the canvas state
    pub fn canvas(canvas_state: CanvasState) -> Self {
        Self {
            canvas_state: Some(canvas_state),
            ..Self::default()
        }
    }
}

impl Validatable for ProjectUpdate {
    fn validate(&self) -> EngineResult<()> {
        match &self.name {
            Some(name) => require_name("Project", name),
            None => Ok(()),
        }
    }
}

// ============================================================================
// ProjectGraph
// ============================================================================

/// Everything loaded for the active project.
///
/// Collections keep the order in which the data service returned them;
/// per-model views (`attachments_for_model`, `nestings_for_model`) are sorted
/// by order index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectGraph {
    pub project: Project,
    #[serde(default)]
    pub models: Vec<DataModel>,
    #[serde(default)]
    pub fields: Vec<DataField>,
    #[serde(default)]
    pub model_fields: Vec<ModelField>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub policies: Vec<RlsPolicy>,
    #[serde(default)]
    pub nestings: Vec<ModelNesting>,
}

impl ProjectGraph {
    /// An empty graph for a project
    pub fn new(project: Project) -> Self {
        Self {
            project,
            models: Vec::new(),
            fields: Vec::new(),
            model_fields: Vec::new(),
            relationships: Vec::new(),
            policies: Vec::new(),
            nestings: Vec::new(),
        }
    }

    pub fn project_id(&self) -> ProjectId {
        self.project.id
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.fields.is_empty() && self.relationships.is_empty()
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn model(&self, id: ModelId) -> Option<&DataModel> {
        find_by_id(&self.models, id)
    }

    /// Current name of a model, if it still exists
    pub fn model_name(&self, id: ModelId) -> Option<&str> {
        self.model(id).map(|m| m.name())
    }

    pub fn field(&self, id: FieldId) -> Option<&DataField> {
        find_by_id(&self.fields, id)
    }

    pub fn attachment(&self, id: ModelFieldId) -> Option<&ModelField> {
        find_by_id(&self.model_fields, id)
    }

    pub fn relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        find_by_id(&self.relationships, id)
    }

    pub fn policy(&self, id: PolicyId) -> Option<&RlsPolicy> {
        find_by_id(&self.policies, id)
    }

    /// The field behind an attachment: the joined row if present, else the
    /// library entry with the same id.
    pub fn field_for<'a>(&'a self, attachment: &'a ModelField) -> Option<&'a DataField> {
        attachment
            .field
            .as_ref()
            .or_else(|| self.field(attachment.field_id))
    }

    /// The child model of a nesting: the live model if present, else the
    /// joined row.
    pub fn child_model_for<'a>(&'a self, nesting: &'a ModelNesting) -> Option<&'a DataModel> {
        self.model(nesting.child_model_id)
            .or(nesting.child_model.as_ref())
    }

    // ========================================================================
    // Per-model views
    // ========================================================================

    /// Attachments of a model in display order.
    ///
    /// Duplicate order indices (possible when two sessions attach at once)
    /// are broken by creation time, then id, so the order is stable.
    pub fn attachments_for_model(&self, model_id: ModelId) -> Vec<&ModelField> {
        let mut attachments: Vec<&ModelField> = self
            .model_fields
            .iter()
            .filter(|mf| mf.model_id == model_id)
            .collect();
        attachments.sort_by(|a, b| {
            a.order_index
                .cmp(&b.order_index)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        attachments
    }

    /// Order index the next attachment of a model receives
    pub fn next_order_index(&self, model_id: ModelId) -> i64 {
        self.model_fields
            .iter()
            .filter(|mf| mf.model_id == model_id)
            .map(|mf| mf.order_index)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Nested child models of a model in order
    pub fn nestings_for_model(&self, model_id: ModelId) -> Vec<&ModelNesting> {
        let mut nestings: Vec<&ModelNesting> = self
            .nestings
            .iter()
            .filter(|n| n.parent_model_id == model_id)
            .collect();
        nestings.sort_by(|a, b| {
            a.order_index
                .cmp(&b.order_index)
                .then(a.created_at.cmp(&b.created_at))
        });
        nestings
    }

    /// Security policies of a model, in load order
    pub fn policies_for_model(&self, model_id: ModelId) -> Vec<&RlsPolicy> {
        self.policies
            .iter()
            .filter(|p| p.model_id == model_id)
            .collect()
    }

    /// Security policies of a model grouped by operation in CREATE, READ,
    /// UPDATE, DELETE order. Every operation is present, possibly empty.
    pub fn policies_by_operation(
        &self,
        model_id: ModelId,
    ) -> Vec<(PolicyOperation, Vec<&RlsPolicy>)> {
        let policies = self.policies_for_model(model_id);
        PolicyOperation::ALL
            .into_iter()
            .map(|op| {
                let group = policies
                    .iter()
                    .copied()
                    .filter(|p| p.operation == op)
                    .collect();
                (op, group)
            })
            .collect()
    }

    /// Relationships touching a model
    pub fn relationships_for_model(&self, model_id: ModelId) -> Vec<&Relationship> {
        self.relationships
            .iter()
            .filter(|r| r.involves(model_id))
            .collect()
    }

    /// Library fields offered for attachment
    pub fn reusable_fields(&self) -> Vec<&DataField> {
        self.fields.iter().filter(|f| f.is_reusable).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
