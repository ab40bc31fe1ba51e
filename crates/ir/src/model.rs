//! Data model definitions
//!
//! This module contains the `DataModel` struct (a block on the canvas that
//! will become a table or resource), its CRUD action flags, and the insert and
//! update payloads sent to the `data_models` collection.

use blueprint_core::{
    CrudAction, EngineResult, Identifiable, ModelId, Named, Position, Positioned, ProjectId,
    Validatable, require_name,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canvas position given to models created from the library panel
pub const LIBRARY_MODEL_POSITION: Position = Position { x: 100.0, y: 100.0 };

// ============================================================================
// CRUD Actions
// ============================================================================

/// Which CRUD operations a model exposes.
///
/// Purely informational for downstream code generation; nothing is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrudActions {
    pub create: bool,
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

impl CrudActions {
    /// All four actions enabled
    pub fn all() -> Self {
        Self {
            create: true,
            read: true,
            update: true,
            delete: true,
        }
    }

    /// All four actions disabled
    pub fn none() -> Self {
        Self {
            create: false,
            read: false,
            update: false,
            delete: false,
        }
    }

    /// Read the flag for one action
    pub fn get(&self, action: CrudAction) -> bool {
        match action {
            CrudAction::Create => self.create,
            CrudAction::Read => self.read,
            CrudAction::Update => self.update,
            CrudAction::Delete => self.delete,
        }
    }

    /// Set the flag for one action
    pub fn set(&mut self, action: CrudAction, enabled: bool) {
        match action {
            CrudAction::Create => self.create = enabled,
            CrudAction::Read => self.read = enabled,
            CrudAction::Update => self.update = enabled,
            CrudAction::Delete => self.delete = enabled,
        }
    }

    /// Copy with one flag flipped; the other three are untouched
    pub fn toggled(&self, action: CrudAction) -> Self {
        let mut next = *self;
        next.set(action, !self.get(action));
        next
    }

    /// Actions that are currently enabled
    pub fn enabled(&self) -> Vec<CrudAction> {
        CrudAction::ALL
            .into_iter()
            .filter(|action| self.get(*action))
            .collect()
    }
}

impl Default for CrudActions {
    fn default() -> Self {
        Self::all()
    }
}

// ============================================================================
// DataModel
// ============================================================================

/// A model block: a named entity definition placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataModel {
    /// Unique identifier for this model
    pub id: ModelId,

    /// Owning project
    pub project_id: ProjectId,

    /// Model name (e.g., "Customer")
    pub name: String,

    /// Top-left corner of the block in canvas coordinates
    #[serde(default)]
    pub canvas_position: Position,

    /// Exposed CRUD actions
    #[serde(default)]
    pub crud_actions: CrudActions,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl DataModel {
    /// Create a new model in a project
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id: ModelId::new_v4(),
            project_id,
            name: name.into(),
            canvas_position: LIBRARY_MODEL_POSITION,
            crud_actions: CrudActions::all(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Set the position using x, y coordinates
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.canvas_position = Position::new(x, y);
        self
    }

    /// Set the CRUD actions
    pub fn with_actions(mut self, actions: CrudActions) -> Self {
        self.crud_actions = actions;
        self
    }

    /// Insert payload for a new model cloned from this one at `position`.
    ///
    /// Used when a library model is dropped onto the canvas: the clone keeps
    /// the template's name and actions but is a distinct model.
    pub fn clone_at(&self, project_id: ProjectId, position: Position) -> NewModel {
        NewModel {
            project_id,
            name: self.name.clone(),
            canvas_position: position,
            crud_actions: self.crud_actions,
        }
    }
}

impl Identifiable for DataModel {
    fn id(&self) -> uuid::Uuid {
        self.id
    }
}

impl Named for DataModel {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Positioned for DataModel {
    fn position(&self) -> Position {
        self.canvas_position
    }

    fn set_position(&mut self, position: Position) {
        self.canvas_position = position;
    }
}

// ============================================================================
// Write Payloads
// ============================================================================

/// Insert payload for the `data_models` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModel {
    pub project_id: ProjectId,
    pub name: String,
    pub canvas_position: Position,
    pub crud_actions: CrudActions,
}

impl NewModel {
    /// A library model: default position, every action enabled
    pub fn library(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            project_id,
            name: name.into(),
            canvas_position: LIBRARY_MODEL_POSITION,
            crud_actions: CrudActions::all(),
        }
    }

    /// Set the canvas position
    pub fn at(mut self, position: Position) -> Self {
        self.canvas_position = position;
        self
    }
}

impl Validatable for NewModel {
    fn validate(&self) -> EngineResult<()> {
        require_name("Model", &self.name)
    }
}

/// Partial update for a model; `None` members are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas_position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crud_actions: Option<CrudActions>,
}

impl ModelUpdate {
    /// Rename the model
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Move the model
    pub fn move_to(position: Position) -> Self {
        Self {
            canvas_position: Some(position),
            ..Self::default()
        }
    }

    /// Replace the CRUD action set
    pub fn actions(actions: CrudActions) -> Self {
        Self {
            crud_actions: Some(actions),
            ..Self::default()
        }
    }
}

impl Validatable for ModelUpdate {
    fn validate(&self) -> EngineResult<()> {
        match &self.name {
            Some(name) => require_name("Model", name),
            None => Ok(()),
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

    #[test]
    fn test_model_new() {
        let project_id = ProjectId::new_v4();
        let model = DataModel::new(project_id, "Customer").at(40.0, 80.0);
        assert_eq!(model.name, "Customer");
        assert_eq!(model.project_id, project_id);
        assert_eq!(model.position(), Position::new(40.0, 80.0));
        assert_eq!(model.crud_actions, CrudActions::all());
    }

    #[test]
    fn test_crud_toggle_touches_one_flag() {
        let actions = CrudActions::all().toggled(CrudAction::Update);
        assert_eq!(
            actions,
            CrudActions {
                create: true,
                read: true,
                update: false,
                delete: true,
            }
        );
        assert_eq!(actions.toggled(CrudAction::Update), CrudActions::all());
        assert_eq!(
            actions.enabled(),
            vec![CrudAction::Create, CrudAction::Read, CrudAction::Delete]
        );
    }

    #[test]
    fn test_clone_at_keeps_template_settings() {
        let project_id = ProjectId::new_v4();
        let template = DataModel::new(project_id, "Invoice")
            .with_actions(CrudActions::none().toggled(CrudAction::Read));

        let clone = template.clone_at(project_id, Position::new(300.0, 120.0));
        assert_eq!(clone.name, "Invoice");
        assert_eq!(clone.canvas_position, Position::new(300.0, 120.0));
        assert!(clone.crud_actions.read);
        assert!(!clone.crud_actions.create);
    }

    #[test]
    fn test_new_model_validation() {
        let project_id = ProjectId::new_v4();
        assert!(NewModel::library(project_id, "Order").is_valid());
        assert!(!NewModel::library(project_id, "  ").is_valid());
        assert!(!ModelUpdate::rename("").is_valid());
        assert!(ModelUpdate::move_to(Position::zero()).is_valid());
    }

    #[test]
    fn test_model_update_serializes_only_set_members() {
        let json = serde_json::to_value(ModelUpdate::move_to(Position::new(1.0, 2.0))).unwrap();
        assert_eq!(json, serde_json::json!({"canvas_position": {"x": 1.0, "y": 2.0}}));
    }

    #[test]
    fn test_model_deserializes_service_row() {
        let row = serde_json::json!({
            "id": "6f1c1c5e-3d0b-4a36-9d43-1f2a0b7f0c11",
            "project_id": "0b5e7c22-8a5f-4a52-b0a8-6cf2d1f2a9d3",
            "name": "Customer",
            "canvas_position": {"x": 10, "y": 20},
            "crud_actions": {"create": true, "read": true, "update": false, "delete": false},
            "created_at": "2024-03-01T12:00:00Z",
            "updated_at": "2024-03-01T12:00:00Z"
        });
        let model: DataModel = serde_json::from_value(row).unwrap();
        assert_eq!(model.canvas_position, Position::new(10.0, 20.0));
        assert!(!model.crud_actions.update);
    }
}
