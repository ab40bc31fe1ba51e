//! UI State for Blueprint Studio
//!
//! Plain state containers for page navigation, selection, dialogs and the
//! status bar. They hold ids only; everything they point at is read from the
//! active `ProjectGraph`.

use crate::dialogs::{ProjectForm, RelationshipForm};
use crate::editors::{LibraryFieldDraft, LibraryModelDraft};
use blueprint_core::{GroupId, ModelFieldId, ModelId, PolicyId, ProjectId, RelationshipId};

// ============================================================================
// Page Navigation
// ============================================================================

/// Application pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    /// Project selector
    #[default]
    Projects,
    /// Canvas, library sidebar and model editor
    Editor,
}

impl Page {
    pub fn display_name(&self) -> &'static str {
        match self {
            Page::Projects => "Projects",
            Page::Editor => "Editor",
        }
    }

    pub fn requires_project(&self) -> bool {
        matches!(self, Page::Editor)
    }
}

/// Sections of the library sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidebarTab {
    #[default]
    Models,
    Fields,
    /// Data-type toolbox
    Toolbox,
}

impl SidebarTab {
    pub const ALL: [SidebarTab; 3] = [SidebarTab::Models, SidebarTab::Fields, SidebarTab::Toolbox];

    pub fn display_name(&self) -> &'static str {
        match self {
            SidebarTab::Models => "Models",
            SidebarTab::Fields => "Fields",
            SidebarTab::Toolbox => "Data Types",
        }
    }
}

// ============================================================================
// Selection State
// ============================================================================

/// What is currently selected on the canvas
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub model: Option<ModelId>,
    pub relationship: Option<RelationshipId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.model = None;
        self.relationship = None;
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.relationship.is_none()
    }

    pub fn is_model_selected(&self, id: ModelId) -> bool {
        self.model == Some(id)
    }

    /// Select a single model (clears other selections)
    pub fn select_model(&mut self, id: ModelId) {
        self.clear();
        self.model = Some(id);
    }

    /// Select a single relationship (clears other selections)
    pub fn select_relationship(&mut self, id: RelationshipId) {
        self.clear();
        self.relationship = Some(id);
    }

    /// Drop selections whose target no longer exists
    pub fn retain(
        &mut self,
        model_exists: impl Fn(ModelId) -> bool,
        relationship_exists: impl Fn(RelationshipId) -> bool,
    ) {
        if self.model.is_some_and(|id| !model_exists(id)) {
            self.model = None;
        }
        if self.relationship.is_some_and(|id| !relationship_exists(id)) {
            self.relationship = None;
        }
    }
}

// ============================================================================
// UI State
// ============================================================================

/// General UI state (page, dialogs, status bar)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub active_page: Page,
    pub sidebar_tab: SidebarTab,
    pub sidebar_collapsed: bool,
    pub active_dialog: Option<Dialog>,
    pub status_message: Option<StatusMessage>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigate(&mut self, page: Page) {
        self.active_page = page;
    }

    pub fn show_dialog(&mut self, dialog: Dialog) {
        self.active_dialog = Some(dialog);
    }

    pub fn close_dialog(&mut self) {
        self.active_dialog = None;
    }

    pub fn set_status(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.status_message = Some(StatusMessage {
            text: message.into(),
            level,
        });
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    /// The delete awaiting confirmation, if the confirm dialog is open
    pub fn pending_delete(&self) -> Option<DeleteTarget> {
        match &self.active_dialog {
            Some(Dialog::ConfirmDelete(target)) => Some(*target),
            _ => None,
        }
    }
}

/// Dialog types
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    NewProject(ProjectForm),
    NewLibraryModel(LibraryModelDraft),
    NewLibraryField(LibraryFieldDraft),
    NewRelationship(RelationshipForm),
    /// Model editor for one model
    EditModel(ModelId),
    /// Delete confirmation dialog
    ConfirmDelete(DeleteTarget),
}

/// Target for delete confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Project(ProjectId),
    Model(ModelId),
    /// A field attachment; the field itself is kept
    Attachment(ModelFieldId),
    Relationship(RelationshipId),
    Policy(PolicyId),
    Group(GroupId),
}

impl DeleteTarget {
    /// Confirmation prompt
    pub fn prompt(&self) -> &'static str {
        match self {
            DeleteTarget::Project(_) => "Delete this project and everything in it?",
            DeleteTarget::Model(_) => "Delete this model?",
            DeleteTarget::Attachment(_) => "Remove this field from the model?",
            DeleteTarget::Relationship(_) => "Delete this relationship?",
            DeleteTarget::Policy(_) => "Delete this policy?",
            DeleteTarget::Group(_) => "Delete this group?",
        }
    }
}

/// Status message for the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

/// Status message severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_selection() {
        let mut selection = Selection::new();
        assert!(selection.is_empty());

        let id = Uuid::new_v4();
        selection.select_model(id);
        assert!(!selection.is_empty());
        assert!(selection.is_model_selected(id));

        let rel = Uuid::new_v4();
        selection.select_relationship(rel);
        assert!(!selection.is_model_selected(id));
        assert_eq!(selection.relationship, Some(rel));

        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_selection_retain() {
        let mut selection = Selection::new();
        let id = Uuid::new_v4();
        selection.select_model(id);

        selection.retain(|m| m == id, |_| true);
        assert!(selection.is_model_selected(id));

        selection.retain(|_| false, |_| true);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_ui_state() {
        let mut ui = UiState::new();
        assert_eq!(ui.active_page, Page::Projects);

        ui.navigate(Page::Editor);
        assert!(ui.active_page.requires_project());

        let target = DeleteTarget::Model(Uuid::new_v4());
        ui.show_dialog(Dialog::ConfirmDelete(target));
        assert_eq!(ui.pending_delete(), Some(target));

        ui.close_dialog();
        assert!(ui.active_dialog.is_none());
        assert_eq!(ui.pending_delete(), None);
    }

    #[test]
    fn test_status() {
        let mut ui = UiState::new();
        ui.set_status("Saved", StatusLevel::Success);
        assert_eq!(
            ui.status_message,
            Some(StatusMessage {
                text: "Saved".to_string(),
                level: StatusLevel::Success
            })
        );
        ui.clear_status();
        assert!(ui.status_message.is_none());
    }
}
