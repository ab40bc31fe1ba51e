//! The editing session
//!
//! `Workspace` owns the project store together with all UI state, and is the
//! one place where canvas gestures, dialog submissions and editor actions
//! turn into store writes. A front end feeds it input and renders from
//! [`Workspace::graph`] plus the public state containers.

use crate::canvas::{
    CanvasCommit, CanvasSurface, DropPayload, PointerButton, PointerEvent, PointerTarget,
};
use crate::dialogs::{ProjectForm, RelationshipForm};
use crate::editors::{LibraryFieldDraft, LibraryModelDraft, ModelEditor};
use crate::state::{DeleteTarget, Dialog, Page, Selection, SidebarTab, StatusLevel, UiState};
use blueprint_core::{
    CrudAction, EngineError, GroupId, ModelFieldId, ModelId, Position, ProjectId, RelationshipId,
    UserId, Viewport,
};
use blueprint_export::{Blueprint, ExportError, export_blueprint, write_blueprint};
use blueprint_ir::{
    AttachmentConfig, CanvasState, DataField, DataModel, ModelField, ModelFieldUpdate,
    ModelUpdate, Project, ProjectGraph, Relationship, RelationshipUpdate, RlsPolicy,
    VisualGroup,
};
use blueprint_store::{ProjectStore, SharedService, StoreError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

fn dialog_not_open(name: &str) -> WorkspaceError {
    EngineError::UiState(format!("{name} dialog is not open")).into()
}

fn no_project() -> WorkspaceError {
    StoreError::NoProjectLoaded.into()
}

// ============================================================================
// Workspace
// ============================================================================

#[derive(Debug)]
pub struct Workspace {
    store: ProjectStore,
    pub canvas: CanvasSurface,
    pub ui: UiState,
    pub selection: Selection,
    editor: Option<ModelEditor>,
}

impl Workspace {
    pub fn new(service: SharedService, owner: UserId) -> Self {
        Self::with_store(ProjectStore::new(service, owner))
    }

    pub fn with_store(store: ProjectStore) -> Self {
        Self {
            store,
            canvas: CanvasSurface::new(),
            ui: UiState::new(),
            selection: Selection::new(),
            editor: None,
        }
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    /// The active project graph
    pub fn graph(&self) -> Option<&ProjectGraph> {
        self.store.current()
    }

    fn require_graph(&self) -> WorkspaceResult<&ProjectGraph> {
        self.store.current().ok_or_else(no_project)
    }

    pub fn editor(&self) -> Option<&ModelEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut ModelEditor> {
        self.editor.as_mut()
    }

    /// Show a failed action in the status bar instead of propagating it
    pub fn report<T>(&mut self, result: WorkspaceResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "action failed");
                self.ui.set_status(e.to_string(), StatusLevel::Error);
                None
            }
        }
    }

    /// Drop selection and editor state that points at deleted models
    fn prune(&mut self) {
        let Some(graph) = self.store.current() else {
            self.selection.clear();
            self.editor = None;
            return;
        };
        self.selection.retain(
            |id| graph.model(id).is_some(),
            |id| graph.relationship(id).is_some(),
        );
        if self
            .editor
            .as_ref()
            .is_some_and(|editor| graph.model(editor.model_id).is_none())
        {
            self.editor = None;
            if matches!(self.ui.active_dialog, Some(Dialog::EditModel(_))) {
                self.ui.close_dialog();
            }
        }
    }

    // ========================================================================
    // Projects
    // ========================================================================

    pub async fn refresh_projects(&mut self) -> WorkspaceResult<&[Project]> {
        Ok(self.store.list_projects().await?)
    }

    pub fn show_new_project(&mut self) {
        self.ui.show_dialog(Dialog::NewProject(ProjectForm::new()));
    }

    /// Create the project in the open dialog and switch to it
    pub async fn submit_new_project(&mut self) -> WorkspaceResult<Project> {
        let Some(Dialog::NewProject(form)) = &self.ui.active_dialog else {
            return Err(dialog_not_open("New project"));
        };
        let (name, description) = form.request()?;
        let project = self.store.create_project(&name, &description).await?;
        self.ui.close_dialog();
        self.open_project(project.id).await?;
        Ok(project)
    }

    /// Load a project and show it on the canvas at its saved viewport
    pub async fn open_project(&mut self, id: ProjectId) -> WorkspaceResult<()> {
        let graph = self.store.load_project(id).await?;
        let viewport = graph.project.canvas_state.viewport;
        info!(project = %id, models = graph.models.len(), "opened project");

        self.canvas.sync_viewport(viewport);
        self.selection.clear();
        self.editor = None;
        self.ui.close_dialog();
        self.navigate(Page::Editor)
    }

    pub fn close_project(&mut self) {
        self.store.close_project();
        self.prune();
        self.ui.close_dialog();
        self.ui.navigate(Page::Projects);
    }

    /// Switch pages. The editor needs a loaded project.
    pub fn navigate(&mut self, page: Page) -> WorkspaceResult<()> {
        if page.requires_project() && self.store.current().is_none() {
            return Err(no_project());
        }
        self.ui.navigate(page);
        Ok(())
    }

    /// Clicking the active tab collapses the sidebar; any tab click while
    /// collapsed opens it again.
    pub fn show_sidebar_tab(&mut self, tab: SidebarTab) {
        if self.ui.sidebar_tab == tab || self.ui.sidebar_collapsed {
            self.ui.toggle_sidebar();
        }
        self.ui.sidebar_tab = tab;
    }

    // ========================================================================
    // Canvas
    // ========================================================================

    /// Persist a completed canvas gesture
    pub async fn apply(&mut self, commit: CanvasCommit) -> WorkspaceResult<()> {
        debug!(?commit, "applying canvas commit");
        match commit {
            CanvasCommit::Viewport(viewport) => self.save_viewport(viewport).await?,
            CanvasCommit::MoveModel { model_id, position } => {
                self.store
                    .update_model(model_id, &ModelUpdate::move_to(position))
                    .await?;
            }
            CanvasCommit::CreateModel(new_model) => {
                let created = self.store.create_model(&new_model).await?;
                self.selection.select_model(created.id);
            }
            CanvasCommit::AttachField { model_id, field_id } => {
                self.store
                    .attach_field(model_id, field_id, AttachmentConfig::default())
                    .await?;
            }
            CanvasCommit::SetCardinality {
                relationship_id,
                cardinality,
            } => {
                let update = RelationshipUpdate::cardinality(cardinality);
                self.store
                    .update_relationship(relationship_id, &update)
                    .await?;
            }
            CanvasCommit::OpenRelationshipDialog { source, target } => {
                self.show_relationship_dialog(Some(RelationshipForm::prefilled(source, target)));
            }
            CanvasCommit::Notice(text) => {
                warn!(notice = %text, "canvas input ignored");
                self.ui.set_status(text, StatusLevel::Info);
            }
        }
        Ok(())
    }

    async fn apply_opt(&mut self, commit: Option<CanvasCommit>) -> WorkspaceResult<()> {
        match commit {
            Some(commit) => self.apply(commit).await,
            None => Ok(()),
        }
    }

    /// Save the viewport, keeping the project's visual groups
    async fn save_viewport(&mut self, viewport: Viewport) -> WorkspaceResult<()> {
        let mut canvas_state = self.require_graph()?.project.canvas_state.clone();
        canvas_state.viewport = viewport;
        self.store.save_canvas_state(canvas_state).await?;
        Ok(())
    }

    pub async fn wheel(&mut self, delta_y: f64) -> WorkspaceResult<()> {
        let commit = self.canvas.wheel(delta_y);
        self.apply(commit).await
    }

    pub async fn zoom_in(&mut self) -> WorkspaceResult<()> {
        let commit = self.canvas.zoom_in();
        self.apply(commit).await
    }

    pub async fn zoom_out(&mut self) -> WorkspaceResult<()> {
        let commit = self.canvas.zoom_out();
        self.apply(commit).await
    }

    pub async fn reset_view(&mut self) -> WorkspaceResult<()> {
        let commit = self.canvas.reset_view();
        self.apply(commit).await
    }

    /// Press on the canvas. In connection mode a press on another block
    /// completes the connection; otherwise blocks are selected and dragged.
    pub async fn pointer_down(
        &mut self,
        event: PointerEvent,
        target: PointerTarget,
    ) -> WorkspaceResult<()> {
        let connecting = self.canvas.connecting_from().is_some();
        if let (true, PointerTarget::Block(model_id)) = (connecting, target) {
            let commit = self.canvas.finish_connection(model_id);
            return self.apply_opt(commit).await;
        }

        match target {
            PointerTarget::Block(model_id) if !event.starts_pan() => {
                self.selection.select_model(model_id)
            }
            PointerTarget::Canvas if event.button == PointerButton::Primary && !event.alt => {
                self.selection.clear()
            }
            _ => {}
        }

        let graph = self.store.current().ok_or_else(no_project)?;
        self.canvas.pointer_down(event, target, graph);
        Ok(())
    }

    pub fn pointer_move(&mut self, client: Position) {
        self.canvas.pointer_move(client);
    }

    pub async fn pointer_up(&mut self) -> WorkspaceResult<()> {
        let commit = self.canvas.pointer_up();
        self.apply_opt(commit).await
    }

    pub async fn pointer_leave(&mut self) -> WorkspaceResult<()> {
        let commit = self.canvas.pointer_leave();
        self.apply_opt(commit).await
    }

    pub async fn drop_payload(
        &mut self,
        payload: DropPayload,
        client: Position,
    ) -> WorkspaceResult<()> {
        let graph = self.store.current().ok_or_else(no_project)?;
        let commit = self.canvas.drop_payload(payload, client, graph);
        self.apply_opt(commit).await
    }

    /// Clicking a relationship label selects it and advances its cardinality
    pub async fn cycle_cardinality(&mut self, id: RelationshipId) -> WorkspaceResult<()> {
        let relationship = self
            .require_graph()?
            .relationship(id)
            .ok_or_else(|| EngineError::RelationshipNotFound(id.to_string()))?;
        let commit = self.canvas.cycle_cardinality(relationship);
        self.selection.select_relationship(id);
        self.apply(commit).await
    }

    /// Ask to delete whatever is selected on the canvas. Returns false when
    /// nothing is selected.
    pub fn request_delete_selection(&mut self) -> bool {
        let target = match (self.selection.relationship, self.selection.model) {
            (Some(id), _) => DeleteTarget::Relationship(id),
            (None, Some(id)) => DeleteTarget::Model(id),
            (None, None) => return false,
        };
        self.request_delete(target);
        true
    }

    pub fn start_connection(&mut self, source: ModelId) {
        self.canvas.start_connection(source);
        self.ui.set_status("Click another model to connect", StatusLevel::Info);
    }

    pub fn cancel_connection(&mut self) {
        self.canvas.cancel_connection();
        self.ui.clear_status();
    }

    async fn save_groups(&mut self, groups: Vec<VisualGroup>) -> WorkspaceResult<()> {
        let canvas_state = CanvasState {
            viewport: self.canvas.viewport,
            groups,
        };
        self.store.save_canvas_state(canvas_state).await?;
        Ok(())
    }

    pub async fn add_group(&mut self, group: VisualGroup) -> WorkspaceResult<()> {
        let mut groups = self.require_graph()?.project.canvas_state.groups.clone();
        groups.push(group);
        self.save_groups(groups).await
    }

    async fn remove_group(&mut self, id: GroupId) -> WorkspaceResult<()> {
        let mut groups = self.require_graph()?.project.canvas_state.groups.clone();
        groups.retain(|g| g.id != id);
        self.save_groups(groups).await
    }

    // ========================================================================
    // Library
    // ========================================================================

    pub fn show_new_library_model(&mut self) {
        self.ui
            .show_dialog(Dialog::NewLibraryModel(LibraryModelDraft::default()));
    }

    pub fn show_new_library_field(&mut self) {
        self.ui
            .show_dialog(Dialog::NewLibraryField(LibraryFieldDraft::default()));
    }

    pub async fn submit_library_model(&mut self) -> WorkspaceResult<DataModel> {
        let project_id = self.require_graph()?.project_id();
        let Some(Dialog::NewLibraryModel(draft)) = &self.ui.active_dialog else {
            return Err(dialog_not_open("New model"));
        };
        let new_model = draft.to_new_model(project_id)?;
        let model = self.store.create_model(&new_model).await?;
        self.ui.close_dialog();
        Ok(model)
    }

    pub async fn submit_library_field(&mut self) -> WorkspaceResult<DataField> {
        let project_id = self.require_graph()?.project_id();
        let Some(Dialog::NewLibraryField(draft)) = &self.ui.active_dialog else {
            return Err(dialog_not_open("New field"));
        };
        let new_field = draft.to_new_field(project_id)?;
        let field = self.store.create_field(&new_field).await?;
        self.ui.close_dialog();
        Ok(field)
    }

    // ========================================================================
    // Relationships
    // ========================================================================

    /// Open the relationship dialog. Returns false, leaving it closed, while
    /// the project has fewer than two models.
    pub fn show_relationship_dialog(&mut self, form: Option<RelationshipForm>) -> bool {
        let available = self.graph().is_some_and(RelationshipForm::is_available);
        if available {
            self.ui
                .show_dialog(Dialog::NewRelationship(form.unwrap_or_default()));
        }
        available
    }

    pub async fn submit_relationship(&mut self) -> WorkspaceResult<Relationship> {
        let Some(Dialog::NewRelationship(form)) = &self.ui.active_dialog else {
            return Err(dialog_not_open("Relationship"));
        };
        let request = form.request()?;
        let relationship = self
            .store
            .create_relationship(request.source, request.target, request.cardinality)
            .await?;
        self.ui.close_dialog();
        Ok(relationship)
    }

    // ========================================================================
    // Model editor
    // ========================================================================

    pub fn open_editor(&mut self, model_id: ModelId) {
        self.selection.select_model(model_id);
        self.editor = Some(ModelEditor::new(model_id));
        self.ui.show_dialog(Dialog::EditModel(model_id));
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
        if matches!(self.ui.active_dialog, Some(Dialog::EditModel(_))) {
            self.ui.close_dialog();
        }
    }

    fn editing(&self) -> WorkspaceResult<&ModelEditor> {
        self.editor
            .as_ref()
            .ok_or_else(|| EngineError::UiState("No model is being edited".to_string()).into())
    }

    pub async fn rename_model(
        &mut self,
        model_id: ModelId,
        name: &str,
    ) -> WorkspaceResult<DataModel> {
        Ok(self
            .store
            .update_model(model_id, &ModelUpdate::rename(name.trim()))
            .await?)
    }

    /// Create the draft field (never reusable) and attach it with the
    /// draft's flags
    pub async fn add_new_field(&mut self) -> WorkspaceResult<ModelField> {
        let project_id = self.require_graph()?.project_id();
        let editor = self.editing()?;
        let model_id = editor.model_id;
        let new_field = editor.field_draft.to_new_field(project_id)?;
        let config = editor.field_draft.config();

        let field = self.store.create_field(&new_field).await?;
        let attachment = self.store.attach_field(model_id, field.id, config).await?;
        if let Some(editor) = self.editor.as_mut() {
            editor.field_draft.reset();
        }
        Ok(attachment)
    }

    /// Attach the library field picked in the selector, unflagged
    pub async fn attach_existing_field(&mut self) -> WorkspaceResult<Option<ModelField>> {
        let Some(editor) = self.editor.as_mut() else {
            return Err(EngineError::UiState("No model is being edited".to_string()).into());
        };
        let model_id = editor.model_id;
        let Some(field_id) = editor.take_attach_choice() else {
            return Ok(None);
        };
        let attachment = self
            .store
            .attach_field(model_id, field_id, AttachmentConfig::default())
            .await?;
        Ok(Some(attachment))
    }

    fn attachment(&self, id: ModelFieldId) -> WorkspaceResult<&ModelField> {
        self.require_graph()?
            .attachment(id)
            .ok_or_else(|| EngineError::AttachmentNotFound(id.to_string()).into())
    }

    pub async fn toggle_required(&mut self, id: ModelFieldId) -> WorkspaceResult<()> {
        let current = self.attachment(id)?.is_required;
        self.store
            .update_model_field(id, &ModelFieldUpdate::required(!current))
            .await?;
        Ok(())
    }

    pub async fn toggle_unique(&mut self, id: ModelFieldId) -> WorkspaceResult<()> {
        let current = self.attachment(id)?.is_unique;
        self.store
            .update_model_field(id, &ModelFieldUpdate::unique(!current))
            .await?;
        Ok(())
    }

    /// Flip one CRUD flag of the edited model
    pub async fn toggle_action(&mut self, action: CrudAction) -> WorkspaceResult<()> {
        let model_id = self.editing()?.model_id;
        let actions = self
            .require_graph()?
            .model(model_id)
            .ok_or_else(|| EngineError::ModelNotFound(model_id.to_string()))?
            .crud_actions
            .toggled(action);
        self.store
            .update_model(model_id, &ModelUpdate::actions(actions))
            .await?;
        Ok(())
    }

    pub async fn add_policy(&mut self) -> WorkspaceResult<RlsPolicy> {
        let editor = self.editing()?;
        let new_policy = editor.policy_draft.to_new_policy(editor.model_id)?;
        let policy = self.store.create_policy(&new_policy).await?;
        if let Some(editor) = self.editor.as_mut() {
            editor.policy_draft.reset();
        }
        Ok(policy)
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Ask for confirmation before deleting
    pub fn request_delete(&mut self, target: DeleteTarget) {
        self.ui.show_dialog(Dialog::ConfirmDelete(target));
    }

    /// Carry out the delete awaiting confirmation. Does nothing when none is
    /// pending.
    pub async fn confirm_delete(&mut self) -> WorkspaceResult<Option<DeleteTarget>> {
        let Some(target) = self.ui.pending_delete() else {
            return Ok(None);
        };
        match target {
            DeleteTarget::Project(id) => self.store.delete_project(id).await?,
            DeleteTarget::Model(id) => self.store.delete_model(id).await?,
            DeleteTarget::Attachment(id) => self.store.detach_field(id).await?,
            DeleteTarget::Relationship(id) => self.store.delete_relationship(id).await?,
            DeleteTarget::Policy(id) => self.store.delete_policy(id).await?,
            DeleteTarget::Group(id) => self.remove_group(id).await?,
        }
        info!(?target, "deleted");

        self.ui.close_dialog();
        if self.store.current().is_none() {
            self.ui.navigate(Page::Projects);
        } else if let Some(editor) = &self.editor {
            self.ui.show_dialog(Dialog::EditModel(editor.model_id));
        }
        self.prune();
        Ok(Some(target))
    }

    /// Close the active dialog without acting on it
    pub fn cancel_dialog(&mut self) {
        if matches!(self.ui.active_dialog, Some(Dialog::EditModel(_))) {
            self.editor = None;
        }
        self.ui.close_dialog();
    }

    // ========================================================================
    // Export
    // ========================================================================

    pub fn export(&self) -> WorkspaceResult<Blueprint> {
        Ok(export_blueprint(self.graph())?)
    }

    /// Export the active project to `target`, a file or a directory
    pub async fn export_to(&mut self, target: &Path) -> WorkspaceResult<PathBuf> {
        let blueprint = self.export()?;
        let path = write_blueprint(&blueprint, target).await?;
        self.ui.set_status(
            format!("Exported {}", path.display()),
            StatusLevel::Success,
        );
        Ok(path)
    }
}

// ============================================================================
// Tests
// ============================================================================
