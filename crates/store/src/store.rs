//! The project store
//!
//! `ProjectStore` owns the active `ProjectGraph` and is the only path through
//! which the canvas, the editors and the command line mutate anything. Every
//! mutation is one service write followed by a full reload of the active
//! project; the new graph replaces the old one in a single assignment, so a
//! failed write or reload leaves the previous graph in place.

use crate::error::{StoreError, StoreResult};
use crate::service::{Collection, DataService, Query, create, fetch, fetch_one, patch};
use blueprint_core::{
    Cardinality, EngineError, FieldId, ModelFieldId, ModelId, NestingId, PolicyId,
    ProjectId, RelationshipId, UserId, Validatable,
};
use blueprint_ir::{
    AttachmentConfig, CanvasState, DataField, DataModel, FieldUpdate, ModelField,
    ModelFieldUpdate, ModelNesting, ModelUpdate, NewField, NewModel, NewModelField, NewNesting,
    NewPolicy, NewProject, NewRelationship, PolicyUpdate, Project, ProjectGraph, ProjectUpdate,
    Relationship, RelationshipUpdate, RlsPolicy,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared handle to a data service
pub type SharedService = Arc<dyn DataService>;

#[derive(Debug, Deserialize)]
struct OrderIndexRow {
    order_index: i64,
}

/// Owner of the active project graph
pub struct ProjectStore {
    service: SharedService,
    owner: UserId,
    projects: Vec<Project>,
    graph: Option<ProjectGraph>,
}

impl std::fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStore")
            .field("owner", &self.owner)
            .field("projects", &self.projects.len())
            .field("active", &self.current_project_id())
            .finish()
    }
}

impl ProjectStore {
    /// Create a store acting on behalf of `owner`
    pub fn new(service: SharedService, owner: UserId) -> Self {
        Self {
            service,
            owner,
            projects: Vec::new(),
            graph: None,
        }
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn service(&self) -> &dyn DataService {
        self.service.as_ref()
    }

    /// The active project graph, if one is loaded
    pub fn current(&self) -> Option<&ProjectGraph> {
        self.graph.as_ref()
    }

    pub fn current_project_id(&self) -> Option<ProjectId> {
        self.graph.as_ref().map(ProjectGraph::project_id)
    }

    /// Projects as of the last listing
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    fn require_current(&self) -> StoreResult<&ProjectGraph> {
        self.graph.as_ref().ok_or(StoreError::NoProjectLoaded)
    }

    fn active_id(&self) -> StoreResult<ProjectId> {
        self.require_current().map(ProjectGraph::project_id)
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// List the owner's projects, most recently updated first
    #[tracing::instrument(skip(self), fields(owner = %self.owner))]
    pub async fn list_projects(&mut self) -> StoreResult<&[Project]> {
        let query = Query::new()
            .eq("user_id", self.owner)
            .order_by("updated_at", false);
        self.projects = fetch(self.service(), Collection::Projects, &query).await?;
        debug!(count = self.projects.len(), "listed projects");
        Ok(&self.projects)
    }

    pub async fn create_project(
        &mut self,
        name: &str,
        description: &str,
    ) -> StoreResult<Project> {
        let payload = NewProject::new(self.owner, name.trim(), description);
        payload.validate()?;
        let project: Project = create(self.service(), Collection::Projects, &payload).await?;
        info!(project = %project.id, name = %project.name, "created project");
        self.list_projects().await?;
        Ok(project)
    }

    pub async fn update_project(
        &mut self,
        id: ProjectId,
        update: &ProjectUpdate,
    ) -> StoreResult<Project> {
        update.validate()?;
        let project: Project = patch(self.service(), Collection::Projects, id, update).await?;
        self.list_projects().await?;
        if self.current_project_id() == Some(id) {
            self.load_project(id).await?;
        }
        Ok(project)
    }

    /// Delete a project and everything in it. Deleting the active project
    /// closes it.
    pub async fn delete_project(&mut self, id: ProjectId) -> StoreResult<()> {
        self.service.delete(Collection::Projects, id).await?;
        info!(project = %id, "deleted project");
        if self.current_project_id() == Some(id) {
            self.graph = None;
        }
        self.list_projects().await?;
        Ok(())
    }

    /// Persist the canvas viewport and visual groups of the active project
    pub async fn save_canvas_state(&mut self, canvas_state: CanvasState) -> StoreResult<()> {
        let id = self.active_id()?;
        let _: Project = patch(
            self.service(),
            Collection::Projects,
            id,
            &ProjectUpdate::canvas(canvas_state),
        )
        .await?;
        self.refresh().await
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Fetch a project's full subgraph without touching the active graph
    #[tracing::instrument(skip(self))]
    pub async fn fetch_graph(&self, id: ProjectId) -> StoreResult<ProjectGraph> {
        let service = self.service();
        let project: Project = fetch_one(service, Collection::Projects, id)
            .await
            .map_err(|e| match e {
                StoreError::RowNotFound { .. } => {
                    StoreError::Engine(EngineError::ProjectNotFound(id.to_string()))
                }
                other => other,
            })?;

        let by_project = Query::new()
            .eq("project_id", id)
            .order_by("created_at", true);
        let models: Vec<DataModel> = fetch(service, Collection::DataModels, &by_project).await?;
        let fields: Vec<DataField> = fetch(service, Collection::DataFields, &by_project).await?;
        let relationships: Vec<Relationship> =
            fetch(service, Collection::Relationships, &by_project).await?;

        let mut graph = ProjectGraph::new(project);
        graph.models = models;
        graph.fields = fields;
        graph.relationships = relationships;

        let model_ids: Vec<ModelId> = graph.models.iter().map(|m| m.id).collect();
        if !model_ids.is_empty() {
            graph.model_fields = fetch(
                service,
                Collection::ModelFields,
                &Query::new()
                    .in_list("model_id", &model_ids)
                    .order_by("order_index", true),
            )
            .await?;
            graph.policies = fetch(
                service,
                Collection::RlsPolicies,
                &Query::new()
                    .in_list("model_id", &model_ids)
                    .order_by("created_at", true),
            )
            .await?;
            graph.nestings = fetch(
                service,
                Collection::ModelNesting,
                &Query::new()
                    .in_list("parent_model_id", &model_ids)
                    .order_by("order_index", true),
            )
            .await?;
        }

        self.resolve_joins(&mut graph).await?;
        Ok(graph)
    }

    /// Attach the field row to every attachment and the child model row to
    /// every nesting, fetching rows that live outside the project's lists.
    async fn resolve_joins(&self, graph: &mut ProjectGraph) -> StoreResult<()> {
        let known: HashSet<FieldId> = graph.fields.iter().map(|f| f.id).collect();
        let missing: Vec<FieldId> = graph
            .model_fields
            .iter()
            .map(|mf| mf.field_id)
            .filter(|id| !known.contains(id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let extra: Vec<DataField> = if missing.is_empty() {
            Vec::new()
        } else {
            fetch(
                self.service(),
                Collection::DataFields,
                &Query::new().in_list("id", &missing),
            )
            .await?
        };
        for attachment in &mut graph.model_fields {
            attachment.field = graph
                .fields
                .iter()
                .chain(&extra)
                .find(|f| f.id == attachment.field_id)
                .cloned();
            if attachment.field.is_none() {
                warn!(attachment = %attachment.id, field = %attachment.field_id, "attachment references a missing field");
            }
        }

        let known: HashSet<ModelId> = graph.models.iter().map(|m| m.id).collect();
        let missing: Vec<ModelId> = graph
            .nestings
            .iter()
            .map(|n| n.child_model_id)
            .filter(|id| !known.contains(id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let extra: Vec<DataModel> = if missing.is_empty() {
            Vec::new()
        } else {
            fetch(
                self.service(),
                Collection::DataModels,
                &Query::new().in_list("id", &missing),
            )
            .await?
        };
        for nesting in &mut graph.nestings {
            nesting.child_model = graph
                .models
                .iter()
                .chain(&extra)
                .find(|m| m.id == nesting.child_model_id)
                .cloned();
        }
        Ok(())
    }

    /// Make a project active, replacing the current graph
    pub async fn load_project(&mut self, id: ProjectId) -> StoreResult<&ProjectGraph> {
        let graph = self.fetch_graph(id).await?;
        debug!(
            project = %id,
            models = graph.models.len(),
            fields = graph.fields.len(),
            relationships = graph.relationships.len(),
            "loaded project"
        );
        Ok(&*self.graph.insert(graph))
    }

    /// Reload the active project
    pub async fn refresh(&mut self) -> StoreResult<()> {
        let id = self.active_id()?;
        self.load_project(id).await?;
        Ok(())
    }

    pub fn close_project(&mut self) {
        self.graph = None;
    }

    // ========================================================================
    // Models
    // ========================================================================

    /// Create a model in the active project
    pub async fn create_model(&mut self, model: &NewModel) -> StoreResult<DataModel> {
        let payload = NewModel {
            project_id: self.active_id()?,
            ..model.clone()
        };
        payload.validate()?;
        let created: DataModel = create(self.service(), Collection::DataModels, &payload).await?;
        info!(model = %created.id, name = %created.name, "created model");
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update_model(
        &mut self,
        id: ModelId,
        update: &ModelUpdate,
    ) -> StoreResult<DataModel> {
        self.active_id()?;
        update.validate()?;
        let updated: DataModel = patch(self.service(), Collection::DataModels, id, update).await?;
        self.refresh().await?;
        Ok(updated)
    }

    /// Delete a model. Its attachments, relationships, policies and nestings
    /// go with it; library fields stay.
    pub async fn delete_model(&mut self, id: ModelId) -> StoreResult<()> {
        self.active_id()?;
        self.service.delete(Collection::DataModels, id).await?;
        info!(model = %id, "deleted model");
        self.refresh().await
    }

    // ========================================================================
    // Fields
    // ========================================================================

    pub async fn create_field(&mut self, field: &NewField) -> StoreResult<DataField> {
        let payload = NewField {
            project_id: self.active_id()?,
            ..field.clone()
        };
        payload.validate()?;
        let created: DataField = create(self.service(), Collection::DataFields, &payload).await?;
        info!(field = %created.id, name = %created.name, reusable = created.is_reusable, "created field");
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update_field(
        &mut self,
        id: FieldId,
        update: &FieldUpdate,
    ) -> StoreResult<DataField> {
        self.active_id()?;
        update.validate()?;
        let updated: DataField = patch(self.service(), Collection::DataFields, id, update).await?;
        self.refresh().await?;
        Ok(updated)
    }

    /// Delete a field and every attachment of it
    pub async fn delete_field(&mut self, id: FieldId) -> StoreResult<()> {
        self.active_id()?;
        self.service.delete(Collection::DataFields, id).await?;
        self.refresh().await
    }

    /// Attach a field to a model at the end of its field list
    pub async fn attach_field(
        &mut self,
        model_id: ModelId,
        field_id: FieldId,
        config: AttachmentConfig,
    ) -> StoreResult<ModelField> {
        self.active_id()?;
        let order_index = self
            .next_order_index(Collection::ModelFields, "model_id", model_id)
            .await?;
        let payload = NewModelField {
            model_id,
            field_id,
            order_index,
            config,
        };
        let created: ModelField =
            create(self.service(), Collection::ModelFields, &payload).await?;
        info!(model = %model_id, field = %field_id, order_index, "attached field");
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update_model_field(
        &mut self,
        id: ModelFieldId,
        update: &ModelFieldUpdate,
    ) -> StoreResult<ModelField> {
        self.active_id()?;
        let updated: ModelField =
            patch(self.service(), Collection::ModelFields, id, update).await?;
        self.refresh().await?;
        Ok(updated)
    }

    /// Remove an attachment. The field itself is kept.
    pub async fn detach_field(&mut self, id: ModelFieldId) -> StoreResult<()> {
        self.active_id()?;
        self.service.delete(Collection::ModelFields, id).await?;
        self.refresh().await
    }

    /// `max(order_index) + 1` among rows whose `column` equals `parent`, or 0
    async fn next_order_index(
        &self,
        collection: Collection,
        column: &str,
        parent: ModelId,
    ) -> StoreResult<i64> {
        let query = Query::new()
            .eq(column, parent)
            .order_by("order_index", false)
            .limit(1);
        let top: Vec<OrderIndexRow> = fetch(self.service(), collection, &query).await?;
        Ok(top.first().map_or(0, |row| row.order_index + 1))
    }

    // ========================================================================
    // Relationships
    // ========================================================================

    pub async fn create_relationship(
        &mut self,
        source_model_id: ModelId,
        target_model_id: ModelId,
        cardinality: Cardinality,
    ) -> StoreResult<Relationship> {
        let payload = NewRelationship {
            project_id: self.active_id()?,
            source_model_id,
            target_model_id,
            cardinality,
        };
        payload.validate()?;
        let created: Relationship =
            create(self.service(), Collection::Relationships, &payload).await?;
        info!(relationship = %created.id, cardinality = %cardinality, "created relationship");
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update_relationship(
        &mut self,
        id: RelationshipId,
        update: &RelationshipUpdate,
    ) -> StoreResult<Relationship> {
        self.active_id()?;
        let updated: Relationship =
            patch(self.service(), Collection::Relationships, id, update).await?;
        self.refresh().await?;
        Ok(updated)
    }

    pub async fn delete_relationship(&mut self, id: RelationshipId) -> StoreResult<()> {
        self.active_id()?;
        self.service.delete(Collection::Relationships, id).await?;
        self.refresh().await
    }

    // ========================================================================
    // Policies
    // ========================================================================

    pub async fn create_policy(&mut self, policy: &NewPolicy) -> StoreResult<RlsPolicy> {
        self.active_id()?;
        policy.validate()?;
        let created: RlsPolicy = create(self.service(), Collection::RlsPolicies, policy).await?;
        info!(policy = %created.id, operation = %created.operation, "created policy");
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update_policy(
        &mut self,
        id: PolicyId,
        update: &PolicyUpdate,
    ) -> StoreResult<RlsPolicy> {
        self.active_id()?;
        if let Some(description) = &update.rule_description {
            blueprint_core::require_name("Policy description", description)?;
        }
        let updated: RlsPolicy = patch(self.service(), Collection::RlsPolicies, id, update).await?;
        self.refresh().await?;
        Ok(updated)
    }

    pub async fn delete_policy(&mut self, id: PolicyId) -> StoreResult<()> {
        self.active_id()?;
        self.service.delete(Collection::RlsPolicies, id).await?;
        self.refresh().await
    }

    // ========================================================================
    // Nesting
    // ========================================================================

    /// Embed `child` in `parent` after its existing nested models
    pub async fn nest_model(
        &mut self,
        parent_model_id: ModelId,
        child_model_id: ModelId,
    ) -> StoreResult<ModelNesting> {
        self.active_id()?;
        if parent_model_id == child_model_id {
            return Err(EngineError::validation("A model cannot be nested in itself").into());
        }
        let order_index = self
            .next_order_index(Collection::ModelNesting, "parent_model_id", parent_model_id)
            .await?;
        let payload = NewNesting {
            parent_model_id,
            child_model_id,
            order_index,
        };
        let created: ModelNesting =
            create(self.service(), Collection::ModelNesting, &payload).await?;
        self.refresh().await?;
        Ok(created)
    }

    pub async fn unnest_model(&mut self, id: NestingId) -> StoreResult<()> {
        self.active_id()?;
        self.service.delete(Collection::ModelNesting, id).await?;
        self.refresh().await
    }
}

// ============================================================================
// Tests
// ============================================================================
