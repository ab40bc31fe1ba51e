//! # Model Editor
//!
//! Headless state for the model editor panel and the library sidebar forms.
//!
//! The editor has three tabs sharing one selected model:
//! - **Fields**: attached fields in order, required/unique toggles, an
//!   expandable business-rule view, new-field and attach-existing forms
//! - **Actions**: the four CRUD toggles
//! - **Security**: row-level-security notes grouped by operation
//!
//! Drafts only validate and build write payloads; the workspace sends them
//! through the store.

use blueprint_core::{
    DataType, EngineResult, FieldId, ModelFieldId, ModelId, PolicyOperation, ProjectId,
    Validatable, require_name,
};
use blueprint_ir::{
    AttachmentConfig, BusinessRule, DataField, DataModel, ModelField, NewField, NewModel,
    NewPolicy, ProjectGraph, RlsPolicy,
};

// ============================================================================
// Tabs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorTab {
    #[default]
    Fields,
    Actions,
    Security,
}

impl EditorTab {
    pub const ALL: [EditorTab; 3] = [EditorTab::Fields, EditorTab::Actions, EditorTab::Security];

    pub fn label(&self) -> &'static str {
        match self {
            EditorTab::Fields => "Fields",
            EditorTab::Actions => "Actions",
            EditorTab::Security => "Security",
        }
    }
}

// ============================================================================
// Drafts
// ============================================================================

/// New one-off field for the selected model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDraft {
    pub name: String,
    pub data_type: DataType,
    pub is_required: bool,
    pub is_unique: bool,
}

impl FieldDraft {
    /// The field row to create; never offered in the library
    pub fn to_new_field(&self, project_id: ProjectId) -> EngineResult<NewField> {
        let field = NewField::private(project_id, self.name.trim(), self.data_type);
        field.validate()?;
        Ok(field)
    }

    /// Attachment settings taken from the draft's checkboxes
    pub fn config(&self) -> AttachmentConfig {
        AttachmentConfig::flags(self.is_required, self.is_unique)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// New reusable field from the library sidebar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryFieldDraft {
    pub name: String,
    pub data_type: DataType,
}

impl LibraryFieldDraft {
    pub fn to_new_field(&self, project_id: ProjectId) -> EngineResult<NewField> {
        let field = NewField::reusable(project_id, self.name.trim(), self.data_type);
        field.validate()?;
        Ok(field)
    }
}

/// New library model from the sidebar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryModelDraft {
    pub name: String,
}

impl LibraryModelDraft {
    /// Placed at the library default position with every action enabled
    pub fn to_new_model(&self, project_id: ProjectId) -> EngineResult<NewModel> {
        let model = NewModel::library(project_id, self.name.trim());
        model.validate()?;
        Ok(model)
    }
}

/// New security note for the selected model
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDraft {
    pub operation: PolicyOperation,
    pub description: String,
}

impl Default for PolicyDraft {
    fn default() -> Self {
        Self {
            operation: PolicyOperation::Read,
            description: String::new(),
        }
    }
}

impl PolicyDraft {
    pub fn to_new_policy(&self, model_id: ModelId) -> EngineResult<NewPolicy> {
        require_name("Policy description", &self.description)?;
        Ok(NewPolicy::described(
            model_id,
            self.operation,
            self.description.trim(),
        ))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Field rows
// ============================================================================

/// One attached field as the Fields tab shows it
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow<'a> {
    pub attachment: &'a ModelField,
    /// `None` when the underlying field no longer resolves
    pub field: Option<&'a DataField>,
    pub expanded: bool,
}

impl FieldRow<'_> {
    pub fn name(&self) -> &str {
        self.field.map_or("Unknown", |f| f.name.as_str())
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.field.map(|f| f.data_type)
    }

    /// Business rules, shown only while the row is expanded
    pub fn visible_rules(&self) -> &[BusinessRule] {
        if self.expanded {
            &self.attachment.business_rules
        } else {
            &[]
        }
    }
}

// ============================================================================
// ModelEditor
// ============================================================================

/// Editor panel state for one model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEditor {
    pub model_id: ModelId,
    pub tab: EditorTab,
    expanded: Option<ModelFieldId>,
    pub field_draft: FieldDraft,
    pub policy_draft: PolicyDraft,
    /// Library field picked in the attach-existing selector
    pub attach_choice: Option<FieldId>,
}

impl ModelEditor {
    pub fn new(model_id: ModelId) -> Self {
        Self {
            model_id,
            tab: EditorTab::default(),
            expanded: None,
            field_draft: FieldDraft::default(),
            policy_draft: PolicyDraft::default(),
            attach_choice: None,
        }
    }

    pub fn select_tab(&mut self, tab: EditorTab) {
        self.tab = tab;
    }

    pub fn model<'a>(&self, graph: &'a ProjectGraph) -> Option<&'a DataModel> {
        graph.model(self.model_id)
    }

    /// Expand an attachment's rules, or collapse it if already expanded.
    /// Only one attachment is expanded at a time.
    pub fn toggle_expanded(&mut self, id: ModelFieldId) {
        self.expanded = if self.expanded == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    pub fn is_expanded(&self, id: ModelFieldId) -> bool {
        self.expanded == Some(id)
    }

    /// Attached fields in display order
    pub fn field_rows<'a>(&self, graph: &'a ProjectGraph) -> Vec<FieldRow<'a>> {
        graph
            .attachments_for_model(self.model_id)
            .into_iter()
            .map(|attachment| FieldRow {
                attachment,
                field: graph.field_for(attachment),
                expanded: self.is_expanded(attachment.id),
            })
            .collect()
    }

    /// Library fields offered in the attach-existing selector
    pub fn available_fields<'a>(&self, graph: &'a ProjectGraph) -> Vec<&'a DataField> {
        graph.reusable_fields()
    }

    /// Policies grouped CREATE, READ, UPDATE, DELETE
    pub fn policy_groups<'a>(
        &self,
        graph: &'a ProjectGraph,
    ) -> Vec<(PolicyOperation, Vec<&'a RlsPolicy>)> {
        graph.policies_by_operation(self.model_id)
    }

    /// Take the attach-existing choice, leaving the selector empty
    pub fn take_attach_choice(&mut self) -> Option<FieldId> {
        self.attach_choice.take()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_ir::{CrudActions, LIBRARY_MODEL_POSITION, Project, RuleKind};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn graph_with_model() -> (ProjectGraph, ModelId) {
        let mut graph = ProjectGraph::new(Project::new(Uuid::new_v4(), "Shop"));
        let model = DataModel::new(graph.project_id(), "Customer");
        let id = model.id;
        graph.models.push(model);
        (graph, id)
    }

    #[test]
    fn test_field_draft_creates_private_field() {
        let project_id = Uuid::new_v4();
        let draft = FieldDraft {
            name: " email ".to_string(),
            data_type: DataType::Email,
            is_required: true,
            is_unique: true,
        };

        let field = draft.to_new_field(project_id).unwrap();
        assert_eq!(field.name, "email");
        assert!(!field.is_reusable);
        assert_eq!(draft.config(), AttachmentConfig::flags(true, true));
    }

    #[test]
    fn test_empty_names_blocked() {
        let project_id = Uuid::new_v4();
        assert!(FieldDraft::default().to_new_field(project_id).is_err());
        assert!(LibraryFieldDraft::default().to_new_field(project_id).is_err());
        assert!(LibraryModelDraft::default().to_new_model(project_id).is_err());
        assert!(PolicyDraft::default().to_new_policy(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_library_drafts() {
        let project_id = Uuid::new_v4();
        let field = LibraryFieldDraft {
            name: "created_at".to_string(),
            data_type: DataType::Datetime,
        }
        .to_new_field(project_id)
        .unwrap();
        assert!(field.is_reusable);

        let model = LibraryModelDraft {
            name: "Invoice".to_string(),
        }
        .to_new_model(project_id)
        .unwrap();
        assert_eq!(model.canvas_position, LIBRARY_MODEL_POSITION);
        assert_eq!(model.crud_actions, CrudActions::all());
    }

    #[test]
    fn test_policy_draft_defaults_to_read() {
        let model_id = Uuid::new_v4();
        let mut draft = PolicyDraft::default();
        assert_eq!(draft.operation, PolicyOperation::Read);

        draft.description = "Owners can read their rows".to_string();
        let policy = draft.to_new_policy(model_id).unwrap();
        assert_eq!(policy.operation, PolicyOperation::Read);
        assert!(policy.condition.is_empty());

        draft.reset();
        assert!(draft.description.is_empty());
    }

    #[test]
    fn test_field_rows_and_expansion() {
        let (mut graph, model_id) = graph_with_model();
        let email = DataField::new(graph.project_id(), "email", DataType::Email);
        let attachment = ModelField::new(model_id, email.id, 0)
            .with_rule(BusinessRule::new(RuleKind::Pattern, ".+@.+"));
        let attachment_id = attachment.id;
        graph.model_fields = vec![
            ModelField::new(model_id, Uuid::new_v4(), 1),
            attachment,
        ];
        graph.fields.push(email);

        let mut editor = ModelEditor::new(model_id);
        let rows = editor.field_rows(&graph);
        assert_eq!(rows[0].name(), "email");
        assert_eq!(rows[1].name(), "Unknown");
        assert_eq!(rows[1].data_type(), None);
        assert!(rows[0].visible_rules().is_empty());

        editor.toggle_expanded(attachment_id);
        assert_eq!(editor.field_rows(&graph)[0].visible_rules().len(), 1);

        editor.toggle_expanded(attachment_id);
        assert!(!editor.is_expanded(attachment_id));
    }

    #[test]
    fn test_available_fields_are_reusable_only() {
        let (mut graph, model_id) = graph_with_model();
        let project_id = graph.project_id();
        graph.fields = vec![
            DataField::new(project_id, "email", DataType::Email).reusable(),
            DataField::new(project_id, "nickname", DataType::Text),
        ];

        let editor = ModelEditor::new(model_id);
        let names: Vec<&str> = editor
            .available_fields(&graph)
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["email"]);
    }

    #[test]
    fn test_policy_groups_in_fixed_order() {
        let (mut graph, model_id) = graph_with_model();
        graph.policies = vec![
            RlsPolicy::new(model_id, PolicyOperation::Delete, "Admins only"),
            RlsPolicy::new(model_id, PolicyOperation::Create, "Signed-in users"),
        ];

        let groups = ModelEditor::new(model_id).policy_groups(&graph);
        let ops: Vec<PolicyOperation> = groups.iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, PolicyOperation::ALL.to_vec());
        assert_eq!(groups[0].1.len(), 1);
        assert!(groups[1].1.is_empty());
        assert_eq!(groups[3].1[0].rule_description, "Admins only");
    }
}
