//! # Dialog Forms
//!
//! Form state behind the project and relationship dialogs.
//!
//! The relationship dialog lets users:
//! - Select source and target models (the target list never offers the source)
//! - Choose a cardinality (1:1, 1:M, M:M), defaulting to 1:M
//!
//! It is hidden entirely while the project has fewer than two models.

use blueprint_core::{Cardinality, EngineError, EngineResult, ModelId, require_name};
use blueprint_ir::{DataModel, ProjectGraph};

// ============================================================================
// Project Form
// ============================================================================

/// Form state for the new-project dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
}

impl ProjectForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validated, trimmed name and description
    pub fn request(&self) -> EngineResult<(String, String)> {
        require_name("Project", &self.name)?;
        Ok((
            self.name.trim().to_string(),
            self.description.trim().to_string(),
        ))
    }

    /// Like [`request`](Self::request), clearing the form on success
    pub fn submit(&mut self) -> EngineResult<(String, String)> {
        let values = self.request()?;
        *self = Self::default();
        Ok(values)
    }
}

// ============================================================================
// Relationship Form
// ============================================================================

/// A validated relationship ready to be created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipRequest {
    pub source: ModelId,
    pub target: ModelId,
    pub cardinality: Cardinality,
}

/// Form state for the relationship dialog
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipForm {
    pub source: Option<ModelId>,
    pub target: Option<ModelId>,
    pub cardinality: Cardinality,
}

impl Default for RelationshipForm {
    fn default() -> Self {
        Self {
            source: None,
            target: None,
            cardinality: Cardinality::OneToMany,
        }
    }
}

impl RelationshipForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form opened from connection mode with both ends chosen
    pub fn prefilled(source: ModelId, target: ModelId) -> Self {
        Self {
            source: Some(source),
            target: Some(target),
            ..Self::default()
        }
    }

    /// Whether the dialog should be shown at all
    pub fn is_available(graph: &ProjectGraph) -> bool {
        graph.models.len() >= 2
    }

    pub fn source_options<'a>(&self, graph: &'a ProjectGraph) -> Vec<&'a DataModel> {
        graph.models.iter().collect()
    }

    /// Every model except the chosen source
    pub fn target_options<'a>(&self, graph: &'a ProjectGraph) -> Vec<&'a DataModel> {
        graph
            .models
            .iter()
            .filter(|m| Some(m.id) != self.source)
            .collect()
    }

    /// Choose the source. A target equal to the new source is cleared.
    pub fn set_source(&mut self, source: ModelId) {
        self.source = Some(source);
        if self.target == Some(source) {
            self.target = None;
        }
    }

    pub fn set_target(&mut self, target: ModelId) {
        self.target = Some(target);
    }

    pub fn set_cardinality(&mut self, cardinality: Cardinality) {
        self.cardinality = cardinality;
    }

    /// Validate the form state
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.source.is_none() {
            errors.push("Source model is required".to_string());
        }

        if self.target.is_none() {
            errors.push("Target model is required".to_string());
        }

        if self.source.is_some() && self.source == self.target {
            errors.push("Source and target models must be different".to_string());
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    pub fn request(&self) -> EngineResult<RelationshipRequest> {
        let errors = self.validate();
        match (self.source, self.target) {
            (Some(source), Some(target)) if errors.is_empty() => Ok(RelationshipRequest {
                source,
                target,
                cardinality: self.cardinality,
            }),
            _ => Err(EngineError::RelationshipValidation(errors.join("; "))),
        }
    }

    /// Validate, then reset the form to its defaults
    pub fn submit(&mut self) -> EngineResult<RelationshipRequest> {
        let request = self.request()?;
        *self = Self::default();
        Ok(request)
    }
}

// ============================================================================
// Tests
// ============================================================================
