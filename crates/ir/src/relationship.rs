//! Relationship definitions between models
//!
//! A relationship is a directed, cardinality-typed link from a source model to
//! a target model. Source and target may be the same model (self-join).

use blueprint_core::{
    Cardinality, EngineError, EngineResult, Identifiable, ModelId, ProjectId, RelationshipId,
    Validatable,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Relationship
// ============================================================================

/// Represents a relationship between two models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier for this relationship
    pub id: RelationshipId,

    /// Owning project
    pub project_id: ProjectId,

    /// ID of the source model (the "from" side)
    pub source_model_id: ModelId,

    /// ID of the target model (the "to" side)
    pub target_model_id: ModelId,

    /// `1:1`, `1:M` or `M:M`
    pub cardinality: Cardinality,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    /// Create a new relationship between two models
    pub fn new(
        project_id: ProjectId,
        source_model_id: ModelId,
        target_model_id: ModelId,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            id: RelationshipId::new_v4(),
            project_id,
            source_model_id,
            target_model_id,
            cardinality,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Check if this relationship involves a specific model
    pub fn involves(&self, model_id: ModelId) -> bool {
        self.source_model_id == model_id || self.target_model_id == model_id
    }

    /// Check if source and target are the same model
    pub fn is_self_referential(&self) -> bool {
        self.source_model_id == self.target_model_id
    }
}

impl Identifiable for Relationship {
    fn id(&self) -> uuid::Uuid {
        self.id
    }
}

// ============================================================================
// Write Payloads
// ============================================================================

/// Insert payload for the `relationships` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRelationship {
    pub project_id: ProjectId,
    pub source_model_id: ModelId,
    pub target_model_id: ModelId,
    pub cardinality: Cardinality,
}

impl Validatable for NewRelationship {
    fn validate(&self) -> EngineResult<()> {
        if self.source_model_id.is_nil() || self.target_model_id.is_nil() {
            return Err(EngineError::RelationshipValidation(
                "source and target models are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update for a relationship
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelationshipUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_model_id: Option<ModelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_model_id: Option<ModelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
}

impl RelationshipUpdate {
    /// Change only the cardinality
    pub fn cardinality(cardinality: Cardinality) -> Self {
        Self {
            cardinality: Some(cardinality),
            ..Self::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
