//! # Blueprint IR
//!
//! The data model of a Blueprint Studio project. Every type here mirrors one
//! row shape of the external data service, plus `ProjectGraph`, which holds
//! one project's whole subgraph in memory.
//!
//! ## Core Concepts
//!
//! - **DataModel**: a named entity block on the canvas with CRUD flags
//! - **DataField**: a typed attribute, optionally reusable across models
//! - **ModelField**: the attachment of a field to a model, with its own flags and rules
//! - **Relationship**: a directed, cardinality-typed link between two models
//! - **RlsPolicy**: a descriptive row-level-security note for one operation
//! - **ModelNesting**: an ordered "parent embeds child" link
//! - **ProjectGraph**: the root container the canvas and exporter read from
//!

pub mod field;
pub mod model;
pub mod nesting;
pub mod policy;
pub mod project;
pub mod relationship;

pub use field::{
    AttachmentConfig, BusinessRule, DataField, FieldUpdate, ModelField, ModelFieldUpdate,
    NewField, NewModelField, RuleKind, RuleValue,
};
pub use model::{CrudActions, DataModel, LIBRARY_MODEL_POSITION, ModelUpdate, NewModel};
pub use nesting::{ModelNesting, NewNesting};
pub use policy::{NewPolicy, PolicyCondition, PolicyUpdate, RlsPolicy};
pub use project::{CanvasState, NewProject, Project, ProjectGraph, ProjectUpdate, VisualGroup};
pub use relationship::{NewRelationship, Relationship, RelationshipUpdate};

// Re-export core types that are commonly used with IR
pub use blueprint_core::{
    Cardinality, CrudAction, DataType, EngineError, EngineResult, PolicyOperation, Position,
    Viewport,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        BusinessRule, Cardinality, CrudAction, CrudActions, DataField, DataModel, DataType,
        EngineError, EngineResult, ModelField, ModelNesting, PolicyOperation, Position, Project,
        ProjectGraph, Relationship, RlsPolicy, Viewport,
    };
}
