//! # Blueprint Core
//!
//! Core types, traits, and error handling for Blueprint Studio.
//!
//! This crate provides the foundational building blocks shared by every other
//! crate in the workspace:
//!
//! - **Types**: identifiers, canvas geometry (Position, Viewport), and the
//!   closed enumerations of the blueprint format (DataType, Cardinality,
//!   PolicyOperation, CrudAction)
//! - **Traits**: `Validatable`, `Identifiable`, `Named`, `Positioned`, `Persistable`
//! - **Errors**: Unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult, ResultExt};
pub use traits::{
    Identifiable, Named, Persistable, Positioned, Validatable, find_by_id, find_by_name,
    require_name,
};
pub use types::{
    Cardinality, CrudAction, DataType, FieldId, GroupId, ModelFieldId, ModelId,
    MAX_ZOOM, MIN_ZOOM, NestingId, PolicyId, PolicyOperation, Position, ProjectId,
    RelationshipId, UserId, Viewport, clamp_zoom,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
