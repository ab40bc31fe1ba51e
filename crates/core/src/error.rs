//! Error types for Blueprint Studio
//!
//! `EngineError` covers the domain layers: blank input rejected before a
//! write, references that no longer resolve, snapshot file IO and editor
//! state misuse. Failures of the hosted data service live in the store crate,
//! which wraps this type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Input
    // ========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required name was left blank
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: &'static str },

    /// The relationship form was submitted incomplete
    #[error("Relationship validation failed: {0}")]
    RelationshipValidation(String),

    /// Unrecognized spelling of one of the closed enumerations
    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    // ========================================================================
    // Missing references
    // ========================================================================
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Field attachment not found: {0}")]
    AttachmentNotFound(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    #[error("Security policy not found: {0}")]
    PolicyNotFound(String),

    // ========================================================================
    // Snapshot files
    // ========================================================================
    #[error("Snapshot not found at path: {}", .0.display())]
    SnapshotNotFound(PathBuf),

    #[error("Failed to read file '{}': {message}", path.display())]
    FileRead { path: PathBuf, message: String },

    #[error("Failed to write file '{}': {message}", path.display())]
    FileWrite { path: PathBuf, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Editor
    // ========================================================================
    /// An editor action arrived in a state that cannot handle it
    #[error("UI state error: {0}")]
    UiState(String),

    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn empty_name(kind: &'static str) -> Self {
        EngineError::EmptyName { kind }
    }

    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        EngineError::UnknownVariant {
            kind,
            value: value.into(),
        }
    }

    /// Blank or incomplete input, caught before anything is written
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_)
                | EngineError::EmptyName { .. }
                | EngineError::RelationshipValidation(_)
                | EngineError::UnknownVariant { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::ProjectNotFound(_)
                | EngineError::ModelNotFound(_)
                | EngineError::FieldNotFound(_)
                | EngineError::AttachmentNotFound(_)
                | EngineError::RelationshipNotFound(_)
                | EngineError::PolicyNotFound(_)
                | EngineError::SnapshotNotFound(_)
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Prefix an error with what was being attempted
pub trait ResultExt<T> {
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T>;
}

impl<T, E: Into<EngineError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T> {
        self.map_err(|e| EngineError::WithContext {
            context: context.into(),
            message: e.into().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = EngineError::validation("Source model is required");
        assert!(err.is_validation());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Validation error: Source model is required");
    }

    #[test]
    fn test_empty_name_error() {
        let err = EngineError::empty_name("Model");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Model name cannot be empty");
    }

    #[test]
    fn test_not_found_errors() {
        let err = EngineError::ModelNotFound("Customer".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Model not found: Customer");

        let err = EngineError::SnapshotNotFound(PathBuf::from("studio.json"));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Snapshot not found at path: studio.json");
    }

    #[test]
    fn test_unknown_variant() {
        let err = EngineError::unknown_variant("cardinality", "N:1");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Unknown cardinality: 'N:1'");
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<(), EngineError> = Err(EngineError::FileWrite {
            path: PathBuf::from("studio.json"),
            message: "denied".to_string(),
        });
        let err = result.with_context("Saving snapshot").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Saving snapshot: Failed to write file 'studio.json': denied"
        );
    }
}
