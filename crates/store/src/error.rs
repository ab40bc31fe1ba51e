//! Error types for the project store and its data services

use crate::service::Collection;
use blueprint_core::EngineError;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while talking to the data service or mutating the graph
#[derive(Error, Debug)]
pub enum StoreError {
    /// The service answered with a non-success status
    #[error("Data service error: {status} {message}")]
    Service { status: u16, message: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// A row could not be decoded into its typed shape
    #[error("Failed to decode {collection} row: {message}")]
    Decode {
        collection: Collection,
        message: String,
    },

    #[error("No {collection} row with id {id}")]
    RowNotFound { collection: Collection, id: Uuid },

    /// An operation needs an active project
    #[error("No project loaded")]
    NoProjectLoaded,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl StoreError {
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    pub fn decode(collection: Collection, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            collection,
            message: err.to_string(),
        }
    }

    /// Client-side rejection (empty names and the like)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Engine(e) if e.is_validation())
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::RowNotFound { .. } => true,
            Self::Engine(e) => e.is_not_found(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::service(409, "duplicate key");
        assert_eq!(err.to_string(), "Data service error: 409 duplicate key");

        let err = StoreError::RowNotFound {
            collection: Collection::DataModels,
            id: Uuid::nil(),
        };
        assert!(err.to_string().starts_with("No data_models row"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_passthrough() {
        let err: StoreError = EngineError::empty_name("Model").into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Model name cannot be empty");
    }
}
