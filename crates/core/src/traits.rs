//! Behaviour shared by the blueprint entities
//!
//! Draft validation before a write is issued, lookup by id or name, canvas
//! placement, and JSON snapshot files.

use crate::error::{EngineError, EngineResult};
use crate::types::Position;
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;
use uuid::Uuid;

// ============================================================================
// Validation
// ============================================================================

/// Drafts (new models, fields, policies, relationships) check themselves so
/// that blank input never reaches the data service.
///
/// ```rust,ignore
/// impl Validatable for NewModel {
///     fn validate(&self) -> EngineResult<()> {
///         require_name("Model", &self.name)
///     }
/// }
/// ```
pub trait Validatable {
    fn validate(&self) -> EngineResult<()>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Reject names that are empty or whitespace only
pub fn require_name(kind: &'static str, name: &str) -> EngineResult<()> {
    if name.trim().is_empty() {
        return Err(EngineError::empty_name(kind));
    }
    Ok(())
}

// ============================================================================
// Lookup
// ============================================================================

pub trait Identifiable {
    fn id(&self) -> Uuid;
}

pub trait Named {
    fn name(&self) -> &str;
}

pub fn find_by_id<T: Identifiable>(items: &[T], id: Uuid) -> Option<&T> {
    items.iter().find(|item| item.id() == id)
}

/// Every item whose name is exactly `name`. Names are not unique, so callers
/// decide what several matches mean.
pub fn find_by_name<'a, T: Named>(items: &'a [T], name: &str) -> Vec<&'a T> {
    items.iter().filter(|item| item.name() == name).collect()
}

// ============================================================================
// Canvas
// ============================================================================

/// Anything drawn as a block at a canvas position
pub trait Positioned {
    fn position(&self) -> Position;

    fn set_position(&mut self, position: Position);
}

// ============================================================================
// Snapshot files
// ============================================================================

/// JSON round trip to disk, used for snapshot files of the in-process data
/// service.
pub trait Persistable: Serialize + DeserializeOwned + Sized {
    fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fails with `SnapshotNotFound` when nothing exists at `path`
    fn load_from_file(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            return Err(EngineError::SnapshotNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}
