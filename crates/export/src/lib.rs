//! # Blueprint Export
//!
//! Turns a project graph into the JSON blueprint document consumed by
//! downstream code generators.
//!
//! ## Features
//!
//! - **Blueprint transform**: models with ordered fields, nested models, CRUD
//!   actions and security notes, plus one flat relationship list
//! - **Late name resolution**: every name is looked up at export time
//! - **File output**: pretty-printed JSON written to `{project}-blueprint.json`
//!

// ============================================================================
// Modules
// ============================================================================

pub mod blueprint;
pub mod exporter;

// ============================================================================
// Re-exports
// ============================================================================

pub use blueprint::{
    BLUEPRINT_VERSION, Blueprint, BlueprintMeta, ExportField, ExportModel, ExportNestedModel,
    ExportPolicy, ExportRelationship, UNKNOWN_NAME,
};
pub use exporter::{export_at, export_blueprint};

use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No project selected")]
    NoProjectSelected,

    #[error("Failed to serialize blueprint: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write blueprint to '{path}': {message}")]
    Write { path: PathBuf, message: String },
}

pub type ExportResult<T> = Result<T, ExportError>;

// ============================================================================
// File output
// ============================================================================

/// Download name for a project's blueprint
pub fn default_file_name(project_name: &str) -> String {
    let name = project_name.trim();
    let name = if name.is_empty() { "project" } else { name };
    format!("{name}-blueprint.json")
}

/// Write a blueprint as pretty JSON. A directory target receives the default
/// file name. Returns the path written.
pub async fn write_blueprint(blueprint: &Blueprint, target: &Path) -> ExportResult<PathBuf> {
    let path = if target.is_dir() {
        target.join(default_file_name(&blueprint.meta.project_name))
    } else {
        target.to_path_buf()
    };

    let json = blueprint.to_json_pretty()?;
    tokio::fs::write(&path, json.as_bytes())
        .await
        .map_err(|e| ExportError::Write {
            path: path.clone(),
            message: e.to_string(),
        })?;

    tracing::info!(
        path = %path.display(),
        models = blueprint.models.len(),
        bytes = json.len(),
        "blueprint written",
    );
    Ok(path)
}

// ============================================================================
// ExportSummary
// ============================================================================

/// A human-readable summary of an export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub project_name: String,
    pub models: usize,
    pub fields: usize,
    pub relationships: usize,
    pub policies: usize,
    pub total_bytes: usize,
}

impl ExportSummary {
    pub fn new(blueprint: &Blueprint, total_bytes: usize) -> Self {
        Self {
            project_name: blueprint.meta.project_name.clone(),
            models: blueprint.models.len(),
            fields: blueprint.models.iter().map(|m| m.fields.len()).sum(),
            relationships: blueprint.relationships.len(),
            policies: blueprint
                .models
                .iter()
                .map(|m| m.security_policies.len())
                .sum(),
            total_bytes,
        }
    }

    /// Format the summary as a boxed report
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(512);

        out.push_str("╔══════════════════════════════════════════════════╗\n");
        out.push_str("║         Blueprint Export Complete                ║\n");
        out.push_str("╠══════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║  Project:       {:<33}║\n", self.project_name));
        out.push_str(&format!("║  Models:        {:<33}║\n", self.models));
        out.push_str(&format!("║  Fields:        {:<33}║\n", self.fields));
        out.push_str(&format!("║  Relationships: {:<33}║\n", self.relationships));
        out.push_str(&format!("║  Policies:      {:<33}║\n", self.policies));

        let size_str = if self.total_bytes < 1024 {
            format!("{} B", self.total_bytes)
        } else {
            format!("{:.1} KB", self.total_bytes as f64 / 1024.0)
        };
        out.push_str(&format!("║  Size:          {:<33}║\n", size_str));
        out.push_str("╚══════════════════════════════════════════════════╝\n");

        out
    }
}

impl std::fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_ir::{Project, ProjectGraph};
    use pretty_assertions::assert_eq;

    fn shop() -> Blueprint {
        let graph = ProjectGraph::new(Project::new(uuid::Uuid::new_v4(), "Shop"));
        export_blueprint(Some(&graph)).unwrap()
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(default_file_name("Shop"), "Shop-blueprint.json");
        assert_eq!(default_file_name(""), "project-blueprint.json");
    }

    #[test]
    fn test_pretty_json_uses_two_space_indent() {
        let json = shop().to_json_pretty().unwrap();
        assert!(json.starts_with("{\n  \"meta\": {\n    \"version\": \"1.0.0\""));
    }

    #[tokio::test]
    async fn test_write_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blueprint = shop();

        let path = write_blueprint(&blueprint, dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("Shop-blueprint.json"));

        let written: Blueprint =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, blueprint);
    }

    #[test]
    fn test_summary_display() {
        let summary = ExportSummary::new(&shop(), 2048);
        let text = summary.to_string();
        assert!(text.contains("Shop"));
        assert!(text.contains("2.0 KB"));
    }
}
