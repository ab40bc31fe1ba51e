//! # Blueprint UI
//!
//! Headless editor state for Blueprint Studio.
//!
//! This crate holds everything a front end needs to drive the visual schema
//! editor without tying it to a rendering toolkit: input goes in as pointer,
//! wheel and drop events, and rendering reads the active `ProjectGraph` plus
//! the state containers here.
//!
//! ## Features
//!
//! - Infinite canvas with pan, zoom, block dragging and drop-to-place
//! - Relationship connectors with click-to-cycle cardinality
//! - Model editor with Fields, Actions and Security tabs
//! - Confirmation before every destructive action
//! - Blueprint export of the active project
//!

// ============================================================================
// Modules
// ============================================================================

pub mod canvas;
pub mod dialogs;
pub mod editors;
pub mod state;
pub mod workspace;

// ============================================================================
// Re-exports
// ============================================================================

// Re-export internal crates for convenience
pub use blueprint_core;
pub use blueprint_ir;
pub use blueprint_store;

pub use canvas::{
    Bounds, CanvasCommit, CanvasSurface, DragState, DropPayload, PanState, PointerButton,
    PointerEvent, PointerTarget, RelationshipLine,
};
pub use dialogs::{ProjectForm, RelationshipForm, RelationshipRequest};
pub use editors::{
    EditorTab, FieldDraft, FieldRow, LibraryFieldDraft, LibraryModelDraft, ModelEditor,
    PolicyDraft,
};
pub use state::{
    DeleteTarget, Dialog, Page, Selection, SidebarTab, StatusLevel, StatusMessage, UiState,
};
pub use workspace::{Workspace, WorkspaceError, WorkspaceResult};

// ============================================================================
// Constants
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
