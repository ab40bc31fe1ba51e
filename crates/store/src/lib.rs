//! # Blueprint Store
//!
//! Persistence for Blueprint Studio. The [`ProjectStore`] owns the active
//! [`ProjectGraph`](blueprint_ir::ProjectGraph) and mutates it through a
//! [`DataService`]: either the hosted HTTP API ([`RestService`]) or the
//! in-process [`MemoryService`], optionally mirrored to a snapshot file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use blueprint_store::{MemoryService, ProjectStore};
//! use std::sync::Arc;
//!
//! # async fn demo() -> blueprint_store::StoreResult<()> {
//! let mut store = ProjectStore::new(Arc::new(MemoryService::new()), uuid::Uuid::new_v4());
//! let project = store.create_project("Shop", "Online shop").await?;
//! store.load_project(project.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod rest;
pub mod service;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryService, MemoryTables};
pub use rest::RestService;
pub use service::{Collection, DataService, Filter, Order, Query};
pub use store::{ProjectStore, SharedService};
