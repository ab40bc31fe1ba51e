//! # Blueprint CLI
//!
//! Command-line interface for Blueprint Studio.
//!
//! Manages projects, models, fields and relationships against a hosted data
//! service or a local snapshot file, and exports blueprints, without the
//! visual editor.
//!
//! ## Commands
//!
//! - `projects list|create|delete` - Manage projects
//! - `info` - Display a project's models and relationships
//! - `export` - Write a project's JSON blueprint
//! - `model add` - Add a model
//! - `field add` - Create a field and attach it to a model
//! - `relate` - Relate two models
//!

pub mod args;
pub mod commands;
pub mod config;
pub mod output;

pub use args::{Cli, Command, ConnectionArgs};
pub use commands::run;
pub use config::{Backend, ConfigError, StudioConfig};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");
