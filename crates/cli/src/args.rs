//! Command-line arguments

use blueprint_core::{Cardinality, DataType};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Design backend schemas and export them as JSON blueprints
#[derive(Parser, Debug)]
#[command(name = "blueprint-studio", version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse from the process arguments
    pub fn from_env() -> Self {
        Self::parse()
    }
}

/// Where the data lives and who is acting. Each flag falls back to its
/// environment variable, then to the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// TOML configuration file
    #[arg(long, global = true, env = "BLUEPRINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the hosted data service
    #[arg(long, global = true, env = "BLUEPRINT_SERVICE_URL")]
    pub service_url: Option<String>,

    /// Public API key of the hosted data service
    #[arg(long, global = true, env = "BLUEPRINT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Session token of the signed-in user
    #[arg(long, global = true, env = "BLUEPRINT_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Id of the user whose projects are listed and created
    #[arg(long, global = true, env = "BLUEPRINT_OWNER_ID")]
    pub owner: Option<Uuid>,

    /// Local JSON snapshot used instead of a hosted service
    #[arg(long, global = true, env = "BLUEPRINT_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage projects
    #[command(subcommand)]
    Projects(ProjectsCommand),

    /// Show a project's models, relationships and policies
    Info {
        /// Project id or name
        project: String,
    },

    /// Export a project as a JSON blueprint
    Export {
        /// Project id or name
        project: String,

        /// Output file or directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage models
    #[command(subcommand)]
    Model(ModelCommand),

    /// Manage fields
    #[command(subcommand)]
    Field(FieldCommand),

    /// Relate two models
    Relate {
        /// Project id or name
        project: String,

        /// Source model id or name
        from: String,

        /// Target model id or name
        to: String,

        /// 1:1, 1:M or M:M
        #[arg(short, long, default_value = "1:M")]
        cardinality: Cardinality,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List projects, most recently updated first
    List,

    /// Create a project
    Create {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete a project and everything in it
    Delete {
        /// Project id or name
        project: String,

        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModelCommand {
    /// Add a model to a project
    Add {
        /// Project id or name
        project: String,

        name: String,

        #[arg(long, default_value_t = 100.0)]
        x: f64,

        #[arg(long, default_value_t = 100.0)]
        y: f64,
    },
}

#[derive(Subcommand, Debug)]
pub enum FieldCommand {
    /// Create a field and attach it to a model
    Add {
        /// Project id or name
        project: String,

        /// Model id or name
        model: String,

        name: String,

        #[arg(short = 't', long = "type")]
        data_type: DataType,

        #[arg(long)]
        required: bool,

        #[arg(long)]
        unique: bool,

        /// Also offer the field in the library
        #[arg(long)]
        reusable: bool,
    },
}
