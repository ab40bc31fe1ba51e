//! Studio configuration
//!
//! Settings come from an optional TOML file, overridden field by field by
//! command-line flags and their environment variables:
//!
//! ```toml
//! service_url = "https://example.supabase.co"
//! api_key = "public-anon-key"
//! owner_id = "6f1c2d3e-0000-4000-8000-000000000001"
//! ```
//!
//! Either `service_url` or `snapshot` must be set. A hosted service wins when
//! both are.

use crate::args::ConnectionArgs;
use blueprint_store::{MemoryService, RestService, SharedService, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No data service configured: set BLUEPRINT_SERVICE_URL or BLUEPRINT_SNAPSHOT")]
    NoBackend,

    #[error("{0} is required when using a hosted service")]
    Missing(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Which data service a config resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Hosted {
        url: String,
        api_key: String,
        access_token: Option<String>,
    },
    Snapshot(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub service_url: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub owner_id: Option<Uuid>,
    pub snapshot: Option<PathBuf>,
}

impl StudioConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The config file named by `args` (if any) with every flag applied on top
    pub fn load(args: &ConnectionArgs) -> Result<Self, ConfigError> {
        let base = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_overrides(args))
    }

    pub fn with_overrides(mut self, args: &ConnectionArgs) -> Self {
        if args.service_url.is_some() {
            self.service_url.clone_from(&args.service_url);
        }
        if args.api_key.is_some() {
            self.api_key.clone_from(&args.api_key);
        }
        if args.access_token.is_some() {
            self.access_token.clone_from(&args.access_token);
        }
        if args.owner.is_some() {
            self.owner_id = args.owner;
        }
        if args.snapshot.is_some() {
            self.snapshot.clone_from(&args.snapshot);
        }
        self
    }

    pub fn backend(&self) -> Result<Backend, ConfigError> {
        match (&self.service_url, &self.snapshot) {
            (Some(url), _) => Ok(Backend::Hosted {
                url: url.clone(),
                api_key: self.api_key.clone().ok_or(ConfigError::Missing("api_key"))?,
                access_token: self.access_token.clone(),
            }),
            (None, Some(path)) => Ok(Backend::Snapshot(path.clone())),
            (None, None) => Err(ConfigError::NoBackend),
        }
    }

    /// The acting user. Hosted services need an explicit owner; a local
    /// snapshot defaults to the nil id.
    pub fn owner(&self) -> Result<Uuid, ConfigError> {
        match (self.owner_id, self.backend()?) {
            (Some(owner), _) => Ok(owner),
            (None, Backend::Snapshot(_)) => Ok(Uuid::nil()),
            (None, Backend::Hosted { .. }) => Err(ConfigError::Missing("owner_id")),
        }
    }

    /// Build the data service this config points at
    pub fn connect(&self) -> Result<SharedService, ConfigError> {
        let service: SharedService = match self.backend()? {
            Backend::Hosted {
                url,
                api_key,
                access_token,
            } => {
                debug!(url = %url, "using hosted data service");
                let service = RestService::new(url, api_key)?;
                Arc::new(match access_token {
                    Some(token) => service.with_access_token(token),
                    None => service,
                })
            }
            Backend::Snapshot(path) => {
                debug!(path = %path.display(), "using local snapshot");
                Arc::new(MemoryService::open(path)?)
            }
        };
        Ok(service)
    }
}
