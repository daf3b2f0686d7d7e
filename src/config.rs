//! Process configuration, read once at startup.
//!
//! There is deliberately no global configuration handle: `main` builds one
//! [`WorkerConfig`] and passes it (or the pieces of it) into each component
//! constructor. Missing required variables fail fast before the server
//! binds.

use std::env;

use crate::types::SyncError;

/// Default public endpoint of the storage provider's REST API.
pub const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Default endpoint of the embedding provider.
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Runtime configuration derived from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Base URL of the metadata/chunk store's REST surface.
    pub store_url: String,
    /// Service credential for the store (sent as `apikey` + bearer).
    pub store_key: String,
    /// Bearer credential for the storage provider.
    pub drive_token: String,
    /// Base URL of the storage provider API. Overridable for tests.
    pub drive_api_base: String,
    /// Id of the folder the bootstrap walk starts from.
    pub root_folder_id: String,
    /// Embedding credential. Absent means chunks persist without vectors.
    pub openai_api_key: Option<String>,
    /// Base URL of the embedding provider API. Overridable for tests.
    pub openai_api_base: String,
    /// Shared secret for the trigger endpoints. Absent leaves them open.
    pub trigger_token: Option<String>,
    /// Socket address the HTTP surface binds to.
    pub bind_addr: String,
}

impl WorkerConfig {
    /// Reads configuration from the process environment.
    ///
    /// Loads a `.env` file first when one is present, then resolves each
    /// variable. Returns [`SyncError::Config`] naming the first missing
    /// required variable.
    pub fn from_env() -> Result<Self, SyncError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            store_url: require("GROVESYNC_STORE_URL")?,
            store_key: require("GROVESYNC_STORE_KEY")?,
            drive_token: require("GROVESYNC_DRIVE_TOKEN")?,
            drive_api_base: optional("GROVESYNC_DRIVE_API_BASE")
                .unwrap_or_else(|| DEFAULT_DRIVE_API_BASE.to_string()),
            root_folder_id: require("GROVESYNC_ROOT_FOLDER")?,
            openai_api_key: optional("OPENAI_API_KEY"),
            openai_api_base: optional("GROVESYNC_OPENAI_BASE")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            trigger_token: optional("GROVESYNC_TRIGGER_TOKEN"),
            bind_addr: optional("GROVESYNC_BIND").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
        })
    }

    /// Whether an embedding credential is configured.
    pub fn has_embeddings(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

fn require(key: &str) -> Result<String, SyncError> {
    optional(key).ok_or_else(|| SyncError::Config(format!("{key} must be set")))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
