//! Read-only seam to the remote file-storage provider.
//!
//! The walker and change handler only ever see the [`StorageProvider`]
//! trait; [`drive::DriveClient`] is the production implementation against
//! the Google Drive v3 REST API. Nodes are read fresh on every call and
//! never cached across requests.

pub mod drive;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::SyncError;

pub use drive::DriveClient;

/// MIME classifier the provider uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A node in the provider's hierarchy, folder or document.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveNode {
    /// Opaque provider id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Content-type classifier; folders carry [`FOLDER_MIME_TYPE`].
    pub mime_type: String,
    /// Parent ids as reported by the provider. At most one is effective.
    pub parents: Vec<String>,
    /// Content checksum, absent for folders and native document types.
    pub md5_checksum: Option<String>,
    /// Last-modified timestamp, normalized to RFC 3339 UTC on ingest.
    pub modified_time: Option<String>,
}

impl DriveNode {
    /// Whether this node is a folder, derived from its MIME classifier.
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// The single effective parent id, when the provider reported one.
    pub fn effective_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }
}

/// Normalizes a provider timestamp to RFC 3339 in UTC.
///
/// Unparseable or empty values collapse to `None` rather than erroring:
/// the timestamp is advisory metadata, not load-bearing state.
pub fn normalize_timestamp(value: Option<&str>) -> Option<String> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc).to_rfc3339())
}

/// Read-only listing and export capabilities of the storage provider.
///
/// Any non-success provider status propagates as a fatal error for the
/// node being processed, with one exception: a missing node resolves to
/// `Ok(None)` from [`get_node`](Self::get_node), because deletions and
/// permission revocations are expected transient states.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Resolves a single node, or `None` when it no longer exists or is
    /// inaccessible.
    async fn get_node(&self, id: &str) -> Result<Option<DriveNode>, SyncError>;

    /// Lists the immediate children of a folder, draining the provider's
    /// pagination into the full child set before returning.
    async fn list_children(&self, parent_id: &str) -> Result<Vec<DriveNode>, SyncError>;

    /// Exports a document's content as text in the requested target MIME.
    async fn export_text(&self, id: &str, target_mime: &str) -> Result<String, SyncError>;

    /// Downloads a node's raw bytes (binary assets; unused by the
    /// reconciliation flow).
    async fn download_raw(&self, id: &str) -> Result<Vec<u8>, SyncError>;
}
