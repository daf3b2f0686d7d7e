//! Persistence seam for node metadata and chunk sets.
//!
//! The processor and walker only see the [`MetadataStore`] trait;
//! [`rest::RestStore`] is the production implementation against the
//! store's PostgREST-style REST and RPC surface.

pub mod rest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provider::DriveNode;
use crate::types::SyncError;

pub use rest::RestStore;

/// Argument set of the `upsert_file_metadata` procedure.
///
/// Provider-derived fields are populated from the current node state on
/// every reconciliation. The domain-classification fields below them are
/// curated store-side; this pipeline always submits their defaults and the
/// store's upsert is contractually merge-preserving for them, so a resync
/// never clobbers curated values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataPayload {
    pub p_drive_id: String,
    pub p_parent_drive_id: Option<String>,
    pub p_path: String,
    pub p_mime_type: String,
    pub p_title: String,
    pub p_checksum: Option<String>,
    pub p_modified_at: Option<String>,
    pub p_last_reviewed_at: Option<String>,
    pub p_core: bool,
    pub p_audience: Vec<String>,
    pub p_age_levels: Vec<String>,
    pub p_geographies: Vec<String>,
    pub p_governance_models: Vec<String>,
    pub p_vouchers: Option<String>,
    pub p_created_by: Option<String>,
    pub p_maintained_by: Option<String>,
    pub p_raw_export_path: Option<String>,
}

impl MetadataPayload {
    /// Builds the upsert payload for a node at the given materialized path.
    pub fn from_node(node: &DriveNode, path: &str) -> Self {
        Self {
            p_drive_id: node.id.clone(),
            p_parent_drive_id: node.effective_parent().map(str::to_string),
            p_path: path.to_string(),
            p_mime_type: node.mime_type.clone(),
            p_title: node.name.clone(),
            p_checksum: node.md5_checksum.clone(),
            p_modified_at: node.modified_time.clone(),
            p_last_reviewed_at: None,
            p_core: false,
            p_audience: Vec::new(),
            p_age_levels: Vec::new(),
            p_geographies: Vec::new(),
            p_governance_models: Vec::new(),
            p_vouchers: None,
            p_created_by: None,
            p_maintained_by: None,
            p_raw_export_path: None,
        }
    }
}

/// A chunk row as persisted, the chunk-with-embedding stage of the
/// pipeline. Produced only by [`crate::ingest::Annotator`], which is what
/// keeps partially annotated documents unrepresentable at this seam.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRecord {
    /// Internal record id of the owning metadata record.
    pub file_id: String,
    /// Zero-based, contiguous within one record.
    pub chunk_index: usize,
    pub content: String,
    /// Provider-reported token count, or the word-count estimate when
    /// embeddings are disabled.
    pub tokens: Option<u32>,
    pub embedding: Option<Vec<f32>>,
}

/// Write surface of the metadata/chunk store used by reconciliation.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Idempotently reconciles one node's attributes, returning the stable
    /// internal record id.
    async fn upsert_metadata(&self, payload: &MetadataPayload) -> Result<String, SyncError>;

    /// Replaces a record's entire chunk set: delete-then-insert, atomic
    /// from the caller's perspective. An empty `chunks` slice persists as
    /// "no chunks". Callers must serialize invocations per record id; the
    /// pipeline itself holds no per-document lock.
    async fn replace_chunks(
        &self,
        record_id: &str,
        chunks: &[ChunkRecord],
    ) -> Result<(), SyncError>;

    /// Stores a resumption cursor for the provider's change feed.
    async fn record_page_token(&self, token: &str) -> Result<(), SyncError>;
}
