//! Subtree reconciliation: walk a folder, upsert every node, process every
//! leaf document.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::ingest::annotate::Annotator;
use crate::ingest::chunk::{DEFAULT_MAX_TOKENS, DEFAULT_OVERLAP_TOKENS, chunk_text};
use crate::provider::{DriveNode, StorageProvider};
use crate::store::{MetadataPayload, MetadataStore};
use crate::types::SyncError;

/// Exportable content types, keyed by source MIME with the text form the
/// provider is asked for. Everything else is mirrored as metadata only.
const SUPPORTED_EXPORTS: [(&str, &str); 3] = [
    ("application/vnd.google-apps.document", "text/plain"),
    ("application/vnd.google-apps.spreadsheet", "text/csv"),
    ("application/vnd.google-apps.presentation", "text/plain"),
];

fn export_target(mime_type: &str) -> Option<&'static str> {
    SUPPORTED_EXPORTS
        .iter()
        .find(|(source, _)| *source == mime_type)
        .map(|(_, target)| *target)
}

/// Counters for one walk, for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Metadata upserts issued (one per node encountered).
    pub upserts: usize,
    /// Leaf documents that went through export → chunk → replace.
    pub documents: usize,
    /// Leaves skipped for unsupported content types.
    pub skipped: usize,
}

/// Walks subtrees of the storage provider and reconciles each node into
/// the metadata store.
#[derive(Clone)]
pub struct Reconciler {
    provider: Arc<dyn StorageProvider>,
    store: Arc<dyn MetadataStore>,
    annotator: Annotator,
}

impl Reconciler {
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        store: Arc<dyn MetadataStore>,
        annotator: Annotator,
    ) -> Self {
        Self {
            provider,
            store,
            annotator,
        }
    }

    /// Reconciles every node below `start_id`, depth-first.
    ///
    /// The traversal runs on an explicit work stack of
    /// `(folder id, path prefix)` pairs rather than call recursion, so
    /// tree depth never grows the call stack, and a visited set skips
    /// folders the provider reports twice. Each folder's listing is
    /// drained through pagination before its children are processed. The
    /// start node itself is not re-upserted here; it was reconciled by
    /// whatever routed the walk.
    pub async fn walk(&self, start_id: &str) -> Result<WalkStats, SyncError> {
        let mut stack: Vec<(String, String)> = vec![(start_id.to_string(), start_id.to_string())];
        let mut visited: HashSet<String> = HashSet::from([start_id.to_string()]);
        let mut stats = WalkStats::default();

        while let Some((folder_id, prefix)) = stack.pop() {
            let children = self.provider.list_children(&folder_id).await?;
            info!(folder = %folder_id, children = children.len(), "reconciling folder");

            for child in children {
                let path = format!("{prefix}.{}", child.id);
                let record_id = self.reconcile_node(&child, &path).await?;
                stats.upserts += 1;

                if child.is_folder() {
                    if visited.insert(child.id.clone()) {
                        stack.push((child.id, path));
                    } else {
                        warn!(folder = %child.id, "folder already visited in this walk; skipping");
                    }
                } else if self.process_content(&child, &record_id).await? {
                    stats.documents += 1;
                } else {
                    stats.skipped += 1;
                }
            }
        }

        info!(
            start = %start_id,
            upserts = stats.upserts,
            documents = stats.documents,
            skipped = stats.skipped,
            "walk complete"
        );
        Ok(stats)
    }

    /// Upserts one node's metadata at the given path, returning the
    /// internal record id.
    pub(crate) async fn reconcile_node(
        &self,
        node: &DriveNode,
        path: &str,
    ) -> Result<String, SyncError> {
        let payload = MetadataPayload::from_node(node, path);
        let record_id = self.store.upsert_metadata(&payload).await?;
        debug!(node = %node.id, %record_id, %path, "metadata upserted");
        Ok(record_id)
    }

    /// Exports, chunks, annotates, and replaces a leaf document's chunk
    /// set. Returns `false` for unsupported content types (benign skip).
    ///
    /// The destructive replace happens only after the full annotated set
    /// is assembled in memory, so an export or embedding failure leaves
    /// the previously persisted chunks untouched.
    pub(crate) async fn process_content(
        &self,
        node: &DriveNode,
        record_id: &str,
    ) -> Result<bool, SyncError> {
        let Some(target_mime) = export_target(&node.mime_type) else {
            debug!(node = %node.id, mime = %node.mime_type, "unsupported content type; metadata only");
            return Ok(false);
        };

        let text = self.provider.export_text(&node.id, target_mime).await?;
        let chunks = chunk_text(&text, DEFAULT_MAX_TOKENS, DEFAULT_OVERLAP_TOKENS);
        let records = self.annotator.annotate(record_id, chunks).await?;
        self.store.replace_chunks(record_id, &records).await?;

        info!(node = %node.id, %record_id, chunks = records.len(), "chunk set replaced");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_targets_cover_native_document_types() {
        assert_eq!(
            export_target("application/vnd.google-apps.document"),
            Some("text/plain")
        );
        assert_eq!(
            export_target("application/vnd.google-apps.spreadsheet"),
            Some("text/csv")
        );
        assert_eq!(
            export_target("application/vnd.google-apps.presentation"),
            Some("text/plain")
        );
        assert_eq!(export_target("image/png"), None);
        assert_eq!(export_target("application/pdf"), None);
    }
}
