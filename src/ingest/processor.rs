//! Change-notification entry point for the reconciliation pipeline.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::ingest::walker::Reconciler;
use crate::provider::StorageProvider;
use crate::types::SyncError;

/// Outcome of a webhook batch: which node ids reconciled and which
/// failed. Failures are logged per node and never abort later entries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: Vec<String>,
    pub failed: Vec<String>,
}

/// Routes single-node change notifications into the walker or directly
/// into leaf content processing.
#[derive(Clone)]
pub struct Processor {
    provider: Arc<dyn StorageProvider>,
    reconciler: Reconciler,
    root_folder_id: String,
}

impl Processor {
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        reconciler: Reconciler,
        root_folder_id: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            reconciler,
            root_folder_id: root_folder_id.into(),
        }
    }

    /// Walks the configured root folder; the initial full mirror and the
    /// recovery path when change notifications were missed.
    pub async fn bootstrap(&self) -> Result<(), SyncError> {
        self.reconciler.walk(&self.root_folder_id).await?;
        Ok(())
    }

    /// Reconciles one changed node.
    ///
    /// A node that no longer resolves is a no-op: deletions and
    /// permission revocations are expected transient states, logged and
    /// skipped. A folder change means "this subtree needs reconciliation"
    /// and triggers a full re-walk below it; a leaf change upserts the
    /// leaf and reprocesses its content.
    pub async fn handle_change(&self, node_id: &str) -> Result<(), SyncError> {
        let Some(node) = self.provider.get_node(node_id).await? else {
            warn!(node = %node_id, "changed node not accessible; skipping");
            return Ok(());
        };

        if node.is_folder() {
            self.reconciler.walk(&node.id).await?;
            return Ok(());
        }

        let path = match node.effective_parent() {
            Some(parent) => format!("{parent}.{}", node.id),
            None => node.id.clone(),
        };
        let record_id = self.reconciler.reconcile_node(&node, &path).await?;
        self.reconciler.process_content(&node, &record_id).await?;
        Ok(())
    }

    /// Processes a batch of change notifications sequentially. Each
    /// change is independent: a failure is logged with its node id and
    /// recorded in the report without swallowing later changes.
    pub async fn handle_changes(&self, node_ids: &[String]) -> BatchReport {
        let mut report = BatchReport::default();
        for node_id in node_ids {
            match self.handle_change(node_id).await {
                Ok(()) => {
                    info!(node = %node_id, "change reconciled");
                    report.processed.push(node_id.clone());
                }
                Err(err) => {
                    error!(node = %node_id, error = %err, "change reconciliation failed");
                    report.failed.push(node_id.clone());
                }
            }
        }
        report
    }
}
