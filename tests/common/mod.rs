//! In-memory fakes for the provider, store, and embedder seams.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use grovesync::embed::{Embedder, EmbeddingOutput};
use grovesync::ingest::{Annotator, Processor, Reconciler};
use grovesync::provider::{DriveNode, FOLDER_MIME_TYPE, StorageProvider};
use grovesync::store::{ChunkRecord, MetadataPayload, MetadataStore};
use grovesync::types::SyncError;

pub const DOC_MIME: &str = "application/vnd.google-apps.document";

/// Static tree of nodes with recorded listing and export calls.
#[derive(Default)]
pub struct FakeProvider {
    nodes: HashMap<String, DriveNode>,
    children: HashMap<String, Vec<String>>,
    texts: HashMap<String, String>,
    fail_get: HashSet<String>,
    pub list_calls: Mutex<Vec<String>>,
    pub export_calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_folder(&mut self, id: &str, parent: Option<&str>) {
        self.add_node(id, parent, FOLDER_MIME_TYPE);
    }

    pub fn add_doc(&mut self, id: &str, parent: Option<&str>, mime: &str, text: Option<&str>) {
        self.add_node(id, parent, mime);
        if let Some(text) = text {
            self.texts.insert(id.to_string(), text.to_string());
        }
    }

    /// Makes `get_node` fail with a provider error for this id.
    pub fn poison_get(&mut self, id: &str) {
        self.fail_get.insert(id.to_string());
    }

    fn add_node(&mut self, id: &str, parent: Option<&str>, mime: &str) {
        let node = DriveNode {
            id: id.to_string(),
            name: format!("node {id}"),
            mime_type: mime.to_string(),
            parents: parent.map(str::to_string).into_iter().collect(),
            md5_checksum: None,
            modified_time: Some("2024-05-01T12:00:00+00:00".to_string()),
        };
        self.nodes.insert(id.to_string(), node);
        if let Some(parent) = parent {
            self.children
                .entry(parent.to_string())
                .or_default()
                .push(id.to_string());
        }
    }
}

#[async_trait]
impl StorageProvider for FakeProvider {
    async fn get_node(&self, id: &str) -> Result<Option<DriveNode>, SyncError> {
        if self.fail_get.contains(id) {
            return Err(SyncError::Provider(format!("get {id} exploded")));
        }
        Ok(self.nodes.get(id).cloned())
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<DriveNode>, SyncError> {
        self.list_calls.lock().unwrap().push(parent_id.to_string());
        let ids = self.children.get(parent_id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| self.nodes.get(id).cloned())
            .collect())
    }

    async fn export_text(&self, id: &str, _target_mime: &str) -> Result<String, SyncError> {
        self.export_calls.lock().unwrap().push(id.to_string());
        self.texts
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::Provider(format!("no exportable text for {id}")))
    }

    async fn download_raw(&self, id: &str) -> Result<Vec<u8>, SyncError> {
        self.texts
            .get(id)
            .map(|text| text.as_bytes().to_vec())
            .ok_or_else(|| SyncError::Provider(format!("no raw content for {id}")))
    }
}

/// Recording store; record ids are derived from the provider id.
#[derive(Default)]
pub struct FakeStore {
    pub upserts: Mutex<Vec<MetadataPayload>>,
    pub chunks: Mutex<HashMap<String, Vec<ChunkRecord>>>,
    pub page_tokens: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_id(drive_id: &str) -> String {
        format!("rec-{drive_id}")
    }

    pub fn chunks_for(&self, drive_id: &str) -> Option<Vec<ChunkRecord>> {
        self.chunks
            .lock()
            .unwrap()
            .get(&Self::record_id(drive_id))
            .cloned()
    }

    pub fn upsert_count(&self) -> usize {
        self.upserts.lock().unwrap().len()
    }

    pub fn path_of(&self, drive_id: &str) -> Option<String> {
        self.upserts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|payload| payload.p_drive_id == drive_id)
            .map(|payload| payload.p_path.clone())
    }
}

#[async_trait]
impl MetadataStore for FakeStore {
    async fn upsert_metadata(&self, payload: &MetadataPayload) -> Result<String, SyncError> {
        self.upserts.lock().unwrap().push(payload.clone());
        Ok(Self::record_id(&payload.p_drive_id))
    }

    async fn replace_chunks(
        &self,
        record_id: &str,
        chunks: &[ChunkRecord],
    ) -> Result<(), SyncError> {
        self.chunks
            .lock()
            .unwrap()
            .insert(record_id.to_string(), chunks.to_vec());
        Ok(())
    }

    async fn record_page_token(&self, token: &str) -> Result<(), SyncError> {
        self.page_tokens.lock().unwrap().push(token.to_string());
        Ok(())
    }
}

/// Deterministic embedder that records every input.
#[derive(Default)]
pub struct CountingEmbedder {
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingOutput, SyncError> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(EmbeddingOutput {
            vector: vec![text.len() as f32, 1.0],
            tokens: text.split_whitespace().count() as u32,
        })
    }
}

/// Embedder that always fails, for partial-annotation tests.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<EmbeddingOutput, SyncError> {
        Err(SyncError::Embedding("provider unavailable".into()))
    }
}

pub fn build_processor(
    provider: Arc<FakeProvider>,
    store: Arc<FakeStore>,
    embedder: Option<Arc<dyn Embedder>>,
    root: &str,
) -> Processor {
    let annotator = Annotator::new(embedder);
    let reconciler = Reconciler::new(provider.clone(), store.clone(), annotator);
    Processor::new(provider, reconciler, root)
}
