//! Embedding-vector generation seam.
//!
//! The annotator holds an `Option<Arc<dyn Embedder>>`; `None` means the
//! credential is unconfigured and chunks persist without vectors.

pub mod openai;

use async_trait::async_trait;

use crate::types::SyncError;

pub use openai::OpenAiEmbedder;

/// One embedding result: the vector plus the provider's own token
/// accounting, which supersedes the chunker's word-count estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutput {
    pub vector: Vec<f32>,
    pub tokens: u32,
}

/// Generates an embedding for a single text, one document per call.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingOutput, SyncError>;
}
