//! Embedding annotation: the bridge from [`TextChunk`] to the persistable
//! [`ChunkRecord`] shape.

use std::sync::Arc;

use tracing::warn;

use crate::embed::Embedder;
use crate::ingest::chunk::TextChunk;
use crate::store::ChunkRecord;
use crate::types::SyncError;

/// Attaches embedding vectors and provider token counts to a document's
/// chunk sequence.
///
/// With no embedder configured the annotator degrades to a pass-through
/// that keeps the chunker's token estimates and leaves `embedding` unset.
/// That is a warning, not an error. With an embedder, requests run
/// sequentially in index order and any failure aborts the whole document:
/// the caller never sees, and therefore never persists, a partially
/// annotated set.
#[derive(Clone)]
pub struct Annotator {
    embedder: Option<Arc<dyn Embedder>>,
}

impl Annotator {
    pub fn new(embedder: Option<Arc<dyn Embedder>>) -> Self {
        Self { embedder }
    }

    /// Whether an embedding provider is configured.
    pub fn is_enabled(&self) -> bool {
        self.embedder.is_some()
    }

    /// Converts a chunk sequence into persistable records owned by
    /// `record_id`, embedding each chunk when a provider is configured.
    pub async fn annotate(
        &self,
        record_id: &str,
        chunks: Vec<TextChunk>,
    ) -> Result<Vec<ChunkRecord>, SyncError> {
        let Some(embedder) = &self.embedder else {
            warn!(record_id, "embedding credential not configured; persisting chunks without vectors");
            return Ok(chunks
                .into_iter()
                .map(|chunk| ChunkRecord {
                    file_id: record_id.to_string(),
                    chunk_index: chunk.index,
                    content: chunk.content,
                    tokens: Some(chunk.token_estimate as u32),
                    embedding: None,
                })
                .collect());
        };

        let mut records = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let output = embedder.embed(&chunk.content).await?;
            records.push(ChunkRecord {
                file_id: record_id.to_string(),
                chunk_index: chunk.index,
                content: chunk.content,
                tokens: Some(output.tokens),
                embedding: Some(output.vector),
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::EmbeddingOutput;
    use async_trait::async_trait;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<EmbeddingOutput, SyncError> {
            Ok(EmbeddingOutput {
                vector: vec![text.len() as f32, 0.5],
                tokens: (text.split_whitespace().count() as u32) * 2,
            })
        }
    }

    struct PoisonEmbedder;

    #[async_trait]
    impl Embedder for PoisonEmbedder {
        async fn embed(&self, text: &str) -> Result<EmbeddingOutput, SyncError> {
            if text.contains("poison") {
                Err(SyncError::Embedding("provider rejected input".into()))
            } else {
                Ok(EmbeddingOutput {
                    vector: vec![1.0],
                    tokens: 1,
                })
            }
        }
    }

    fn sample_chunks() -> Vec<TextChunk> {
        vec![
            TextChunk {
                index: 0,
                content: "first chunk".into(),
                token_estimate: 2,
            },
            TextChunk {
                index: 1,
                content: "second chunk body".into(),
                token_estimate: 3,
            },
        ]
    }

    #[tokio::test]
    async fn pass_through_keeps_estimates_and_no_vectors() {
        let annotator = Annotator::new(None);
        let records = annotator.annotate("rec-1", sample_chunks()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file_id, "rec-1");
        assert_eq!(records[0].chunk_index, 0);
        assert_eq!(records[0].tokens, Some(2));
        assert_eq!(records[0].embedding, None);
        assert_eq!(records[1].tokens, Some(3));
    }

    #[tokio::test]
    async fn provider_counts_supersede_estimates() {
        let annotator = Annotator::new(Some(Arc::new(FixedEmbedder)));
        let records = annotator.annotate("rec-1", sample_chunks()).await.unwrap();

        assert_eq!(records[0].tokens, Some(4));
        assert_eq!(records[1].tokens, Some(6));
        assert!(records.iter().all(|r| r.embedding.is_some()));
        // Index assignment stays chunk-exact.
        assert_eq!(records[0].chunk_index, 0);
        assert_eq!(records[1].chunk_index, 1);
    }

    #[tokio::test]
    async fn mid_document_failure_aborts_the_whole_batch() {
        let annotator = Annotator::new(Some(Arc::new(PoisonEmbedder)));
        let chunks = vec![
            TextChunk {
                index: 0,
                content: "fine".into(),
                token_estimate: 1,
            },
            TextChunk {
                index: 1,
                content: "poison pill".into(),
                token_estimate: 2,
            },
        ];
        let err = annotator.annotate("rec-1", chunks).await.unwrap_err();
        assert!(matches!(err, SyncError::Embedding(_)));
    }

    #[tokio::test]
    async fn empty_input_stays_empty() {
        let annotator = Annotator::new(Some(Arc::new(FixedEmbedder)));
        let records = annotator.annotate("rec-1", Vec::new()).await.unwrap();
        assert!(records.is_empty());
    }
}
