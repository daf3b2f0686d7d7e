//! OpenAI embeddings implementation of [`Embedder`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::embed::{Embedder, EmbeddingOutput};
use crate::types::SyncError;

const EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// Embedding calls ride the document-processing critical path; the budget
/// is looser than the metadata clients'.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for an OpenAI-compatible `/embeddings` endpoint.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: Url,
}

impl OpenAiEmbedder {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, SyncError> {
        let endpoint = Url::parse(&format!("{}/embeddings", base_url.trim_end_matches('/')))
            .map_err(|err| SyncError::Config(format!("invalid embedding api base: {err}")))?;
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|err| SyncError::Config(format!("invalid embedding credential: {err}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .use_rustls_tls()
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingEntry>,
    usage: Usage,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingOutput, SyncError> {
        let request = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: text,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Embedding(format!(
                "embedding request failed with status {status}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|err| SyncError::Embedding(format!("malformed embedding response: {err}")))?;
        let entry = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| SyncError::Embedding("embedding response carried no vectors".into()))?;

        Ok(EmbeddingOutput {
            vector: entry.embedding,
            tokens: parsed.usage.total_tokens,
        })
    }
}
