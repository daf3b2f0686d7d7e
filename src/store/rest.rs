//! PostgREST-style implementation of [`MetadataStore`].
//!
//! Metadata upserts and the change-feed cursor go through RPC procedures;
//! chunk rows, feedback, and the approvals read path use the REST table
//! surface directly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::{Value, json};
use url::Url;

use crate::store::{ChunkRecord, MetadataPayload, MetadataStore};
use crate::types::SyncError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST/RPC client for the metadata store, authenticated with a service
/// credential sent both as `apikey` and as a bearer token.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base: Url,
}

impl RestStore {
    /// Builds a client against the store's root URL (the `/rest/v1` prefix
    /// is appended here).
    pub fn new(store_url: &str, service_key: &str) -> Result<Self, SyncError> {
        let base = Url::parse(&format!("{}/rest/v1/", store_url.trim_end_matches('/')))
            .map_err(|err| SyncError::Config(format!("invalid store url: {err}")))?;

        let key = HeaderValue::from_str(service_key.trim())
            .map_err(|err| SyncError::Config(format!("invalid store credential: {err}")))?;
        let auth = HeaderValue::from_str(&format!("Bearer {}", service_key.trim()))
            .map_err(|err| SyncError::Config(format!("invalid store credential: {err}")))?;
        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .use_rustls_tls()
            .build()?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        self.base
            .join(path)
            .map_err(|err| SyncError::Config(format!("invalid store endpoint {path}: {err}")))
    }

    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response, SyncError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(SyncError::storage_status(status, context))
        }
    }

    /// Records reader feedback for a persisted answer (downstream review
    /// feature; not part of the reconciliation flow).
    pub async fn store_feedback(&self, payload: &Value) -> Result<(), SyncError> {
        let response = self
            .client
            .post(self.endpoint("feedback")?)
            .json(payload)
            .send()
            .await?;
        Self::check(response, "store feedback").await?;
        Ok(())
    }

    /// Fetches answers still awaiting review approval (downstream review
    /// feature; not part of the reconciliation flow).
    pub async fn fetch_pending_approvals(&self) -> Result<Vec<Value>, SyncError> {
        let response = self
            .client
            .get(self.endpoint("answers")?)
            .query(&[("approved", "eq.false")])
            .send()
            .await?;
        let response = Self::check(response, "fetch pending approvals").await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MetadataStore for RestStore {
    async fn upsert_metadata(&self, payload: &MetadataPayload) -> Result<String, SyncError> {
        let response = self
            .client
            .post(self.endpoint("rpc/upsert_file_metadata")?)
            .json(payload)
            .send()
            .await?;
        let response = Self::check(response, "upsert metadata").await?;

        // The procedure returns the record id either bare or as a
        // single-element set, depending on how it is declared store-side.
        match response.json::<Value>().await? {
            Value::String(id) => Ok(id),
            Value::Array(items) => match items.first() {
                Some(Value::String(id)) => Ok(id.clone()),
                _ => Err(SyncError::Storage(
                    "upsert_file_metadata returned an empty or non-string set".into(),
                )),
            },
            other => Err(SyncError::Storage(format!(
                "unexpected upsert_file_metadata response: {other}"
            ))),
        }
    }

    async fn replace_chunks(
        &self,
        record_id: &str,
        chunks: &[ChunkRecord],
    ) -> Result<(), SyncError> {
        let delete = self
            .client
            .delete(self.endpoint("chunks")?)
            .query(&[("file_id", format!("eq.{record_id}"))])
            .send()
            .await?;
        Self::check(delete, "delete chunks").await?;

        if chunks.is_empty() {
            return Ok(());
        }

        let insert = self
            .client
            .post(self.endpoint("chunks")?)
            .json(chunks)
            .send()
            .await?;
        Self::check(insert, "insert chunks").await?;
        Ok(())
    }

    async fn record_page_token(&self, token: &str) -> Result<(), SyncError> {
        let response = self
            .client
            .post(self.endpoint("rpc/set_drive_start_page_token")?)
            .json(&json!({ "p_token": token }))
            .send()
            .await?;
        Self::check(response, "record page token").await?;
        Ok(())
    }
}
