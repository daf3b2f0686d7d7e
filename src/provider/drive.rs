//! Google Drive v3 REST implementation of [`StorageProvider`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::provider::{DriveNode, StorageProvider, normalize_timestamp};
use crate::types::SyncError;

const NODE_FIELDS: &str = "id, name, mimeType, parents, md5Checksum, modifiedTime";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, parents, md5Checksum, modifiedTime)";

/// Page size requested from the listing endpoint. The provider caps pages
/// at 1000 entries; larger trees arrive via continuation tokens.
const PAGE_SIZE: &str = "1000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Drive v3 client authenticated with a bearer credential.
#[derive(Clone)]
pub struct DriveClient {
    client: Client,
    base: Url,
}

impl DriveClient {
    /// Builds a client against the given API base (production default is
    /// [`crate::config::DEFAULT_DRIVE_API_BASE`]).
    pub fn new(base_url: &str, token: &str) -> Result<Self, SyncError> {
        let base = Url::parse(base_url)
            .map_err(|err| SyncError::Config(format!("invalid drive api base: {err}")))?;
        let auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|err| SyncError::Config(format!("invalid drive credential: {err}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .use_rustls_tls()
            .build()?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SyncError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| SyncError::Config("drive api base cannot be a base url".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    id: String,
    name: String,
    mime_type: String,
    #[serde(default)]
    parents: Vec<String>,
    md5_checksum: Option<String>,
    modified_time: Option<String>,
}

impl From<FileResource> for DriveNode {
    fn from(resource: FileResource) -> Self {
        DriveNode {
            id: resource.id,
            name: resource.name,
            mime_type: resource.mime_type,
            parents: resource.parents,
            md5_checksum: resource.md5_checksum,
            modified_time: normalize_timestamp(resource.modified_time.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListPage {
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<FileResource>,
}

#[async_trait]
impl StorageProvider for DriveClient {
    async fn get_node(&self, id: &str) -> Result<Option<DriveNode>, SyncError> {
        let url = self.endpoint(&["files", id])?;
        let response = self
            .client
            .get(url)
            .query(&[("fields", NODE_FIELDS), ("supportsAllDrives", "true")])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let resource: FileResource = response.json().await?;
                Ok(Some(resource.into()))
            }
            status => Err(SyncError::provider_status(status, "get node")),
        }
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<DriveNode>, SyncError> {
        let url = self.endpoint(&["files"])?;
        let query = format!("'{parent_id}' in parents and trashed = false");
        let mut page_token: Option<String> = None;
        let mut nodes = Vec::new();

        loop {
            let mut request = self.client.get(url.clone()).query(&[
                ("q", query.as_str()),
                ("pageSize", PAGE_SIZE),
                ("fields", LIST_FIELDS),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SyncError::provider_status(status, "list children"));
            }

            let page: FileListPage = response.json().await?;
            nodes.extend(page.files.into_iter().map(DriveNode::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(nodes)
    }

    async fn export_text(&self, id: &str, target_mime: &str) -> Result<String, SyncError> {
        let url = self.endpoint(&["files", id, "export"])?;
        let response = self
            .client
            .get(url)
            .query(&[("mimeType", target_mime)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::provider_status(status, "export text"));
        }
        Ok(response.text().await?)
    }

    async fn download_raw(&self, id: &str) -> Result<Vec<u8>, SyncError> {
        let url = self.endpoint(&["files", id])?;
        let response = self.client.get(url).query(&[("alt", "media")]).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::provider_status(status, "download"));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
