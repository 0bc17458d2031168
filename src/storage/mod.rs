//! Storage gateway module
//!
//! The only outbound surface of the service: list, download and upload calls
//! against the storage provider. Handlers talk to the [`StorageGateway`] trait,
//! never to a concrete client, so tests can swap in an in-memory account.

mod dropbox;
#[cfg(test)]
pub mod memory;

pub use dropbox::DropboxGateway;

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Failure that leaves no provider status to pass through
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request to storage provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider JSON could not be encoded or decoded: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raw provider reply; callers decide what a non-success status means
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl GatewayResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Proxy operations against the storage account.
///
/// Every call is a single request: no retries, no backoff, no pagination.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// List the root folder, excluding non-downloadable files
    async fn list(&self) -> Result<GatewayResponse, GatewayError>;

    /// Fetch the raw bytes of the file at `path`
    async fn download(&self, path: &str) -> Result<GatewayResponse, GatewayError>;

    /// Overwrite the file at `path` with `content`
    async fn upload(&self, path: &str, content: &str) -> Result<GatewayResponse, GatewayError>;
}

/// One page of a folder listing
#[derive(Debug, Deserialize)]
pub struct FileListing {
    pub entries: Vec<FileEntry>,
    /// Continuation cursor; only the first page is ever shown
    #[serde(default)]
    pub cursor: String,
    #[serde(default)]
    pub has_more: bool,
}

/// Listing item, discriminated by the provider's `.tag`
#[derive(Debug, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
pub enum FileEntry {
    File(FileMetadata),
    Folder(FolderMetadata),
    /// Tags this service does not know about (e.g. `deleted`)
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct FileMetadata {
    pub name: String,
    /// Lowercased path, used as the stable identifier
    pub path_lower: String,
    #[serde(default)]
    pub path_display: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub rev: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct FolderMetadata {
    pub name: String,
    #[serde(default)]
    pub path_lower: String,
    #[serde(default)]
    pub path_display: String,
    #[serde(default)]
    pub id: String,
}

/// What the sidebar needs to know about a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub name: String,
    pub path: String,
}

impl FileListing {
    /// Files only, in provider order
    pub fn summaries(&self) -> Vec<FileSummary> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                FileEntry::File(meta) => Some(FileSummary {
                    name: meta.name.clone(),
                    path: meta.path_lower.clone(),
                }),
                FileEntry::Folder(_) | FileEntry::Unknown => None,
            })
            .collect()
    }
}
