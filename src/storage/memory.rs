//! In-memory storage account for handler tests.
//!
//! Listing reflects uploads immediately, each operation can be forced to
//! answer with an error status, and every call is counted.

use async_trait::async_trait;
use hyper::StatusCode;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{GatewayError, GatewayResponse, StorageGateway};

#[derive(Default)]
pub struct MemoryGateway {
    files: Mutex<BTreeMap<String, String>>,
    folders: Vec<String>,
    fail_list: Option<StatusCode>,
    fail_download: Option<StatusCode>,
    fail_upload: Option<StatusCode>,
    list_calls: AtomicUsize,
    download_calls: AtomicUsize,
    upload_calls: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        self
    }

    pub fn with_folder(mut self, path: &str) -> Self {
        self.folders.push(path.to_string());
        self
    }

    pub fn failing_list(mut self, status: StatusCode) -> Self {
        self.fail_list = Some(status);
        self
    }

    pub fn failing_download(mut self, status: StatusCode) -> Self {
        self.fail_download = Some(status);
        self
    }

    pub fn failing_upload(mut self, status: StatusCode) -> Self {
        self.fail_upload = Some(status);
        self
    }

    pub fn content_of(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.list_calls.load(Ordering::SeqCst),
            self.download_calls.load(Ordering::SeqCst),
            self.upload_calls.load(Ordering::SeqCst),
        )
    }

    fn error(status: StatusCode) -> GatewayResponse {
        GatewayResponse::new(status, format!(r#"{{"error_summary":"forced {status}"}}"#))
    }
}

fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[async_trait]
impl StorageGateway for MemoryGateway {
    async fn list(&self) -> Result<GatewayResponse, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_list {
            return Ok(Self::error(status));
        }

        let mut entries: Vec<serde_json::Value> = self
            .folders
            .iter()
            .map(|path| {
                serde_json::json!({
                    ".tag": "folder",
                    "name": name_of(path),
                    "path_lower": path.to_lowercase(),
                    "path_display": path,
                    "id": format!("id:{path}"),
                })
            })
            .collect();
        for (path, content) in self.files.lock().unwrap().iter() {
            entries.push(serde_json::json!({
                ".tag": "file",
                "name": name_of(path),
                "path_lower": path.to_lowercase(),
                "path_display": path,
                "id": format!("id:{path}"),
                "rev": "0001",
                "size": content.len(),
                "content_hash": "0",
            }));
        }

        let body = serde_json::json!({
            "entries": entries,
            "cursor": "cursor",
            "has_more": false,
        });
        Ok(GatewayResponse::new(StatusCode::OK, body.to_string()))
    }

    async fn download(&self, path: &str) -> Result<GatewayResponse, GatewayError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_download {
            return Ok(Self::error(status));
        }
        match self.content_of(path) {
            Some(content) => Ok(GatewayResponse::new(StatusCode::OK, content)),
            None => Ok(Self::error(StatusCode::CONFLICT)),
        }
    }

    async fn upload(&self, path: &str, content: &str) -> Result<GatewayResponse, GatewayError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_upload {
            return Ok(Self::error(status));
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Ok(GatewayResponse::new(StatusCode::OK, "{}"))
    }
}
