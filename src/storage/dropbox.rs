// Dropbox HTTP gateway
// Three single-shot calls against the v2 files API, authenticated with a static bearer token

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;

use super::{GatewayError, GatewayResponse, StorageGateway};
use crate::config::DropboxConfig;
use crate::logger;

/// Header carrying the JSON argument of content-endpoint calls
const API_ARG_HEADER: &str = "Dropbox-API-Arg";

#[derive(Serialize)]
struct ListFolderArg<'a> {
    path: &'a str,
    include_non_downloadable_files: bool,
}

#[derive(Serialize)]
struct DownloadArg<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct UploadArg<'a> {
    path: &'a str,
    mode: &'static str,
    autorename: bool,
}

/// `StorageGateway` backed by the Dropbox HTTP API.
pub struct DropboxGateway {
    client: Client,
    api_url: String,
    content_url: String,
    access_token: String,
}

impl DropboxGateway {
    pub fn new(client: Client, config: &DropboxConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            content_url: config.content_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    fn list_folder_url(&self) -> String {
        format!("{}/2/files/list_folder", self.api_url)
    }

    fn download_url(&self) -> String {
        format!("{}/2/files/download", self.content_url)
    }

    fn upload_url(&self) -> String {
        format!("{}/2/files/upload", self.content_url)
    }

    async fn send(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<GatewayResponse, GatewayError> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        logger::log_debug(&format!(
            "[Storage] {operation} -> {status} ({} bytes)",
            body.len()
        ));
        Ok(GatewayResponse::new(status, body))
    }
}

#[async_trait]
impl StorageGateway for DropboxGateway {
    async fn list(&self) -> Result<GatewayResponse, GatewayError> {
        let request = self.client.post(self.list_folder_url()).json(&ListFolderArg {
            path: "",
            include_non_downloadable_files: false,
        });
        self.send("list_folder", request).await
    }

    async fn download(&self, path: &str) -> Result<GatewayResponse, GatewayError> {
        let arg = header_safe_json(&DownloadArg { path })?;
        let request = self
            .client
            .post(self.download_url())
            .header(API_ARG_HEADER, arg);
        self.send("download", request).await
    }

    async fn upload(&self, path: &str, content: &str) -> Result<GatewayResponse, GatewayError> {
        let arg = header_safe_json(&UploadArg {
            path,
            mode: "overwrite",
            autorename: true,
        })?;
        let request = self
            .client
            .post(self.upload_url())
            .header(API_ARG_HEADER, arg)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content.as_bytes().to_vec());
        self.send("upload", request).await
    }
}

/// Serialize `arg` as JSON that can travel in an HTTP header.
///
/// Non-ASCII characters (and DEL) are written as `\uXXXX` escapes, using
/// surrogate pairs outside the BMP. They can only occur inside JSON strings,
/// so the output decodes to the same value.
fn header_safe_json<T: Serialize>(arg: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(arg)?;
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() && c != '\u{7f}' {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    Ok(out)
}
