//! Editor operations
//!
//! `show` lists the account and optionally loads one file into the page;
//! `save` overwrites one file. Both talk to the provider only through
//! [`StorageGateway`].

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::http::{self, query};
use crate::logger;
use crate::page::{self, EditableDocument};
use crate::storage::{FileListing, StorageGateway};

pub const LIST_FAILED_BODY: &str = "Could not get file list";
pub const MISSING_INPUT_BODY: &str = "File name and/or content missing";
pub const UPLOAD_FAILED_BODY: &str = "Something went wrong. Data may be lost";
const RENDER_FAILED_BODY: &str = "Could not render editor";

/// Render the editor page, with `requested` loaded when given.
///
/// A failed listing aborts with the provider's status; a failed download only
/// leaves the editor empty.
pub async fn show(gateway: &dyn StorageGateway, requested: Option<&str>) -> Response<Full<Bytes>> {
    let listing = match gateway.list().await {
        Ok(resp) if resp.is_success() => resp.json::<FileListing>(),
        Ok(resp) => {
            logger::log_warning(&format!("File listing failed with {}", resp.status));
            return http::build_text_response(resp.status, LIST_FAILED_BODY);
        }
        Err(e) => {
            logger::log_error(&format!("File listing failed: {e}"));
            return http::build_text_response(StatusCode::BAD_GATEWAY, LIST_FAILED_BODY);
        }
    };
    let listing = match listing {
        Ok(listing) => listing,
        Err(e) => {
            logger::log_error(&format!("Unreadable file listing: {e}"));
            return http::build_text_response(StatusCode::BAD_GATEWAY, LIST_FAILED_BODY);
        }
    };
    if listing.has_more {
        logger::log_warning(&format!(
            "Listing has more entries than one page (cursor {}); only the first page is shown",
            listing.cursor
        ));
    }
    let files = listing.summaries();

    let document = match requested {
        Some(path) => Some(EditableDocument::new(path, load_content(gateway, path).await)),
        None => None,
    };

    match page::render_page(&files, document.as_ref()) {
        Ok(html) => http::build_html_response(html),
        Err(e) => {
            logger::log_error(&format!("Failed to render editor page: {e}"));
            http::build_text_response(StatusCode::INTERNAL_SERVER_ERROR, RENDER_FAILED_BODY)
        }
    }
}

/// Download `path` as text, or an empty string when that fails
async fn load_content(gateway: &dyn StorageGateway, path: &str) -> String {
    match gateway.download(path).await {
        Ok(resp) if resp.is_success() => resp.text(),
        Ok(resp) => {
            logger::log_debug(&format!("Download of {path} failed with {}", resp.status));
            String::new()
        }
        Err(e) => {
            logger::log_debug(&format!("Download of {path} failed: {e}"));
            String::new()
        }
    }
}

/// Overwrite `file` with `content` and point the client back at the editor.
///
/// Either input missing is a client error and nothing is uploaded.
pub async fn save(
    gateway: &dyn StorageGateway,
    file: Option<&str>,
    content: Option<&str>,
) -> Response<Full<Bytes>> {
    let (Some(file), Some(content)) = (file, content) else {
        return http::build_text_response(StatusCode::BAD_REQUEST, MISSING_INPUT_BODY);
    };

    match gateway.upload(file, content).await {
        Ok(resp) if resp.is_success() => http::build_saved_response(&query::editor_url(file)),
        Ok(resp) => {
            logger::log_error(&format!(
                "Upload of {file} failed with {}: {}",
                resp.status,
                resp.text()
            ));
            http::build_text_response(resp.status, UPLOAD_FAILED_BODY)
        }
        Err(e) => {
            logger::log_error(&format!("Upload of {file} failed: {e}"));
            http::build_text_response(StatusCode::BAD_GATEWAY, UPLOAD_FAILED_BODY)
        }
    }
}
