//! Request parameter extraction
//!
//! The editor form posts `application/x-www-form-urlencoded`; API clients may
//! post `{"content": "..."}` as JSON. Anything else carries no content.

use hyper::header::CONTENT_TYPE;
use hyper::HeaderMap;

use crate::http::query;

/// The `content` field of a POST body, if present and a string
pub fn submitted_content(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/json" => json_content(body),
        "application/x-www-form-urlencoded" => {
            query::single_value(Some(std::str::from_utf8(body).ok()?), "content")
        }
        _ => None,
    }
}

fn json_content(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("content")?.as_str().map(ToString::to_string)
}
