//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method dispatch, body limits,
//! response decoration and access logging.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::{editor, params};
use crate::config::AppState;
use crate::http::{self, query};
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_entry = state
        .config
        .logging
        .access_log
        .then(|| AccessLogEntry::from_request(&req, peer_addr));

    let mut response = route_request(req, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(mut entry) = access_entry {
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.finish(response.status(), body_bytes, started.elapsed());
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch on method; the path is not significant
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match *req.method() {
        Method::GET => {
            let file = query::single_value(req.uri().query(), "file");
            editor::show(state.gateway.as_ref(), file.as_deref()).await
        }
        Method::POST => handle_post(req, state).await,
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", req.method()));
            http::build_405_response()
        }
    }
}

async fn handle_post<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(req.headers(), max_body_size) {
        return resp;
    }

    let file = query::single_value(req.uri().query(), "file");
    let (parts, body) = req.into_parts();

    // Content-Length may be absent or wrong; enforce the limit while reading too
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!(
                "Request body exceeded {max_body_size} bytes while reading"
            ));
            return http::build_413_response();
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return http::build_text_response(StatusCode::BAD_REQUEST, editor::MISSING_INPUT_BODY);
        }
    };

    let content = params::submitted_content(&parts.headers, &body);
    editor::save(state.gateway.as_ref(), file.as_deref(), content.as_deref()).await
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::memory::MemoryGateway;
    use hyper::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};

    fn state_with(gateway: Arc<MemoryGateway>, config: Config) -> Arc<AppState> {
        Arc::new(AppState::new(config, gateway))
    }

    fn account() -> Arc<MemoryGateway> {
        Arc::new(
            MemoryGateway::new()
                .with_folder("/Drafts")
                .with_file("/a.md", "alpha"),
        )
    }

    fn request(method: &str, uri: &str, content_type: Option<&str>, body: &str) -> Request<Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        builder
            .body(Full::new(Bytes::copy_from_slice(body.as_bytes())))
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> (Response<Full<Bytes>>, String) {
        let resp = handle_request(req, Arc::clone(state), "127.0.0.1:40000".parse().unwrap())
            .await
            .unwrap();
        let (parts, body) = resp.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        (
            Response::from_parts(parts, Full::new(Bytes::new())),
            String::from_utf8(bytes.to_vec()).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let gateway = account();
        let state = state_with(Arc::clone(&gateway), Config::for_tests());
        for method in ["PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"] {
            let req = request(method, "/?file=/a.md", Some("application/json"), r#"{"content":"x"}"#);
            let (resp, _) = send(&state, req).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(resp.headers()[ALLOW], "GET, POST");
        }
        assert_eq!(gateway.calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_server_header_applied() {
        let state = state_with(account(), Config::for_tests());
        let (resp, _) = send(&state, request("GET", "/", None, "")).await;
        assert_eq!(resp.headers()[SERVER], "dropbox-md-cms");
    }

    #[tokio::test]
    async fn test_get_loads_requested_file() {
        let gateway = account();
        let state = state_with(Arc::clone(&gateway), Config::for_tests());
        let (resp, html) = send(&state, request("GET", "/?file=%2Fa.md", None, "")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(html.contains(">\nalpha</textarea>"));
        assert_eq!(gateway.calls(), (1, 1, 0));
    }

    #[tokio::test]
    async fn test_get_with_repeated_file_is_unscoped() {
        let gateway = account();
        let state = state_with(Arc::clone(&gateway), Config::for_tests());
        let (resp, html) = send(&state, request("GET", "/?file=/a.md&file=/b.md", None, "")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(html.contains("disabled placeholder="));
        assert_eq!(gateway.calls(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_post_json_saves() {
        let gateway = account();
        let state = state_with(Arc::clone(&gateway), Config::for_tests());
        let req = request("POST", "/?file=/a.md", Some("application/json"), r#"{"content":"X"}"#);
        let (resp, body) = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()[LOCATION], "/?file=/a.md");
        assert!(body.is_empty());
        assert_eq!(gateway.content_of("/a.md").as_deref(), Some("X"));
    }

    #[tokio::test]
    async fn test_post_form_saves() {
        let gateway = account();
        let state = state_with(Arc::clone(&gateway), Config::for_tests());
        let req = request(
            "POST",
            "/?file=/new.md",
            Some("application/x-www-form-urlencoded"),
            "content=hello+world",
        );
        let (resp, _) = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(gateway.content_of("/new.md").as_deref(), Some("hello world"));
    }

    #[tokio::test]
    async fn test_post_missing_inputs_never_uploads() {
        let gateway = account();
        let state = state_with(Arc::clone(&gateway), Config::for_tests());
        let cases = [
            request("POST", "/", Some("application/json"), r#"{"content":"X"}"#),
            request("POST", "/?file=/a.md", Some("application/json"), r#"{"content":1}"#),
            request("POST", "/?file=/a.md", Some("application/json"), "{}"),
            request("POST", "/?file=/a.md", Some("text/plain"), "X"),
            request("POST", "/", None, ""),
        ];
        for req in cases {
            let (resp, body) = send(&state, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body, editor::MISSING_INPUT_BODY);
        }
        assert_eq!(gateway.calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_post_declared_too_large() {
        let gateway = account();
        let mut config = Config::for_tests();
        config.http.max_body_size = 8;
        let state = state_with(Arc::clone(&gateway), config);

        let mut req = request("POST", "/?file=/a.md", Some("application/json"), r#"{"content":"0123456789"}"#);
        req.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(24u64));
        let (resp, _) = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(gateway.calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_post_streamed_too_large() {
        let gateway = account();
        let mut config = Config::for_tests();
        config.http.max_body_size = 8;
        let state = state_with(Arc::clone(&gateway), config);

        let req = request("POST", "/?file=/a.md", Some("application/json"), r#"{"content":"0123456789"}"#);
        let (resp, _) = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(gateway.calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_post_then_get_round_trip() {
        let state = state_with(Arc::new(MemoryGateway::new()), Config::for_tests());
        let req = request("POST", "/?file=/a.md", Some("application/json"), r#"{"content":"X"}"#);
        let (saved, _) = send(&state, req).await;
        assert_eq!(saved.status(), StatusCode::NO_CONTENT);

        let (resp, html) = send(&state, request("GET", "/?file=/a.md", None, "")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(html.contains(">\nX</textarea>"));
    }
}
