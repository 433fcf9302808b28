//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route lookup, body collection,
//! handler invocation and access logging.

use crate::config::AppState;
use crate::handler::cors::apply_cors_headers;
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use crate::routing::BodyMode;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderValue, SERVER};
use hyper::http::request::Parts;
use hyper::{Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<HttpResponse, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, peer_addr));

    let mut response = dispatch(req, &state).await;
    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve the route, collect the body and invoke the wrapped handler
async fn dispatch<B>(req: Request<B>, state: &Arc<AppState>) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let Some(route) = state.routes.lookup(req.uri().path()) else {
        return http::build_404_response();
    };
    let handler = Arc::clone(route.handler());
    let body_mode = route.body;

    let (parts, body) = req.into_parts();

    // Preflight never reaches the handler, so its body is never read
    let bytes = if parts.method == Method::OPTIONS || body_mode == BodyMode::Ignore {
        drop(body);
        Bytes::new()
    } else {
        match read_body(&parts, body, state.config.http.max_body_size).await {
            Ok(bytes) => bytes,
            Err(mut resp) => {
                apply_cors_headers(resp.headers_mut());
                return resp;
            }
        }
    };

    handler(Request::from_parts(parts, bytes), Arc::clone(state)).await
}

/// Collect a request body of at most `max_body_size` bytes
///
/// The error is the rejection to send: 413 over the limit, 400 otherwise.
async fn read_body<B>(parts: &Parts, body: B, max_body_size: u64) -> Result<Bytes, HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(resp) = check_body_size(&parts.headers, max_body_size) {
        return Err(resp);
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_warning(&format!(
                "Request body exceeded {max_body_size} bytes on {}",
                parts.uri.path()
            ));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response("Invalid request body"))
        }
    }
}

/// Reject early when Content-Length already announces an oversized body
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<HttpResponse> {
    let size = headers
        .get(hyper::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()?;
    if size > max_body_size {
        logger::log_warning(&format!(
            "Request body too large: {size} bytes (max: {max_body_size})"
        ));
        return Some(http::build_413_response());
    }
    None
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: hyper::header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header(hyper::header::REFERER);
    entry.user_agent = header(hyper::header::USER_AGENT);
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handler::cors::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN};
    use crate::routing::RouteTable;
    use http_body_util::Full;
    use hyper::StatusCode;

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str, body: &str) -> HttpResponse {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap();
        handle_request(req, peer(), Arc::clone(state)).await.unwrap()
    }

    async fn body_of(resp: HttpResponse) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_unmatched_path_is_404_without_cors() {
        let state = Arc::new(AppState::for_tests("."));
        for uri in ["/", "/nope", "/health/", "/greet/extra"] {
            let resp = send(&state, Method::GET, uri, "").await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
            assert!(resp.headers().get("access-control-allow-origin").is_none());
        }
    }

    #[tokio::test]
    async fn test_preflight_on_every_route() {
        let state = Arc::new(AppState::for_tests("."));
        for path in ["/health", "/system", "/compute", "/files", "/greet"] {
            let resp = send(&state, Method::OPTIONS, path, "").await;
            assert_eq!(resp.status(), StatusCode::OK, "{path}");
            assert_eq!(resp.headers()["access-control-allow-origin"], ALLOW_ORIGIN);
            assert_eq!(resp.headers()["access-control-allow-methods"], ALLOW_METHODS);
            assert_eq!(resp.headers()["access-control-allow-headers"], ALLOW_HEADERS);
            assert!(body_of(resp).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_server_header_on_every_response() {
        let state = Arc::new(AppState::for_tests("."));
        for uri in ["/health", "/nope"] {
            let resp = send(&state, Method::GET, uri, "").await;
            assert_eq!(resp.headers()["server"], "Rust backend");
        }
    }

    #[tokio::test]
    async fn test_query_string_does_not_affect_matching() {
        let state = Arc::new(AppState::for_tests("."));
        let resp = send(&state, Method::GET, "/greet?name=Ada", "").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    fn small_body_state() -> Arc<AppState> {
        let mut cfg = Config::for_tests(0, ".");
        cfg.http.max_body_size = 8;
        Arc::new(AppState::new(cfg, RouteTable::standard()))
    }

    #[tokio::test]
    async fn test_body_over_limit_is_413_with_cors() {
        let state = small_body_state();

        let resp = send(&state, Method::POST, "/compute", r#"{"number": 10, "pad": true}"#).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(resp.headers()["access-control-allow-origin"], ALLOW_ORIGIN);
        assert_eq!(resp.headers()["access-control-allow-methods"], ALLOW_METHODS);

        let req = Request::post("/compute")
            .header("content-length", "12")
            .body(Full::new(Bytes::from_static(br#"{"number":1}"#)))
            .unwrap();
        let resp = handle_request(req, peer(), Arc::clone(&state)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(resp.headers()["access-control-allow-origin"], ALLOW_ORIGIN);
    }

    #[tokio::test]
    async fn test_large_body_ignored_by_preflight_and_bodyless_routes() {
        let state = small_body_state();
        let padding = "0123456789abcdef";

        let resp = send(&state, Method::OPTIONS, "/compute", padding).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["access-control-allow-origin"], ALLOW_ORIGIN);
        assert!(body_of(resp).await.is_empty());

        for path in ["/health", "/system", "/greet", "/files"] {
            let resp = send(&state, Method::GET, path, padding).await;
            assert_eq!(resp.status(), StatusCode::OK, "{path}");
            assert_eq!(resp.headers()["access-control-allow-origin"], ALLOW_ORIGIN);
        }
    }

    #[test]
    fn test_content_length_check() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", HeaderValue::from_static("2048"));
        assert!(check_body_size(&headers, 1024).is_some());
        assert!(check_body_size(&headers, 4096).is_none());

        headers.insert("content-length", HeaderValue::from_static("lots"));
        assert!(check_body_size(&headers, 1024).is_none());

        assert!(check_body_size(&HeaderMap::new(), 0).is_none());
    }

    #[test]
    fn test_access_entry_fields() {
        let req = Request::get("/greet?name=Ada")
            .header("user-agent", "curl/8.0")
            .body(())
            .unwrap();
        let entry = access_entry(&req, peer());
        assert_eq!(entry.remote_addr, "127.0.0.1");
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.path, "/greet");
        assert_eq!(entry.query.as_deref(), Some("name=Ada"));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        assert!(entry.referer.is_none());
    }
}
