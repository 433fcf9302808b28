//! Cross-origin wrapper
//!
//! Decorates a handler with a permissive cross-origin policy: preflight
//! `OPTIONS` requests are answered directly, and every response carries the
//! three `Access-Control-Allow-*` headers.

use std::sync::Arc;

use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use hyper::{Method, Request, StatusCode};

use crate::config::AppState;
use crate::http::{build_empty_response, HttpResponse};
use crate::routing::{Handler, HandlerFuture};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Insert the cross-origin headers, replacing any the handler set
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

/// Answer a preflight request: 200 with an empty body
pub fn preflight_response() -> HttpResponse {
    let mut resp = build_empty_response(StatusCode::OK);
    apply_cors_headers(resp.headers_mut());
    resp
}

/// Wrap `inner` so that `OPTIONS` never reaches it and all other requests
/// reach it exactly once, unmodified
pub fn with_cors(inner: Handler) -> Handler {
    Arc::new(
        move |req: Request<Bytes>, state: Arc<AppState>| -> HandlerFuture {
            if req.method() == Method::OPTIONS {
                return Box::pin(async { preflight_response() });
            }

            let fut = inner(req, state);
            Box::pin(async move {
                let mut resp = fut.await;
                apply_cors_headers(resp.headers_mut());
                resp
            })
        },
    )
}
