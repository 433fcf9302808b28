// Health, system information and greeting endpoints
// None of these can fail and all of them accept any method

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use hyper::body::Bytes;
use hyper::{Request, StatusCode};

use super::response::json_response;
use super::types::{GreetingResponse, StatusResponse, SystemInfoResponse};
use crate::config::AppState;
use crate::http::HttpResponse;

/// Compiler version captured by the build script
const RUNTIME_VERSION: &str = env!("DEMO_ROUTER_RUSTC_VERSION");

const DEFAULT_GREETING_NAME: &str = "World";

/// GET /health
#[allow(clippy::unused_async)]
pub async fn health(_req: Request<Bytes>, state: Arc<AppState>) -> HttpResponse {
    let response = StatusResponse {
        status: "ok".to_string(),
        message: format!("{} is running!", state.config.http.server_name),
        timestamp: Utc::now(),
    };
    json_response(StatusCode::OK, &response)
}

/// GET /system
#[allow(clippy::unused_async)]
pub async fn system_info(_req: Request<Bytes>, _state: Arc<AppState>) -> HttpResponse {
    let info = SystemInfoResponse {
        os: std::env::consts::OS.to_string(),
        architecture: std::env::consts::ARCH.to_string(),
        cpu_count: std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
        runtime_version: RUNTIME_VERSION.to_string(),
    };
    json_response(StatusCode::OK, &info)
}

/// GET /greet?name=<name>
#[allow(clippy::unused_async)]
pub async fn greet(req: Request<Bytes>, state: Arc<AppState>) -> HttpResponse {
    let name = req
        .uri()
        .query()
        .and_then(|q| query_param(q, "name"))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_GREETING_NAME.to_string());

    let response = GreetingResponse {
        greeting: format!("Hello, {name}! from {}", state.config.http.server_name),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    json_response(StatusCode::OK, &response)
}

/// First value of `key` in a form-urlencoded query string
///
/// Pairs containing a malformed percent escape are skipped entirely.
fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty() && has_valid_escapes(pair))
        .flat_map(|pair| url::form_urlencoded::parse(pair.as_bytes()))
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Every `%` must be followed by two hex digits
fn has_valid_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::Method;
    use serde_json::Value;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::for_tests("."))
    }

    fn get(uri: &str) -> Request<Bytes> {
        Request::get(uri).body(Bytes::new()).unwrap()
    }

    async fn json_of(resp: HttpResponse) -> Value {
        assert_eq!(resp.headers()["content-type"], "application/json");
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let resp = health(get("/health"), state()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_of(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Rust backend is running!");
        let ts = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[tokio::test]
    async fn test_health_accepts_any_method() {
        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/health")
            .body(Bytes::new())
            .unwrap();
        assert_eq!(health(req, state()).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_system_info() {
        let body = json_of(system_info(get("/system"), state()).await).await;
        assert_eq!(body["os"], std::env::consts::OS);
        assert_eq!(body["architecture"], std::env::consts::ARCH);
        assert!(body["cpuCount"].as_u64().unwrap() >= 1);
        assert!(!body["runtimeVersion"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_system_info_is_stable() {
        let first = json_of(system_info(get("/system"), state()).await).await;
        let second = json_of(system_info(get("/system"), state()).await).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_health_is_stable_apart_from_timestamp() {
        let mut first = json_of(health(get("/health"), state()).await).await;
        let mut second = json_of(health(get("/health"), state()).await).await;
        assert!(first.as_object_mut().unwrap().remove("timestamp").is_some());
        assert!(second.as_object_mut().unwrap().remove("timestamp").is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_greet_is_stable_apart_from_time() {
        let mut first = json_of(greet(get("/greet?name=Ada"), state()).await).await;
        let mut second = json_of(greet(get("/greet?name=Ada"), state()).await).await;
        assert!(first.as_object_mut().unwrap().remove("time").is_some());
        assert!(second.as_object_mut().unwrap().remove("time").is_some());
        assert_eq!(first, second);
        assert_eq!(first.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_greet_defaults_to_world() {
        for uri in ["/greet", "/greet?name=", "/greet?other=1"] {
            let body = json_of(greet(get(uri), state()).await).await;
            assert_eq!(body["greeting"], "Hello, World! from Rust backend", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_greet_with_name() {
        let body = json_of(greet(get("/greet?name=Ada"), state()).await).await;
        assert_eq!(body["greeting"], "Hello, Ada! from Rust backend");
        let time = body["time"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
        assert!(time.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_greet_decodes_query() {
        let body = json_of(greet(get("/greet?name=Ada+Lovelace&name=Bob"), state()).await).await;
        assert!(body["greeting"].as_str().unwrap().contains("Ada Lovelace"));

        let body = json_of(greet(get("/greet?name=Gr%C3%A9ce"), state()).await).await;
        assert!(body["greeting"].as_str().unwrap().contains("Gréce"));
    }

    #[tokio::test]
    async fn test_greet_malformed_name_is_absent() {
        for uri in ["/greet?name=%ZZ", "/greet?name=%", "/greet?name=ab%4", "/greet?na%me=Ada"] {
            let body = json_of(greet(get(uri), state()).await).await;
            assert_eq!(body["greeting"], "Hello, World! from Rust backend", "{uri}");
        }
    }

    #[test]
    fn test_query_param() {
        assert_eq!(query_param("a=1&name=x", "name").as_deref(), Some("x"));
        assert_eq!(query_param("name", "name").as_deref(), Some(""));
        assert_eq!(query_param("%%%", "name"), None);
        assert_eq!(query_param("name=%ZZ&name=Ada", "name").as_deref(), Some("Ada"));
        assert_eq!(query_param("bad=%G1&name=Ada", "name").as_deref(), Some("Ada"));
        assert_eq!(query_param("name=%41da", "name").as_deref(), Some("Ada"));
    }

    #[test]
    fn test_has_valid_escapes() {
        assert!(has_valid_escapes("name=Ada%20Lovelace"));
        assert!(has_valid_escapes("plain"));
        assert!(!has_valid_escapes("name=%"));
        assert!(!has_valid_escapes("name=%4"));
        assert!(!has_valid_escapes("name=%ZZ"));
    }
}
