// Fibonacci computation endpoint

use std::sync::Arc;
use std::time::Instant;

use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};

use super::response::json_response;
use super::types::{ComputationResponse, ComputeRequest};
use crate::config::AppState;
use crate::http::{build_400_response, build_405_response, HttpResponse};
use crate::logger;

/// Largest accepted input. Bounds response latency whatever the algorithm.
pub const MAX_FIBONACCI_INPUT: i64 = 45;

/// POST /compute with `{"number": n}`
#[allow(clippy::unused_async)]
pub async fn compute(req: Request<Bytes>, _state: Arc<AppState>) -> HttpResponse {
    if req.method() != Method::POST {
        return build_405_response("POST, OPTIONS");
    }

    let request = match decode_request(req.body()) {
        Ok(r) => r,
        Err(e) => {
            logger::log_warning(&format!("Rejected /compute body: {e}"));
            return build_400_response("Invalid request body");
        }
    };

    let Some(n) = u32::try_from(request.number)
        .ok()
        .filter(|&n| i64::from(n) <= MAX_FIBONACCI_INPUT)
    else {
        return build_400_response(&format!(
            "Number must be between 0 and {MAX_FIBONACCI_INPUT}"
        ));
    };

    let start = Instant::now();
    let result = fibonacci(n);
    let elapsed_millis = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    json_response(
        StatusCode::OK,
        &ComputationResponse {
            input: request.number,
            result,
            elapsed_millis,
        },
    )
}

/// Decode a `{"number": n}` object
///
/// Only a JSON object is accepted: serde would otherwise read the
/// sequence `[n]` into the struct positionally.
fn decode_request(body: &[u8]) -> serde_json::Result<ComputeRequest> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(serde::de::Error::invalid_type(
            serde::de::Unexpected::Other("non-object JSON value"),
            &"a JSON object",
        ));
    }
    serde_json::from_value(value)
}

/// n-th Fibonacci number with F(0) = 0, F(1) = 1
///
/// Iterative; exact in `u64` up to n = 93.
pub const fn fibonacci(n: u32) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    let mut i = 0;
    while i < n {
        let next = a.wrapping_add(b);
        a = b;
        b = next;
        i += 1;
    }
    a
}
