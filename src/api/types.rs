// Endpoint payload types
// Fixed-shape records serialized as the JSON bodies of the demonstration endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `/health` response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// `/system` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfoResponse {
    pub os: String,
    pub architecture: String,
    pub cpu_count: usize,
    pub runtime_version: String,
}

/// `/compute` request body; unknown fields are ignored
#[derive(Debug, Deserialize)]
pub struct ComputeRequest {
    pub number: i64,
}

/// `/compute` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationResponse {
    pub input: i64,
    pub result: u64,
    /// Time spent in the computation step only
    pub elapsed_millis: u64,
}

/// One `/files` record
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub is_directory: bool,
    pub size_bytes: u64,
    pub modified_time: DateTime<Utc>,
}

/// `/greet` response
#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    pub greeting: String,
    /// RFC3339, second precision
    pub time: String,
}
