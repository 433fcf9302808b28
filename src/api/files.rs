// Directory listing endpoint
// Lists the configured directory (process working directory by default)

use std::io;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};

use super::response::json_response;
use super::types::FileEntry;
use crate::config::AppState;
use crate::http::{build_405_response, build_500_response, HttpResponse};
use crate::logger;

/// GET /files
pub async fn list_files(req: Request<Bytes>, state: Arc<AppState>) -> HttpResponse {
    if req.method() != Method::GET {
        return build_405_response("GET, OPTIONS");
    }

    let dir = Path::new(&state.config.http.files_dir);
    match read_entries(dir).await {
        Ok(entries) => json_response(StatusCode::OK, &entries),
        Err(e) => {
            logger::log_error(&format!("Failed to read directory {}: {e}", dir.display()));
            build_500_response(&e.to_string())
        }
    }
}

/// Describe every entry of `dir` in directory-listing order
///
/// Failing to open or iterate the directory fails the whole listing. An entry
/// whose metadata cannot be read is left out and logged.
pub async fn read_entries(dir: &Path) -> io::Result<Vec<FileEntry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        match describe(&entry).await {
            Ok(file) => entries.push(file),
            Err(e) => logger::log_warning(&format!(
                "Skipping {}: failed to read metadata: {e}",
                entry.path().display()
            )),
        }
    }

    Ok(entries)
}

async fn describe(entry: &tokio::fs::DirEntry) -> io::Result<FileEntry> {
    let metadata = entry.metadata().await?;
    let modified = metadata.modified()?;
    Ok(FileEntry {
        name: entry.file_name().to_string_lossy().into_owned(),
        is_directory: metadata.is_dir(),
        size_bytes: metadata.len(),
        modified_time: DateTime::<Utc>::from(modified),
    })
}
