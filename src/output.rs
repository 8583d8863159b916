use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::Result;

/// File name used for a saved index document.
pub fn result_file_name(job_id: &str) -> String {
    format!("response_video_{job_id}.json")
}

/// Write `document` verbatim (pretty-printed, 2-space indent) to
/// `dir/response_video_{job_id}.json` and return the path written.
pub async fn save_result(dir: impl AsRef<Path>, job_id: &str, document: &Value) -> Result<PathBuf> {
    let path = dir.as_ref().join(result_file_name(job_id));
    let mut text = serde_json::to_string_pretty(document)?;
    text.push('\n');
    tokio::fs::write(&path, text).await?;
    tracing::info!(job_id, path = %path.display(), "saved index result");
    Ok(path)
}

/// Read back a document written by [`save_result`].
pub async fn load_result(path: impl AsRef<Path>) -> Result<Value> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
