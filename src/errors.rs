use std::time::Duration;

use thiserror::Error;

/// All errors that can occur when talking to the Video Indexer API.
#[derive(Error, Debug)]
pub enum IndexerError {
    /// The configuration is missing, unreadable, malformed, or incomplete.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The access token request failed.
    #[error("authentication failed{}: {message}", status_suffix(.status_code))]
    Authentication {
        status_code: Option<u16>,
        message: String,
    },

    /// The media upload failed, the file could not be opened, or the server
    /// did not return a video id.
    #[error("upload failed{}: {message}", status_suffix(.status_code))]
    Upload {
        status_code: Option<u16>,
        message: String,
    },

    /// The index/status request failed.
    #[error("status fetch failed{}: {message}", status_suffix(.status_code))]
    StatusFetch {
        status_code: Option<u16>,
        message: String,
    },

    /// The job reached a terminal failure state such as `Failed`.
    #[error("job {job_id} ended in state {state}")]
    JobFailed { job_id: String, state: String },

    /// Polling hit the attempt cap or the deadline before the job finished.
    #[error("job still pending after {attempts} attempts ({elapsed:?})")]
    Timeout { attempts: u32, elapsed: Duration },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error while persisting or reading a result file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A result file did not contain valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn status_suffix(status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

/// A convenience alias for `Result<T, IndexerError>`.
pub type Result<T> = std::result::Result<T, IndexerError>;
