use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// State reported by the service once indexing has finished successfully.
pub const STATE_PROCESSED: &str = "Processed";

/// States after which a job will never reach [`STATE_PROCESSED`].
pub const FAILURE_STATES: &[&str] = &["Failed", "Quarantined"];

/// Bearer credential for upload and index calls.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub(crate) fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Current view of an indexing job. Check `state` or use the `is_*` helpers.
#[derive(Debug, Clone)]
pub struct IndexJob {
    pub id: String,
    /// e.g. "Uploaded", "Processing", "Processed", "Failed". Empty if absent.
    pub state: String,
    /// Full index document as returned by the service.
    pub raw: Value,
}

impl IndexJob {
    pub(crate) fn from_value(id: &str, raw: Value) -> Self {
        let state = raw
            .get("state")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        Self {
            id: id.to_string(),
            state,
            raw,
        }
    }

    /// Exact match on `"Processed"`.
    pub fn is_processed(&self) -> bool {
        self.state == STATE_PROCESSED
    }

    /// State is "Failed" or "Quarantined".
    pub fn is_failed(&self) -> bool {
        FAILURE_STATES.contains(&self.state.as_str())
    }

    /// Terminal = won't change anymore.
    pub fn is_terminal(&self) -> bool {
        self.is_processed() || self.is_failed()
    }
}

/// How a bounded poll ended.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Processed(IndexJob),
    Failed(IndexJob),
    /// Attempt cap or deadline reached. `last` is the final observation.
    Pending { attempts: u32, last: IndexJob },
}

/// Polling config for `poll` / `wait_until_processed`.
pub struct PollOptions {
    /// Default: 5s.
    pub poll_interval: Duration,
    /// Default: unlimited.
    pub max_attempts: Option<u32>,
    /// Wall-clock deadline for the whole poll. Default: none.
    pub timeout: Option<Duration>,
    /// Called on each poll iteration with the current `IndexJob`.
    #[allow(clippy::type_complexity)]
    pub on_progress: Option<Box<dyn Fn(&IndexJob) + Send + Sync>>,
}

impl PollOptions {
    pub fn poll_interval(mut self, d: Duration) -> Self {
        self.poll_interval = d;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n);
        self
    }

    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }

    pub fn on_progress(mut self, cb: impl Fn(&IndexJob) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_attempts: None,
            timeout: None,
            on_progress: None,
        }
    }
}

/// Pull the video id out of an upload response. The service normally sends a
/// string, but numeric ids are accepted and rendered as decimal text.
pub(crate) fn video_id_from_value(val: &Value) -> Option<String> {
    match val.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Best-effort error message from a failed response body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("Message")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
