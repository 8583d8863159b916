use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Body, Response};
use serde_json::Value;
use tokio::time::Instant;
use tokio_util::io::ReaderStream;

use crate::config::Credentials;
use crate::errors::{IndexerError, Result};
use crate::models::{
    error_message, video_id_from_value, AccessToken, IndexJob, JobOutcome, PollOptions,
};

const DEFAULT_BASE_URL: &str = "https://api.videoindexer.ai";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PRIVACY: &str = "Private";
const DEFAULT_PARTITION: &str = "demos";

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

type RequestIdFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use video_indexer::ClientBuilder;
/// use std::time::Duration;
///
/// # async fn example() -> video_indexer::Result<()> {
/// let client = ClientBuilder::new()
///     .config_file("config.json")
///     .timeout(Duration::from_secs(120))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    credentials: Option<Credentials>,
    config_file: Option<PathBuf>,
    base_url: String,
    timeout: Duration,
    request_id: RequestIdFn,
    privacy: String,
    partition: String,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            credentials: None,
            config_file: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            request_id: Arc::new(|| uuid::Uuid::new_v4().to_string()),
            privacy: DEFAULT_PRIVACY.to_string(),
            partition: DEFAULT_PARTITION.to_string(),
        }
    }

    /// Use these credentials. Takes precedence over [`config_file`](Self::config_file).
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Load credentials from a JSON configuration file at build time.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the base URL (defaults to `https://api.videoindexer.ai`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request HTTP timeout (defaults to 30 seconds).
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Replace the generator for the `x-ms-client-request-id` header sent on
    /// each authentication call. Defaults to a random UUID.
    pub fn request_id_generator(mut self, f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.request_id = Arc::new(f);
        self
    }

    /// Privacy level sent with uploads (defaults to `"Private"`).
    pub fn privacy(mut self, privacy: impl Into<String>) -> Self {
        self.privacy = privacy.into();
        self
    }

    /// Partition sent with uploads (defaults to `"demos"`).
    pub fn partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }

    /// Build the [`Client`] and obtain its first access token.
    ///
    /// Credentials come from [`credentials`](Self::credentials), then
    /// [`config_file`](Self::config_file), then the `VIDEO_INDEXER_*`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// - [`IndexerError::Config`] if no usable credentials are found.
    /// - [`IndexerError::Authentication`] if the token request fails.
    pub async fn build(self) -> Result<Client> {
        let credentials = match (self.credentials, self.config_file) {
            (Some(creds), _) => creds,
            (None, Some(path)) => Credentials::from_file(path)?,
            (None, None) => Credentials::from_env()?,
        };

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(IndexerError::Http)?;

        let mut client = Client {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            credentials,
            http,
            request_id: self.request_id,
            privacy: self.privacy,
            partition: self.partition,
            token: None,
        };
        client.authenticate().await?;
        Ok(client)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The Video Indexer API client.
///
/// A client always holds an access token: construction authenticates, and a
/// failed [`authenticate`](Self::authenticate) keeps the previous token.
///
/// # Example
///
/// ```no_run
/// use video_indexer::{Client, PollOptions};
///
/// # async fn example() -> video_indexer::Result<()> {
/// let client = Client::from_config_file("config.json").await?;
///
/// let video_id = client.upload("talk.mp4", "talk", "Conference talk").await?;
/// let index = client.wait_until_processed(&video_id, &PollOptions::default()).await?;
/// video_indexer::save_result(".", &video_id, &index).await?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    base_url: String,
    credentials: Credentials,
    http: reqwest::Client,
    request_id: RequestIdFn,
    privacy: String,
    partition: String,
    token: Option<AccessToken>,
}

impl Client {
    /// Load credentials from `path`, then authenticate with default settings.
    ///
    /// For customization, use [`ClientBuilder`] instead.
    pub async fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        ClientBuilder::new()
            .config_file(path.as_ref())
            .build()
            .await
    }

    /// Credentials this client authenticates with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The token obtained by the last successful [`authenticate`](Self::authenticate).
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    /// Request a fresh access token and replace the stored one.
    ///
    /// Sends the subscription key and a newly generated request id. On
    /// failure the stored token is left unchanged. No retry is performed.
    pub async fn authenticate(&mut self) -> Result<()> {
        let url = format!(
            "{}/Auth/{}/Accounts/{}/AccessToken",
            self.base_url,
            self.credentials.location(),
            self.credentials.account_id()
        );
        let request_id = (self.request_id)();
        tracing::debug!(%url, %request_id, "requesting access token");

        let auth_err = |status_code: Option<u16>, message: String| IndexerError::Authentication {
            status_code,
            message,
        };

        let response = self
            .http
            .get(&url)
            .query(&[("allowEdit", "true")])
            .header(SUBSCRIPTION_KEY_HEADER, self.credentials.subscription_key())
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| auth_err(None, redacted("request failed", e)))?;

        let response = check_status(response)
            .await
            .map_err(|(status, message)| auth_err(Some(status), message))?;

        let token: String = response
            .json()
            .await
            .map_err(|e| auth_err(None, redacted("unexpected token response", e)))?;

        self.token = Some(AccessToken::new(token));
        tracing::info!(
            account_id = self.credentials.account_id(),
            location = self.credentials.location(),
            "authenticated"
        );
        Ok(())
    }

    /// Upload a local media file for indexing and return the video id.
    ///
    /// The file is streamed as the multipart part `file`. Its handle belongs
    /// to the request body, so it is closed when the request completes, fails,
    /// or is dropped.
    ///
    /// # Errors
    ///
    /// [`IndexerError::Upload`] if the file cannot be opened, the request
    /// fails, or the response carries no `id`.
    pub async fn upload(
        &self,
        media_path: impl AsRef<Path>,
        name: &str,
        description: &str,
    ) -> Result<String> {
        let media_path = media_path.as_ref();
        let upload_err = |status_code: Option<u16>, message: String| IndexerError::Upload {
            status_code,
            message,
        };

        let file = tokio::fs::File::open(media_path)
            .await
            .map_err(|e| upload_err(None, format!("cannot open {}: {e}", media_path.display())))?;
        let length = file.metadata().await.map(|m| m.len()).ok();

        let file_name = media_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());

        let body = Body::wrap_stream(ReaderStream::new(file));
        let part = match length {
            Some(len) => Part::stream_with_length(body, len),
            None => Part::stream(body),
        }
        .file_name(file_name);
        let form = Form::new().part("file", part);

        let url = format!(
            "{}/{}/Accounts/{}/Videos",
            self.base_url,
            self.credentials.location(),
            self.credentials.account_id()
        );
        tracing::info!(path = %media_path.display(), name, "uploading media for indexing");

        let response = self
            .http
            .post(&url)
            .query(&[
                ("name", name),
                ("description", description),
                ("privacy", self.privacy.as_str()),
                ("partition", self.partition.as_str()),
                ("accessToken", self.token_str()),
            ])
            .multipart(form)
            .send()
            .await
            .map_err(|e| upload_err(None, redacted("request failed", e)))?;

        let response = check_status(response)
            .await
            .map_err(|(status, message)| upload_err(Some(status), message))?;

        let value: Value = response
            .json()
            .await
            .map_err(|e| upload_err(None, redacted("unexpected upload response", e)))?;

        let video_id = video_id_from_value(&value)
            .ok_or_else(|| upload_err(None, "response did not contain a video id".into()))?;

        tracing::info!(video_id = %video_id, "upload accepted");
        Ok(video_id)
    }

    /// Fetch the current index document for a video.
    ///
    /// While indexing is in progress the document carries a non-terminal
    /// `state`. Once processed it also holds the full insights.
    pub async fn fetch_status(&self, job_id: &str) -> Result<Value> {
        let url = format!(
            "{}/{}/Accounts/{}/Videos/{}/Index",
            self.base_url,
            self.credentials.location(),
            self.credentials.account_id(),
            job_id
        );
        let status_err = |status_code: Option<u16>, message: String| IndexerError::StatusFetch {
            status_code,
            message,
        };

        let response = self
            .http
            .get(&url)
            .query(&[("accessToken", self.token_str())])
            .send()
            .await
            .map_err(|e| status_err(None, redacted("request failed", e)))?;

        let response = check_status(response)
            .await
            .map_err(|(status, message)| status_err(Some(status), message))?;

        response
            .json()
            .await
            .map_err(|e| status_err(None, redacted("unexpected index response", e)))
    }

    /// Fetch the current state of a job as an [`IndexJob`].
    pub async fn get_job(&self, job_id: &str) -> Result<IndexJob> {
        let raw = self.fetch_status(job_id).await?;
        Ok(IndexJob::from_value(job_id, raw))
    }

    /// Poll until the job reaches a terminal state, or until the attempt cap
    /// or deadline in `opts` is hit.
    ///
    /// Transport and HTTP failures are returned as errors. Server-side
    /// outcomes are reported through [`JobOutcome`]. At least one status
    /// request is always made, so `max_attempts(0)` behaves like
    /// `max_attempts(1)`. Sleeps are cut short at the deadline, after which
    /// one final status request is made.
    pub async fn poll(&self, job_id: &str, opts: &PollOptions) -> Result<JobOutcome> {
        let deadline = opts.timeout.map(|t| Instant::now() + t);
        let mut attempts: u32 = 0;

        loop {
            let job = self.get_job(job_id).await?;
            attempts += 1;
            tracing::info!(job_id, state = %job.state, attempt = attempts, "polled index state");

            if let Some(ref cb) = opts.on_progress {
                cb(&job);
            }

            if job.is_processed() {
                return Ok(JobOutcome::Processed(job));
            }

            if job.is_failed() {
                tracing::warn!(job_id, state = %job.state, "indexing ended in failure state");
                return Ok(JobOutcome::Failed(job));
            }

            let capped = opts.max_attempts.is_some_and(|max| attempts >= max);
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            if capped || remaining.is_some_and(|r| r.is_zero()) {
                return Ok(JobOutcome::Pending { attempts, last: job });
            }

            let pause = remaining.map_or(opts.poll_interval, |r| r.min(opts.poll_interval));
            tokio::time::sleep(pause).await;
        }
    }

    /// Poll until the job's `state` is exactly `"Processed"` and return the
    /// final document unchanged.
    ///
    /// With [`PollOptions::default`] there is no attempt cap or deadline.
    ///
    /// # Errors
    ///
    /// - [`IndexerError::StatusFetch`] if a status request fails.
    /// - [`IndexerError::JobFailed`] if the job reaches a failure state.
    /// - [`IndexerError::Timeout`] if the attempt cap or deadline is reached.
    pub async fn wait_until_processed(&self, job_id: &str, opts: &PollOptions) -> Result<Value> {
        let started = Instant::now();
        match self.poll(job_id, opts).await? {
            JobOutcome::Processed(job) => Ok(job.raw),
            JobOutcome::Failed(job) => Err(IndexerError::JobFailed {
                job_id: job.id,
                state: job.state,
            }),
            JobOutcome::Pending { attempts, .. } => Err(IndexerError::Timeout {
                attempts,
                elapsed: started.elapsed(),
            }),
        }
    }

    /// Upload a file, then wait for it to be processed. Returns the video id
    /// and the final index document.
    pub async fn index_file(
        &self,
        media_path: impl AsRef<Path>,
        name: &str,
        description: &str,
        opts: &PollOptions,
    ) -> Result<(String, Value)> {
        let video_id = self.upload(media_path, name, description).await?;
        let document = self.wait_until_processed(&video_id, opts).await?;
        Ok((video_id, document))
    }

    fn token_str(&self) -> &str {
        self.token.as_ref().map(AccessToken::as_str).unwrap_or_default()
    }
}

/// Format a reqwest error without its URL, which carries the access token
/// as a query parameter.
fn redacted(context: &str, e: reqwest::Error) -> String {
    format!("{context}: {}", e.without_url())
}

/// Pass through a successful response, or return its status code and a
/// message extracted from the body.
async fn check_status(response: Response) -> std::result::Result<Response, (u16, String)> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        error_message(&text)
    };
    Err((status.as_u16(), message))
}
