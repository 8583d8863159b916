//! # Video Indexer client
//!
//! Async Rust client for the [Video Indexer](https://api.videoindexer.ai) API.
//! Authenticate with account credentials, upload a media file, poll until
//! indexing finishes, and save the resulting insights document.
//!
//! ## Quick start
//!
//! ```no_run
//! use video_indexer::{Client, PollOptions};
//!
//! #[tokio::main]
//! async fn main() -> video_indexer::Result<()> {
//!     // config.json: {"AccountId": "...", "location": "trial", "API_KEY": "..."}
//!     let client = Client::from_config_file("config.json").await?;
//!
//!     let (video_id, index) = client
//!         .index_file("meeting.mp4", "meeting", "Weekly sync", &PollOptions::default())
//!         .await?;
//!
//!     let path = video_indexer::save_result(".", &video_id, &index).await?;
//!     println!("saved {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Bounded polling
//!
//! The default [`PollOptions`] poll every 5 seconds with no limit. Use
//! [`Client::poll`] with a cap to get a [`JobOutcome`] instead of waiting
//! forever:
//!
//! ```no_run
//! use std::time::Duration;
//! use video_indexer::{Client, JobOutcome, PollOptions};
//!
//! # async fn example(client: &Client, video_id: &str) -> video_indexer::Result<()> {
//! let opts = PollOptions::default()
//!     .poll_interval(Duration::from_secs(10))
//!     .timeout(Duration::from_secs(30 * 60));
//!
//! match client.poll(video_id, &opts).await? {
//!     JobOutcome::Processed(job) => println!("done: {}", job.raw),
//!     JobOutcome::Failed(job) => eprintln!("indexing failed: {}", job.state),
//!     JobOutcome::Pending { attempts, last } => {
//!         eprintln!("still {} after {attempts} polls", last.state)
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod errors;
mod models;
mod output;

pub use client::{Client, ClientBuilder};
pub use config::Credentials;
pub use errors::{IndexerError, Result};
pub use models::{AccessToken, IndexJob, JobOutcome, PollOptions, FAILURE_STATES, STATE_PROCESSED};
pub use output::{load_result, result_file_name, save_result};
