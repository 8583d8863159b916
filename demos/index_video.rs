//! Upload one video, wait for indexing, and save the insights next to you.
//!
//! Run with:
//!   cargo run --example index_video -- --config config.json --media talk.mp4
//!
//! Set `RUST_LOG=video_indexer=debug` for request-level logging.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use video_indexer::{Client, PollOptions};

#[derive(Parser, Debug)]
#[command(about = "Index a video with the Video Indexer API")]
struct Args {
    /// JSON file with AccountId, location and API_KEY.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Media file to upload.
    #[arg(short, long, default_value = "media/1TRILLIONmessages.mp4")]
    media: PathBuf,

    #[arg(long, default_value = "1TRILLIONmessages")]
    name: String,

    #[arg(long, default_value = "1 Trilion Messages")]
    description: String,

    /// Seconds between status checks.
    #[arg(long, default_value_t = 5)]
    interval: u64,

    /// Directory the result JSON is written to.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> video_indexer::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let client = Client::from_config_file(&args.config).await?;

    let video_id = client
        .upload(&args.media, &args.name, &args.description)
        .await?;
    println!("Video {video_id} uploading for indexing...");

    let opts = PollOptions::default()
        .poll_interval(Duration::from_secs(args.interval))
        .on_progress(|job| println!("  state: {}", job.state));
    let index = client.wait_until_processed(&video_id, &opts).await?;

    let path = video_indexer::save_result(&args.out_dir, &video_id, &index).await?;
    println!("Saved {}", path.display());

    Ok(())
}
