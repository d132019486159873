//! Video generation example with progress reporting.
//!
//! Run with: `cargo run --example generate_video`
//!
//! Requires `API_KEY` or `GOOGLE_API_KEY` environment variable.

use genstudio::{GenerationClient, LroProgress};

#[tokio::main]
async fn main() -> genstudio::Result<()> {
    let client = GenerationClient::gemini()?;

    println!("Generating video (this may take a few minutes)...");
    let report = |progress: &LroProgress| {
        println!(
            "  {:?} after {} polls ({}s)",
            progress.state,
            progress.polls,
            progress.elapsed.as_secs()
        );
    };
    let video = client
        .generate_video_with_progress("Ocean waves crashing on a rocky shore at sunset", None, &report)
        .await?;

    video.save("output.mp4")?;
    println!(
        "Generated video: {} bytes in {:?} ms",
        video.size(),
        video.metadata.duration_ms
    );

    Ok(())
}
