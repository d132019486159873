//! Basic image generation example.
//!
//! Run with: `cargo run --example generate_image`
//!
//! Requires `API_KEY` or `GOOGLE_API_KEY` environment variable.

use genstudio::{AspectRatio, GenerationClient};

#[tokio::main]
async fn main() -> genstudio::Result<()> {
    let client = GenerationClient::gemini()?;

    let images = client
        .generate_images(
            "A lighthouse on a cliff at dusk, dramatic clouds",
            AspectRatio::Landscape,
            2,
        )
        .await?;

    for (i, image) in images.iter().enumerate() {
        let path = format!("lighthouse-{}.{}", i + 1, image.format.extension());
        image.save(&path)?;
        println!("Generated image: {} ({} bytes)", path, image.size());
    }

    Ok(())
}
