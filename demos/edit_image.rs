//! Image editing example - modifies an existing image with a text prompt.
//!
//! Run with: `cargo run --example edit_image -- <input_image.png>`
//!
//! Requires `API_KEY` or `GOOGLE_API_KEY` environment variable.

use genstudio::{GenerationClient, Upload};

#[tokio::main]
async fn main() -> genstudio::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: edit_image <input_image.png>");

    let client = GenerationClient::gemini()?;
    let image = Upload::File(input_path.into()).encode().await?;

    let result = client
        .edit_image("Make the colors more vibrant and add a warm sunset glow", &image)
        .await?;

    if let Some(text) = &result.text {
        println!("Model says: {}", text);
    }
    match &result.image {
        Some(edited) => {
            let path = format!("edited.{}", edited.format.extension());
            edited.save(&path)?;
            println!("Edited image saved to {} ({} bytes)", path, edited.size());
        }
        None => println!("No image was returned."),
    }

    Ok(())
}
