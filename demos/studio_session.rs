//! Drives the studio controller the way the front end does: compose a
//! prompt, translate a negative prompt, generate, then reuse history.
//!
//! Run with: `cargo run --example studio_session`
//!
//! Requires `API_KEY` or `GOOGLE_API_KEY` environment variable.

use genstudio::{
    ActionOutcome, GenerationClient, PromptParts, Studio, Style, TranslationTarget,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let studio = Studio::new(GenerationClient::gemini()?);

    let parts = PromptParts {
        subject: "a majestic lion".into(),
        setting: "in the Serengeti".into(),
        composition: "wide-angle shot".into(),
        lighting: "golden hour".into(),
        ..PromptParts::default()
    };
    studio.use_prompt_parts(&parts);
    studio.set_style(Style::Cinematic);
    studio.set_count(2);

    if studio.translate("flou, texte", "French", "English").await? == ActionOutcome::Completed {
        studio.use_translation(TranslationTarget::NegativePrompt);
    }

    match studio.generate().await? {
        ActionOutcome::Completed => {}
        ActionOutcome::Failed(err) => {
            eprintln!("{:?}: {}", err.category, err.message);
            return Ok(());
        }
        ActionOutcome::Superseded => return Ok(()),
    }

    let state = studio.snapshot();
    for (i, image) in state.image.images.iter().enumerate() {
        let path = format!("lion-{}.{}", i + 1, image.format.extension());
        image.save(&path)?;
        println!("Saved {}", path);
    }

    if let Some(entry) = state.history.iter().next() {
        studio.reuse_history(entry.id)?;
        println!("Reused history entry {}: {}", entry.id, studio.snapshot().image.form.prompt);
    }

    Ok(())
}
