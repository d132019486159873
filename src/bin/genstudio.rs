//! CLI for GenStudio - image, edit, video and translation from the terminal.

use clap::{Args, Parser, Subcommand};
use genstudio::client::GenerationClient;
use genstudio::{
    ActionOutcome, AspectRatio, GeminiBackend, Model, Studio, Style, Surface, TranslationTarget,
    Upload, ValidationError,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genstudio")]
#[command(about = "Generate and edit images and videos with Imagen, Gemini and Veo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// API key (defaults to API_KEY or GOOGLE_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate images from a text prompt
    Image(ImageArgs),

    /// Edit an image with a text prompt
    Edit(EditArgs),

    /// Generate a video from a text prompt and optional image
    Video(VideoArgs),

    /// Translate text between languages
    Translate(TranslateArgs),

    /// List the model catalog
    Models,
}

#[derive(Args)]
struct ImageArgs {
    /// The text prompt describing the image
    prompt: String,

    /// Output file path; numbered when more than one image is requested
    #[arg(short, long)]
    output: PathBuf,

    /// Things to keep out of the image
    #[arg(short, long)]
    negative: Option<String>,

    /// Aspect ratio (1:1, 16:9, 9:16, 4:3, 3:4)
    #[arg(long, default_value = "1:1", value_parser = parse_aspect_ratio)]
    aspect_ratio: AspectRatio,

    /// Style preset (e.g., cinematic, digital-art)
    #[arg(long, default_value = "none", value_parser = parse_style)]
    style: Style,

    /// Number of images (1-4)
    #[arg(short = 'n', long, default_value_t = 1)]
    count: u8,

    /// Translate the prompt from this language to English first
    #[arg(long)]
    translate_from: Option<String>,
}

#[derive(Args)]
struct EditArgs {
    /// Edit instruction
    prompt: String,

    /// Image to edit
    #[arg(short, long)]
    input: PathBuf,

    /// Output file path for the edited image
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct VideoArgs {
    /// The text prompt describing the video
    prompt: String,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Reference image to animate
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Give up after this many seconds (default: wait until done)
    #[arg(long)]
    max_wait: Option<u64>,

    /// Seconds between status polls
    #[arg(long, default_value_t = 10)]
    poll_interval: u64,
}

#[derive(Args)]
struct TranslateArgs {
    /// Text to translate
    text: String,

    /// Source language
    #[arg(long, default_value = "English")]
    from: String,

    /// Target language
    #[arg(long)]
    to: String,
}

fn parse_aspect_ratio(value: &str) -> Result<AspectRatio, String> {
    AspectRatio::parse(value).ok_or_else(|| {
        let valid: Vec<&str> = AspectRatio::ALL.iter().map(|r| r.as_str()).collect();
        format!("expected one of {}", valid.join(", "))
    })
}

fn parse_style(value: &str) -> Result<Style, String> {
    Style::parse(value).ok_or_else(|| {
        let valid: Vec<&str> = Style::ALL.iter().map(|s| s.as_str()).collect();
        format!("expected one of {}", valid.join(", "))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("genstudio=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Image(args) => {
            let studio = studio(cli.api_key.as_deref())?;
            generate_image(&studio, args, cli.json).await?;
        }
        Commands::Edit(args) => {
            let studio = studio(cli.api_key.as_deref())?;
            edit_image(&studio, args, cli.json).await?;
        }
        Commands::Video(args) => {
            let client = client(cli.api_key.as_deref(), Some(&args))?;
            generate_video(&Studio::new(client), args, cli.json).await?;
        }
        Commands::Translate(args) => {
            let studio = studio(cli.api_key.as_deref())?;
            translate(&studio, args, cli.json).await?;
        }
        Commands::Models => {
            list_models(cli.json)?;
        }
    }

    Ok(())
}

fn client(api_key: Option<&str>, video: Option<&VideoArgs>) -> anyhow::Result<GenerationClient> {
    let mut backend = GeminiBackend::builder();
    if let Some(key) = api_key {
        backend = backend.api_key(key);
    }

    let mut builder = GenerationClient::builder(Arc::new(backend.build()?));
    if let Some(args) = video {
        builder = builder.poll_interval(Duration::from_secs(args.poll_interval.max(1)));
        if let Some(secs) = args.max_wait {
            builder = builder.max_wait(Duration::from_secs(secs));
        }
    }
    Ok(builder.build())
}

fn studio(api_key: Option<&str>) -> anyhow::Result<Studio> {
    Ok(Studio::new(client(api_key, None)?))
}

/// Turns an action outcome into a CLI error when it did not complete.
fn finish(outcome: Result<ActionOutcome, ValidationError>) -> anyhow::Result<()> {
    match outcome? {
        ActionOutcome::Completed => Ok(()),
        ActionOutcome::Failed(classified) => anyhow::bail!("{}", classified.message),
        ActionOutcome::Superseded => anyhow::bail!("request was superseded"),
    }
}

/// `out.png` for a single image, `out-1.png`, `out-2.png`... otherwise.
fn numbered_path(base: &Path, index: usize, total: usize, extension: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let name = if total > 1 {
        format!("{}-{}.{}", stem, index + 1, extension)
    } else {
        format!("{}.{}", stem, extension)
    };
    base.with_file_name(name)
}

async fn generate_image(studio: &Studio, args: ImageArgs, json_output: bool) -> anyhow::Result<()> {
    studio.select_model(Model::Imagen4)?;
    studio.set_prompt(&args.prompt);
    if let Some(ref negative) = args.negative {
        studio.set_negative_prompt(negative);
    }
    studio.set_aspect_ratio(args.aspect_ratio);
    studio.set_style(args.style);
    studio.set_count(args.count);

    if let Some(ref from) = args.translate_from {
        finish(studio.translate(&args.prompt, from, "English").await)?;
        studio.use_translation(TranslationTarget::Prompt);
    }

    finish(studio.generate().await)?;

    let state = studio.snapshot();
    let images = &state.image.images;
    if images.is_empty() {
        anyhow::bail!("no images were returned");
    }

    let mut outputs = Vec::with_capacity(images.len());
    for (i, image) in images.iter().enumerate() {
        let path = numbered_path(&args.output, i, images.len(), image.format.extension());
        image.save(&path)?;
        outputs.push(path);
    }

    if json_output {
        let result = serde_json::json!({
            "type": "image",
            "success": true,
            "outputs": outputs.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            "requested": args.count,
            "received": images.len(),
            "model": Model::Imagen4.id(),
            "history_id": state.history.iter().next().map(|e| e.id),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for (path, image) in outputs.iter().zip(images) {
            println!("Generated image: {} ({} bytes)", path.display(), image.size());
        }
        if images.len() < args.count as usize {
            println!("Note: {} of {} requested images returned", images.len(), args.count);
        }
    }

    Ok(())
}

async fn edit_image(studio: &Studio, args: EditArgs, json_output: bool) -> anyhow::Result<()> {
    studio.select_model(Model::NanoBanana)?;
    studio.set_upload(Some(Upload::File(args.input.clone())));
    studio.set_prompt(&args.prompt);

    finish(studio.generate().await)?;

    let state = studio.snapshot();
    let saved = match state.image.images.first() {
        Some(image) => {
            let path = numbered_path(&args.output, 0, 1, image.format.extension());
            image.save(&path)?;
            Some(path)
        }
        None => None,
    };

    if json_output {
        let result = serde_json::json!({
            "type": "edit",
            "success": true,
            "output": saved.as_ref().map(|p| p.display().to_string()),
            "text": state.image.edit_text,
            "model": Model::NanoBanana.id(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        match saved {
            Some(path) => println!("Edited image: {}", path.display()),
            None => println!("No image was produced."),
        }
        if let Some(text) = state.image.edit_text {
            println!("{}", text);
        }
    }

    Ok(())
}

async fn generate_video(studio: &Studio, args: VideoArgs, json_output: bool) -> anyhow::Result<()> {
    studio.switch_surface(Surface::VideoStudio);
    studio.set_video_prompt(&args.prompt);
    studio.set_video_upload(args.image.clone().map(Upload::File));

    let run = studio.generate_video();
    tokio::pin!(run);
    let mut ticker = tokio::time::interval(Duration::from_secs(15));
    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            _ = ticker.tick() => {
                if let Some(progress) = studio.snapshot().video.progress {
                    tracing::info!(
                        state = ?progress.state,
                        polls = progress.polls,
                        elapsed_secs = progress.elapsed.as_secs(),
                        "waiting for video"
                    );
                }
            }
        }
    };
    finish(outcome)?;

    let Some(video) = studio.snapshot().video.video else {
        anyhow::bail!("no video was stored");
    };
    video.save(&args.output)?;

    if json_output {
        let result = serde_json::json!({
            "type": "video",
            "success": true,
            "output": args.output.display().to_string(),
            "size_bytes": video.size(),
            "model": video.metadata.model,
            "duration_ms": video.metadata.duration_ms,
            "polls": video.metadata.polls,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated video: {} ({} bytes)",
            args.output.display(),
            video.size()
        );
        if let Some(duration) = video.metadata.duration_ms {
            println!("Generation time: {}ms ({} polls)", duration, video.metadata.polls);
        }
    }

    Ok(())
}

async fn translate(studio: &Studio, args: TranslateArgs, json_output: bool) -> anyhow::Result<()> {
    finish(studio.translate(&args.text, &args.from, &args.to).await)?;
    let translated = studio.snapshot().translator.result.unwrap_or_default();

    if json_output {
        let result = serde_json::json!({
            "type": "translation",
            "success": true,
            "from": args.from,
            "to": args.to,
            "text": translated,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", translated);
    }

    Ok(())
}

fn list_models(json_output: bool) -> anyhow::Result<()> {
    let models: Vec<_> = Model::ALL.iter().map(Model::descriptor).collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&models)?);
    } else {
        println!("Models:\n");
        for m in &models {
            let status = if m.functional { "✓" } else { "✗" };
            let kind = if m.editing { " [edit]" } else { "" };
            println!("  {} {}{} ({})", status, m.name, kind, m.id);
            println!("    {}", m.description);
        }
        println!("\nAspect ratios:");
        for r in AspectRatio::ALL {
            println!("  {}", r.label());
        }
        println!("\nStyles:");
        for s in Style::ALL {
            println!("  {}", s.as_str());
        }
    }

    Ok(())
}
