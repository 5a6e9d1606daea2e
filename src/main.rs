//! Waveframe CLI
//!
//! `waveform` and `frame` produce the conditioning images on their own;
//! `generate` runs the full pipeline against the video-generation API.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waveframe::frame::extract_midpoint_frame;
use waveframe::generate::{
    AudioMode, CharacterVoice, ClientConfig, GeneratePipeline, GenerateRequest, PromptSpec,
    VideoApiClient,
};
use waveframe::media::EncodedImage;
use waveframe::utils::error::{AppError, ErrorResponse};
use waveframe::waveform::{rasterize_waveform, WaveformStyle};

#[derive(Parser)]
#[command(
    name = "waveframe",
    version,
    about = "Turn audio and reference footage into AI-generated video"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an audio file's waveform as a PNG image
    Waveform {
        /// Audio file to render
        input: PathBuf,
        /// Output PNG path
        #[arg(short, long, default_value = "waveform.png")]
        output: PathBuf,
        /// Canvas width in pixels
        #[arg(long, default_value_t = 800)]
        width: u32,
        /// Canvas height in pixels
        #[arg(long, default_value_t = 150)]
        height: u32,
    },
    /// Extract the midpoint frame of a video as a PNG image
    Frame {
        /// Video file to capture from
        input: PathBuf,
        /// Output PNG path
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,
    },
    /// Generate a video from a prompt plus optional audio and reference media
    Generate {
        /// Scene description
        #[arg(long)]
        scene: String,
        /// Audio track the result must lip-sync against
        #[arg(long)]
        audio: Option<PathBuf>,
        /// Reference video for the conditioning frame
        #[arg(long)]
        reference_video: Option<PathBuf>,
        /// Character appearance description
        #[arg(long)]
        character: Option<String>,
        /// Character voice preset
        #[arg(long, value_enum, default_value = "default")]
        voice: CharacterVoice,
        /// Dialogue or action line
        #[arg(long)]
        dialogue: Option<String>,
        /// Video duration in seconds
        #[arg(long, default_value_t = 10)]
        duration: u32,
        /// Output video path
        #[arg(short, long, default_value = "generated.mp4")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waveframe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting waveframe v{}", env!("CARGO_PKG_VERSION"));

    if let Err(error) = run(Cli::parse()).await {
        match error.downcast::<AppError>() {
            Ok(app_error) => {
                let response = ErrorResponse::from(app_error);
                eprintln!("{}: {}", response.code, response.message);
            }
            Err(other) => eprintln!("ERROR: {:#}", other),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Waveform {
            input,
            output,
            width,
            height,
        } => {
            let audio = std::fs::read(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let style = WaveformStyle {
                width,
                height,
                ..WaveformStyle::default()
            };

            let image = rasterize_waveform(&audio, &style)
                .await
                .map_err(AppError::from)?;
            write_image(&image, &output)?;
            println!(
                "Wrote {}x{} waveform to {}",
                image.width,
                image.height,
                output.display()
            );
        }
        Commands::Frame { input, output } => {
            let video = std::fs::read(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;

            let image = extract_midpoint_frame(&video)
                .await
                .map_err(AppError::from)?;
            write_image(&image, &output)?;
            println!(
                "Wrote {}x{} frame to {}",
                image.width,
                image.height,
                output.display()
            );
        }
        Commands::Generate {
            scene,
            audio,
            reference_video,
            character,
            voice,
            dialogue,
            duration,
            output,
        } => {
            let api_key = std::env::var("GEMINI_API_KEY")
                .context("GEMINI_API_KEY is not set; put it in the environment or a .env file")?;

            let audio_bytes = audio
                .as_deref()
                .map(std::fs::read)
                .transpose()
                .context("failed to read audio file")?;
            let reference_bytes = reference_video
                .as_deref()
                .map(std::fs::read)
                .transpose()
                .context("failed to read reference video")?;

            let audio_mode = if audio_bytes.is_some() {
                AudioMode::Upload
            } else {
                AudioMode::Generate
            };

            let request = GenerateRequest {
                prompt: PromptSpec {
                    scene,
                    character_description: character,
                    voice,
                    dialogue,
                    duration_secs: duration,
                    audio: audio_mode,
                },
                audio: audio_bytes,
                reference_video: reference_bytes,
            };

            let client = VideoApiClient::new(ClientConfig::new(api_key));
            let pipeline = GeneratePipeline::new(
                client,
                WaveformStyle::default(),
                Arc::new(AtomicBool::new(false)),
            );

            let video = pipeline
                .run(&request, |progress| {
                    println!("[{:>5.1}%] {}", progress.percent, progress.message());
                })
                .await
                .map_err(AppError::from)?;

            std::fs::write(&output, &video)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Wrote generated video to {}", output.display());
        }
    }

    Ok(())
}

fn write_image(image: &EncodedImage, output: &Path) -> anyhow::Result<()> {
    let png = image
        .to_png_bytes()
        .context("image payload is not valid base64")?;
    std::fs::write(output, png).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}
