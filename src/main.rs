//! Web2App Studio
//!
//! Entry point for the terminal studio. Parses CLI flags, initializes
//! logging, picks the generation backend, and runs one wizard session.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use web2app::artifact::resolve_out_dir;
use web2app::gemini::client::{DEFAULT_API_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use web2app::gemini::{GeminiClient, MockGenerator};
use web2app::studio::run_session;
use web2app::types::ContentGenerator;

/// Web2App Studio -- convert web apps to production APKs
#[derive(Parser, Debug)]
#[command(
    name = "web2app",
    version,
    about = "Web2App Studio -- convert web apps to production APKs"
)]
struct Cli {
    /// Run with canned offline content instead of the generation API
    #[arg(long)]
    offline: bool,

    /// Output directory for exported artifacts
    #[arg(long, default_value = "~/Downloads")]
    out: String,

    /// Base URL of the generation API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Model for project and store metadata generation
    #[arg(long, default_value = DEFAULT_TEXT_MODEL)]
    model: String,

    /// Model for icon and feature graphic generation
    #[arg(long, default_value = DEFAULT_IMAGE_MODEL)]
    image_model: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let generator: Arc<dyn ContentGenerator> = if cli.offline {
        Arc::new(MockGenerator::new())
    } else {
        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            eprintln!("No API key found. Set GEMINI_API_KEY, or pass --offline for canned content.");
            std::process::exit(1);
        }
        Arc::new(GeminiClient::new(
            cli.api_url,
            api_key,
            cli.model,
            cli.image_model,
        ))
    };

    let out_dir = resolve_out_dir(&cli.out);
    if let Err(e) = run_session(generator, &out_dir).await {
        eprintln!("Session failed: {}", e);
        std::process::exit(1);
    }
}
