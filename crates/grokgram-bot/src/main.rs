use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grokgram")]
#[command(about = "grokgram - relays Telegram chats to Grok")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to a .env file loaded before reading the environment
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Override the default model
    #[arg(short, long)]
    model: Option<String>,

    /// Override the model selected by the `fast.` prefix
    #[arg(long)]
    fast_model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.env_file {
        Some(ref path) => {
            dotenvy::from_path(path).with_context(|| format!("loading {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let mut settings =
        grokgram_core::Settings::load(cli.config.as_deref()).context("loading configuration")?;

    if let Some(model) = cli.model {
        settings.grok.model = model;
    }
    if let Some(fast_model) = cli.fast_model {
        settings.grok.fast_model = fast_model;
    }
    settings.validate().context("invalid configuration")?;

    grokgram_bot::run_bot(settings).await
}
