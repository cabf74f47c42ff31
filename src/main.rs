use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flowdeck_core::config::AppConfig;
use flowdeck_core::event::EventBus;
use flowdeck_graph::canvas::Canvas;
use flowdeck_graph::registry::NodeRegistry;
use flowdeck_graph::view::ViewTransform;
use flowdeck_runner::HttpBackend;

#[derive(Parser)]
#[command(name = "flowdeck", version, about = "Terminal canvas for building and running workflows")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "flowdeck.toml")]
    config: PathBuf,

    /// Override the backend base URL
    #[arg(long)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the canvas editor (default)
    Tui,
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("flowdeck=info,warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load config
    let mut config = if cli.config.exists() {
        AppConfig::load(&cli.config)?
    } else {
        warn!(path = %cli.config.display(), "Config file not found, using defaults");
        AppConfig::default()
    };

    if let Some(url) = cli.backend_url {
        config.backend.base_url = url;
    }

    match cli.command {
        Some(Commands::Config) => {
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| anyhow::anyhow!("config render failed: {e}"))?;
            println!("{rendered}");
            Ok(())
        }
        Some(Commands::Tui) | None => {
            info!(backend = %config.backend.base_url, "Starting canvas editor");

            let canvas = Canvas::new(
                NodeRegistry::default_palette(),
                ViewTransform::from_config(&config.canvas),
            );
            let backend = Arc::new(HttpBackend::new(
                config.backend.base_url.clone(),
                config.backend.timeout_secs,
            )?);
            let event_bus = Arc::new(EventBus::default());

            flowdeck_tui::run_tui(canvas, backend, event_bus).await
        }
    }
}
