//! Gripper dashboard - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Gripper and rotation actuator dashboard
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via GRIPDASH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    gripdash_app::init_logging();

    info!("Starting gripdash v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > GRIPDASH_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("GRIPDASH_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = gripdash_app::AppConfig::load(&config_path)?;
    info!(base_url = %config.base_url, "Configuration loaded");

    let app = gripdash_app::Application::new(config)?;
    app.run().await?;

    Ok(())
}
