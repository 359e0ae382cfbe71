use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use sensor_infrastructure::{AppConfig, CONFIG_PATH_ENV};

#[derive(Parser, Debug)]
#[command(name = "sensor-analyzer")]
#[command(about = "AI Sensor Analyzer Server", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine.
    dotenvy::dotenv().ok();

    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var(CONFIG_PATH_ENV, config);
    }

    let config_path = AppConfig::config_path();
    let config = AppConfig::load_from(&config_path).await?;
    let _log_guard = sensor_bootstrap::logging::init_tracing(config.log_dir.as_deref())?;

    if config_path.exists() {
        info!("loaded config from {}", config_path.display());
    } else {
        warn!("{} not found, using defaults", config_path.display());
    }

    sensor_bootstrap::run_standalone(config).await
}
