use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator_monitor::{Monitor, MonitorConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Validator address: {}", config.validator_address);
    tracing::info!("Active validator host: {}", config.active_host);
    tracing::info!(
        "Backup validator host: {}",
        config.backup_host.as_deref().unwrap_or("(disabled)")
    );
    tracing::info!("Last validator info file: {}", config.state_file);

    let monitor = match Monitor::from_config(&config) {
        Ok(monitor) => monitor,
        Err(e) => {
            tracing::error!("Failed to initialize monitor: {e}");
            return ExitCode::FAILURE;
        }
    };

    match monitor.run_once().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
