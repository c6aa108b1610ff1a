use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use validator_exporter::{
    routes, spawn_refresher, watch_refresher, AppState, MetricsExporter, SnapshotCache,
};
use validator_monitor::{MonitorConfig, RemoteApiClient, SnapshotFetcher};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = MonitorConfig::from_env().expect("Failed to load configuration");
    let port = config.port;

    tracing::info!("Starting validator-exporter on port {}", port);
    tracing::info!("Validator address: {}", config.validator_address);
    tracing::info!("Refresh interval: {}s", config.fetch_interval_secs);

    let client = RemoteApiClient::new(&config).expect("Failed to create HTTP client");
    let fetcher = SnapshotFetcher::new(client, config.max_stake_pages);

    let exporter = Arc::new(
        MetricsExporter::new(SnapshotCache::new()).expect("Failed to register metrics"),
    );

    // Scrapes before the first refresh completes are served zeroed gauges.
    let refresher = spawn_refresher(
        fetcher,
        config.validator_address.clone(),
        exporter.clone(),
        config.fetch_interval(),
    );

    let state = web::Data::new(AppState::new(exporter, config.validator_address.clone()));

    // Reachable from any interface; restrict with firewall rules.
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", port))?
    .run();

    // Stop serving once the refresher is gone.
    tokio::select! {
        result = server => result,
        err = watch_refresher(refresher) => Err(err),
    }
}
