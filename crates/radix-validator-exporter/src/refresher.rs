//! Periodic snapshot refresh feeding the exporter cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use validator_monitor::{GatewayApi, SnapshotFetcher};

use crate::metrics::MetricsExporter;

/// Fetch one snapshot and publish it. A failure keeps the previous snapshot.
pub async fn refresh_once<G: GatewayApi>(
    fetcher: &SnapshotFetcher<G>,
    address: &str,
    exporter: &MetricsExporter,
) -> bool {
    match fetcher.build_snapshot(address).await {
        Ok(snapshot) => {
            tracing::info!(?snapshot, "retrieved validator data");
            exporter.record_refresh(snapshot);
            true
        }
        Err(e) => {
            exporter.record_failure();
            tracing::warn!(
                address,
                error = %e,
                stale = exporter.cache().is_populated(),
                "validator refresh failed, keeping previous snapshot"
            );
            false
        }
    }
}

/// Spawn the refresh loop. The first refresh runs immediately.
///
/// A single task awaits each refresh before the next tick, so refreshes never
/// overlap; ticks missed while a slow refresh was in flight are skipped.
pub fn spawn_refresher<G>(
    fetcher: SnapshotFetcher<G>,
    address: String,
    exporter: Arc<MetricsExporter>,
    interval: Duration,
) -> JoinHandle<()>
where
    G: GatewayApi + 'static,
{
    tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs(), "validator refresher started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            refresh_once(&fetcher, &address, &exporter).await;
        }
    })
}

/// Wait for the refresh task to end. It only ends by panicking or being
/// aborted, so the returned error is always meant to stop the service.
pub async fn watch_refresher(handle: JoinHandle<()>) -> std::io::Error {
    match handle.await {
        Ok(()) => tracing::error!("validator refresher exited"),
        Err(e) if e.is_panic() => tracing::error!(error = %e, "validator refresher panicked"),
        Err(e) => tracing::error!(error = %e, "validator refresher cancelled"),
    }
    std::io::Error::other("validator refresher stopped")
}
