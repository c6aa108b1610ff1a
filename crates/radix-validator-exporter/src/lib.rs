//! Prometheus exporter for a Radix validator.
//!
//! A background task refreshes a [`ValidatorSnapshot`](validator_monitor::ValidatorSnapshot)
//! on a fixed interval into a [`SnapshotCache`]; `GET /metrics` renders
//! whatever the cache holds at scrape time.

pub mod cache;
pub mod metrics;
pub mod refresher;
pub mod routes;
pub mod state;

pub use cache::{CachedSnapshot, SnapshotCache};
pub use metrics::MetricsExporter;
pub use refresher::{refresh_once, spawn_refresher, watch_refresher};
pub use state::AppState;
