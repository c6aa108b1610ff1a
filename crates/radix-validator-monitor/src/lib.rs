//! Monitoring core for a Radix validator node.
//!
//! One cycle probes the node health endpoints, builds a [`ValidatorSnapshot`]
//! from the public gateway, compares it with the last stored snapshot, alerts
//! on meaningful changes and persists the new snapshot.
//!
//! - [`HealthProber`]: liveness of the active and backup nodes
//! - [`SnapshotFetcher`]: validator list lookup plus the paginated staker walk
//! - [`ChangeDetector`]: per-field alert policies
//! - [`SnapshotStore`]: the single persisted record
//! - [`AlertSink`]: where alerts go (Telegram or the log)

pub mod alert;
pub mod client;
pub mod config;
pub mod cycle;
pub mod detector;
pub mod error;
pub mod fetcher;
pub mod gateway;
pub mod health;
pub mod number;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod test_support;

pub use alert::{AlertSink, LogSink, Notifier, TelegramSink};
pub use client::RemoteApiClient;
pub use config::MonitorConfig;
pub use cycle::{CycleReport, Monitor};
pub use detector::{ChangeDetector, ChangeEvent, Direction};
pub use error::{ConfigError, MonitorError};
pub use fetcher::{SnapshotFetcher, StakerTally};
pub use gateway::GatewayApi;
pub use health::{HealthProber, NodeEndpoint, NodeHealthApi, NodeRole, ProbeOutcome};
pub use snapshot::ValidatorSnapshot;
pub use store::SnapshotStore;
