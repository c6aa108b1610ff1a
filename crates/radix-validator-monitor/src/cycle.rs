//! The one-shot poll, diff, alert and persist cycle.

use crate::alert::{AlertSink, Notifier};
use crate::client::RemoteApiClient;
use crate::config::MonitorConfig;
use crate::detector::{ChangeDetector, ChangeEvent};
use crate::error::MonitorError;
use crate::fetcher::SnapshotFetcher;
use crate::gateway::GatewayApi;
use crate::health::{HealthProber, NodeEndpoint, NodeHealthApi, NodeRole, ProbeOutcome};
use crate::snapshot::ValidatorSnapshot;
use crate::store::SnapshotStore;

/// What one completed cycle observed and did.
#[derive(Debug)]
pub struct CycleReport {
    pub probes: Vec<(NodeRole, ProbeOutcome)>,
    pub snapshot: ValidatorSnapshot,
    pub events: Vec<ChangeEvent>,
    pub persisted: bool,
}

pub struct Monitor<G, N, S> {
    address: String,
    fetcher: SnapshotFetcher<G>,
    prober: HealthProber<N>,
    store: SnapshotStore,
    sink: S,
}

impl Monitor<RemoteApiClient, RemoteApiClient, Notifier> {
    /// Wire the monitor against the real upstreams.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, MonitorError> {
        let client = RemoteApiClient::new(config)?;
        Ok(Monitor::new(
            config.validator_address.clone(),
            SnapshotFetcher::new(client.clone(), config.max_stake_pages),
            HealthProber::new(client, NodeEndpoint::from_config(config)),
            SnapshotStore::new(&config.state_file),
            Notifier::from_config(config)?,
        ))
    }
}

impl<G, N, S> Monitor<G, N, S>
where
    G: GatewayApi,
    N: NodeHealthApi,
    S: AlertSink,
{
    pub fn new(
        address: String,
        fetcher: SnapshotFetcher<G>,
        prober: HealthProber<N>,
        store: SnapshotStore,
        sink: S,
    ) -> Self {
        Self {
            address,
            fetcher,
            prober,
            store,
            sink,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Probe nodes, fetch a snapshot, alert on changes and persist it.
    ///
    /// Probe and comparison problems are turned into alerts or log lines. Only
    /// a failed snapshot fetch ends the run with an error, in which case the
    /// stored snapshot is left untouched.
    pub async fn run_once(&self) -> Result<CycleReport, MonitorError> {
        let probes = self.prober.probe_all(&self.sink).await;

        let snapshot = match self.fetcher.build_snapshot(&self.address).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(address = %self.address, error = %e, "failed to fetch validator info");
                self.sink
                    .send(&format!("could not fetch validator info: {e}"))
                    .await;
                return Err(e);
            }
        };

        let previous = match self.store.load() {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!(
                    path = %self.store.path().display(),
                    error = %e,
                    "could not read last validator info, skipping comparison"
                );
                None
            }
        };

        let events = ChangeDetector::notify(previous.as_ref(), &snapshot, &self.sink).await;

        let persisted = match self.store.save(&snapshot) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    path = %self.store.path().display(),
                    error = %e,
                    "could not write last validator info"
                );
                false
            }
        };

        tracing::info!(?snapshot, alerts = events.len(), persisted, "validator check complete");
        Ok(CycleReport {
            probes,
            snapshot,
            events,
            persisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        delegations, entry, page, snapshot, FakeGateway, FakeNodeHealth, RecordingSink,
    };

    const ADDR: &str = "rv1validator";

    fn endpoints() -> Vec<NodeEndpoint> {
        vec![
            NodeEndpoint {
                role: NodeRole::Active,
                host: "active".into(),
                auth_token: None,
            },
            NodeEndpoint {
                role: NodeRole::Backup,
                host: "backup".into(),
                auth_token: None,
            },
        ]
    }

    fn healthy_nodes() -> FakeNodeHealth {
        FakeNodeHealth::new()
            .with("active", Ok("UP"))
            .with("backup", Ok("SYNCING"))
    }

    fn monitor(
        gateway: FakeGateway,
        nodes: FakeNodeHealth,
        store: SnapshotStore,
    ) -> Monitor<FakeGateway, FakeNodeHealth, RecordingSink> {
        Monitor::new(
            ADDR.to_string(),
            SnapshotFetcher::new(gateway, 10),
            HealthProber::new(nodes, endpoints()),
            store,
            RecordingSink::default(),
        )
    }

    fn gateway() -> FakeGateway {
        FakeGateway::new(vec![entry("rv1other", "1"), entry(ADDR, "1000000000000000000000")])
            .with_pages(vec![page(delegations(&["1", "0", "2"]), Some(3), None)])
    }

    #[tokio::test]
    async fn test_first_run_persists_without_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("state.json"));
        let monitor = monitor(gateway(), healthy_nodes(), store.clone());

        let report = monitor.run_once().await.unwrap();

        assert!(report.persisted);
        assert!(report.events.is_empty());
        assert!(monitor.sink.messages().is_empty());
        assert_eq!(report.snapshot.position_in_set, 2);
        assert_eq!(report.snapshot.staker_count, 2);
        assert_eq!(store.load().unwrap(), Some(report.snapshot));
    }

    #[tokio::test]
    async fn test_changes_alert_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("state.json"));
        store
            .save(&ValidatorSnapshot {
                stake: 1000.0,
                ..snapshot()
            })
            .unwrap();
        let monitor = monitor(gateway(), healthy_nodes(), store.clone());

        let report = monitor.run_once().await.unwrap();

        // stake is unchanged, uptime 99.9 -> 99.5 and rank 12 -> 2 alert.
        let fields: Vec<&str> = report.events.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["uptime", "position_in_set"]);
        assert_eq!(monitor.sink.messages().len(), 2);
        assert_eq!(store.load().unwrap().unwrap().position_in_set, 2);
    }

    #[tokio::test]
    async fn test_validator_missing_leaves_state_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("state.json"));
        store.save(&snapshot()).unwrap();
        let monitor = monitor(
            FakeGateway::new(vec![entry("rv1other", "1")]),
            healthy_nodes(),
            store.clone(),
        );

        let err = monitor.run_once().await.unwrap_err();

        assert!(matches!(err, MonitorError::ValidatorNotFound(_)));
        assert_eq!(store.load().unwrap(), Some(snapshot()));
        let alerts = monitor.sink.messages();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("not found"));
    }

    #[tokio::test]
    async fn test_gateway_down_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("state.json"));
        let monitor = monitor(FakeGateway::failing(503), healthy_nodes(), store.clone());

        let err = monitor.run_once().await.unwrap_err();

        assert!(matches!(err, MonitorError::UpstreamStatus { status: 503, .. }));
        assert!(store.load().unwrap().is_none());
        assert_eq!(monitor.sink.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_state_skips_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = SnapshotStore::new(&path);
        let monitor = monitor(gateway(), healthy_nodes(), store.clone());

        let report = monitor.run_once().await.unwrap();

        assert!(report.events.is_empty());
        assert!(monitor.sink.messages().is_empty());
        assert_eq!(store.load().unwrap(), Some(report.snapshot));
    }

    #[tokio::test]
    async fn test_node_down_does_not_stop_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("state.json"));
        let nodes = FakeNodeHealth::new()
            .with("active", Ok("DOWN"))
            .with("backup", Ok("SYNCING"));
        let monitor = monitor(gateway(), nodes, store);

        let report = monitor.run_once().await.unwrap();

        assert!(report.persisted);
        let alerts = monitor.sink.messages();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].to_lowercase().contains("active"));
    }

    #[tokio::test]
    async fn test_unwritable_state_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("missing").join("state.json"));
        let monitor = monitor(gateway(), healthy_nodes(), store);

        let report = monitor.run_once().await.unwrap();

        assert!(!report.persisted);
    }
}
