use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::{Mutex, PoisonError};

use validator_monitor::ValidatorSnapshot;

use crate::cache::SnapshotCache;

/// Renders the cached snapshot as Prometheus gauges on each scrape.
pub struct MetricsExporter {
    registry: Registry,
    cache: SnapshotCache,
    stake: Gauge,
    stakers: Gauge,
    uptime: Gauge,
    proposals_made: Gauge,
    proposals_missed: Gauge,
    position_in_set: Gauge,
    snapshot_available: IntGauge,
    last_refresh: IntGauge,
    refresh_failures: IntCounter,
    // Gauges are set then gathered; two scrapes must not interleave.
    render_lock: Mutex<()>,
}

impl MetricsExporter {
    pub fn new(cache: SnapshotCache) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let stake = Gauge::new(
            "validatornode_total_stake",
            "Number of total stake from network gateway api",
        )?;
        let stakers = Gauge::new(
            "validatornode_stakers",
            "Number of stakers from network gateway api",
        )?;
        let uptime = Gauge::new("validatornode_uptime", "Uptime from network gateway api")?;
        let proposals_made = Gauge::new(
            "validatornode_proposals_made",
            "Number of proposals completed",
        )?;
        let proposals_missed = Gauge::new(
            "validatornode_proposals_missed",
            "Number of proposals missed",
        )?;
        let position_in_set = Gauge::new(
            "validatornode_position_in_set",
            "Position in active validator set",
        )?;
        let snapshot_available = IntGauge::new(
            "validatornode_snapshot_available",
            "1 once a validator snapshot has been fetched",
        )?;
        let last_refresh = IntGauge::new(
            "validatornode_last_refresh_timestamp_seconds",
            "Unix time of the last successful snapshot refresh",
        )?;
        let refresh_failures = IntCounter::new(
            "validatornode_refresh_failures_total",
            "Total number of failed snapshot refreshes",
        )?;

        registry.register(Box::new(stake.clone()))?;
        registry.register(Box::new(stakers.clone()))?;
        registry.register(Box::new(uptime.clone()))?;
        registry.register(Box::new(proposals_made.clone()))?;
        registry.register(Box::new(proposals_missed.clone()))?;
        registry.register(Box::new(position_in_set.clone()))?;
        registry.register(Box::new(snapshot_available.clone()))?;
        registry.register(Box::new(last_refresh.clone()))?;
        registry.register(Box::new(refresh_failures.clone()))?;

        Ok(Self {
            registry,
            cache,
            stake,
            stakers,
            uptime,
            proposals_made,
            proposals_missed,
            position_in_set,
            snapshot_available,
            last_refresh,
            refresh_failures,
            render_lock: Mutex::new(()),
        })
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Swap in a freshly fetched snapshot.
    pub fn record_refresh(&self, snapshot: ValidatorSnapshot) {
        self.cache.publish(snapshot);
    }

    pub fn record_failure(&self) {
        self.refresh_failures.inc();
    }

    pub fn refresh_failures(&self) -> u64 {
        self.refresh_failures.get()
    }

    /// Text exposition of every gauge. Before the first refresh the six
    /// snapshot gauges read zero and `validatornode_snapshot_available` is 0.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let _guard = self.render_lock.lock().unwrap_or_else(PoisonError::into_inner);

        match self.cache.latest() {
            Some(cached) => {
                let s = &cached.snapshot;
                self.stake.set(s.stake);
                self.stakers.set(s.staker_count as f64);
                self.uptime.set(s.uptime);
                self.proposals_made.set(s.proposals_completed as f64);
                self.proposals_missed.set(s.proposals_missed as f64);
                self.position_in_set.set(f64::from(s.position_in_set));
                self.snapshot_available.set(1);
                self.last_refresh.set(cached.fetched_at.timestamp());
            }
            None => {
                for gauge in [
                    &self.stake,
                    &self.stakers,
                    &self.uptime,
                    &self.proposals_made,
                    &self.proposals_missed,
                    &self.position_in_set,
                ] {
                    gauge.set(0.0);
                }
                self.snapshot_available.set(0);
                self.last_refresh.set(0);
            }
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}
