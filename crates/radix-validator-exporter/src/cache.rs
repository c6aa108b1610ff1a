//! The latest snapshot, shared between the refresher and the scrape handler.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use validator_monitor::ValidatorSnapshot;

/// A snapshot together with when it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSnapshot {
    pub snapshot: ValidatorSnapshot,
    pub fetched_at: DateTime<Utc>,
}

/// Single-slot cell swapped wholesale on every refresh.
///
/// Readers clone the inner `Arc`, so a scrape always sees one complete
/// snapshot even while a refresh publishes the next one.
#[derive(Clone, Default)]
pub struct SnapshotCache {
    slot: Arc<RwLock<Option<Arc<CachedSnapshot>>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first successful refresh.
    pub fn latest(&self) -> Option<Arc<CachedSnapshot>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn publish(&self, snapshot: ValidatorSnapshot) {
        let entry = Arc::new(CachedSnapshot {
            snapshot,
            fetched_at: Utc::now(),
        });
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(entry);
    }

    pub fn is_populated(&self) -> bool {
        self.latest().is_some()
    }
}
