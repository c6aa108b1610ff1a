//! Builds a [`ValidatorSnapshot`] from the validator list and a full walk of
//! the validator's delegations.
//!
//! A build is all-or-nothing: any failure along the way aborts it with a
//! single error and no partial snapshot.

use crate::error::MonitorError;
use crate::gateway::{GatewayApi, ValidatorEntry};
use crate::snapshot::{is_zero_attos, scale_attos, ValidatorSnapshot};

/// Result of walking every delegation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakerTally {
    /// Delegations with nonzero remaining stake.
    pub stakers: u64,
    /// Every delegation seen, including exhausted ones.
    pub delegations: u64,
    pub pages: usize,
}

pub struct SnapshotFetcher<G> {
    api: G,
    max_pages: usize,
}

impl<G: GatewayApi> SnapshotFetcher<G> {
    pub fn new(api: G, max_pages: usize) -> Self {
        Self {
            api,
            max_pages: max_pages.max(1),
        }
    }

    pub fn api(&self) -> &G {
        &self.api
    }

    /// Fetch a consistent snapshot for `address`.
    pub async fn build_snapshot(&self, address: &str) -> Result<ValidatorSnapshot, MonitorError> {
        let list = self.api.validators().await?;

        // Rank is the list order the gateway returned, not a computed rank.
        let (idx, entry) = list
            .validators
            .iter()
            .enumerate()
            .find(|(_, v)| v.validator_identifier.address == address)
            .ok_or_else(|| MonitorError::ValidatorNotFound(address.to_string()))?;

        let position_in_set = u32::try_from(idx + 1)
            .map_err(|_| MonitorError::Upstream(format!("validator index {idx} out of range")))?;
        let (stake, uptime, proposals_completed, proposals_missed) = extract_entry(entry)?;

        let tally = self.walk_stakers(address).await?;

        let snapshot = ValidatorSnapshot {
            stake,
            uptime,
            proposals_completed,
            proposals_missed,
            position_in_set,
            staker_count: tally.stakers,
        };
        tracing::debug!(address, ?snapshot, "snapshot built");
        Ok(snapshot)
    }

    /// Walk every page of delegations and count those with stake left.
    ///
    /// Stops once the cumulative delegation count reaches the `total_count`
    /// reported on the first page. Fails with [`MonitorError::Exhausted`] when
    /// the cursor runs out early or the page cap is hit.
    pub async fn walk_stakers(&self, address: &str) -> Result<StakerTally, MonitorError> {
        let mut cursor: Option<String> = None;
        let mut expected: Option<u64> = None;
        let mut tally = StakerTally {
            stakers: 0,
            delegations: 0,
            pages: 0,
        };

        loop {
            if tally.pages >= self.max_pages {
                return Err(exhausted(&tally, expected));
            }

            let page = self.api.stake_page(address, cursor.as_deref()).await?;
            tally.pages += 1;

            for delegation in &page.account_stake_delegations {
                if is_zero_attos(delegation.stake_value())? {
                    tracing::debug!(
                        account = delegation.account_address(),
                        "former staker omitted, no delegation left"
                    );
                } else {
                    tally.stakers += 1;
                }
            }
            tally.delegations += page.account_stake_delegations.len() as u64;

            if expected.is_none() {
                expected = page.total_count;
            }
            cursor = page.next_cursor;

            tracing::debug!(
                page = tally.pages,
                fetched = page.account_stake_delegations.len(),
                cumulative = tally.delegations,
                total_count = ?expected,
                next_cursor = ?cursor,
                "stake page fetched"
            );

            match expected {
                Some(total) if tally.delegations >= total => break,
                Some(_) if cursor.is_none() => return Err(exhausted(&tally, expected)),
                // No total reported: trust the cursor alone.
                None if cursor.is_none() => break,
                _ => {}
            }
        }

        tracing::info!(
            address,
            delegations = tally.delegations,
            stakers = tally.stakers,
            pages = tally.pages,
            "staker walk complete"
        );
        Ok(tally)
    }
}

fn extract_entry(entry: &ValidatorEntry) -> Result<(f64, f64, u64, u64), MonitorError> {
    let address = &entry.validator_identifier.address;
    let stake = entry
        .stake
        .as_ref()
        .ok_or_else(|| MonitorError::Upstream(format!("validator {address} has no stake")))?;
    let uptime = entry
        .info
        .as_ref()
        .and_then(|info| info.uptime.as_ref())
        .ok_or_else(|| MonitorError::Upstream(format!("validator {address} has no uptime info")))?;

    Ok((
        scale_attos(&stake.value)?,
        uptime.uptime_percentage,
        uptime.proposals_completed,
        uptime.proposals_missed,
    ))
}

fn exhausted(tally: &StakerTally, expected: Option<u64>) -> MonitorError {
    MonitorError::Exhausted {
        pages: tally.pages,
        fetched: tally.delegations,
        expected: expected.unwrap_or(0),
    }
}
