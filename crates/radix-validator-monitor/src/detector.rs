//! Field-by-field comparison of a fresh snapshot against the stored one.

use std::fmt;

use crate::alert::AlertSink;
use crate::snapshot::{si_format, ValidatorSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        }
    }
}

/// Which movements of a field are worth an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    AnyChange,
    DecreaseOnly,
    IncreaseOnly,
}

impl Policy {
    fn alerts_on(self, direction: Direction) -> bool {
        match self {
            Policy::AnyChange => true,
            Policy::DecreaseOnly => direction == Direction::Decreased,
            Policy::IncreaseOnly => direction == Direction::Increased,
        }
    }
}

/// A tracked field moved in a direction its policy alerts on.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub field: &'static str,
    pub previous: String,
    pub current: String,
    pub direction: Direction,
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} from {} to {}",
            self.field,
            self.direction.as_str(),
            self.previous,
            self.current
        )
    }
}

/// Tracked fields in alert order, with their policies.
pub const POLICIES: [(&str, Policy); 4] = [
    ("stake", Policy::AnyChange),
    ("uptime", Policy::DecreaseOnly),
    ("proposals_missed", Policy::IncreaseOnly),
    ("position_in_set", Policy::AnyChange),
];

pub struct ChangeDetector;

impl ChangeDetector {
    /// Compare every tracked field. Movements the policy ignores are logged only.
    pub fn detect(previous: &ValidatorSnapshot, current: &ValidatorSnapshot) -> Vec<ChangeEvent> {
        let [stake, uptime, missed, position] = POLICIES;
        let (prev_stake, cur_stake) = stake_labels(previous.stake, current.stake);

        [
            compare(stake, previous.stake, current.stake, prev_stake, cur_stake),
            compare(
                uptime,
                previous.uptime,
                current.uptime,
                previous.uptime.to_string(),
                current.uptime.to_string(),
            ),
            compare(
                missed,
                previous.proposals_missed,
                current.proposals_missed,
                previous.proposals_missed.to_string(),
                current.proposals_missed.to_string(),
            ),
            compare(
                position,
                previous.position_in_set,
                current.position_in_set,
                previous.position_in_set.to_string(),
                current.position_in_set.to_string(),
            ),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Detect changes and forward each one to `sink`, in field order.
    ///
    /// Without a previous snapshot there is nothing to compare against; the
    /// run is skipped with a log line and no alert.
    pub async fn notify<S: AlertSink>(
        previous: Option<&ValidatorSnapshot>,
        current: &ValidatorSnapshot,
        sink: &S,
    ) -> Vec<ChangeEvent> {
        let Some(previous) = previous else {
            tracing::info!("no previous snapshot, skipping comparison");
            return Vec::new();
        };

        let events = Self::detect(previous, current);
        for event in &events {
            let message = event.to_string();
            tracing::warn!(field = event.field, "{message}");
            if !sink.send(&message).await {
                tracing::warn!(field = event.field, "change alert was not delivered");
            }
        }
        events
    }
}

fn compare<T: PartialOrd + fmt::Display>(
    (field, policy): (&'static str, Policy),
    previous: T,
    current: T,
    previous_label: String,
    current_label: String,
) -> Option<ChangeEvent> {
    let direction = if current > previous {
        Direction::Increased
    } else if current < previous {
        Direction::Decreased
    } else {
        tracing::info!(field, value = %current, "unchanged");
        return None;
    };

    let event = ChangeEvent {
        field,
        previous: previous_label,
        current: current_label,
        direction,
    };
    if policy.alerts_on(direction) {
        Some(event)
    } else {
        tracing::info!(field, "{event}");
        None
    }
}

/// SI labels for the stake. When the rounded labels would read the same, fall
/// back to six decimals, then to the shortest exact form.
fn stake_labels(previous: f64, current: f64) -> (String, String) {
    let si = (si_format(previous), si_format(current));
    if si.0 != si.1 || previous == current {
        return si;
    }
    let fixed = (format!("{previous:.6}"), format!("{current:.6}"));
    if fixed.0 != fixed.1 {
        return fixed;
    }
    (format!("{previous}"), format!("{current}"))
}
