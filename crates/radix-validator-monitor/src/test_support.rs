//! In-memory fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::alert::AlertSink;
use crate::error::MonitorError;
use crate::gateway::{
    AccountIdentifier, Delegation, GatewayApi, StakePageResponse, TokenAmount, UptimeInfo,
    ValidatorEntry, ValidatorIdentifier, ValidatorInfo, ValidatorListResponse,
};
use crate::health::{HealthResponse, NodeEndpoint, NodeHealthApi};
use crate::snapshot::ValidatorSnapshot;

#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    async fn send(&self, message: &str) -> bool {
        self.messages.lock().unwrap().push(message.to_string());
        true
    }
}

pub fn entry(address: &str, stake_attos: &str) -> ValidatorEntry {
    ValidatorEntry {
        validator_identifier: ValidatorIdentifier {
            address: address.to_string(),
        },
        stake: Some(TokenAmount {
            value: stake_attos.to_string(),
        }),
        info: Some(ValidatorInfo {
            uptime: Some(UptimeInfo {
                uptime_percentage: 99.5,
                proposals_completed: 100,
                proposals_missed: 2,
            }),
        }),
    }
}

pub fn delegations(stakes: &[&str]) -> Vec<Delegation> {
    stakes
        .iter()
        .enumerate()
        .map(|(i, stake)| Delegation {
            account: Some(AccountIdentifier {
                address: format!("rdx1account{i}"),
            }),
            total_stake: Some(TokenAmount {
                value: stake.to_string(),
            }),
        })
        .collect()
}

pub fn page(
    delegations: Vec<Delegation>,
    total_count: Option<u64>,
    next_cursor: Option<&str>,
) -> StakePageResponse {
    StakePageResponse {
        account_stake_delegations: delegations,
        total_count,
        next_cursor: next_cursor.map(str::to_string),
    }
}

pub fn snapshot() -> ValidatorSnapshot {
    ValidatorSnapshot {
        stake: 1_000_000.0,
        uptime: 99.9,
        proposals_completed: 5_000,
        proposals_missed: 4,
        position_in_set: 12,
        staker_count: 321,
    }
}

enum StakeSource {
    Pages(Vec<StakePageResponse>),
    Repeating(StakePageResponse),
    Error(u16),
}

/// Scripted gateway: a fixed validator list plus stake pages served in order.
pub struct FakeGateway {
    validators: Result<Vec<ValidatorEntry>, u16>,
    stakes: StakeSource,
    cursors: Mutex<Vec<Option<String>>>,
}

impl FakeGateway {
    pub fn new(validators: Vec<ValidatorEntry>) -> Self {
        Self {
            validators: Ok(validators),
            stakes: StakeSource::Pages(vec![]),
            cursors: Mutex::new(vec![]),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            validators: Err(status),
            ..Self::new(vec![])
        }
    }

    pub fn with_pages(mut self, pages: Vec<StakePageResponse>) -> Self {
        self.stakes = StakeSource::Pages(pages);
        self
    }

    pub fn with_repeating_page(mut self, page: StakePageResponse) -> Self {
        self.stakes = StakeSource::Repeating(page);
        self
    }

    pub fn with_stake_error(mut self, status: u16) -> Self {
        self.stakes = StakeSource::Error(status);
        self
    }

    pub fn stake_calls(&self) -> usize {
        self.cursors.lock().unwrap().len()
    }

    pub fn cursors_seen(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }
}

impl GatewayApi for FakeGateway {
    async fn validators(&self) -> Result<ValidatorListResponse, MonitorError> {
        match &self.validators {
            Ok(validators) => Ok(ValidatorListResponse {
                validators: validators.clone(),
            }),
            Err(status) => Err(MonitorError::UpstreamStatus {
                status: *status,
                body: String::new(),
            }),
        }
    }

    async fn stake_page(
        &self,
        _address: &str,
        cursor: Option<&str>,
    ) -> Result<StakePageResponse, MonitorError> {
        let call = {
            let mut cursors = self.cursors.lock().unwrap();
            cursors.push(cursor.map(str::to_string));
            cursors.len() - 1
        };
        match &self.stakes {
            StakeSource::Pages(pages) => pages.get(call).cloned().ok_or_else(|| {
                MonitorError::Upstream(format!("no scripted stake page {call}"))
            }),
            StakeSource::Repeating(page) => Ok(page.clone()),
            StakeSource::Error(status) => Err(MonitorError::UpstreamStatus {
                status: *status,
                body: String::new(),
            }),
        }
    }
}

/// Health answers keyed by host. `Err(0)` is a transport failure, any other
/// `Err(code)` a non-200 response.
#[derive(Default)]
pub struct FakeNodeHealth {
    answers: HashMap<String, Result<String, u16>>,
}

impl FakeNodeHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, host: &str, answer: Result<&str, u16>) -> Self {
        self.answers
            .insert(host.to_string(), answer.map(str::to_string));
        self
    }
}

impl NodeHealthApi for FakeNodeHealth {
    async fn health(&self, endpoint: &NodeEndpoint) -> Result<HealthResponse, MonitorError> {
        match self.answers.get(&endpoint.host) {
            Some(Ok(status)) => Ok(HealthResponse {
                status: Some(status.clone()),
            }),
            Some(Err(0)) | None => Err(MonitorError::Transport("connection refused".into())),
            Some(Err(status)) => Err(MonitorError::UpstreamStatus {
                status: *status,
                body: "bad gateway".into(),
            }),
        }
    }
}
