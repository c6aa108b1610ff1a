//! Wire types for the public network gateway and the trait the fetcher
//! consumes them through.

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::error::MonitorError;
use crate::number;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkIdentifier {
    pub network: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidatorIdentifier {
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountIdentifier {
    pub address: String,
}

/// Token amount in attos, as a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenAmount {
    pub value: String,
}

/// POST body for `/validators`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatorListRequest {
    pub network_identifier: NetworkIdentifier,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ValidatorListResponse {
    #[serde(default)]
    pub validators: Vec<ValidatorEntry>,
}

/// One validator in the list. Only the identifier is required so that a
/// malformed entry for some other validator does not break the lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorEntry {
    pub validator_identifier: ValidatorIdentifier,
    #[serde(default)]
    pub stake: Option<TokenAmount>,
    #[serde(default)]
    pub info: Option<ValidatorInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorInfo {
    #[serde(default)]
    pub uptime: Option<UptimeInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UptimeInfo {
    #[serde(deserialize_with = "number::f64")]
    pub uptime_percentage: f64,
    #[serde(deserialize_with = "number::u64")]
    pub proposals_completed: u64,
    #[serde(deserialize_with = "number::u64")]
    pub proposals_missed: u64,
}

/// POST body for `/validator/stakes`.
#[derive(Debug, Clone, Serialize)]
pub struct StakePageRequest {
    pub network_identifier: NetworkIdentifier,
    pub validator_identifier: ValidatorIdentifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StakePageResponse {
    #[serde(default)]
    pub account_stake_delegations: Vec<Delegation>,
    #[serde(default, deserialize_with = "number::opt_u64")]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Delegation {
    #[serde(default)]
    pub account: Option<AccountIdentifier>,
    /// Absent means nothing left delegated.
    #[serde(default)]
    pub total_stake: Option<TokenAmount>,
}

impl Delegation {
    pub fn account_address(&self) -> &str {
        self.account
            .as_ref()
            .map(|a| a.address.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn stake_value(&self) -> &str {
        self.total_stake
            .as_ref()
            .map(|s| s.value.as_str())
            .unwrap_or("0")
    }
}

/// Read access to the network gateway.
///
/// Implementations make exactly one attempt per call and surface every failure
/// as a typed error; retries are the caller's business.
pub trait GatewayApi: Send + Sync {
    /// Fetch the full validator list for the configured network.
    fn validators(
        &self,
    ) -> impl Future<Output = Result<ValidatorListResponse, MonitorError>> + Send;

    /// Fetch one page of delegations to `address`, starting at `cursor`.
    fn stake_page(
        &self,
        address: &str,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<StakePageResponse, MonitorError>> + Send;
}
