//! HTTP access to the network gateway and the node health endpoints.

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::gateway::{
    GatewayApi, NetworkIdentifier, StakePageRequest, StakePageResponse, ValidatorIdentifier,
    ValidatorListRequest, ValidatorListResponse,
};
use crate::health::{HealthResponse, NodeEndpoint, NodeHealthApi};

/// Longest upstream body echoed into an error.
const MAX_BODY_EXCERPT: usize = 512;

/// One-attempt HTTP client for every upstream the monitor talks to.
///
/// Gateway calls verify TLS; node probes may skip verification because the
/// nodes sit behind self-signed certificates.
#[derive(Clone)]
pub struct RemoteApiClient {
    gateway_http: reqwest::Client,
    node_http: reqwest::Client,
    validators_url: String,
    stakes_url: String,
    network: String,
}

impl RemoteApiClient {
    pub fn new(config: &MonitorConfig) -> Result<Self, MonitorError> {
        let gateway_http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        let node_http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            gateway_http,
            node_http,
            validators_url: format!("{}/validators", config.gateway_url.trim_end_matches('/')),
            stakes_url: format!(
                "{}/validator/stakes",
                config.stakes_gateway_url.trim_end_matches('/')
            ),
            network: config.network.clone(),
        })
    }

    fn network_identifier(&self) -> NetworkIdentifier {
        NetworkIdentifier {
            network: self.network.clone(),
        }
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, MonitorError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .gateway_http
            .post(url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        decode(resp).await
    }
}

impl GatewayApi for RemoteApiClient {
    async fn validators(&self) -> Result<ValidatorListResponse, MonitorError> {
        let body = ValidatorListRequest {
            network_identifier: self.network_identifier(),
        };
        self.post_json(&self.validators_url, &body).await
    }

    async fn stake_page(
        &self,
        address: &str,
        cursor: Option<&str>,
    ) -> Result<StakePageResponse, MonitorError> {
        let body = StakePageRequest {
            network_identifier: self.network_identifier(),
            validator_identifier: ValidatorIdentifier {
                address: address.to_string(),
            },
            cursor: cursor.map(str::to_string),
        };
        self.post_json(&self.stakes_url, &body).await
    }
}

impl NodeHealthApi for RemoteApiClient {
    async fn health(&self, endpoint: &NodeEndpoint) -> Result<HealthResponse, MonitorError> {
        let mut req = self
            .node_http
            .get(endpoint.health_url())
            .header(ACCEPT, "application/json");
        if let Some(ref token) = endpoint.auth_token {
            req = req.header(AUTHORIZATION, format!("Basic {token}"));
        }
        decode(req.send().await?).await
    }
}

/// Turn a response into `T`, mapping any status but 200 and malformed bodies
/// to typed errors.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, MonitorError> {
    let status = resp.status();
    let text = resp.text().await?;
    if status != StatusCode::OK {
        return Err(MonitorError::UpstreamStatus {
            status: status.as_u16(),
            body: excerpt(&text),
        });
    }
    serde_json::from_str(&text)
        .map_err(|e| MonitorError::Upstream(format!("{e}: {}", excerpt(&text))))
}

fn excerpt(body: &str) -> String {
    if body.len() <= MAX_BODY_EXCERPT {
        return body.to_string();
    }
    let mut end = MAX_BODY_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
