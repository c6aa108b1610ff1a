//! Liveness probes for the active and backup validator nodes.

use serde::Deserialize;
use std::fmt;
use std::future::Future;

use crate::alert::AlertSink;
use crate::config::MonitorConfig;
use crate::error::MonitorError;

/// Which node an endpoint belongs to. The backup is expected to lag behind,
/// so it tolerates more states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Active,
    Backup,
}

impl NodeRole {
    pub fn allowed_statuses(self) -> &'static [&'static str] {
        match self {
            NodeRole::Active => &["UP"],
            NodeRole::Backup => &["UP", "SYNCING", "OUT_OF_SYNC", "BOOTING_PRE_GENESIS"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeRole::Active => "active",
            NodeRole::Backup => "backup",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node health endpoint and the credentials to reach it.
#[derive(Clone)]
pub struct NodeEndpoint {
    pub role: NodeRole,
    /// Bare host (`10.0.0.5`) or base URL (`https://node.example:8443`).
    pub host: String,
    pub auth_token: Option<String>,
}

impl fmt::Debug for NodeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeEndpoint")
            .field("role", &self.role)
            .field("host", &self.host)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl NodeEndpoint {
    pub fn health_url(&self) -> String {
        let base = if self.host.contains("://") {
            self.host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.host.trim_end_matches('/'))
        };
        format!("{base}/system/health")
    }

    /// Endpoints to probe, active first.
    pub fn from_config(config: &MonitorConfig) -> Vec<NodeEndpoint> {
        let mut endpoints = vec![NodeEndpoint {
            role: NodeRole::Active,
            host: config.active_host.clone(),
            auth_token: config.active_auth_token.clone(),
        }];
        if let Some(ref host) = config.backup_host {
            endpoints.push(NodeEndpoint {
                role: NodeRole::Backup,
                host: host.clone(),
                auth_token: config.backup_auth_token.clone(),
            });
        }
        endpoints
    }
}

/// Body of `GET /system/health`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
}

/// Access to node health endpoints.
pub trait NodeHealthApi: Send + Sync {
    fn health(
        &self,
        endpoint: &NodeEndpoint,
    ) -> impl Future<Output = Result<HealthResponse, MonitorError>> + Send;
}

/// Result of probing one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Healthy { status: String },
    /// Reachable, but reporting a state outside the role's allowed set.
    Unhealthy { status: Option<String> },
    /// Transport failure, non-200 or unparseable body.
    Failed { reason: String },
}

impl ProbeOutcome {
    pub fn classify(role: NodeRole, result: Result<HealthResponse, MonitorError>) -> Self {
        match result {
            Ok(HealthResponse {
                status: Some(status),
            }) if role.allowed_statuses().contains(&status.as_str()) => {
                ProbeOutcome::Healthy { status }
            }
            Ok(resp) => ProbeOutcome::Unhealthy {
                status: resp.status,
            },
            Err(e) => ProbeOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }

    /// Alert text for this outcome, or `None` when healthy.
    pub fn alert_message(&self, role: NodeRole) -> Option<String> {
        let tag = role.as_str().to_uppercase();
        match self {
            ProbeOutcome::Healthy { .. } => None,
            ProbeOutcome::Unhealthy { status: Some(status) } => Some(format!(
                "[{tag}] {role} node status not UP! status={status}"
            )),
            ProbeOutcome::Unhealthy { status: None } => Some(format!(
                "[{tag}] {role} node health response has no status"
            )),
            ProbeOutcome::Failed { reason } => Some(format!(
                "[{tag}] error getting {role} node health status! {reason}"
            )),
        }
    }
}

/// Probes every configured endpoint and raises at most one alert per endpoint.
pub struct HealthProber<N> {
    api: N,
    endpoints: Vec<NodeEndpoint>,
}

impl<N: NodeHealthApi> HealthProber<N> {
    pub fn new(api: N, endpoints: Vec<NodeEndpoint>) -> Self {
        Self { api, endpoints }
    }

    pub fn endpoints(&self) -> &[NodeEndpoint] {
        &self.endpoints
    }

    /// Probe all endpoints in order. Returns the outcome per endpoint.
    pub async fn probe_all<S: AlertSink>(&self, sink: &S) -> Vec<(NodeRole, ProbeOutcome)> {
        let mut outcomes = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            let outcome =
                ProbeOutcome::classify(endpoint.role, self.api.health(endpoint).await);
            match outcome.alert_message(endpoint.role) {
                None => tracing::info!(role = %endpoint.role, ?outcome, "node is up"),
                Some(message) => {
                    tracing::warn!(role = %endpoint.role, ?outcome, "node is not healthy");
                    sink.send(&message).await;
                }
            }
            outcomes.push((endpoint.role, outcome));
        }
        outcomes
    }
}
