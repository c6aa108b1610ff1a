//! Monitor configuration from environment variables.

use std::env;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

const DEFAULT_NETWORK: &str = "mainnet";
const DEFAULT_GATEWAY_URL: &str = "https://mainnet.radixdlt.com";
const DEFAULT_STAKES_GATEWAY_URL: &str = "https://mainnet-gateway.radixdlt.com";
const DEFAULT_ACTIVE_HOST: &str = "127.0.0.1";
const DEFAULT_BACKUP_HOST: &str = "127.0.1.1";
const DEFAULT_STATE_FILE: &str = "last_validator_info.txt";
const DEFAULT_PORT: u16 = 8111;
// Public gateway blacklists aggressive pollers.
const DEFAULT_FETCH_INTERVAL_SECS: u64 = 300;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_STAKE_PAGES: usize = 500;

#[derive(Clone)]
pub struct MonitorConfig {
    /// Validator address to track
    pub validator_address: String,
    /// Network identifier sent in gateway payloads
    pub network: String,
    /// Base URL serving `/validators`
    pub gateway_url: String,
    /// Base URL serving `/validator/stakes`
    pub stakes_gateway_url: String,
    /// Active node host or URL
    pub active_host: String,
    /// Backup node host or URL (None = no backup probe)
    pub backup_host: Option<String>,
    /// Basic auth token for the active node
    pub active_auth_token: Option<String>,
    /// Basic auth token for the backup node
    pub backup_auth_token: Option<String>,
    /// Skip TLS verification for node probes (nodes use self-signed certs)
    pub accept_invalid_certs: bool,
    /// Telegram bot token (None = log-only alerts)
    pub bot_token: Option<String>,
    /// Telegram chat receiving alerts
    pub chat_id: Option<String>,
    /// Path of the persisted snapshot
    pub state_file: String,
    /// Exporter listen port
    pub port: u16,
    /// Exporter refresh interval
    pub fetch_interval_secs: u64,
    /// Timeout applied to every outbound request
    pub http_timeout_secs: u64,
    /// Upper bound on staker pages fetched per snapshot
    pub max_stake_pages: usize,
}

impl std::fmt::Debug for MonitorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorConfig")
            .field("validator_address", &self.validator_address)
            .field("network", &self.network)
            .field("gateway_url", &self.gateway_url)
            .field("stakes_gateway_url", &self.stakes_gateway_url)
            .field("active_host", &self.active_host)
            .field("backup_host", &self.backup_host)
            .field(
                "active_auth_token",
                &self.active_auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "backup_auth_token",
                &self.backup_auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("chat_id", &self.chat_id)
            .field("state_file", &self.state_file)
            .field("port", &self.port)
            .field("fetch_interval_secs", &self.fetch_interval_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("max_stake_pages", &self.max_stake_pages)
            .finish()
    }
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. `from_env` delegates here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        // Required: validator address
        let validator_address = non_empty("VALIDATOR_ADDRESS")
            .ok_or(ConfigError::MissingRequired("VALIDATOR_ADDRESS"))?;

        let network = non_empty("NETWORK").unwrap_or_else(|| DEFAULT_NETWORK.to_string());

        let gateway_url = non_empty("GATEWAY_URL")
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());
        validate_url("GATEWAY_URL", &gateway_url)?;

        let stakes_gateway_url = non_empty("STAKES_GATEWAY_URL")
            .unwrap_or_else(|| DEFAULT_STAKES_GATEWAY_URL.to_string());
        validate_url("STAKES_GATEWAY_URL", &stakes_gateway_url)?;

        let active_host =
            non_empty("ACTIVE_VALIDATOR_HOST").unwrap_or_else(|| DEFAULT_ACTIVE_HOST.to_string());

        // An explicitly empty value disables the backup probe.
        let backup_host = match lookup("BACKUP_VALIDATOR_HOST") {
            Some(host) if host.trim().is_empty() => None,
            Some(host) => Some(host),
            None => Some(DEFAULT_BACKUP_HOST.to_string()),
        };

        let active_auth_token = non_empty("NGINX_ACTIVE_BEARER_TOKEN");
        let backup_auth_token = non_empty("NGINX_BACKUP_BEARER_TOKEN");

        let accept_invalid_certs = non_empty("NODE_ACCEPT_INVALID_CERTS")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let bot_token = non_empty("BOT_TOKEN");
        let chat_id = non_empty("GROUPCHAT_CHATID");

        let state_file =
            non_empty("LAST_VALIDATOR_INFO_FILE").unwrap_or_else(|| DEFAULT_STATE_FILE.to_string());

        let port = parse_or("PORT", non_empty("PORT"), DEFAULT_PORT)?;
        let fetch_interval_secs = parse_or(
            "FETCH_INTERVAL_SECS",
            non_empty("FETCH_INTERVAL_SECS"),
            DEFAULT_FETCH_INTERVAL_SECS,
        )?;
        let http_timeout_secs = parse_or(
            "HTTP_TIMEOUT_SECS",
            non_empty("HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let max_stake_pages = parse_or(
            "MAX_STAKE_PAGES",
            non_empty("MAX_STAKE_PAGES"),
            DEFAULT_MAX_STAKE_PAGES,
        )?;

        if fetch_interval_secs == 0 || max_stake_pages == 0 {
            return Err(ConfigError::InvalidValue {
                var: if fetch_interval_secs == 0 {
                    "FETCH_INTERVAL_SECS"
                } else {
                    "MAX_STAKE_PAGES"
                },
                value: "0".to_string(),
            });
        }

        Ok(Self {
            validator_address,
            network,
            gateway_url,
            stakes_gateway_url,
            active_host,
            backup_host,
            active_auth_token,
            backup_auth_token,
            accept_invalid_certs,
            bot_token,
            chat_id,
            state_file,
            port,
            fetch_interval_secs,
            http_timeout_secs,
            max_stake_pages,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_secs)
    }
}

fn validate_url(var: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
    })?;
    Ok(())
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::from_lookup(lookup(&[("VALIDATOR_ADDRESS", "rv1abc")])).unwrap();
        assert_eq!(config.validator_address, "rv1abc");
        assert_eq!(config.network, "mainnet");
        assert_eq!(config.gateway_url, DEFAULT_GATEWAY_URL);
        assert_eq!(config.active_host, "127.0.0.1");
        assert_eq!(config.backup_host.as_deref(), Some("127.0.1.1"));
        assert!(config.accept_invalid_certs);
        assert_eq!(config.port, 8111);
        assert_eq!(config.fetch_interval_secs, 300);
        assert_eq!(config.max_stake_pages, 500);
        assert_eq!(config.state_file, "last_validator_info.txt");
    }

    #[test]
    fn test_missing_address() {
        let err = MonitorConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired("VALIDATOR_ADDRESS")));
    }

    #[test]
    fn test_empty_backup_disables_probe() {
        let config = MonitorConfig::from_lookup(lookup(&[
            ("VALIDATOR_ADDRESS", "rv1abc"),
            ("BACKUP_VALIDATOR_HOST", ""),
        ]))
        .unwrap();
        assert!(config.backup_host.is_none());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = MonitorConfig::from_lookup(lookup(&[
            ("VALIDATOR_ADDRESS", "rv1abc"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "PORT", .. }));
    }

    #[test]
    fn test_invalid_gateway_url_rejected() {
        let err = MonitorConfig::from_lookup(lookup(&[
            ("VALIDATOR_ADDRESS", "rv1abc"),
            ("GATEWAY_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { var: "GATEWAY_URL", .. }));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = MonitorConfig::from_lookup(lookup(&[
            ("VALIDATOR_ADDRESS", "rv1abc"),
            ("BOT_TOKEN", "123:secret"),
            ("NGINX_ACTIVE_BEARER_TOKEN", "dXNlcjpwYXNz"),
        ]))
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("123:secret"));
        assert!(!rendered.contains("dXNlcjpwYXNz"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
