//! Monitor error types.

/// Errors surfaced by the fetch, persistence and probe paths.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Network failure or timeout talking to an upstream.
    #[error("transport error: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Upstream answered 200 but the payload was not what we expect.
    #[error("malformed upstream response: {0}")]
    Upstream(String),

    #[error("validator {0} not found in validator list")]
    ValidatorNotFound(String),

    /// The persisted state file exists but cannot be decoded.
    #[error("persisted state is corrupt: {0}")]
    StateCorrupt(String),

    /// The staker walk did not converge.
    #[error("staker pagination exhausted after {pages} pages ({fetched} of {expected} delegations)")]
    Exhausted {
        pages: usize,
        fetched: u64,
        expected: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for MonitorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            MonitorError::Upstream(e.to_string())
        } else {
            MonitorError::Transport(e.to_string())
        }
    }
}

/// Errors raised while loading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid URL in {var}: {value}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("invalid value in {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}
