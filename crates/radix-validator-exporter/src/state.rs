use std::sync::Arc;

use crate::metrics::MetricsExporter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub exporter: Arc<MetricsExporter>,
    pub validator_address: String,
}

impl AppState {
    pub fn new(exporter: Arc<MetricsExporter>, validator_address: String) -> Self {
        Self {
            exporter,
            validator_address,
        }
    }
}
