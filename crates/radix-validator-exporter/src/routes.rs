use actix_web::{web, HttpResponse};

use crate::state::AppState;

/// GET /metrics - Prometheus text exposition of the latest snapshot
pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    match state.exporter.render() {
        Ok(output) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(output),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError().body("Failed to encode metrics")
        }
    }
}

/// GET /health - Exporter liveness and whether a snapshot is cached
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let latest = state.exporter.cache().latest();
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "validator-exporter",
        "version": env!("CARGO_PKG_VERSION"),
        "validator": state.validator_address,
        "snapshot_available": latest.is_some(),
        "last_refresh": latest.map(|c| c.fetched_at.to_rfc3339()),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics));
}
