use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use prometheus::{Encoder, Registry, TextEncoder};

use crate::store::CourseStore;

// ============================================================================
// Metrics Server
// ============================================================================
//
//   GET /metrics  Prometheus text format for the module operation registry
//   GET /health   200 while the course store answers, 503 otherwise
//
// Runs on an actix system of its own; start it from a dedicated thread.
//
// ============================================================================

struct ServerState {
    registry: Registry,
    store: Arc<dyn CourseStore>,
}

pub async fn start_metrics_server(
    registry: Registry,
    store: Arc<dyn CourseStore>,
    port: u16,
) -> std::io::Result<()> {
    tracing::info!(port = port, "📊 Starting metrics server on http://0.0.0.0:{}/metrics", port);

    let state = web::Data::new(ServerState { registry, store });
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/metrics", web::get().to(metrics_handler))
            .route("/health", web::get().to(health_handler))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn metrics_handler(state: web::Data<ServerState>) -> HttpResponse {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&state.registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

async fn health_handler(state: web::Data<ServerState>) -> HttpResponse {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "store": "ready",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Course store not ready");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "store": e.to_string(),
                "version": env!("CARGO_PKG_VERSION")
            }))
        }
    }
}
