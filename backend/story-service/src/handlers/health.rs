/// Health endpoints for container probes
use crate::services::StoryAccessController;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    store: ComponentCheck,
    timestamp: String,
}

pub async fn health_summary() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "story-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn readiness(controller: web::Data<StoryAccessController>) -> HttpResponse {
    let start = Instant::now();
    let result = controller.store().health_check().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (ready, store) = match result {
        Ok(()) => (
            true,
            ComponentCheck {
                status: ComponentStatus::Healthy,
                message: "Story store reachable".to_string(),
                latency_ms,
            },
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                false,
                ComponentCheck {
                    status: ComponentStatus::Unhealthy,
                    message: format!("Story store check failed: {}", e),
                    latency_ms,
                },
            )
        }
    };

    let response = ReadinessResponse {
        ready,
        store,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
