use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::service::TaskService;

/// Health check endpoint
///
/// Reports whether the task storage is reachable, which backend is in use,
/// and the current timestamp.
#[get("/health")]
pub async fn health(service: web::Data<TaskService>) -> impl Responder {
    match service.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "storage": service.backend(),
            "timestamp": Utc::now()
        })),
        Err(err) => {
            log::error!("health check failed: {}", err);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "storage": service.backend(),
                "timestamp": Utc::now()
            }))
        }
    }
}
