use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Health check endpoint
///
/// Reports liveness and the current server time; sits outside `/api` and
/// needs no session.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "error": false,
        "status": 200,
        "timestamp": Utc::now()
    }))
}
