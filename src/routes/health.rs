use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::models::health::HealthResponse;
use crate::state::AppState;

/// GET /api/health - Liveness plus a database ping
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(error) => {
            tracing::warn!(%error, "health check: database unreachable");
            "down"
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        time: Utc::now(),
        database,
    })
}
