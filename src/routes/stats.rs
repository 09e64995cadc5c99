use actix_web::{get, web, HttpResponse};

use crate::error::AppResult;
use crate::services::gallery_service::GalleryService;
use crate::services::stats_service::StatsService;
use crate::state::AppState;

/// GET /api/stats - Event totals and breakdowns (PUBLIC)
#[get("")]
pub async fn public_stats(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let stats = StatsService::public(&state.db).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// GET /api/stats/pledges-by-day (PUBLIC)
#[get("/pledges-by-day")]
pub async fn pledges_by_day(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let data = StatsService::pledges_by_day(&state.db).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": data })))
}

/// GET /api/stats/pledges-by-week (PUBLIC)
#[get("/pledges-by-week")]
pub async fn pledges_by_week(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let data = StatsService::pledges_by_week(&state.db).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": data })))
}

/// GET /api/gallery - Newest pledge and submission photos (PUBLIC)
#[get("/gallery")]
pub async fn gallery(state: web::Data<AppState>) -> HttpResponse {
    let images = GalleryService::latest(&state.db).await;
    HttpResponse::Ok().json(serde_json::json!({ "images": images }))
}

pub fn stats_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(gallery).service(
        web::scope("/stats")
            .service(public_stats)
            .service(pledges_by_day)
            .service(pledges_by_week),
    );
}
