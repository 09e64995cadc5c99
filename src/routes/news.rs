use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::models::dto::VisitorQuery;
use crate::services::like_service::LikeService;
use crate::state::AppState;

/// POST /api/news/{id}/like - Toggle a visitor's like (PUBLIC)
#[post("/{id}/like")]
pub async fn toggle_like(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<VisitorQuery>,
) -> AppResult<HttpResponse> {
    let visitor_id = body
        .into_inner()
        .visitor_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Visitor ID required"))?;

    let status = LikeService::toggle(&state.db, &path.into_inner(), &visitor_id, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// GET /api/news/{id}/like?visitorId= - Like count and whether this visitor liked (PUBLIC)
#[get("/{id}/like")]
pub async fn like_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<VisitorQuery>,
) -> AppResult<HttpResponse> {
    let visitor_id = query.into_inner().visitor_id;

    let status = LikeService::status(&state.db, &path.into_inner(), visitor_id.as_deref()).await?;
    Ok(HttpResponse::Ok().json(status))
}

pub fn news_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/news")
            .service(toggle_like)
            .service(like_status),
    );
}
