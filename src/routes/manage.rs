// Token-gated owner area. Every link in the emails lands here with
// `?token=<edit token>`; an admin session works without one.

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::models::dto::{TokenQuery, UpdateConfirmationRequest, UpdatePledgeRequest};
use crate::services::access::Principal;
use crate::services::confirmation_service::ConfirmationService;
use crate::services::edit_token_service::EditTokenService;
use crate::services::identity_service::IdentityService;
use crate::services::pledge_service::PledgeService;
use crate::state::AppState;

fn required_token(query: TokenQuery) -> AppResult<String> {
    query
        .token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::bad_request("Token is required"))
}

/// GET /api/manage?token= - Everything the token's owner has sent (TOKEN)
#[get("")]
pub async fn overview(state: web::Data<AppState>, query: web::Query<TokenQuery>) -> AppResult<HttpResponse> {
    // 1. Token must be present and live
    let token = required_token(query.into_inner())?;
    let user_id = EditTokenService::validate(&state.db, &token, Utc::now())
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

    // 2. Owner
    let user = IdentityService::find(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    // 3. Records
    let pledges = PledgeService::list_for_user(&state.db, user.id).await?;
    let confirmations = ConfirmationService::list_for_user(&state.db, user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user": { "id": user.id, "username": user.username, "email": user.email },
        "pledges": pledges,
        "confirmations": confirmations,
        "token": token,
    })))
}

/// PUT /api/manage/pledge/{id}?token= (TOKEN or ADMIN)
#[put("/pledge/{id}")]
pub async fn update_pledge(
    state: web::Data<AppState>,
    caller: Principal,
    path: web::Path<i32>,
    body: web::Json<UpdatePledgeRequest>,
) -> AppResult<HttpResponse> {
    caller.require_token_or_admin()?;
    let changes = body.into_inner();
    changes.check()?;

    let pledge = PledgeService::update(&state.db, &caller, path.into_inner(), changes, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "pledge": pledge })))
}

/// DELETE /api/manage/pledge/{id}?token= (TOKEN or ADMIN)
#[delete("/pledge/{id}")]
pub async fn delete_pledge(
    state: web::Data<AppState>,
    caller: Principal,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    caller.require_token_or_admin()?;

    PledgeService::delete(&state.db, state.files.as_ref(), &caller, path.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "message": "Pledge deleted" })))
}

/// PUT /api/manage/confirmation/{id}?token= (TOKEN or ADMIN)
#[put("/confirmation/{id}")]
pub async fn update_confirmation(
    state: web::Data<AppState>,
    caller: Principal,
    path: web::Path<i32>,
    body: web::Json<UpdateConfirmationRequest>,
) -> AppResult<HttpResponse> {
    caller.require_token_or_admin()?;
    let changes = body.into_inner();
    changes.check()?;

    let confirmation =
        ConfirmationService::update(&state.db, &caller, path.into_inner(), changes, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "confirmation": confirmation })))
}

/// DELETE /api/manage/confirmation/{id}?token= (TOKEN or ADMIN)
#[delete("/confirmation/{id}")]
pub async fn delete_confirmation(
    state: web::Data<AppState>,
    caller: Principal,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    caller.require_token_or_admin()?;

    ConfirmationService::delete(&state.db, &caller, path.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "message": "Confirmation deleted" })))
}

/// POST /api/manage/logout?token= - Revoke the edit token (TOKEN)
#[post("/logout")]
pub async fn logout(state: web::Data<AppState>, query: web::Query<TokenQuery>) -> AppResult<HttpResponse> {
    let token = required_token(query.into_inner())?;
    let removed = EditTokenService::revoke(&state.db, &token).await?;
    tracing::debug!(removed, "edit token revoked");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub fn manage_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/manage")
            .service(overview)
            .service(update_pledge)
            .service(delete_pledge)
            .service(update_confirmation)
            .service(delete_confirmation)
            .service(logout),
    );
}
