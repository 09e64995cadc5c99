use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateSubmissionRequest, UpdateSubmissionRequest};
use crate::services::access::Principal;
use crate::services::identity_service::IdentityService;
use crate::services::notification_service::NotificationService;
use crate::services::submission_service::SubmissionService;
use crate::state::AppState;

/// POST /api/submissions - Publish a pledge as a cache (OWNER or ADMIN)
#[post("")]
pub async fn create_submission(
    state: web::Data<AppState>,
    caller: Principal,
    body: web::Json<CreateSubmissionRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();
    let hidden_date = request.check()?;

    let submission = SubmissionService::create(&state.db, &caller, request, hidden_date, Utc::now()).await?;

    // Best effort: the submission is committed whatever happens here
    match IdentityService::find(&state.db, submission.user_id).await {
        Ok(Some(owner)) => {
            NotificationService::send_submission_received(
                state.mailer.as_ref(),
                &state.config,
                &owner.email,
                submission.id,
                &submission.cache_name,
            )
            .await;
        }
        Ok(None) => tracing::warn!(submission_id = submission.id, "submission owner not found, no email sent"),
        Err(error) => tracing::warn!(%error, submission_id = submission.id, "could not load submission owner"),
    }

    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "submission": submission })))
}

/// GET /api/submissions/me - The signed-in user's submissions (PROTECTED)
#[get("/me")]
pub async fn my_submissions(state: web::Data<AppState>, auth_user: AuthUser) -> AppResult<HttpResponse> {
    let submissions = SubmissionService::list_for_user(&state.db, auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "submissions": submissions })))
}

/// GET /api/submissions/{id} (OWNER or ADMIN)
#[get("/{id}")]
pub async fn get_submission(
    state: web::Data<AppState>,
    caller: Principal,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let submission = SubmissionService::get(&state.db, &caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "submission": submission })))
}

/// PATCH /api/submissions/{id} - Partial update (OWNER or ADMIN)
#[patch("/{id}")]
pub async fn update_submission(
    state: web::Data<AppState>,
    caller: Principal,
    path: web::Path<i32>,
    body: web::Json<UpdateSubmissionRequest>,
) -> AppResult<HttpResponse> {
    let changes = body.into_inner();
    let hidden_date = changes.check()?;

    let submission =
        SubmissionService::update(&state.db, &caller, path.into_inner(), changes, hidden_date, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "submission": submission })))
}

/// DELETE /api/submissions/{id} - Pledge goes back to CONCEPT (OWNER or ADMIN)
#[delete("/{id}")]
pub async fn delete_submission(
    state: web::Data<AppState>,
    caller: Principal,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    SubmissionService::delete(&state.db, &caller, path.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub fn submission_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/submissions")
            .service(create_submission)
            .service(my_submissions)
            .service(get_submission)
            .service(update_submission)
            .service(delete_submission),
    );
}
