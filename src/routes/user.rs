use actix_web::{get, patch, web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::dto::UpdateProfileRequest;
use crate::services::identity_service::IdentityService;
use crate::state::AppState;

/// GET /api/user/me - Profile of the signed-in user (PROTECTED)
#[get("/me")]
pub async fn get_profile(state: web::Data<AppState>, auth_user: AuthUser) -> AppResult<HttpResponse> {
    let user = IdentityService::find(&state.db, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": user })))
}

/// PATCH /api/user/me - Change the display name (PROTECTED)
#[patch("/me")]
pub async fn update_profile(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;

    let user = IdentityService::rename(&state.db, auth_user.user_id, &body.username)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": user })))
}

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .service(get_profile)
            .service(update_profile),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::routes::configure_routes;
    use crate::testing::{self, TestApp};

    #[actix_web::test]
    async fn profile_can_be_read_and_renamed() {
        let app = TestApp::new().await;
        let owner = testing::user(app.db(), "owner@example.com", "Owner").await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::patch()
            .uri("/api/user/me")
            .insert_header(("Authorization", app.bearer(&owner)))
            .set_json(json!({ "username": "Renamed" }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/user/me")
            .insert_header(("Authorization", app.bearer(&owner)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        assert_eq!(body["user"]["username"], "Renamed");
        assert_eq!(body["user"]["email"], "owner@example.com");
    }

    #[actix_web::test]
    async fn profile_requires_a_session() {
        let app = TestApp::new().await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let resp = test::call_service(&service, test::TestRequest::get().uri("/api/user/me").to_request()).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
