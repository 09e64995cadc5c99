use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::dto::{AdminLoginRequest, MagicLinkRequest, VerifyTokenRequest};
use crate::services::auth_service::AuthService;
use crate::state::AppState;

/// Body of GET /api/auth/me.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: i32,
    pub email: String,
    pub is_admin: bool,
}

/// POST /api/auth/magic-link - Email a sign-in / manage link (PUBLIC)
#[post("/magic-link")]
pub async fn magic_link(
    state: web::Data<AppState>,
    body: web::Json<MagicLinkRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;

    AuthService::send_magic_link(
        &state.db,
        state.mailer.as_ref(),
        &state.config,
        &body.email,
        &body.username,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Check your email for a link to manage your entries"
    })))
}

/// POST /api/auth/verify - Exchange an emailed token for a session (PUBLIC)
#[post("/verify")]
pub async fn verify(
    state: web::Data<AppState>,
    body: web::Json<VerifyTokenRequest>,
) -> AppResult<HttpResponse> {
    let session = AuthService::verify(&state.db, &state.config, &body.token, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// POST /api/auth/admin/login - Administrator password login (PUBLIC)
#[post("/admin/login")]
pub async fn admin_login(
    state: web::Data<AppState>,
    body: web::Json<AdminLoginRequest>,
) -> AppResult<HttpResponse> {
    let session = AuthService::admin_login(&state.db, &state.config, &body.email, &body.password, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// GET /api/auth/me - Echo the session (PROTECTED)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        user_id: auth_user.user_id,
        email: auth_user.email,
        is_admin: auth_user.is_admin,
    })
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(magic_link)
            .service(verify)
            .service(admin_login)
            .service(me),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::routes::configure_routes;
    use crate::testing::{self, TestApp};

    #[actix_web::test]
    async fn magic_link_then_verify_gives_a_session() {
        let app = TestApp::new().await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/magic-link")
            .set_json(json!({ "email": "owner@example.com", "username": "Owner" }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let sent = app.mailer.sent();
        let token = sent[0].text.split("token=").nth(1).unwrap().split_whitespace().next().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/auth/verify")
            .set_json(json!({ "token": token }))
            .to_request();
        let session: Value = test::call_and_read_body_json(&service, req).await;

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", session["token"].as_str().unwrap())))
            .to_request();
        let me: Value = test::call_and_read_body_json(&service, req).await;

        assert_eq!(me["email"], "owner@example.com");
        assert_eq!(me["isAdmin"], false);
    }

    #[actix_web::test]
    async fn invalid_magic_link_body_is_a_validation_error() {
        let app = TestApp::new().await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/magic-link")
            .set_json(json!({ "email": "not-an-email", "username": "Owner" }))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(app.mailer.sent().is_empty());
    }

    #[actix_web::test]
    async fn me_requires_a_valid_bearer() {
        let app = TestApp::new().await;
        let owner = testing::user(app.db(), "owner@example.com", "Owner").await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let missing = test::call_service(&service, test::TestRequest::get().uri("/api/auth/me").to_request()).await;
        let garbage = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header(("Authorization", "Bearer garbage"))
                .to_request(),
        )
        .await;
        let valid = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header(("Authorization", app.bearer(&owner)))
                .to_request(),
        )
        .await;

        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(valid.status(), StatusCode::OK);
    }
}
