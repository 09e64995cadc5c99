use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateConfirmationRequest, CreatePledgeRequest, UpdatePledgeRequest};
use crate::services::access::Principal;
use crate::services::confirmation_service::ConfirmationService;
use crate::services::edit_token_service::EditTokenService;
use crate::services::identity_service::IdentityService;
use crate::services::notification_service::NotificationService;
use crate::services::pledge_service::PledgeService;
use crate::state::AppState;

/// POST /api/pledge - Record a pledge and email the manage link (PUBLIC)
#[post("/pledge")]
pub async fn create_pledge(
    state: web::Data<AppState>,
    body: web::Json<CreatePledgeRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();
    request.check()?;
    let now = Utc::now();

    // 1. Identity from email
    let owner = IdentityService::resolve(&state.db, &request.email, &request.username, now).await?;

    // 2. Pledge
    let pledge = PledgeService::create(&state.db, &owner, request, now).await?;

    // 3. Edit token, delivered by email only
    let token = EditTokenService::issue(&state.db, owner.id, state.config.edit_token_ttl, now).await?;
    NotificationService::send_manage_link(state.mailer.as_ref(), &state.config, &owner.email, &token).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "pledgeId": pledge.id,
        "message": "Pledge recorded. Check your email for a link to manage it."
    })))
}

/// POST /api/confirm - Link a published cache to the event (PUBLIC)
#[post("/confirm")]
pub async fn create_confirmation(
    state: web::Data<AppState>,
    body: web::Json<CreateConfirmationRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();
    request.check()?;
    let now = Utc::now();

    let owner = IdentityService::resolve(&state.db, &request.email, &request.username, now).await?;
    let confirmation = ConfirmationService::create(&state.db, &owner, request, now).await?;

    let token = EditTokenService::issue(&state.db, owner.id, state.config.edit_token_ttl, now).await?;
    NotificationService::send_manage_link(state.mailer.as_ref(), &state.config, &owner.email, &token).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "confirmationId": confirmation.id,
        "message": "Confirmation recorded. Check your email for a link to manage it."
    })))
}

/// GET /api/pledges/me - The signed-in user's pledges (PROTECTED)
#[get("/me")]
pub async fn my_pledges(state: web::Data<AppState>, auth_user: AuthUser) -> AppResult<HttpResponse> {
    let pledges = PledgeService::list_for_user(&state.db, auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "pledges": pledges })))
}

/// GET /api/pledges/{id} - One pledge with its submission (OWNER or ADMIN)
#[get("/{id}")]
pub async fn get_pledge(
    state: web::Data<AppState>,
    caller: Principal,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let pledge = PledgeService::get(&state.db, &caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "pledge": pledge })))
}

/// PATCH /api/pledges/{id} - Partial update (OWNER or ADMIN)
#[patch("/{id}")]
pub async fn update_pledge(
    state: web::Data<AppState>,
    caller: Principal,
    path: web::Path<i32>,
    body: web::Json<UpdatePledgeRequest>,
) -> AppResult<HttpResponse> {
    let changes = body.into_inner();
    changes.check()?;

    let pledge = PledgeService::update(&state.db, &caller, path.into_inner(), changes, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "pledge": pledge })))
}

/// DELETE /api/pledges/{id} - Delete with submission and images (OWNER or ADMIN)
#[delete("/{id}")]
pub async fn delete_pledge(
    state: web::Data<AppState>,
    caller: Principal,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    PledgeService::delete(&state.db, state.files.as_ref(), &caller, path.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub fn pledge_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_pledge)
        .service(create_confirmation)
        .service(
            web::scope("/pledges")
                .service(my_pledges)
                .service(get_pledge)
                .service(update_pledge)
                .service(delete_pledge),
        );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
    use serde_json::{json, Value};

    use crate::models::{confirmations, edit_tokens, pledges, users};
    use crate::outbound::fakes::{RecordingFileStore, RecordingMailer};
    use crate::routes::configure_routes;
    use crate::testing::{self, TestApp, ADMIN_EMAIL};

    fn pledge_body() -> Value {
        json!({
            "email": "owner@example.com",
            "username": "CacheOwner",
            "pledgedCount": 2,
            "cacheTypes": ["TRADITIONAL", "MULTI"],
            "cacheSizes": ["SMALL"],
            "states": ["NSW"],
            "approxLocations": ["Newcastle"],
            "ideaNotes": "Under the old bridge"
        })
    }

    #[actix_web::test]
    async fn create_pledge_issues_token_and_email() {
        let app = TestApp::new().await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::post().uri("/api/pledge").set_json(pledge_body()).to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        assert_eq!(body["success"], true);
        let pledge_id = body["pledgeId"].as_i64().unwrap() as i32;
        let pledge = pledges::Entity::find_by_id(pledge_id).one(app.db()).await.unwrap().unwrap();
        assert_eq!(pledge.pledged_count, 2);
        assert_eq!(pledge.concept_notes.as_deref(), Some("Under the old bridge"));
        assert_eq!(edit_tokens::Entity::find().count(app.db()).await.unwrap(), 1);
        assert_eq!(app.mailer.sent().len(), 1);
    }

    #[actix_web::test]
    async fn unknown_cache_type_is_rejected() {
        let app = TestApp::new().await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;
        let mut body = pledge_body();
        body["cacheTypes"] = json!(["EARTHCACHE"]);

        let req = test::TestRequest::post().uri("/api/pledge").set_json(body).to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(users::Entity::find().count(app.db()).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn mail_failure_does_not_fail_the_pledge() {
        let app = TestApp::with_collaborators(RecordingMailer::failing(), RecordingFileStore::default()).await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::post().uri("/api/pledge").set_json(pledge_body()).to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(pledges::Entity::find().count(app.db()).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn confirm_without_pledge_creates_one() {
        let app = TestApp::new().await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/confirm")
            .set_json(json!({
                "email": "finder@example.com",
                "username": "Finder",
                "gcCode": "GCAB12",
                "cacheName": "Lookout",
                "type": "MYSTERY",
                "size": "MICRO",
                "difficulty": 3.5,
                "terrain": 2,
                "suburb": "Katoomba",
                "state": "NSW",
                "noPreviousPledge": true
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        let confirmation_id = body["confirmationId"].as_i64().unwrap() as i32;
        let confirmation = confirmations::Entity::find_by_id(confirmation_id).one(app.db()).await.unwrap().unwrap();
        assert!(confirmation.from_non_pledge);
        assert!(confirmation.pledge_id.is_some());
        assert_eq!(app.mailer.sent().len(), 1);
    }

    #[actix_web::test]
    async fn other_users_session_gets_403() {
        let app = TestApp::new().await;
        let owner = testing::user(app.db(), "owner@example.com", "Owner").await;
        let stranger = testing::user(app.db(), "stranger@example.com", "Stranger").await;
        let pledge = testing::pledge(app.db(), &owner).await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let patch = test::TestRequest::patch()
            .uri(&format!("/api/pledges/{}", pledge.id))
            .insert_header(("Authorization", app.bearer(&stranger)))
            .set_json(json!({ "pledgedCount": 5 }))
            .to_request();
        let delete = test::TestRequest::delete()
            .uri(&format!("/api/pledges/{}", pledge.id))
            .insert_header(("Authorization", app.bearer(&stranger)))
            .to_request();
        let anonymous = test::TestRequest::get().uri(&format!("/api/pledges/{}", pledge.id)).to_request();

        assert_eq!(test::call_service(&service, patch).await.status(), StatusCode::FORBIDDEN);
        assert_eq!(test::call_service(&service, delete).await.status(), StatusCode::FORBIDDEN);
        assert_eq!(test::call_service(&service, anonymous).await.status(), StatusCode::UNAUTHORIZED);
        assert!(pledges::Entity::find_by_id(pledge.id).one(app.db()).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn owner_and_admin_can_edit() {
        let app = TestApp::new().await;
        let owner = testing::user(app.db(), "owner@example.com", "Owner").await;
        let admin = testing::user(app.db(), ADMIN_EMAIL, "Admin").await;
        let pledge = testing::pledge(app.db(), &owner).await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let by_owner = test::TestRequest::patch()
            .uri(&format!("/api/pledges/{}", pledge.id))
            .insert_header(("Authorization", app.bearer(&owner)))
            .set_json(json!({ "pledgedCount": 3 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, by_owner).await;
        assert_eq!(body["pledge"]["pledgedCount"], 3);

        let by_admin = test::TestRequest::delete()
            .uri(&format!("/api/pledges/{}", pledge.id))
            .insert_header(("Authorization", app.bearer(&admin)))
            .to_request();
        assert_eq!(test::call_service(&service, by_admin).await.status(), StatusCode::OK);
        assert!(pledges::Entity::find_by_id(pledge.id).one(app.db()).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn my_pledges_lists_only_mine() {
        let app = TestApp::new().await;
        let owner = testing::user(app.db(), "owner@example.com", "Owner").await;
        let other = testing::user(app.db(), "other@example.com", "Other").await;
        testing::pledge(app.db(), &owner).await;
        let mut later = testing::pledge_for(&owner);
        later.title = Set(Some("Second".to_string()));
        later.created_at = Set(testing::at(2026, 3, 1));
        later.insert(app.db()).await.unwrap();
        testing::pledge(app.db(), &other).await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/pledges/me")
            .insert_header(("Authorization", app.bearer(&owner)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        let pledges = body["pledges"].as_array().unwrap();
        assert_eq!(pledges.len(), 2);
        assert_eq!(pledges[0]["title"], "Second");
    }
}
