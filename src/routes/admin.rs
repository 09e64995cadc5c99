use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::access::Principal;
use crate::services::admin_service::AdminService;
use crate::services::audit_service::AuditService;
use crate::services::csv_export;
use crate::services::filters::{FilterQuery, RecordFilter};
use crate::services::stats_service::StatsService;
use crate::state::AppState;

const DEFAULT_AUDIT_LIMIT: u64 = 100;
const MAX_AUDIT_LIMIT: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<u64>,
}

/// GET /api/admin/pledges - Filtered pledges with owner email (ADMIN)
#[get("/pledges")]
pub async fn list_pledges(
    state: web::Data<AppState>,
    caller: Principal,
    query: web::Query<FilterQuery>,
) -> AppResult<HttpResponse> {
    caller.require_admin()?;
    let filter = RecordFilter::try_from(query.into_inner())?;

    let pledges = AdminService::pledges(&state.db, &filter).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "pledges": pledges })))
}

/// GET /api/admin/submissions (ADMIN)
#[get("/submissions")]
pub async fn list_submissions(
    state: web::Data<AppState>,
    caller: Principal,
    query: web::Query<FilterQuery>,
) -> AppResult<HttpResponse> {
    caller.require_admin()?;
    let filter = RecordFilter::try_from(query.into_inner())?;

    let submissions = AdminService::submissions(&state.db, &filter).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "submissions": submissions })))
}

/// GET /api/admin/confirmations (ADMIN)
#[get("/confirmations")]
pub async fn list_confirmations(
    state: web::Data<AppState>,
    caller: Principal,
    query: web::Query<FilterQuery>,
) -> AppResult<HttpResponse> {
    caller.require_admin()?;
    let filter = RecordFilter::try_from(query.into_inner())?;

    let confirmations = AdminService::confirmations(&state.db, &filter).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "confirmations": confirmations })))
}

/// GET /api/admin/audit-log?limit= - Latest admin changes (ADMIN)
#[get("/audit-log")]
pub async fn audit_log(
    state: web::Data<AppState>,
    caller: Principal,
    query: web::Query<AuditQuery>,
) -> AppResult<HttpResponse> {
    caller.require_admin()?;
    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT);

    let logs = AuditService::list(&state.db, limit).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "logs": logs })))
}

/// GET /api/admin/stats - Public stats plus distinct pledgers (ADMIN)
#[get("/stats")]
pub async fn admin_stats(state: web::Data<AppState>, caller: Principal) -> AppResult<HttpResponse> {
    caller.require_admin()?;

    let stats = StatsService::admin(&state.db).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// GET /api/admin/export/{pledges|submissions|confirmations} - CSV download (ADMIN)
#[get("/export/{kind}")]
pub async fn export_csv(
    state: web::Data<AppState>,
    caller: Principal,
    path: web::Path<String>,
    query: web::Query<FilterQuery>,
) -> AppResult<HttpResponse> {
    caller.require_admin()?;
    let kind = path.into_inner();
    let filter = RecordFilter::try_from(query.into_inner())?;

    let body = match kind.as_str() {
        "pledges" => csv_export::pledges_csv(&AdminService::pledges(&state.db, &filter).await?),
        "submissions" => csv_export::submissions_csv(&AdminService::submissions(&state.db, &filter).await?),
        "confirmations" => csv_export::confirmations_csv(&AdminService::confirmations(&state.db, &filter).await?),
        _ => return Err(AppError::not_found(format!("Unknown export: {kind}"))),
    };

    let filename = format!("irc26-{}-{}.csv", kind, Utc::now().format("%Y-%m-%d"));
    tracing::info!(%kind, "admin export generated");

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename)],
            },
        ))
        .body(body))
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(list_pledges)
            .service(list_submissions)
            .service(list_confirmations)
            .service(audit_log)
            .service(admin_stats)
            .service(export_csv),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, Set};
    use serde_json::{json, Value};

    use crate::routes::configure_routes;
    use crate::testing::{self, TestApp, ADMIN_EMAIL};

    #[actix_web::test]
    async fn listings_are_admin_only() {
        let app = TestApp::new().await;
        let owner = testing::user(app.db(), "owner@example.com", "Owner").await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let anonymous = test::TestRequest::get().uri("/api/admin/pledges").to_request();
        let participant = test::TestRequest::get()
            .uri("/api/admin/pledges")
            .insert_header(("Authorization", app.bearer(&owner)))
            .to_request();

        assert_eq!(test::call_service(&service, anonymous).await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(test::call_service(&service, participant).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn filtered_listing_includes_owner_email() {
        let app = TestApp::new().await;
        let admin = testing::user(app.db(), ADMIN_EMAIL, "Admin").await;
        let owner = testing::user(app.db(), "owner@example.com", "Owner").await;
        testing::pledge(app.db(), &owner).await;
        let mut qld = testing::pledge_for(&owner);
        qld.states = Set(testing::labels(&["QLD"]));
        qld.insert(app.db()).await.unwrap();
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/admin/pledges?state=QLD")
            .insert_header(("Authorization", app.bearer(&admin)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        let pledges = body["pledges"].as_array().unwrap();
        assert_eq!(pledges.len(), 1);
        assert_eq!(pledges[0]["states"], json!(["QLD"]));
        assert_eq!(pledges[0]["user"]["email"], "owner@example.com");
    }

    #[actix_web::test]
    async fn bad_date_filter_is_a_validation_error() {
        let app = TestApp::new().await;
        let admin = testing::user(app.db(), ADMIN_EMAIL, "Admin").await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/admin/confirmations?startDate=yesterday")
            .insert_header(("Authorization", app.bearer(&admin)))
            .to_request();

        assert_eq!(test::call_service(&service, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn export_is_a_csv_attachment() {
        let app = TestApp::new().await;
        let admin = testing::user(app.db(), ADMIN_EMAIL, "Admin").await;
        let owner = testing::user(app.db(), "owner@example.com", "Owner").await;
        testing::confirmation_for(&owner).insert(app.db()).await.unwrap();
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/admin/export/confirmations")
            .insert_header(("Authorization", app.bearer(&admin)))
            .to_request();
        let resp = test::call_service(&service, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap().to_string();
        let disposition = resp.headers().get("content-disposition").unwrap().to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/csv"));
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains(&format!("irc26-confirmations-{}.csv", Utc::now().format("%Y-%m-%d"))));

        let body = test::read_body(resp).await;
        let csv = std::str::from_utf8(&body).unwrap();
        assert!(csv.starts_with("Username,Email,GC Code,"));
        assert_eq!(csv.lines().count(), 2);
    }

    #[actix_web::test]
    async fn unknown_export_is_404() {
        let app = TestApp::new().await;
        let admin = testing::user(app.db(), ADMIN_EMAIL, "Admin").await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/admin/export/users")
            .insert_header(("Authorization", app.bearer(&admin)))
            .to_request();

        assert_eq!(test::call_service(&service, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn admin_edits_show_up_in_the_audit_log() {
        let app = TestApp::new().await;
        let admin = testing::user(app.db(), ADMIN_EMAIL, "Admin").await;
        let owner = testing::user(app.db(), "owner@example.com", "Owner").await;
        let pledge = testing::pledge(app.db(), &owner).await;
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let edit = test::TestRequest::patch()
            .uri(&format!("/api/pledges/{}", pledge.id))
            .insert_header(("Authorization", app.bearer(&admin)))
            .set_json(json!({ "pledgedCount": 7 }))
            .to_request();
        assert_eq!(test::call_service(&service, edit).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/admin/audit-log")
            .insert_header(("Authorization", app.bearer(&admin)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        let logs = body["logs"].as_array().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["action"], "UPDATE_PLEDGE");
        assert_eq!(logs[0]["before"]["pledgedCount"], 1);
        assert_eq!(logs[0]["after"]["pledgedCount"], 7);
    }

    #[actix_web::test]
    async fn admin_stats_count_pledgers() {
        let app = TestApp::new().await;
        let admin = testing::user(app.db(), ADMIN_EMAIL, "Admin").await;
        let owner = testing::user(app.db(), "owner@example.com", "Owner").await;
        let finder = testing::user(app.db(), "finder@example.com", "Finder").await;
        testing::pledge(app.db(), &owner).await;
        testing::confirmation_for(&finder).insert(app.db()).await.unwrap();
        let service = test::init_service(App::new().app_data(app.state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/admin/stats")
            .insert_header(("Authorization", app.bearer(&admin)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        assert_eq!(body["totalPledgers"], 2);
        assert_eq!(body["totalPledges"], 1);
    }
}
