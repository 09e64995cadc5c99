pub mod admin;
pub mod auth;
pub mod health;
pub mod manage;
pub mod news;
pub mod pledges;
pub mod stats;
pub mod submissions;
pub mod user;

use actix_web::web;

use crate::error::AppError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies and query strings get the same JSON error shape
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::bad_request(format!("Invalid request body: {err}")).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::bad_request(format!("Invalid query string: {err}")).into()),
    )
    .service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(user::user_routes)
            .configure(pledges::pledge_routes)
            .configure(submissions::submission_routes)
            .configure(manage::manage_routes)
            .configure(admin::admin_routes)
            .configure(stats::stats_routes)
            .configure(news::news_routes),
    );
}
