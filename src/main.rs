mod config;
mod db;
mod error;
mod middleware;
mod models;
mod outbound;
mod routes;
mod services;
mod state;
mod telemetry;
mod utils;

#[cfg(test)]
mod testing;

use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Utc;

use crate::config::AppConfig;
use crate::services::auth_service::AuthService;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_tracing();

    // 1. Configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            std::process::exit(1);
        }
    };

    // 2. Database
    tracing::info!("connecting to database");
    let db = match db::establish_connection(&config.database_url).await {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "failed to connect to database");
            std::process::exit(1);
        }
    };
    if let Err(error) = db::sync_schema(&db).await {
        tracing::error!(%error, "failed to create schema");
        std::process::exit(1);
    }
    if let Err(error) = AuthService::seed_admin(&db, &config, Utc::now()).await {
        tracing::error!(%error, "failed to seed admin credentials");
        std::process::exit(1);
    }

    // 3. Outbound collaborators
    let client = reqwest::Client::new();
    let mailer = outbound::build_mailer(&config, client.clone());
    let files = outbound::build_file_store(&config, client);

    let bind = (config.bind_address.clone(), config.port);
    let state = web::Data::new(AppState::new(db, config, mailer, files));

    tracing::info!(address = %bind.0, port = bind.1, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
