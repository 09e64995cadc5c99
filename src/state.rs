use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::outbound::{FileStore, Mailer};

/// Shared by every handler through `web::Data<AppState>`. Built once in main.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub mailer: Arc<dyn Mailer>,
    pub files: Arc<dyn FileStore>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: AppConfig,
        mailer: Arc<dyn Mailer>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        Self { db, config, mailer, files }
    }
}
