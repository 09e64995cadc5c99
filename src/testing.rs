// Fixtures shared by the service and route tests.

use std::sync::Arc;

use actix_web::web;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::config::AppConfig;
use crate::db;
use crate::middleware::AuthUser;
use crate::models::pledges::PledgeStatus;
use crate::models::values::{ImageRef, ImageSet, Labels};
use crate::models::{confirmations, pledges, submissions, users};
use crate::outbound::fakes::{RecordingFileStore, RecordingMailer};
use crate::state::AppState;
use crate::utils::jwt;

pub const ADMIN_EMAIL: &str = "admin@irc26.example";

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
}

pub fn labels(values: &[&str]) -> Labels {
    Labels(values.iter().map(|value| value.to_string()).collect())
}

pub fn images(keys: &[&str]) -> ImageSet {
    ImageSet(
        keys.iter()
            .map(|key| ImageRef {
                url: format!("https://utfs.io/f/{key}"),
                key: key.to_string(),
            })
            .collect(),
    )
}

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub mailer: Arc<RecordingMailer>,
    pub files: Arc<RecordingFileStore>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_collaborators(RecordingMailer::default(), RecordingFileStore::default()).await
    }

    pub async fn with_collaborators(mailer: RecordingMailer, files: RecordingFileStore) -> Self {
        let mailer = Arc::new(mailer);
        let files = Arc::new(files);
        let state = AppState::new(
            db::test_connection().await,
            AppConfig::for_tests(),
            mailer.clone(),
            files.clone(),
        );

        Self { state: web::Data::new(state), mailer, files }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    /// `Authorization` header value for a session of `user`.
    pub fn bearer(&self, user: &users::Model) -> String {
        let is_admin = self.state.config.is_admin_email(&user.email);
        let token = jwt::generate_token(&self.state.config.jwt_secret, user.id, &user.email, is_admin, Duration::hours(1))
            .unwrap();
        format!("Bearer {token}")
    }
}

pub fn session_of(user: &users::Model, is_admin: bool) -> AuthUser {
    AuthUser {
        user_id: user.id,
        email: user.email.clone(),
        is_admin,
    }
}

pub async fn user(db: &DatabaseConnection, email: &str, username: &str) -> users::Model {
    users::ActiveModel {
        email: Set(email.to_string()),
        username: Set(username.to_string()),
        created_at: Set(at(2026, 1, 1)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub fn pledge_for(owner: &users::Model) -> pledges::ActiveModel {
    pledges::ActiveModel {
        user_id: Set(owner.id),
        gc_username: Set(owner.username.clone()),
        title: Set(None),
        pledged_count: Set(1),
        cache_types: Set(labels(&["TRADITIONAL"])),
        cache_sizes: Set(labels(&["SMALL"])),
        states: Set(labels(&["NSW"])),
        approx_locations: Set(labels(&["Newcastle"])),
        concept_notes: Set(None),
        images: Set(ImageSet::default()),
        status: Set(PledgeStatus::Concept),
        created_at: Set(at(2026, 1, 5)),
        updated_at: Set(at(2026, 1, 5)),
        ..Default::default()
    }
}

pub async fn pledge(db: &DatabaseConnection, owner: &users::Model) -> pledges::Model {
    pledge_for(owner).insert(db).await.unwrap()
}

pub fn confirmation_for(owner: &users::Model) -> confirmations::ActiveModel {
    confirmations::ActiveModel {
        user_id: Set(owner.id),
        pledge_id: Set(None),
        gc_code: Set("GC1ABCD".to_string()),
        cache_name: Set("Harbour View".to_string()),
        cache_type: Set("MULTI".to_string()),
        cache_size: Set("REGULAR".to_string()),
        difficulty: Set(2.0),
        terrain: Set(1.5),
        suburb: Set("Manly".to_string()),
        state: Set("NSW".to_string()),
        notes: Set(None),
        from_non_pledge: Set(false),
        created_at: Set(at(2026, 1, 6)),
        updated_at: Set(at(2026, 1, 6)),
        ..Default::default()
    }
}

pub fn submission_for(pledge: &pledges::Model) -> submissions::ActiveModel {
    submissions::ActiveModel {
        pledge_id: Set(pledge.id),
        user_id: Set(pledge.user_id),
        gc_username: Set(pledge.gc_username.clone()),
        gc_code: Set("GC9ZZZZ".to_string()),
        cache_name: Set("Creek Crossing".to_string()),
        cache_type: Set("TRADITIONAL".to_string()),
        suburb: Set("Maitland".to_string()),
        state: Set("NSW".to_string()),
        difficulty: Set(1.5),
        terrain: Set(2.0),
        hidden_date: Set(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()),
        notes: Set(None),
        images: Set(ImageSet::default()),
        created_at: Set(at(2026, 2, 2)),
        updated_at: Set(at(2026, 2, 2)),
        ..Default::default()
    }
}
