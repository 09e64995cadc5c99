// ============================================================================
// AUTH SERVICE
// ============================================================================
//
// Sessions are signed JWTs. Three ways to obtain one:
//   - magic link: identity resolved from email, edit token emailed
//   - verify: an emailed edit token exchanged for a session
//   - admin login: email + password checked against admin_users
//
// ============================================================================

use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::dto::SessionResponse;
use crate::models::{admin_users, users};
use crate::outbound::Mailer;
use crate::services::edit_token_service::EditTokenService;
use crate::services::identity_service::IdentityService;
use crate::services::notification_service::NotificationService;
use crate::utils::{jwt, password};

const ADMIN_USERNAME: &str = "Admin";

pub struct AuthService;

impl AuthService {
    /// Signs a session for `user`.
    pub fn session_for(config: &AppConfig, user: &users::Model, is_admin: bool) -> AppResult<SessionResponse> {
        let is_admin = is_admin || config.is_admin_email(&user.email);
        let token = jwt::generate_token(&config.jwt_secret, user.id, &user.email, is_admin, config.session_ttl)
            .map_err(AppError::Internal)?;

        Ok(SessionResponse {
            token,
            user_id: user.id,
            email: user.email.clone(),
            is_admin,
        })
    }

    /// Resolves the user and emails them a fresh edit link.
    pub async fn send_magic_link(
        db: &DatabaseConnection,
        mailer: &dyn Mailer,
        config: &AppConfig,
        email: &str,
        username: &str,
        now: DateTime<Utc>,
    ) -> AppResult<users::Model> {
        let user = IdentityService::resolve(db, email, username, now).await?;
        let token = EditTokenService::issue(db, user.id, config.edit_token_ttl, now).await?;

        NotificationService::send_manage_link(mailer, config, &user.email, &token).await;
        Ok(user)
    }

    /// Exchanges a live edit token for a session. The token stays valid.
    pub async fn verify(
        db: &DatabaseConnection,
        config: &AppConfig,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<SessionResponse> {
        // 1. Token -> user id
        let user_id = EditTokenService::validate(db, token, now)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

        // 2. User row
        let user = IdentityService::find(db, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        // 3. Session
        Self::session_for(config, &user, false)
    }

    /// Password login for the configured administrator.
    pub async fn admin_login(
        db: &DatabaseConnection,
        config: &AppConfig,
        email: &str,
        plain: &str,
        now: DateTime<Utc>,
    ) -> AppResult<SessionResponse> {
        let email = email.trim();

        // 1. Find the admin credential
        let admin = admin_users::Entity::find()
            .filter(admin_users::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

        // 2. Check the password
        let valid = password::verify_password(plain, &admin.password_hash).map_err(AppError::Internal)?;
        if !valid {
            tracing::warn!("admin login rejected");
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        // 3. The session subject is a users row; create one on first login
        let user = match users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
        {
            Some(user) => user,
            None => IdentityService::resolve(db, email, ADMIN_USERNAME, now).await?,
        };

        tracing::info!(user_id = user.id, "admin signed in");
        Self::session_for(config, &user, true)
    }

    /// Upserts the admin credential from ADMIN_EMAIL / ADMIN_PASSWORD.
    pub async fn seed_admin(db: &DatabaseConnection, config: &AppConfig, now: DateTime<Utc>) -> AppResult<()> {
        let (Some(email), Some(plain)) = (config.admin_email.as_deref(), config.admin_password.as_deref()) else {
            tracing::info!("no admin credentials configured, skipping admin seed");
            return Ok(());
        };

        let password_hash = password::hash_password(plain).map_err(AppError::Internal)?;

        let existing = admin_users::Entity::find()
            .filter(admin_users::Column::Email.eq(email))
            .one(db)
            .await?;

        match existing {
            Some(admin) => {
                let mut active: admin_users::ActiveModel = admin.into();
                active.password_hash = Set(password_hash);
                active.update(db).await?;
            }
            None => {
                admin_users::ActiveModel {
                    email: Set(email.to_string()),
                    password_hash: Set(password_hash),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(db)
                .await?;
            }
        }

        tracing::info!("admin credentials seeded");
        Ok(())
    }
}
