use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::models::users;

pub struct IdentityService;

impl IdentityService {
    /// Finds the user with `email`, creating it when absent. A different
    /// `username` overwrites the stored one.
    pub async fn resolve<C: ConnectionTrait>(
        db: &C,
        email: &str,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<users::Model, DbErr> {
        let email = email.trim();
        let username = username.trim();

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?;

        match existing {
            Some(user) if user.username == username => Ok(user),
            Some(user) => {
                let mut active: users::ActiveModel = user.into();
                active.username = Set(username.to_string());
                active.update(db).await
            }
            None => {
                let inserted = users::ActiveModel {
                    email: Set(email.to_string()),
                    username: Set(username.to_string()),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(db)
                .await;

                match inserted {
                    Ok(user) => {
                        tracing::info!(user_id = user.id, "new participant registered");
                        Ok(user)
                    }
                    // Lost a race with another first-time request for this email
                    Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                        users::Entity::find()
                            .filter(users::Column::Email.eq(email))
                            .one(db)
                            .await?
                            .ok_or(err)
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }

    pub async fn find<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(user_id).one(db).await
    }

    /// Profile edit from PATCH /user/me. `None` when the user is gone.
    pub async fn rename<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        username: &str,
    ) -> Result<Option<users::Model>, DbErr> {
        let Some(user) = Self::find(db, user_id).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.username = Set(username.trim().to_string());
        active.update(db).await.map(Some)
    }
}
