use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::*;

use crate::models::edit_tokens;

/// Emailed bearer tokens that let a user edit their own records without a
/// session. Several tokens per user may be live at once.
pub struct EditTokenService;

impl EditTokenService {
    /// 32 random bytes, hex encoded.
    pub fn generate() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes);
        hex::encode(bytes)
    }

    /// Stores a new token for `user_id` expiring `ttl` after `now`.
    pub async fn issue<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, DbErr> {
        let token = Self::generate();

        edit_tokens::ActiveModel {
            user_id: Set(user_id),
            token: Set(token.clone()),
            expires_at: Set(now + ttl),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::debug!(user_id, "edit token issued");
        Ok(token)
    }

    /// Owner of `token` while `now < expires_at`. An expired token is
    /// deleted on sight; deleting a row that is already gone is a no-op.
    pub async fn validate<C: ConnectionTrait>(
        db: &C,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i32>, DbErr> {
        let Some(row) = edit_tokens::Entity::find()
            .filter(edit_tokens::Column::Token.eq(token))
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        if row.expires_at <= now {
            edit_tokens::Entity::delete_many()
                .filter(edit_tokens::Column::Id.eq(row.id))
                .exec(db)
                .await?;
            tracing::debug!(user_id = row.user_id, "expired edit token removed");
            return Ok(None);
        }

        Ok(Some(row.user_id))
    }

    /// Deletes every row holding `token`. Returns how many were removed.
    pub async fn revoke<C: ConnectionTrait>(db: &C, token: &str) -> Result<u64, DbErr> {
        let result = edit_tokens::Entity::delete_many()
            .filter(edit_tokens::Column::Token.eq(token))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
