use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::models::dto::LikeStatus;
use crate::models::post_likes;

/// Anonymous likes on news posts, one per (post, visitor).
pub struct LikeService;

impl LikeService {
    pub async fn toggle(
        db: &DatabaseConnection,
        post_id: &str,
        visitor_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LikeStatus, DbErr> {
        let removed = post_likes::Entity::delete_many()
            .filter(post_likes::Column::PostId.eq(post_id))
            .filter(post_likes::Column::VisitorId.eq(visitor_id))
            .exec(db)
            .await?
            .rows_affected;

        let liked = if removed > 0 {
            false
        } else {
            post_likes::ActiveModel {
                post_id: Set(post_id.to_string()),
                visitor_id: Set(visitor_id.to_string()),
                created_at: Set(now),
            }
            .insert(db)
            .await?;
            true
        };

        Ok(LikeStatus {
            liked,
            count: Self::count(db, post_id).await?,
        })
    }

    pub async fn status(
        db: &DatabaseConnection,
        post_id: &str,
        visitor_id: Option<&str>,
    ) -> Result<LikeStatus, DbErr> {
        let liked = match visitor_id {
            Some(visitor_id) => post_likes::Entity::find_by_id((post_id.to_string(), visitor_id.to_string()))
                .one(db)
                .await?
                .is_some(),
            None => false,
        };

        Ok(LikeStatus {
            liked,
            count: Self::count(db, post_id).await?,
        })
    }

    async fn count(db: &DatabaseConnection, post_id: &str) -> Result<u64, DbErr> {
        post_likes::Entity::find()
            .filter(post_likes::Column::PostId.eq(post_id))
            .count(db)
            .await
    }
}
