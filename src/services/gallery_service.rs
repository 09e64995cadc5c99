use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Serialize;

use crate::models::{pledges, submissions};

pub const GALLERY_SIZE: usize = 9;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub url: String,
    pub key: String,
    pub title: Option<String>,
    pub gc_username: String,
    pub created_at: DateTime<Utc>,
    pub state: String,
}

/// Newest images first, pledges and submissions mixed, at most `limit`.
pub fn latest_images(
    pledges: &[pledges::Model],
    submissions: &[submissions::Model],
    limit: usize,
) -> Vec<GalleryImage> {
    let from_pledges = pledges.iter().flat_map(|pledge| {
        pledge.images.0.iter().map(move |image| GalleryImage {
            url: image.url.clone(),
            key: image.key.clone(),
            title: pledge.title.clone(),
            gc_username: pledge.gc_username.clone(),
            created_at: pledge.created_at,
            state: pledge.states.joined(),
        })
    });
    let from_submissions = submissions.iter().flat_map(|submission| {
        submission.images.0.iter().map(move |image| GalleryImage {
            url: image.url.clone(),
            key: image.key.clone(),
            title: Some(submission.cache_name.clone()),
            gc_username: submission.gc_username.clone(),
            created_at: submission.created_at,
            state: submission.state.clone(),
        })
    });

    let mut images: Vec<GalleryImage> = from_pledges.chain(from_submissions).collect();
    images.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    images.truncate(limit);
    images
}

pub struct GalleryService;

impl GalleryService {
    /// Any failure degrades to an empty gallery.
    pub async fn latest(db: &DatabaseConnection) -> Vec<GalleryImage> {
        match Self::load(db).await {
            Ok((pledges, submissions)) => latest_images(&pledges, &submissions, GALLERY_SIZE),
            Err(error) => {
                tracing::error!(%error, "could not load gallery images");
                Vec::new()
            }
        }
    }

    async fn load(db: &DatabaseConnection) -> Result<(Vec<pledges::Model>, Vec<submissions::Model>), DbErr> {
        let pledges = pledges::Entity::find()
            .order_by_desc(pledges::Column::CreatedAt)
            .all(db)
            .await?;
        let submissions = submissions::Entity::find()
            .order_by_desc(submissions::Column::CreatedAt)
            .all(db)
            .await?;
        Ok((pledges, submissions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, at};

    #[actix_web::test]
    async fn keeps_the_nine_newest_images() {
        let db = crate::db::test_connection().await;
        let owner = testing::user(&db, "owner@example.com", "Owner").await;
        for day in 1..=4 {
            let mut active = testing::pledge_for(&owner);
            active.created_at = Set(at(2026, 1, day));
            let (a, b) = (format!("p{day}a"), format!("p{day}b"));
            active.images = Set(testing::images(&[a.as_str(), b.as_str()]));
            active.insert(&db).await.unwrap();
        }
        let pledge = testing::pledge(&db, &owner).await;
        let mut submission = testing::submission_for(&pledge);
        submission.created_at = Set(at(2026, 2, 1));
        submission.images = Set(testing::images(&["s1", "s2"]));
        submission.insert(&db).await.unwrap();

        let images = GalleryService::latest(&db).await;

        assert_eq!(images.len(), GALLERY_SIZE);
        assert_eq!(images[0].key, "s1");
        assert_eq!(images[0].title.as_deref(), Some("Creek Crossing"));
        assert_eq!(images.iter().filter(|image| image.created_at == at(2026, 1, 1)).count(), 1);
    }

    #[test]
    fn no_images_no_gallery() {
        assert!(latest_images(&[], &[], GALLERY_SIZE).is_empty());
    }
}
