use chrono::{DateTime, Utc};
use sea_orm::*;
use sea_orm::sea_query::Expr;

use crate::error::{AppError, AppResult};
use crate::models::dto::{CreatePledgeRequest, PledgeWithSubmission, UpdatePledgeRequest};
use crate::models::pledges::{self, PledgeStatus};
use crate::models::{confirmations, submissions, users};
use crate::outbound::FileStore;
use crate::services::access::Principal;
use crate::services::audit_service::{AuditAction, AuditService};

pub struct PledgeService;

impl PledgeService {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        owner: &users::Model,
        request: CreatePledgeRequest,
        now: DateTime<Utc>,
    ) -> Result<pledges::Model, DbErr> {
        let pledge = pledges::ActiveModel {
            user_id: Set(owner.id),
            gc_username: Set(request.username.trim().to_string()),
            title: Set(request.title),
            pledged_count: Set(request.pledged_count),
            cache_types: Set(request.cache_types.into()),
            cache_sizes: Set(request.cache_sizes.into()),
            states: Set(request.states.into()),
            approx_locations: Set(request.approx_locations.into()),
            concept_notes: Set(request.concept_notes),
            images: Set(request.images.map(|images| images.normalize()).unwrap_or_default()),
            status: Set(PledgeStatus::Concept),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(pledge_id = pledge.id, user_id = owner.id, "pledge created");
        Ok(pledge)
    }

    pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<pledges::Model> {
        pledges::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Pledge not found"))
    }

    pub async fn get(db: &DatabaseConnection, caller: &Principal, id: i32) -> AppResult<PledgeWithSubmission> {
        let pledge = Self::find(db, id).await?;
        caller.authorize(pledge.user_id)?;

        let submission = pledge.find_related(submissions::Entity).one(db).await?;
        Ok(PledgeWithSubmission { pledge, submission })
    }

    /// Partial update. Admin edits are audited in the same transaction.
    pub async fn update(
        db: &DatabaseConnection,
        caller: &Principal,
        id: i32,
        changes: UpdatePledgeRequest,
        now: DateTime<Utc>,
    ) -> AppResult<pledges::Model> {
        let existing = Self::find(db, id).await?;
        caller.authorize(existing.user_id)?;

        let mut active: pledges::ActiveModel = existing.clone().into();
        Self::apply_changes(&mut active, changes);
        active.updated_at = Set(now);

        let txn = db.begin().await?;
        let updated = active.update(&txn).await?;
        if let Some(admin) = caller.admin() {
            AuditService::record(&txn, admin, AuditAction::UpdatePledge, id, &existing, Some(&updated), now).await?;
        }
        txn.commit().await?;

        Ok(updated)
    }

    /// Deletes the pledge with its submission, then asks the file host to
    /// drop the images of both. File deletion never fails the request.
    pub async fn delete(
        db: &DatabaseConnection,
        files: &dyn FileStore,
        caller: &Principal,
        id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let pledge = Self::find(db, id).await?;
        caller.authorize(pledge.user_id)?;
        let submission = pledge.find_related(submissions::Entity).one(db).await?;

        let mut file_keys = pledge.images.keys();
        if let Some(submission) = &submission {
            file_keys.extend(submission.images.keys());
        }

        let txn = db.begin().await?;
        if let Some(admin) = caller.admin() {
            let before = PledgeWithSubmission {
                pledge: pledge.clone(),
                submission: submission.clone(),
            };
            AuditService::record(&txn, admin, AuditAction::DeletePledge, id, &before, None, now).await?;
        }
        if let Some(submission) = submission {
            submissions::Entity::delete_by_id(submission.id).exec(&txn).await?;
        }
        confirmations::Entity::update_many()
            .col_expr(confirmations::Column::PledgeId, Expr::value(Option::<i32>::None))
            .filter(confirmations::Column::PledgeId.eq(id))
            .exec(&txn)
            .await?;
        pledges::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(pledge_id = id, "pledge deleted");

        if let Err(error) = files.delete_files(&file_keys).await {
            tracing::warn!(%error, pledge_id = id, "could not delete pledge images");
        }
        Ok(())
    }

    /// The user's pledges, newest first, each with its submission if any.
    pub async fn list_for_user<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<PledgeWithSubmission>, DbErr> {
        let rows = pledges::Entity::find()
            .filter(pledges::Column::UserId.eq(user_id))
            .order_by_desc(pledges::Column::CreatedAt)
            .order_by_desc(pledges::Column::Id)
            .find_also_related(submissions::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(pledge, submission)| PledgeWithSubmission { pledge, submission })
            .collect())
    }

    pub async fn latest_for_user<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Option<pledges::Model>, DbErr> {
        pledges::Entity::find()
            .filter(pledges::Column::UserId.eq(user_id))
            .order_by_desc(pledges::Column::CreatedAt)
            .order_by_desc(pledges::Column::Id)
            .one(db)
            .await
    }

    fn apply_changes(active: &mut pledges::ActiveModel, changes: UpdatePledgeRequest) {
        if let Some(gc_username) = changes.gc_username {
            active.gc_username = Set(gc_username);
        }
        if let Some(title) = changes.title {
            active.title = Set(Some(title));
        }
        if let Some(count) = changes.pledged_count {
            active.pledged_count = Set(count);
        }
        if let Some(types) = changes.cache_types {
            active.cache_types = Set(types.into());
        }
        if let Some(sizes) = changes.cache_sizes {
            active.cache_sizes = Set(sizes.into());
        }
        if let Some(states) = changes.states {
            active.states = Set(states.into());
        }
        if let Some(locations) = changes.approx_locations {
            active.approx_locations = Set(locations.into());
        }
        if let Some(notes) = changes.concept_notes {
            active.concept_notes = Set(Some(notes));
        }
        if let Some(images) = changes.images {
            active.images = Set(images.normalize());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit_logs;
    use crate::models::values::ImagesPayload;
    use crate::outbound::fakes::RecordingFileStore;
    use crate::testing::{self, at};
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    async fn fixture() -> (DatabaseConnection, users::Model, users::Model, users::Model) {
        let db = crate::db::test_connection().await;
        let owner = testing::user(&db, "owner@example.com", "Owner").await;
        let other = testing::user(&db, "other@example.com", "Other").await;
        let admin = testing::user(&db, testing::ADMIN_EMAIL, "Admin").await;
        (db, owner, other, admin)
    }

    #[actix_web::test]
    async fn create_normalizes_images() {
        let (db, owner, _, _) = fixture().await;
        let request: CreatePledgeRequest = serde_json::from_value(serde_json::json!({
            "email": owner.email,
            "username": "Owner",
            "pledgedCount": 3,
            "cacheTypes": ["TRADITIONAL", "MULTI"],
            "cacheSizes": ["SMALL"],
            "states": ["NSW"],
            "images": { "url": "https://utfs.io/f/a", "key": "a" }
        }))
        .unwrap();

        let pledge = PledgeService::create(&db, &owner, request, at(2026, 1, 10)).await.unwrap();

        assert_eq!(pledge.status, PledgeStatus::Concept);
        assert_eq!(pledge.pledged_count, 3);
        assert_eq!(pledge.images, testing::images(&["a"]));
        assert!(pledge.cache_types.contains("MULTI"));
    }

    #[actix_web::test]
    async fn non_owner_session_gets_403_on_update_and_delete() {
        let (db, owner, other, _) = fixture().await;
        let pledge = testing::pledge(&db, &owner).await;
        let caller = Principal::with_session(testing::session_of(&other, false));
        let files = RecordingFileStore::default();

        let update = PledgeService::update(&db, &caller, pledge.id, UpdatePledgeRequest::default(), at(2026, 2, 1))
            .await
            .unwrap_err();
        let delete = PledgeService::delete(&db, &files, &caller, pledge.id, at(2026, 2, 1))
            .await
            .unwrap_err();

        assert_eq!(update.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(delete.status_code(), StatusCode::FORBIDDEN);
        assert!(PledgeService::find(&db, pledge.id).await.is_ok());
    }

    #[actix_web::test]
    async fn owner_update_is_not_audited() {
        let (db, owner, _, _) = fixture().await;
        let pledge = testing::pledge(&db, &owner).await;
        let caller = Principal::with_token(owner.id);
        let changes = UpdatePledgeRequest {
            title: Some("Bush walk series".to_string()),
            pledged_count: Some(4),
            ..Default::default()
        };

        let updated = PledgeService::update(&db, &caller, pledge.id, changes, at(2026, 2, 1)).await.unwrap();

        assert_eq!(updated.title.as_deref(), Some("Bush walk series"));
        assert_eq!(updated.pledged_count, 4);
        assert_eq!(updated.states, pledge.states);
        assert_eq!(audit_logs::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn admin_update_writes_before_and_after() {
        let (db, owner, _, admin) = fixture().await;
        let pledge = testing::pledge(&db, &owner).await;
        let caller = Principal::with_session(testing::session_of(&admin, true));
        let changes = UpdatePledgeRequest {
            states: Some(vec!["QLD".to_string()]),
            ..Default::default()
        };

        PledgeService::update(&db, &caller, pledge.id, changes, at(2026, 2, 1)).await.unwrap();

        let log = audit_logs::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(log.action, "UPDATE_PLEDGE");
        assert_eq!(log.actor_id, Some(admin.id));
        assert_eq!(log.before["states"], serde_json::json!(["NSW"]));
        assert_eq!(log.after.unwrap()["states"], serde_json::json!(["QLD"]));
    }

    #[actix_web::test]
    async fn delete_removes_submission_and_files() {
        let (db, owner, _, admin) = fixture().await;
        let mut active = testing::pledge_for(&owner);
        active.images = Set(testing::images(&["p1"]));
        let pledge = active.insert(&db).await.unwrap();
        let mut submission = testing::submission_for(&pledge);
        submission.images = Set(testing::images(&["s1", "s2"]));
        submission.insert(&db).await.unwrap();
        let caller = Principal::with_session(testing::session_of(&admin, true));
        let files = RecordingFileStore::default();

        PledgeService::delete(&db, &files, &caller, pledge.id, at(2026, 3, 1)).await.unwrap();

        assert_eq!(pledges::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(submissions::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(files.deleted(), vec!["p1", "s1", "s2"]);
        let log = audit_logs::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(log.action, "DELETE_PLEDGE");
        assert!(log.after.is_none());
    }

    #[actix_web::test]
    async fn file_store_failure_does_not_fail_delete() {
        let (db, owner, _, _) = fixture().await;
        let pledge = testing::pledge(&db, &owner).await;
        let files = RecordingFileStore::failing();

        PledgeService::delete(&db, &files, &Principal::with_token(owner.id), pledge.id, at(2026, 3, 1))
            .await
            .unwrap();

        assert!(PledgeService::find(&db, pledge.id).await.is_err());
    }

    #[actix_web::test]
    async fn encoded_images_on_update_are_normalized() {
        let (db, owner, _, _) = fixture().await;
        let pledge = testing::pledge(&db, &owner).await;
        let changes = UpdatePledgeRequest {
            images: Some(ImagesPayload::Encoded("[{\"url\":\"https://utfs.io/f/z\",\"key\":\"z\"}]".to_string())),
            ..Default::default()
        };

        let updated = PledgeService::update(&db, &Principal::with_token(owner.id), pledge.id, changes, at(2026, 2, 1))
            .await
            .unwrap();

        assert_eq!(updated.images, testing::images(&["z"]));
    }
}
