// ============================================================================
// SUBMISSIONS
// ============================================================================
//
// A submission turns a pledge into a published cache:
//   - one submission per pledge (second attempt -> 409)
//   - creating it moves the pledge's images onto the submission (pledge
//     images first, then the new ones, at most MAX_SUBMISSION_IMAGES) and
//     marks the pledge HIDDEN with an empty image list
//   - deleting it puts the pledge back to CONCEPT
// Both state changes run inside one transaction with the submission write.
//
// ============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::*;
use sea_orm::sea_query::Expr;

use crate::error::{AppError, AppResult};
use crate::models::dto::{CreateSubmissionRequest, UpdateSubmissionRequest};
use crate::models::pledges::{self, PledgeStatus};
use crate::models::submissions;
use crate::models::values::{ImageSet, MAX_SUBMISSION_IMAGES};
use crate::services::access::Principal;
use crate::services::audit_service::{AuditAction, AuditService};

const ALREADY_SUBMITTED: &str = "This pledge already has a submission";

/// A concurrent create for the same pledge loses on the unique pledge_id.
fn conflict_on_duplicate(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(ALREADY_SUBMITTED),
        _ => AppError::Database(err),
    }
}

pub struct SubmissionService;

impl SubmissionService {
    pub async fn create(
        db: &DatabaseConnection,
        caller: &Principal,
        request: CreateSubmissionRequest,
        hidden_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> AppResult<submissions::Model> {
        if caller.is_anonymous() {
            return Err(AppError::unauthorized("Authentication required"));
        }

        // 1. Pledge must exist, have no submission yet, and belong to the caller
        let txn = db.begin().await?;

        let (pledge, existing) = pledges::Entity::find_by_id(request.pledge_id)
            .find_also_related(submissions::Entity)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Pledge not found"))?;

        if existing.is_some() {
            return Err(AppError::conflict(ALREADY_SUBMITTED));
        }
        caller.authorize(pledge.user_id)?;

        // 2. Pledge images first, then the new ones, capped
        let incoming = request.images.map(|images| images.normalize()).unwrap_or_default();
        let images = pledge.images.merged(&incoming, MAX_SUBMISSION_IMAGES);

        // 3. Insert the submission and hide the pledge atomically
        let submission = submissions::ActiveModel {
            pledge_id: Set(pledge.id),
            user_id: Set(pledge.user_id),
            gc_username: Set(pledge.gc_username.clone()),
            gc_code: Set(request.gc_code),
            cache_name: Set(request.cache_name),
            cache_type: Set(request.cache_type),
            suburb: Set(request.suburb),
            state: Set(request.state),
            difficulty: Set(request.difficulty),
            terrain: Set(request.terrain),
            hidden_date: Set(hidden_date),
            notes: Set(request.notes),
            images: Set(images),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(conflict_on_duplicate)?;

        let pledge_id = pledge.id;
        let mut hidden: pledges::ActiveModel = pledge.into();
        hidden.status = Set(PledgeStatus::Hidden);
        hidden.images = Set(ImageSet::default());
        hidden.updated_at = Set(now);
        hidden.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(submission_id = submission.id, pledge_id, "submission created, pledge hidden");
        Ok(submission)
    }

    pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<submissions::Model> {
        submissions::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Submission not found"))
    }

    pub async fn get(db: &DatabaseConnection, caller: &Principal, id: i32) -> AppResult<submissions::Model> {
        let submission = Self::find(db, id).await?;
        caller.authorize(submission.user_id)?;
        Ok(submission)
    }

    pub async fn update(
        db: &DatabaseConnection,
        caller: &Principal,
        id: i32,
        changes: UpdateSubmissionRequest,
        hidden_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> AppResult<submissions::Model> {
        let existing = Self::find(db, id).await?;
        caller.authorize(existing.user_id)?;

        let mut active: submissions::ActiveModel = existing.clone().into();
        if let Some(gc_code) = changes.gc_code {
            active.gc_code = Set(gc_code);
        }
        if let Some(cache_name) = changes.cache_name {
            active.cache_name = Set(cache_name);
        }
        if let Some(cache_type) = changes.cache_type {
            active.cache_type = Set(cache_type);
        }
        if let Some(suburb) = changes.suburb {
            active.suburb = Set(suburb);
        }
        if let Some(state) = changes.state {
            active.state = Set(state);
        }
        if let Some(difficulty) = changes.difficulty {
            active.difficulty = Set(difficulty);
        }
        if let Some(terrain) = changes.terrain {
            active.terrain = Set(terrain);
        }
        if let Some(hidden_date) = hidden_date {
            active.hidden_date = Set(hidden_date);
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(images) = changes.images {
            active.images = Set(ImageSet::default().merged(&images.normalize(), MAX_SUBMISSION_IMAGES));
        }
        active.updated_at = Set(now);

        let txn = db.begin().await?;
        let updated = active.update(&txn).await?;
        if let Some(admin) = caller.admin() {
            AuditService::record(&txn, admin, AuditAction::UpdateSubmission, id, &existing, Some(&updated), now).await?;
        }
        txn.commit().await?;

        Ok(updated)
    }

    /// Deletes the submission and returns its pledge to CONCEPT.
    pub async fn delete(
        db: &DatabaseConnection,
        caller: &Principal,
        id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let existing = Self::find(db, id).await?;
        caller.authorize(existing.user_id)?;

        let txn = db.begin().await?;
        if let Some(admin) = caller.admin() {
            AuditService::record(&txn, admin, AuditAction::DeleteSubmission, id, &existing, None, now).await?;
        }
        submissions::Entity::delete_by_id(id).exec(&txn).await?;
        pledges::Entity::update_many()
            .col_expr(pledges::Column::Status, Expr::value(PledgeStatus::Concept.as_str()))
            .col_expr(pledges::Column::UpdatedAt, Expr::value(now))
            .filter(pledges::Column::Id.eq(existing.pledge_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::info!(submission_id = id, pledge_id = existing.pledge_id, "submission deleted, pledge back to concept");
        Ok(())
    }

    /// Newest first.
    pub async fn list_for_user<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<submissions::Model>, DbErr> {
        submissions::Entity::find()
            .filter(submissions::Column::UserId.eq(user_id))
            .order_by_desc(submissions::Column::CreatedAt)
            .order_by_desc(submissions::Column::Id)
            .all(db)
            .await
    }
}
