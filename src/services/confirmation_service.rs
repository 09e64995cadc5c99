use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::error::{AppError, AppResult};
use crate::models::dto::{
    ConfirmationWithPledge, CreateConfirmationRequest, PledgeSummary, UpdateConfirmationRequest,
};
use crate::models::pledges::{self, PledgeStatus};
use crate::models::values::{ImageSet, Labels};
use crate::models::{confirmations, users};
use crate::services::access::Principal;
use crate::services::audit_service::{AuditAction, AuditService};
use crate::services::pledge_service::PledgeService;

pub struct ConfirmationService;

impl ConfirmationService {
    /// Records a published cache. With `noPreviousPledge` an implicit
    /// one-cache pledge is created alongside; otherwise the confirmation is
    /// linked to the owner's most recent pledge, if there is one.
    pub async fn create(
        db: &DatabaseConnection,
        owner: &users::Model,
        request: CreateConfirmationRequest,
        now: DateTime<Utc>,
    ) -> Result<confirmations::Model, DbErr> {
        let txn = db.begin().await?;

        let pledge_id = if request.no_previous_pledge {
            let pledge = pledges::ActiveModel {
                user_id: Set(owner.id),
                gc_username: Set(owner.username.clone()),
                title: Set(None),
                pledged_count: Set(1),
                cache_types: Set(Labels(vec![request.cache_type.clone()])),
                cache_sizes: Set(Labels(vec![request.cache_size.clone()])),
                states: Set(Labels(vec![request.state.clone()])),
                approx_locations: Set(Labels(vec![request.suburb.clone()])),
                concept_notes: Set(None),
                images: Set(ImageSet::default()),
                status: Set(PledgeStatus::Concept),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            Some(pledge.id)
        } else {
            PledgeService::latest_for_user(&txn, owner.id)
                .await?
                .map(|pledge| pledge.id)
        };

        let confirmation = confirmations::ActiveModel {
            user_id: Set(owner.id),
            pledge_id: Set(pledge_id),
            gc_code: Set(request.gc_code),
            cache_name: Set(request.cache_name),
            cache_type: Set(request.cache_type),
            cache_size: Set(request.cache_size),
            difficulty: Set(request.difficulty),
            terrain: Set(request.terrain),
            suburb: Set(request.suburb),
            state: Set(request.state),
            notes: Set(request.notes),
            from_non_pledge: Set(request.no_previous_pledge),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(confirmation_id = confirmation.id, user_id = owner.id, ?pledge_id, "confirmation created");
        Ok(confirmation)
    }

    pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<confirmations::Model> {
        confirmations::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Confirmation not found"))
    }

    pub async fn update(
        db: &DatabaseConnection,
        caller: &Principal,
        id: i32,
        changes: UpdateConfirmationRequest,
        now: DateTime<Utc>,
    ) -> AppResult<confirmations::Model> {
        let existing = Self::find(db, id).await?;
        caller.authorize(existing.user_id)?;

        let mut active: confirmations::ActiveModel = existing.clone().into();
        if let Some(gc_code) = changes.gc_code {
            active.gc_code = Set(gc_code);
        }
        if let Some(cache_name) = changes.cache_name {
            active.cache_name = Set(cache_name);
        }
        if let Some(cache_type) = changes.cache_type {
            active.cache_type = Set(cache_type);
        }
        if let Some(cache_size) = changes.cache_size {
            active.cache_size = Set(cache_size);
        }
        if let Some(difficulty) = changes.difficulty {
            active.difficulty = Set(difficulty);
        }
        if let Some(terrain) = changes.terrain {
            active.terrain = Set(terrain);
        }
        if let Some(suburb) = changes.suburb {
            active.suburb = Set(suburb);
        }
        if let Some(state) = changes.state {
            active.state = Set(state);
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(now);

        let txn = db.begin().await?;
        let updated = active.update(&txn).await?;
        if let Some(admin) = caller.admin() {
            AuditService::record(&txn, admin, AuditAction::UpdateConfirmation, id, &existing, Some(&updated), now).await?;
        }
        txn.commit().await?;

        Ok(updated)
    }

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
            AuditService::record(&txn, admin, AuditAction::DeleteConfirmation, id, &existing, None, now).await?;
        }
        confirmations::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(confirmation_id = id, "confirmation deleted");
        Ok(())
    }

    /// The user's confirmations, newest first, with a summary of the linked pledge.
    pub async fn list_for_user<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
    ) -> Result<Vec<ConfirmationWithPledge>, DbErr> {
        let rows = confirmations::Entity::find()
            .filter(confirmations::Column::UserId.eq(user_id))
            .order_by_desc(confirmations::Column::CreatedAt)
            .order_by_desc(confirmations::Column::Id)
            .find_also_related(pledges::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(confirmation, pledge)| ConfirmationWithPledge {
                confirmation,
                pledge: pledge.map(|pledge| PledgeSummary {
                    id: pledge.id,
                    pledged_count: pledge.pledged_count,
                }),
            })
            .collect())
    }
}
