use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Serialize;

use crate::middleware::AuthUser;
use crate::models::audit_logs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UpdatePledge,
    DeletePledge,
    UpdateSubmission,
    DeleteSubmission,
    UpdateConfirmation,
    DeleteConfirmation,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpdatePledge => "UPDATE_PLEDGE",
            Self::DeletePledge => "DELETE_PLEDGE",
            Self::UpdateSubmission => "UPDATE_SUBMISSION",
            Self::DeleteSubmission => "DELETE_SUBMISSION",
            Self::UpdateConfirmation => "UPDATE_CONFIRMATION",
            Self::DeleteConfirmation => "DELETE_CONFIRMATION",
        }
    }

    pub fn target_kind(&self) -> &'static str {
        match self {
            Self::UpdatePledge | Self::DeletePledge => "PLEDGE",
            Self::UpdateSubmission | Self::DeleteSubmission => "SUBMISSION",
            Self::UpdateConfirmation | Self::DeleteConfirmation => "CONFIRMATION",
        }
    }
}

pub struct AuditService;

impl AuditService {
    /// Appends one audit row. Callers pass their open transaction so the row
    /// commits or rolls back together with the mutation it describes.
    pub async fn record<C: ConnectionTrait, T: Serialize>(
        db: &C,
        actor: &AuthUser,
        action: AuditAction,
        target_id: i32,
        before: &T,
        after: Option<&T>,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let snapshot = |value: &T| {
            serde_json::to_value(value).map_err(|e| DbErr::Custom(format!("audit snapshot failed: {e}")))
        };

        audit_logs::ActiveModel {
            actor_id: Set(Some(actor.user_id)),
            actor_email: Set(Some(actor.email.clone())),
            action: Set(action.as_str().to_string()),
            target_id: Set(target_id),
            target_kind: Set(action.target_kind().to_string()),
            before: Set(snapshot(before)?),
            after: Set(after.map(snapshot).transpose()?),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(actor = actor.user_id, action = action.as_str(), target_id, "admin change audited");
        Ok(())
    }

    /// Newest first.
    pub async fn list(db: &DatabaseConnection, limit: u64) -> Result<Vec<audit_logs::Model>, DbErr> {
        audit_logs::Entity::find()
            .order_by_desc(audit_logs::Column::CreatedAt)
            .order_by_desc(audit_logs::Column::Id)
            .limit(limit)
            .all(db)
            .await
    }
}
