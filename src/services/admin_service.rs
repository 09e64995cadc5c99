use sea_orm::*;
use serde::Serialize;

use crate::models::{confirmations, pledges, submissions, users};
use crate::services::filters::RecordFilter;

/// Owner details attached to every admin row.
#[derive(Debug, Clone, Serialize)]
pub struct Owner {
    pub id: i32,
    pub email: String,
    pub username: String,
}

impl From<users::Model> for Owner {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPledge {
    #[serde(flatten)]
    pub pledge: pledges::Model,
    pub user: Option<Owner>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSubmission {
    #[serde(flatten)]
    pub submission: submissions::Model,
    pub user: Option<Owner>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfirmation {
    #[serde(flatten)]
    pub confirmation: confirmations::Model,
    pub user: Option<Owner>,
}

impl AdminPledge {
    pub fn email(&self) -> &str {
        self.user.as_ref().map(|u| u.email.as_str()).unwrap_or_default()
    }
}

impl AdminSubmission {
    pub fn email(&self) -> &str {
        self.user.as_ref().map(|u| u.email.as_str()).unwrap_or_default()
    }
}

impl AdminConfirmation {
    pub fn email(&self) -> &str {
        self.user.as_ref().map(|u| u.email.as_str()).unwrap_or_default()
    }

    pub fn username(&self) -> &str {
        self.user.as_ref().map(|u| u.username.as_str()).unwrap_or_default()
    }
}

/// Filtered, newest-first listings for the admin screens and CSV exports.
pub struct AdminService;

impl AdminService {
    pub async fn pledges(db: &DatabaseConnection, filter: &RecordFilter) -> Result<Vec<AdminPledge>, DbErr> {
        let query = filter.created_between(pledges::Entity::find(), pledges::Column::CreatedAt);
        let rows = query
            .order_by_desc(pledges::Column::CreatedAt)
            .order_by_desc(pledges::Column::Id)
            .find_also_related(users::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter(|(pledge, _)| filter.matches_pledge(pledge))
            .map(|(pledge, user)| AdminPledge { pledge, user: user.map(Owner::from) })
            .collect())
    }

    pub async fn submissions(db: &DatabaseConnection, filter: &RecordFilter) -> Result<Vec<AdminSubmission>, DbErr> {
        let query = filter.created_between(submissions::Entity::find(), submissions::Column::CreatedAt);
        let rows = query
            .order_by_desc(submissions::Column::CreatedAt)
            .order_by_desc(submissions::Column::Id)
            .find_also_related(users::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter(|(submission, _)| filter.matches_submission(submission))
            .map(|(submission, user)| AdminSubmission { submission, user: user.map(Owner::from) })
            .collect())
    }

    pub async fn confirmations(db: &DatabaseConnection, filter: &RecordFilter) -> Result<Vec<AdminConfirmation>, DbErr> {
        let query = filter.created_between(confirmations::Entity::find(), confirmations::Column::CreatedAt);
        let rows = query
            .order_by_desc(confirmations::Column::CreatedAt)
            .order_by_desc(confirmations::Column::Id)
            .find_also_related(users::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter(|(confirmation, user)| filter.matches_confirmation(confirmation, user.as_ref()))
            .map(|(confirmation, user)| AdminConfirmation { confirmation, user: user.map(Owner::from) })
            .collect())
    }
}
