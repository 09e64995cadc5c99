//! Append-only trail of admin mutations. Rows are inserted by the audit
//! service and never updated or deleted.

use serde::Serialize;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "audit_logs")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub actor_id: Option<i32>,
    pub actor_email: Option<String>,
    pub action: String,      // UPDATE_PLEDGE, DELETE_PLEDGE, UPDATE_SUBMISSION, ...
    pub target_id: i32,
    pub target_kind: String, // PLEDGE, SUBMISSION, CONFIRMATION
    pub before: Json,
    pub after: Option<Json>, // NULL for deletes
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
