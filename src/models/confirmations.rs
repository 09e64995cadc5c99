use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Links an already published cache (by GC code) to the event.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "confirmations")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub pledge_id: Option<i32>,
    pub gc_code: String,
    pub cache_name: String,
    #[serde(rename = "type")]
    pub cache_type: String,
    #[serde(rename = "size")]
    pub cache_size: String,
    pub difficulty: f64,
    pub terrain: f64,
    pub suburb: String,
    pub state: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub from_non_pledge: bool, // true when the confirm form created an implicit pledge
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::pledges::Entity",
        from = "Column::PledgeId",
        to = "super::pledges::Column::Id",
        on_delete = "SetNull"
    )]
    Pledge,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::pledges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pledge.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
