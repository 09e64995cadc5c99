use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use super::values::ImageSet;

/// The published cache that fulfils a pledge. One per pledge at most.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submissions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub pledge_id: i32,
    pub user_id: i32,
    pub gc_username: String,
    pub gc_code: String,
    pub cache_name: String,
    #[serde(rename = "type")]
    pub cache_type: String,
    pub suburb: String,
    pub state: String,
    pub difficulty: f64,
    pub terrain: f64,
    pub hidden_date: Date,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub images: ImageSet, // at most MAX_SUBMISSION_IMAGES entries
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pledges::Entity",
        from = "Column::PledgeId",
        to = "super::pledges::Column::Id",
        on_delete = "Cascade"
    )]
    Pledge,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::pledges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pledge.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
