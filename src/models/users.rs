use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub username: String, // geocaching.com username, shown publicly
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pledges::Entity")]
    Pledges,

    #[sea_orm(has_many = "super::confirmations::Entity")]
    Confirmations,

    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,

    #[sea_orm(has_many = "super::edit_tokens::Entity")]
    EditTokens,
}

impl Related<super::pledges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pledges.def()
    }
}

impl Related<super::confirmations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Confirmations.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl Related<super::edit_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EditTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
