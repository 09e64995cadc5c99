// ============================================================================
// MODEL : PLEDGES
// ============================================================================
//
// A pledge is the intention to hide one or more caches for the event.
// The list columns (cache_types, cache_sizes, states, approx_locations) are
// JSON arrays; images is a JSON list of {url, key}.
//
// Lifecycle:
//   CONCEPT --(submission created)--> HIDDEN --(submission deleted)--> CONCEPT
//
// When a submission is created the pledge's images move to the submission
// and the pledge keeps an empty list.
//
// ============================================================================

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

use super::values::{ImageSet, Labels};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum PledgeStatus {
    #[sea_orm(string_value = "CONCEPT")]
    Concept,
    #[sea_orm(string_value = "HIDDEN")]
    Hidden,
}

impl PledgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concept => "CONCEPT",
            Self::Hidden => "HIDDEN",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pledges")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub gc_username: String,
    pub title: Option<String>,
    pub pledged_count: i32,
    pub cache_types: Labels,
    pub cache_sizes: Labels,
    pub states: Labels,
    pub approx_locations: Labels,
    #[sea_orm(column_type = "Text", nullable)]
    pub concept_notes: Option<String>,
    pub images: ImageSet,
    pub status: PledgeStatus,
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

    #[sea_orm(has_one = "super::submissions::Entity")]
    Submission,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
