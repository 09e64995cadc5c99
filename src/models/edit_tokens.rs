// ============================================================================
// MODEL : EDIT TOKENS
// ============================================================================
//
// Columns of edit_tokens:
//   - id (INTEGER, PRIMARY KEY)
//   - user_id (INTEGER, NOT NULL, FK -> users)
//   - token (VARCHAR, UNIQUE, NOT NULL) - 32 random bytes, hex encoded
//   - expires_at (TIMESTAMPTZ, NOT NULL) - created_at + EDIT_TOKEN_TTL_DAYS
//   - created_at (TIMESTAMPTZ, NOT NULL)
//
// Workflow:
//   1. POST /api/pledge, /api/confirm or /api/auth/magic-link issues a token
//   2. The token travels only inside the emailed manage link
//   3. /api/manage?token=... and /api/manage/*?token=... validate it
//   4. An expired token is deleted the first time it is presented
//   5. POST /api/manage/logout?token=... deletes it explicitly
//
// Notes:
//   - Several live tokens per user are normal (one per submitted form)
//   - A token is never marked "used"; only expiry or logout ends it
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "edit_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub token: String,

    pub expires_at: DateTimeUtc,

    pub created_at: DateTimeUtc,
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
