// ============================================================================
// MODEL : ADMIN USERS
// ============================================================================
//
// Columns of admin_users:
//   - id (INTEGER, PRIMARY KEY)
//   - email (VARCHAR, UNIQUE, NOT NULL)
//   - password_hash (VARCHAR, NOT NULL) - pbkdf2:sha256:iterations$salt$hash
//   - created_at (TIMESTAMPTZ, NOT NULL)
//
// The row is upserted at startup from ADMIN_EMAIL / ADMIN_PASSWORD and read
// by POST /api/auth/admin/login. Ordinary users never get a row here.
//
// ============================================================================

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,

    pub password_hash: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
