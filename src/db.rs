// Database connection and schema

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::time::Duration;

use crate::models::{
    admin_users, audit_logs, confirmations, edit_tokens, pledges, post_likes, submissions, users,
};

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(10)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Creates every table that does not exist yet. Parents before children so
/// foreign keys resolve on Postgres.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, admin_users::Entity).await?;
    create_table(db, edit_tokens::Entity).await?;
    create_table(db, pledges::Entity).await?;
    create_table(db, confirmations::Entity).await?;
    create_table(db, submissions::Entity).await?;
    create_table(db, audit_logs::Entity).await?;
    create_table(db, post_likes::Entity).await?;

    tracing::info!("database schema is up to date");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(backend.build(&statement)).await?;
    Ok(())
}

/// A fresh in-memory SQLite database with the full schema. One pooled
/// connection keeps the memory database alive for the whole test.
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.expect("sqlite connection");
    sync_schema(&db).await.expect("schema");
    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{EntityTrait, PaginatorTrait};

    #[actix_web::test]
    async fn schema_sync_is_idempotent() {
        let db = test_connection().await;

        sync_schema(&db).await.unwrap();

        assert_eq!(users::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(pledges::Entity::find().count(&db).await.unwrap(), 0);
    }
}
