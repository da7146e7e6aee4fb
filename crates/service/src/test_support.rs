#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::db::{connect_with_config, DatabaseConfig};

/// Fresh in-memory database with migrations applied; each call is isolated.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::default() };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Insert a user row so titles can reference it.
pub async fn seed_user(db: &DatabaseConnection, email: &str) -> Result<Uuid, anyhow::Error> {
    let user = models::user::create(db, email, "Test User").await?;
    Ok(user.id)
}
