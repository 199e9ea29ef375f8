//! Database fixtures shared by unit tests here and the HTTP tests in `server`.
use chrono::Utc;
use migration::MigratorTrait;
use models::db::connect_with_config;
use models::user::{self, Role};
use models::user_profile;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

/// Fresh in-memory database with every migration applied. Each call is isolated.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let mut cfg = configs::DatabaseConfig::from_env();
    cfg.url = "sqlite::memory:".to_string();
    cfg.min_connections = 1;
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Insert a user (with default profile, no password) directly.
pub async fn insert_user(db: &DatabaseConnection, username: &str, role: Role) -> Result<user::Model, anyhow::Error> {
    let now = Utc::now().into();
    let u = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        cpf: Set(None),
        document: Set(None),
        role: Set(role),
        date_joined: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    user_profile::defaults_for(u.id).insert(db).await?;
    Ok(u)
}
