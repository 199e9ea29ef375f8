use anyhow::Result;
use chrono::{NaiveDate, NaiveTime, Utc};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, Set, TransactionTrait};
use uuid::Uuid;

use crate::{appointment, db, support_message, support_ticket, user, user_credentials, user_profile};

/// Fresh in-memory database with every migration applied.
async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut cfg = configs::DatabaseConfig::from_env();
    cfg.url = "sqlite::memory:".to_string();
    let db = db::connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn insert_user(db: &DatabaseConnection, username: &str, role: user::Role) -> Result<user::Model> {
    let now = Utc::now().into();
    let am = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(String::new()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        cpf: Set(None),
        document: Set(None),
        role: Set(role),
        date_joined: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

fn appointment_for(user_id: Uuid, professional_id: Option<Uuid>) -> appointment::ActiveModel {
    appointment::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        professional_id: Set(professional_id),
        date: Set(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap_or_default()),
        time: Set(NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default()),
        status: Set(appointment::AppointmentStatus::Pending),
        description: Set(String::new()),
        created_at: Set(Utc::now().into()),
    }
}

#[tokio::test]
async fn role_round_trips_through_store() -> Result<()> {
    let db = setup_test_db().await?;
    let u = insert_user(&db, "maria", user::Role::Professional).await?;
    let found = user::Entity::find_by_id(u.id).one(&db).await?.unwrap();
    assert_eq!(found.role, user::Role::Professional);
    assert!(user::find_by_username(&db, "maria").await?.is_some());
    assert!(user::username_taken(&db, "maria", None).await?);
    assert!(!user::username_taken(&db, "maria", Some(u.id)).await?);
    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_rejected_by_store() -> Result<()> {
    let db = setup_test_db().await?;
    insert_user(&db, "joao", user::Role::Citizen).await?;
    assert!(insert_user(&db, "joao", user::Role::Citizen).await.is_err());
    Ok(())
}

#[tokio::test]
async fn deleting_user_cascades_profile_credentials_and_owned_rows() -> Result<()> {
    let db = setup_test_db().await?;
    let u = insert_user(&db, "ana", user::Role::Citizen).await?;
    user_profile::defaults_for(u.id).insert(&db).await?;
    user_credentials::upsert_password(&db, u.id, "$argon2id$fake".into(), "argon2").await?;
    appointment_for(u.id, None).insert(&db).await?;
    let t = support_ticket::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(u.id),
        subject: Set("Bolsa".into()),
        description: Set("Dúvida".into()),
        status: Set(support_ticket::TicketStatus::Open),
        created_at: Set(Utc::now().into()),
    }
    .insert(&db)
    .await?;
    support_message::ActiveModel {
        id: Set(Uuid::new_v4()),
        ticket_id: Set(t.id),
        sender_id: Set(u.id),
        message: Set("Olá".into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&db)
    .await?;

    u.delete(&db).await?;

    assert!(user_profile::Entity::find().all(&db).await?.is_empty());
    assert!(user_credentials::Entity::find().all(&db).await?.is_empty());
    assert!(appointment::Entity::find().all(&db).await?.is_empty());
    assert!(support_ticket::Entity::find().all(&db).await?.is_empty());
    assert!(support_message::Entity::find().all(&db).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn deleting_professional_nulls_handled_appointments() -> Result<()> {
    let db = setup_test_db().await?;
    let citizen = insert_user(&db, "c1", user::Role::Citizen).await?;
    let pro = insert_user(&db, "p1", user::Role::Professional).await?;
    let a = appointment_for(citizen.id, Some(pro.id)).insert(&db).await?;

    pro.delete(&db).await?;

    let a = appointment::Entity::find_by_id(a.id).one(&db).await?.unwrap();
    assert_eq!(a.professional_id, None);
    assert_eq!(a.user_id, citizen.id);
    Ok(())
}

#[tokio::test]
async fn upsert_password_replaces_existing_hash() -> Result<()> {
    let db = setup_test_db().await?;
    let u = insert_user(&db, "pw", user::Role::Citizen).await?;
    user_credentials::upsert_password(&db, u.id, "h1".into(), "argon2").await?;
    user_credentials::upsert_password(&db, u.id, "h2".into(), "argon2").await?;
    let creds = user_credentials::find_for_user(&db, u.id).await?.unwrap();
    assert_eq!(creds.password_hash, "h2");
    assert!(user_credentials::upsert_password(&db, u.id, " ".into(), "argon2").await.is_err());
    Ok(())
}

#[tokio::test]
async fn rolled_back_transaction_leaves_nothing() -> Result<()> {
    let db = setup_test_db().await?;
    let txn = db.begin().await?;
    let now = Utc::now().into();
    let id = Uuid::new_v4();
    user::ActiveModel {
        id: Set(id),
        username: Set("tx".into()),
        email: Set(String::new()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        cpf: Set(None),
        document: Set(None),
        role: Set(user::Role::Citizen),
        date_joined: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    user_profile::defaults_for(id).insert(&txn).await?;
    txn.rollback().await?;
    assert!(user::Entity::find_by_id(id).one(&db).await?.is_none());
    assert!(user_profile::Entity::find().all(&db).await?.is_empty());
    Ok(())
}
