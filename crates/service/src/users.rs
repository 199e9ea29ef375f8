//! User accounts with their profile and credentials.
//!
//! Creation writes user, profile and (optionally) credentials in one
//! transaction. Any caller may register; every other operation requires an
//! authenticated caller.

use chrono::{NaiveDate, Utc};
use models::errors::FieldErrors;
use models::user::{self, Role};
use models::{user_credentials, user_profile, validate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::access::Caller;
use crate::auth::password;
use crate::errors::ServiceError;

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const CPF_TAKEN: &str = "user with this cpf already exists.";
const PASSWORD_NOT_YOURS: &str = "You may only change your own password.";

/// Nested profile attributes; absent fields keep their current (or default) value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    #[serde(default, deserialize_with = "crate::nullable::deserialize")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::nullable::deserialize")]
    pub neighborhood: Option<Option<String>>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(default, deserialize_with = "crate::nullable::deserialize")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::nullable::deserialize")]
    pub birth_date: Option<Option<NaiveDate>>,
    pub is_vulnerable: Option<bool>,
    #[serde(rename = "cadUnico_number", default, deserialize_with = "crate::nullable::deserialize")]
    pub cad_unico_number: Option<Option<String>>,
}

fn flat(v: &Option<Option<String>>) -> Option<&str> {
    v.as_ref().and_then(|x| x.as_deref())
}

impl ProfileInput {
    fn validate(&self) -> FieldErrors {
        let mut errs = FieldErrors::new();
        user_profile::validate_fields(
            &mut errs,
            flat(&self.address),
            flat(&self.neighborhood),
            self.city.as_deref(),
            self.state.as_deref(),
            flat(&self.phone),
            flat(&self.cad_unico_number),
        );
        errs
    }

    fn apply(self, am: &mut user_profile::ActiveModel) {
        if let Some(v) = self.address { am.address = Set(v); }
        if let Some(v) = self.neighborhood { am.neighborhood = Set(v); }
        if let Some(v) = self.city { am.city = Set(v); }
        if let Some(v) = self.state { am.state = Set(v); }
        if let Some(v) = self.phone { am.phone = Set(v); }
        if let Some(v) = self.birth_date { am.birth_date = Set(v); }
        if let Some(v) = self.is_vulnerable { am.is_vulnerable = Set(v); }
        if let Some(v) = self.cad_unico_number { am.cad_unico_number = Set(v); }
    }
}

/// Registration payload. Any `role` sent by the client is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub cpf: Option<String>,
    pub document: Option<String>,
    pub password: Option<String>,
    pub profile: Option<ProfileInput>,
}

/// Replace (PUT) or partial (PATCH) update payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "crate::nullable::deserialize")]
    pub cpf: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::nullable::deserialize")]
    pub document: Option<Option<String>>,
    pub role: Option<Role>,
    pub password: Option<String>,
    pub profile: Option<ProfileInput>,
}

/// Output shape: user fields plus the nested profile. Credentials never appear.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    #[serde(flatten)]
    pub user: user::Model,
    pub profile: Option<user_profile::Model>,
}

/// Blank optional identifiers are stored as NULL so uniqueness only applies to real values.
fn blank_to_none(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn check_password(errs: &mut FieldErrors, password: Option<&str>) {
    if let Some(p) = password {
        if let Err(msg) = password::check_strength(p) {
            errs.add("password", msg);
        }
    }
}

fn hash(password: Option<&str>) -> Result<Option<String>, ServiceError> {
    password
        .map(password::hash_password)
        .transpose()
        .map_err(|e| ServiceError::Db(e.to_string()))
}

async fn check_unique(
    db: &DatabaseConnection,
    errs: &mut FieldErrors,
    username: Option<&str>,
    cpf: Option<&str>,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    if let Some(u) = username {
        if !errs.contains("username") && user::username_taken(db, u, except).await? {
            errs.add("username", USERNAME_TAKEN);
        }
    }
    if let Some(c) = cpf {
        if !errs.contains("cpf") && user::cpf_taken(db, c, except).await? {
            errs.add("cpf", CPF_TAKEN);
        }
    }
    Ok(())
}

/// Register a user. Role is always citizen.
#[instrument(skip(db, input), fields(username = ?input.username))]
pub async fn create(db: &DatabaseConnection, input: CreateUser) -> Result<UserView, ServiceError> {
    let cpf = blank_to_none(input.cpf);
    let document = blank_to_none(input.document);

    let mut errs = FieldErrors::new();
    validate::required(&mut errs, "username", input.username.as_deref());
    user::validate_fields(
        &mut errs,
        input.username.as_deref(),
        input.email.as_deref(),
        input.first_name.as_deref(),
        input.last_name.as_deref(),
        cpf.as_deref(),
        document.as_deref(),
    );
    check_password(&mut errs, input.password.as_deref());
    if let Some(profile) = &input.profile {
        errs.nest("profile", profile.validate());
    }
    check_unique(db, &mut errs, input.username.as_deref(), cpf.as_deref(), None).await?;
    errs.into_result()?;

    let password_hash = hash(input.password.as_deref())?;
    let id = Uuid::new_v4();
    let now = Utc::now().into();

    // 用户、档案、凭证在同一事务内写入
    let txn = db.begin().await?;
    let created = user::ActiveModel {
        id: Set(id),
        username: Set(input.username.unwrap_or_default()),
        email: Set(input.email.unwrap_or_default()),
        first_name: Set(input.first_name.unwrap_or_default()),
        last_name: Set(input.last_name.unwrap_or_default()),
        cpf: Set(cpf),
        document: Set(document),
        role: Set(Role::Citizen),
        date_joined: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let mut profile_am = user_profile::defaults_for(id);
    if let Some(p) = input.profile {
        p.apply(&mut profile_am);
    }
    let profile = profile_am.insert(&txn).await?;

    if let Some(h) = password_hash {
        user_credentials::upsert_password(&txn, id, h, password::ALGORITHM).await?;
    }
    txn.commit().await?;

    info!(event = "user_created", user_id = %id);
    Ok(UserView { user: created, profile: Some(profile) })
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection) -> Result<Vec<UserView>, ServiceError> {
    let rows = user::Entity::find()
        .order_by_asc(user::Column::DateJoined)
        .find_also_related(user_profile::Entity)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|(user, profile)| UserView { user, profile }).collect())
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<UserView, ServiceError> {
    let (user, profile) = user::Entity::find_by_id(id)
        .find_also_related(user_profile::Entity)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    Ok(UserView { user, profile })
}

/// PUT when `partial` is false (username required), PATCH otherwise.
/// Changing `role` is reserved to staff; `password` to the user or staff.
#[instrument(skip(db, caller, patch), fields(caller = %caller.id, user_id = %id, partial))]
pub async fn update(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    patch: UserPatch,
    partial: bool,
) -> Result<UserView, ServiceError> {
    let existing = user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))?;

    let cpf = patch.cpf.map(blank_to_none);
    let document = patch.document.map(blank_to_none);

    let mut errs = FieldErrors::new();
    if !partial {
        validate::required(&mut errs, "username", patch.username.as_deref());
    }
    user::validate_fields(
        &mut errs,
        patch.username.as_deref(),
        patch.email.as_deref(),
        patch.first_name.as_deref(),
        patch.last_name.as_deref(),
        cpf.as_ref().and_then(|c| c.as_deref()),
        document.as_ref().and_then(|d| d.as_deref()),
    );
    if let Some(role) = patch.role {
        if role != existing.role && !caller.is_staff() {
            errs.add("role", "Only staff members can change a user's role.");
        }
    }
    if patch.password.is_some() && !may_manage(caller, id) {
        errs.add("password", PASSWORD_NOT_YOURS);
    }
    check_password(&mut errs, patch.password.as_deref());
    if let Some(profile) = &patch.profile {
        errs.nest("profile", profile.validate());
    }
    check_unique(db, &mut errs, patch.username.as_deref(), cpf.as_ref().and_then(|c| c.as_deref()), Some(id)).await?;
    errs.into_result()?;

    let password_hash = hash(patch.password.as_deref())?;
    let current_profile = user_profile::Entity::find()
        .filter(user_profile::Column::UserId.eq(id))
        .one(db)
        .await?;

    let txn = db.begin().await?;
    let mut am: user::ActiveModel = existing.into();
    if let Some(v) = patch.username { am.username = Set(v); }
    if let Some(v) = patch.email { am.email = Set(v); }
    if let Some(v) = patch.first_name { am.first_name = Set(v); }
    if let Some(v) = patch.last_name { am.last_name = Set(v); }
    if let Some(v) = cpf { am.cpf = Set(v); }
    if let Some(v) = document { am.document = Set(v); }
    if let Some(v) = patch.role { am.role = Set(v); }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;

    let profile = match (patch.profile, current_profile) {
        (Some(input), Some(current)) => {
            let mut pam: user_profile::ActiveModel = current.clone().into();
            input.apply(&mut pam);
            if pam.is_changed() { Some(pam.update(&txn).await?) } else { Some(current) }
        }
        (Some(input), None) => {
            let mut pam = user_profile::defaults_for(id);
            input.apply(&mut pam);
            Some(pam.insert(&txn).await?)
        }
        (None, current) => current,
    };

    if let Some(h) = password_hash {
        user_credentials::upsert_password(&txn, id, h, password::ALGORITHM).await?;
    }
    txn.commit().await?;

    info!(event = "user_updated", user_id = %id, partial);
    Ok(UserView { user: updated, profile })
}

#[instrument(skip(db, caller), fields(caller = %caller.id, user_id = %id))]
pub async fn delete(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    // 其他用户的账号对非 staff 不可见
    if !may_manage(caller, id) {
        debug!(event = "user_delete_denied", user_id = %id);
        return Err(ServiceError::not_found("user"));
    }
    let res = user::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("user"));
    }
    info!(event = "user_deleted", user_id = %id);
    Ok(())
}

fn may_manage(caller: &Caller, id: Uuid) -> bool {
    caller.id == id || caller.is_staff()
}

/// Administrative role assignment, outside any request context.
#[instrument(skip(db))]
pub async fn set_role(db: &DatabaseConnection, id: Uuid, role: Role) -> Result<user::Model, ServiceError> {
    let existing = user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    let mut am: user::ActiveModel = existing.into();
    am.role = Set(role);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(event = "role_set", user_id = %id, role = ?role);
    Ok(updated)
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<user::Model>, ServiceError> {
    Ok(user::find_by_username(db, username).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, insert_user};

    fn staff(id: Uuid) -> Caller { Caller::new(id, Role::Staff) }

    fn named(username: &str) -> CreateUser {
        CreateUser { username: Some(username.into()), ..CreateUser::default() }
    }

    #[tokio::test]
    async fn create_applies_profile_defaults_and_citizen_role() -> anyhow::Result<()> {
        let db = get_db().await?;
        let view = create(&db, named("maria")).await?;
        assert_eq!(view.user.role, Role::Citizen);
        let profile = view.profile.unwrap();
        assert_eq!(profile.city, "Paulista");
        assert_eq!(profile.state, "PE");
        assert!(!profile.is_vulnerable);
        assert!(user_credentials::find_for_user(&db, view.user.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn create_with_profile_and_password() -> anyhow::Result<()> {
        let db = get_db().await?;
        let input = CreateUser {
            password: Some("Senha123".into()),
            profile: Some(ProfileInput {
                city: Some("Recife".into()),
                is_vulnerable: Some(true),
                cad_unico_number: Some(Some("1234".into())),
                ..ProfileInput::default()
            }),
            ..named("joao")
        };
        let view = create(&db, input).await?;
        let profile = view.profile.unwrap();
        assert_eq!(profile.city, "Recife");
        assert_eq!(profile.state, "PE");
        assert!(profile.is_vulnerable);
        let creds = user_credentials::find_for_user(&db, view.user.id).await?.unwrap();
        assert!(password::verify_password("Senha123", &creds.password_hash)?);

        let json = serde_json::to_value(UserView { user: view.user, profile: Some(profile) })?;
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["profile"]["cadUnico_number"], "1234");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_profile_creates_nothing() -> anyhow::Result<()> {
        let db = get_db().await?;
        let input = CreateUser {
            profile: Some(ProfileInput { state: Some("PER".into()), ..ProfileInput::default() }),
            ..named("ana")
        };
        match create(&db, input).await {
            Err(ServiceError::Validation(errs)) => assert!(errs.contains("profile.state")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(user::find_by_username(&db, "ana").await?.is_none());
        assert!(user_profile::Entity::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_and_cpf_are_field_errors() -> anyhow::Result<()> {
        let db = get_db().await?;
        create(&db, CreateUser { cpf: Some("111.222.333-44".into()), ..named("dup") }).await?;
        let err = create(&db, CreateUser { cpf: Some("111.222.333-44".into()), ..named("dup") }).await.unwrap_err();
        match err {
            ServiceError::Validation(errs) => {
                assert_eq!(errs.get("username"), Some(&[USERNAME_TAKEN.to_string()][..]));
                assert!(errs.contains("cpf"));
            }
            other => panic!("unexpected {other:?}"),
        }
        // blank cpf is not a uniqueness clash
        create(&db, CreateUser { cpf: Some(String::new()), ..named("b1") }).await?;
        create(&db, CreateUser { cpf: Some(String::new()), ..named("b2") }).await?;
        Ok(())
    }

    #[tokio::test]
    async fn short_password_and_missing_username_rejected() -> anyhow::Result<()> {
        let db = get_db().await?;
        let err = create(&db, CreateUser { password: Some("short".into()), ..CreateUser::default() }).await.unwrap_err();
        match err {
            ServiceError::Validation(errs) => {
                assert!(errs.contains("password"));
                assert_eq!(errs.get("username"), Some(&[validate::REQUIRED.to_string()][..]));
            }
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn patch_updates_only_supplied_fields_and_nested_profile() -> anyhow::Result<()> {
        let db = get_db().await?;
        let view = create(&db, CreateUser { email: Some("a@b.com".into()), ..named("pat") }).await?;
        let me = Caller::new(view.user.id, Role::Citizen);
        let patch = UserPatch {
            first_name: Some("Pat".into()),
            profile: Some(ProfileInput { phone: Some(Some("81999999999".into())), ..ProfileInput::default() }),
            ..UserPatch::default()
        };
        let updated = update(&db, &me, view.user.id, patch, true).await?;
        assert_eq!(updated.user.first_name, "Pat");
        assert_eq!(updated.user.email, "a@b.com");
        let profile = updated.profile.unwrap();
        assert_eq!(profile.phone.as_deref(), Some("81999999999"));
        assert_eq!(profile.city, "Paulista");
        Ok(())
    }

    #[tokio::test]
    async fn put_requires_username() -> anyhow::Result<()> {
        let db = get_db().await?;
        let view = create(&db, named("putter")).await?;
        let me = Caller::new(view.user.id, Role::Citizen);
        let err = update(&db, &me, view.user.id, UserPatch::default(), false).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref e) if e.contains("username")));
        let ok = update(&db, &me, view.user.id, UserPatch { username: Some("putter2".into()), ..UserPatch::default() }, false).await?;
        assert_eq!(ok.user.username, "putter2");
        Ok(())
    }

    #[tokio::test]
    async fn only_staff_can_change_role() -> anyhow::Result<()> {
        let db = get_db().await?;
        let view = create(&db, named("target")).await?;
        let me = Caller::new(view.user.id, Role::Citizen);
        let promote = UserPatch { role: Some(Role::Professional), ..UserPatch::default() };

        let err = update(&db, &me, view.user.id, promote.clone(), true).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref e) if e.contains("role")));

        // resending the current role is not a change
        let same = UserPatch { role: Some(Role::Citizen), ..UserPatch::default() };
        update(&db, &me, view.user.id, same, true).await?;

        let admin = insert_user(&db, "admin", Role::Staff).await?;
        let done = update(&db, &staff(admin.id), view.user.id, promote, true).await?;
        assert_eq!(done.user.role, Role::Professional);
        Ok(())
    }

    #[tokio::test]
    async fn delete_and_missing_user() -> anyhow::Result<()> {
        let db = get_db().await?;
        let view = create(&db, named("gone")).await?;
        let me = Caller::new(view.user.id, Role::Citizen);
        delete(&db, &me, view.user.id).await?;
        assert!(matches!(get(&db, view.user.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(delete(&db, &me, view.user.id).await, Err(ServiceError::NotFound(_))));
        assert!(user_profile::Entity::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn set_role_promotes() -> anyhow::Result<()> {
        let db = get_db().await?;
        let view = create(&db, named("pro")).await?;
        let m = set_role(&db, view.user.id, Role::Professional).await?;
        assert_eq!(m.role, Role::Professional);
        assert!(matches!(set_role(&db, Uuid::new_v4(), Role::Staff).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn list_includes_profiles() -> anyhow::Result<()> {
        let db = get_db().await?;
        create(&db, named("l1")).await?;
        create(&db, named("l2")).await?;
        let all = list(&db).await?;
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|v| v.profile.is_some()));
        Ok(())
    }

    #[tokio::test]
    async fn password_change_limited_to_self_or_staff() -> anyhow::Result<()> {
        let db = get_db().await?;
        let alice = create(&db, named("alice")).await?;
        let admin = insert_user(&db, "admin", Role::Staff).await?;
        let as_alice = Caller::new(alice.user.id, Role::Citizen);
        let reset = |p: &str| UserPatch { password: Some(p.into()), ..UserPatch::default() };

        let err = update(&db, &as_alice, admin.id, reset("pwned12345"), true).await.unwrap_err();
        match err {
            ServiceError::Validation(errs) => {
                assert_eq!(errs.get("password"), Some(&[PASSWORD_NOT_YOURS.to_string()][..]));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(user_credentials::find_for_user(&db, admin.id).await?.is_none());

        update(&db, &as_alice, alice.user.id, reset("Alice12345"), true).await?;
        update(&db, &staff(admin.id), alice.user.id, reset("Reset12345"), true).await?;
        let creds = user_credentials::find_for_user(&db, alice.user.id).await?.unwrap();
        assert!(password::verify_password("Reset12345", &creds.password_hash)?);
        Ok(())
    }

    #[tokio::test]
    async fn delete_limited_to_self_or_staff() -> anyhow::Result<()> {
        let db = get_db().await?;
        let alice = create(&db, named("alice")).await?;
        let bob = create(&db, named("bob")).await?;
        let admin = insert_user(&db, "admin", Role::Staff).await?;
        let as_alice = Caller::new(alice.user.id, Role::Citizen);

        assert!(matches!(delete(&db, &as_alice, bob.user.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(delete(&db, &as_alice, admin.id).await, Err(ServiceError::NotFound(_))));
        get(&db, bob.user.id).await?;

        delete(&db, &staff(admin.id), bob.user.id).await?;
        assert!(matches!(get(&db, bob.user.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
