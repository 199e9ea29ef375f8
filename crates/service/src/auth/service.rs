use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::domain::{AuthUser, LoginInput, TokenKind, TokenPair};
use super::errors::AuthError;
use super::password;
use super::repository::AuthRepository;
use super::tokens;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self { jwt_secret: jwt_secret.into(), access_ttl: Duration::hours(24), refresh_ttl: Duration::hours(24) }
    }
}

impl From<&configs::AuthConfig> for AuthConfig {
    fn from(cfg: &configs::AuthConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            access_ttl: Duration::hours(cfg.access_ttl_hours),
            refresh_ttl: Duration::hours(cfg.refresh_ttl_hours),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Hash and store a password for an existing user.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use models::user::Role;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let user = repo.add_user("maria", Role::Citizen);
    /// let svc = AuthService::new(repo, AuthConfig::new("secret"));
    /// tokio_test::block_on(svc.set_password(user.id, "Secret123")).unwrap();
    /// assert!(tokio_test::block_on(svc.set_password(user.id, "short")).is_err());
    /// ```
    #[instrument(skip(self, new_password), fields(user_id = %user_id))]
    pub async fn set_password(&self, user_id: Uuid, new_password: &str) -> Result<(), AuthError> {
        password::check_strength(new_password).map_err(AuthError::Validation)?;
        let hash = password::hash_password(new_password)?;
        self.repo.upsert_password(user_id, hash, password::ALGORITHM.to_string()).await?;
        info!(event = "password_set", user_id = %user_id);
        Ok(())
    }

    /// Exchange username/password for an access + refresh pair.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::LoginInput;
    /// use models::user::Role;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let user = repo.add_user("joao", Role::Citizen);
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret"));
    /// tokio_test::block_on(svc.set_password(user.id, "Passw0rd")).unwrap();
    /// let pair = tokio_test::block_on(svc.login(LoginInput { username: "joao".into(), password: "Passw0rd".into() })).unwrap();
    /// assert!(!pair.access.is_empty() && !pair.refresh.is_empty());
    /// let bad = tokio_test::block_on(svc.login(LoginInput { username: "joao".into(), password: "nope".into() }));
    /// assert!(bad.is_err());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<TokenPair, AuthError> {
        let Some(user) = self.repo.find_user_by_username(&input.username).await? else {
            password::verify_dummy(&input.password);
            debug!("unknown username");
            return Err(AuthError::Unauthorized);
        };

        let Some(cred) = self.repo.get_credentials(user.id).await? else {
            password::verify_dummy(&input.password);
            debug!(user_id = %user.id, "no stored password");
            return Err(AuthError::Unauthorized);
        };

        if !password::verify_password(&input.password, &cred.password_hash)? {
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let pair = self.issue_pair(&user)?;
        info!(event = "token_obtained", user_id = %user.id);
        Ok(pair)
    }

    pub fn issue_pair(&self, user: &AuthUser) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: tokens::issue(&self.cfg.jwt_secret, user, TokenKind::Access, self.cfg.access_ttl)?,
            refresh: tokens::issue(&self.cfg.jwt_secret, user, TokenKind::Refresh, self.cfg.refresh_ttl)?,
        })
    }

    /// New access token from a refresh token whose user still exists.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let (user_id, _) = tokens::expect_kind(&self.cfg.jwt_secret, refresh_token, TokenKind::Refresh)?;
        let user = self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::InvalidToken)?;
        let access = tokens::issue(&self.cfg.jwt_secret, &user, TokenKind::Access, self.cfg.access_ttl)?;
        info!(event = "token_refreshed", user_id = %user.id);
        Ok(access)
    }

    /// Signature and expiry only; either token type is accepted.
    pub fn verify(&self, token: &str) -> Result<(), AuthError> {
        tokens::decode_claims(&self.cfg.jwt_secret, token).map(|_| ())
    }

    /// Resolve a bearer access token to its (still existing) user.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let (user_id, _) = tokens::expect_kind(&self.cfg.jwt_secret, access_token, TokenKind::Access)?;
        self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use models::user::Role;

    fn svc() -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(repo.clone(), AuthConfig::new("test-secret"));
        (repo, svc)
    }

    #[tokio::test]
    async fn unknown_user_and_passwordless_user_cannot_login() {
        let (repo, svc) = svc();
        repo.add_user("nopass", Role::Citizen);
        let e = svc.login(LoginInput { username: "ghost".into(), password: "whatever1".into() }).await.unwrap_err();
        assert!(matches!(e, AuthError::Unauthorized));
        let e = svc.login(LoginInput { username: "nopass".into(), password: "whatever1".into() }).await.unwrap_err();
        assert!(matches!(e, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn missing_user_costs_a_hash_verification() {
        let (repo, svc) = svc();
        let u = repo.add_user("real", Role::Citizen);
        svc.set_password(u.id, "Passw0rd1").await.unwrap();

        // 预热 dummy hash
        let _ = svc.login(LoginInput { username: "ghost".into(), password: "x".into() }).await;

        let started = std::time::Instant::now();
        let e = svc.login(LoginInput { username: "real".into(), password: "wrong-pass".into() }).await.unwrap_err();
        let wrong_password = started.elapsed();
        assert!(matches!(e, AuthError::Unauthorized));

        let started = std::time::Instant::now();
        let e = svc.login(LoginInput { username: "ghost".into(), password: "wrong-pass".into() }).await.unwrap_err();
        let unknown_user = started.elapsed();
        assert!(matches!(e, AuthError::Unauthorized));

        assert!(unknown_user * 4 >= wrong_password, "{unknown_user:?} vs {wrong_password:?}");
    }

    #[tokio::test]
    async fn refresh_requires_refresh_token_and_live_user() {
        let (repo, svc) = svc();
        let u = repo.add_user("ana", Role::Citizen);
        let pair = svc.issue_pair(&u).unwrap();

        let access = svc.refresh(&pair.refresh).await.unwrap();
        assert_eq!(svc.authenticate(&access).await.unwrap().id, u.id);

        assert!(matches!(svc.refresh(&pair.access).await, Err(AuthError::InvalidToken)));

        repo.remove_user(u.id);
        assert!(matches!(svc.refresh(&pair.refresh).await, Err(AuthError::InvalidToken)));
        assert!(matches!(svc.authenticate(&pair.access).await, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn authenticate_rejects_refresh_tokens() {
        let (repo, svc) = svc();
        let u = repo.add_user("pro", Role::Professional);
        let pair = svc.issue_pair(&u).unwrap();
        let resolved = svc.authenticate(&pair.access).await.unwrap();
        assert_eq!(resolved.role, Role::Professional);
        assert!(svc.authenticate(&pair.refresh).await.is_err());
    }

    #[test]
    fn verify_accepts_both_kinds_rejects_garbage() {
        let (repo, svc) = svc();
        let u = repo.add_user("v", Role::Citizen);
        let pair = svc.issue_pair(&u).unwrap();
        assert!(svc.verify(&pair.access).is_ok());
        assert!(svc.verify(&pair.refresh).is_ok());
        assert!(matches!(svc.verify("garbage"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn config_from_app_config_uses_hours() {
        let app = configs::AuthConfig { jwt_secret: "s".into(), access_ttl_hours: 2, refresh_ttl_hours: 48 };
        let cfg = AuthConfig::from(&app);
        assert_eq!(cfg.access_ttl, Duration::hours(2));
        assert_eq!(cfg.refresh_ttl, Duration::hours(48));
    }
}
