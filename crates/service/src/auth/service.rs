use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{info, debug, warn, instrument};
use uuid::Uuid;

use super::domain::{RegisterInput, LoginInput, AuthUser, AuthSession, CurrentUser};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub password_algorithm: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: None, password_algorithm: "argon2".into(), token_ttl_hours: 12 }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: usize,
    exp: usize,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::default());
    /// let input = RegisterInput { email: "user@example.com".into(), name: "Test".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        models::user::validate_email(&input.email)?;
        models::user::validate_name(&input.name)?;
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let user = self.repo.create_user(&input.email, &input.name).await?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and optionally issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let cfg = AuthConfig { jwt_secret: Some("secret".into()), ..AuthConfig::default() };
    /// let svc = AuthService::new(repo.clone(), cfg);
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            warn!(user_id = %user.id, "login_rejected");
            return Err(AuthError::Unauthorized);
        }

        let token = match &self.cfg.jwt_secret {
            Some(secret) => Some(self.issue_token(&user, secret)?),
            None => None,
        };

        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Decode a bearer token into the principal it was issued for.
    pub fn verify_token(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let secret = self.cfg.jwt_secret.as_deref()
            .ok_or_else(|| AuthError::TokenError("no signing secret configured".into()))?;
        let key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            debug!(err = %e, "token_rejected");
            AuthError::Unauthorized
        })?;
        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::Unauthorized)?;
        Ok(CurrentUser::new(id))
    }

    fn issue_token(&self, user: &AuthUser, secret: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + chrono::Duration::hours(self.cfg.token_ttl_hours);
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> AuthService<MockAuthRepository> {
        let cfg = AuthConfig { jwt_secret: Some("test-secret".into()), ..AuthConfig::default() };
        AuthService::new(Arc::new(MockAuthRepository::default()), cfg)
    }

    fn register_input(email: &str, password: &str) -> RegisterInput {
        RegisterInput { email: email.into(), name: "Tester".into(), password: password.into() }
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let err = svc().register(register_input("a@b.com", "short")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(err.code(), 1001);
    }

    #[tokio::test]
    async fn register_rejects_invalid_email() {
        let err = svc().register(register_input("not-an-email", "LongEnough1")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let s = svc();
        s.register(register_input("dup@example.com", "LongEnough1")).await.unwrap();
        let err = s.register(register_input("dup@example.com", "LongEnough1")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let s = svc();
        s.register(register_input("u@example.com", "CorrectHorse1")).await.unwrap();
        let err = s.login(LoginInput { email: "u@example.com".into(), password: "wrong-pass".into() }).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn login_unknown_user_is_unauthorized() {
        let err = svc().login(LoginInput { email: "ghost@example.com".into(), password: "whatever1".into() }).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn issued_token_verifies_to_same_user() {
        let s = svc();
        let user = s.register(register_input("tok@example.com", "CorrectHorse1")).await.unwrap();
        let session = s.login(LoginInput { email: "tok@example.com".into(), password: "CorrectHorse1".into() }).await.unwrap();
        let current = s.verify_token(&session.token.unwrap()).unwrap();
        assert_eq!(current, CurrentUser::new(user.id));
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let s = svc();
        s.register(register_input("x@example.com", "CorrectHorse1")).await.unwrap();
        let session = s.login(LoginInput { email: "x@example.com".into(), password: "CorrectHorse1".into() }).await.unwrap();

        let other = AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: Some("another-secret".into()), ..AuthConfig::default() },
        );
        let err = other.verify_token(&session.token.unwrap()).unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(svc().verify_token("not.a.jwt"), Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn login_without_secret_issues_no_token() {
        let s = AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::default());
        s.register(register_input("nt@example.com", "CorrectHorse1")).await.unwrap();
        let session = s.login(LoginInput { email: "nt@example.com".into(), password: "CorrectHorse1".into() }).await.unwrap();
        assert!(session.token.is_none());
        assert!(matches!(s.verify_token("anything"), Err(AuthError::TokenError(_))));
    }
}
