use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use chrono::Duration;
use cookie::{Cookie, SameSite};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    clock::Clock,
    config::AuthConfig,
    domain::{Identity, Membership, Role},
    error::{AppError, Result},
};

pub mod guard;
pub mod identity;
pub mod session;

pub use guard::{Actor, AuthorizationGuard};
use identity::{IdentityStore, LinkKind};
use session::SessionStore;

pub const SESSION_COOKIE: &str = "session";

/// Identity and session provider: accounts, credentials, sessions and the
/// single-use links for password resets and passwordless sign-in. Knows
/// nothing about clubs or roles.
pub struct AuthService {
    identities: IdentityStore,
    session_store: SessionStore,
    clock: Arc<dyn Clock>,
    session_duration_hours: i64,
    password_reset_minutes: i64,
    magic_link_minutes: i64,
}

impl AuthService {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, config: &AuthConfig) -> Self {
        Self {
            identities: IdentityStore::new(pool.clone()),
            session_store: SessionStore::new(pool),
            clock,
            session_duration_hours: config.session_duration_hours,
            password_reset_minutes: config.password_reset_minutes,
            magic_link_minutes: config.magic_link_minutes,
        }
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// Registers a new identity with an empty (club-less) membership.
    pub async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<(Identity, Membership)> {
        let password_hash = Self::hash_password(password).await?;
        self.identities
            .create(email, &password_hash, full_name, None, self.clock.now())
            .await
    }

    /// Like `sign_up`, but the membership is placed in `club_id` with `role`
    /// in the same transaction. Nothing is written if either part fails.
    pub async fn sign_up_into_club(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        club_id: Uuid,
        role: Role,
    ) -> Result<(Identity, Membership)> {
        let password_hash = Self::hash_password(password).await?;
        self.identities
            .create(email, &password_hash, full_name, Some((club_id, role)), self.clock.now())
            .await
    }

    /// Checks credentials and opens a session. Returns the raw session token.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(Identity, String)> {
        let (identity, password_hash) = self.identities
            .find_credentials(email)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        if !Self::verify_password(password, &password_hash).await? {
            return Err(AppError::Unauthenticated);
        }

        let token = self.create_session(identity.id).await?;
        Ok((identity, token))
    }

    pub async fn create_session(&self, identity_id: Uuid) -> Result<String> {
        let token = generate_token();
        let now = self.clock.now();
        let expires_at = now + Duration::hours(self.session_duration_hours);

        self.session_store
            .create(identity_id, &token, expires_at, now)
            .await?;

        Ok(token)
    }

    pub async fn sign_out(&self, token: &str) -> Result<()> {
        self.session_store.delete_by_token(token).await
    }

    pub async fn current_identity(&self, token: &str) -> Result<Option<Identity>> {
        self.session_store.find_identity(token, self.clock.now()).await
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.session_store.cleanup_expired(self.clock.now()).await
    }

    /// Issues a password reset token for `email`. `None` when no such account
    /// exists; callers must not reveal the difference.
    pub async fn create_password_reset(&self, email: &str) -> Result<Option<(Identity, String)>> {
        self.issue_link(LinkKind::PasswordReset, email, self.password_reset_minutes).await
    }

    /// Issues a passwordless sign-in token for `email`, with the same
    /// silence about unknown accounts as `create_password_reset`.
    pub async fn create_login_link(&self, email: &str) -> Result<Option<(Identity, String)>> {
        self.issue_link(LinkKind::SignIn, email, self.magic_link_minutes).await
    }

    /// Consumes a sign-in token and opens a session for its owner.
    pub async fn sign_in_with_link(&self, token: &str) -> Result<(Identity, String)> {
        let identity_id = self.identities
            .consume_link(LinkKind::SignIn, token, self.clock.now())
            .await?
            .ok_or_else(|| AppError::Validation("Invalid or expired sign-in link".to_string()))?;

        let identity = self.identities
            .find_by_id(identity_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        let session_token = self.create_session(identity.id).await?;
        Ok((identity, session_token))
    }

    async fn issue_link(
        &self,
        kind: LinkKind,
        email: &str,
        valid_minutes: i64,
    ) -> Result<Option<(Identity, String)>> {
        let Some((identity, _)) = self.identities.find_credentials(email).await? else {
            return Ok(None);
        };

        let token = generate_token();
        let now = self.clock.now();
        let expires_at = now + Duration::minutes(valid_minutes);

        self.identities
            .create_link(kind, identity.id, &token, expires_at, now)
            .await?;

        Ok(Some((identity, token)))
    }

    /// Consumes a reset token, sets the new password and ends every session
    /// of the identity.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let identity_id = self.identities
            .consume_link(LinkKind::PasswordReset, token, self.clock.now())
            .await?
            .ok_or_else(|| AppError::Validation("Invalid or expired reset link".to_string()))?;

        let password_hash = Self::hash_password(new_password).await?;
        self.identities.set_password_hash(identity_id, &password_hash).await?;
        self.session_store.delete_by_identity(identity_id).await?;

        tracing::info!(identity_id = %identity_id, "Password reset completed");
        Ok(())
    }

    pub fn create_session_cookie(&self, token: &str, secure: bool) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(secure)
            .max_age(cookie::time::Duration::hours(self.session_duration_hours))
            .build()
    }

    pub fn create_logout_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

/// 32 bytes from the OS-seeded CSPRNG, hex encoded (URL safe, 256 bits).
pub(crate) fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
