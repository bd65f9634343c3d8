use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Identity, Membership, Role},
    error::{is_unique_violation, AppError, Result},
    repository::parse_id,
};

use super::session::hash_token;

/// Single-use tokens mailed to an account holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    PasswordReset,
    SignIn,
}

impl LinkKind {
    fn table(self) -> &'static str {
        match self {
            LinkKind::PasswordReset => "password_resets",
            LinkKind::SignIn => "login_links",
        }
    }
}

#[derive(FromRow)]
struct CredentialRow {
    id: String,
    email: String,
    password_hash: String,
}

/// Accounts and their credentials. Profiles are created alongside so every
/// identity has exactly one membership row from the start.
pub struct IdentityStore {
    pool: SqlitePool,
}

impl IdentityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts the identity and its profile in one transaction. With a
    /// placement the profile starts out in that club with that role,
    /// otherwise club-less as a player.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        placement: Option<(Uuid, Role)>,
        now: DateTime<Utc>,
    ) -> Result<(Identity, Membership)> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let email = email.trim().to_lowercase();
        let now_naive = now.naive_utc();
        let club_id = placement.map(|(club_id, _)| club_id);
        let role = placement.map(|(_, role)| role).unwrap_or_default();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO identities (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)"
        )
        .bind(&id_str)
        .bind(&email)
        .bind(password_hash)
        .bind(now_naive)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::IdentityAlreadyExists
            } else {
                AppError::from(e)
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO profiles (id, full_name, role, club_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(full_name)
        .bind(role.as_str())
        .bind(club_id.map(|id| id.to_string()))
        .bind(now_naive)
        .bind(now_naive)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let membership = Membership {
            id,
            full_name: full_name.to_string(),
            role,
            club_id,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };

        Ok((Identity { id, email }, membership))
    }

    pub async fn find_credentials(&self, email: &str) -> Result<Option<(Identity, String)>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, email, password_hash FROM identities WHERE email = ?"
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((
                Identity { id: parse_id(&r.id)?, email: r.email },
                r.password_hash,
            ))),
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        let email = sqlx::query_scalar::<_, String>("SELECT email FROM identities WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(email.map(|email| Identity { id, email }))
    }

    pub async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE identities SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn create_link(
        &self,
        kind: LinkKind,
        identity_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let query = format!(
            "INSERT INTO {} (token_hash, identity_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
            kind.table()
        );
        sqlx::query(&query)
            .bind(hash_token(token))
            .bind(identity_id.to_string())
            .bind(expires_at.naive_utc())
            .bind(now.naive_utc())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Marks a link used. Returns the identity it belongs to, or `None` when
    /// the token is unknown, expired or already consumed. Of two concurrent
    /// calls with the same token at most one gets the identity.
    pub async fn consume_link(&self, kind: LinkKind, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>> {
        let now_naive = now.naive_utc();
        let query = format!(
            r#"
            UPDATE {}
            SET used_at = ?
            WHERE token_hash = ? AND used_at IS NULL AND expires_at > ?
            RETURNING identity_id
            "#,
            kind.table()
        );

        let identity_id = sqlx::query_scalar::<_, String>(&query)
            .bind(now_naive)
            .bind(hash_token(token))
            .bind(now_naive)
            .fetch_optional(&self.pool)
            .await?;

        identity_id.as_deref().map(parse_id).transpose()
    }
}
