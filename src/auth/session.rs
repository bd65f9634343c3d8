use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::Identity,
    error::Result,
    repository::parse_id,
};

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub identity_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct SessionIdentityRow {
    identity_id: String,
    email: String,
}

pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        identity_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let id = Uuid::new_v4().to_string();
        let now_naive = now.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO sessions (id, identity_id, token_hash, expires_at, created_at, last_used_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id)
        .bind(identity_id.to_string())
        .bind(hash_token(token))
        .bind(expires_at.naive_utc())
        .bind(now_naive)
        .bind(now_naive)
        .execute(&self.pool)
        .await?;

        Ok(Session {
            id,
            identity_id,
            expires_at,
            created_at: now,
        })
    }

    /// Resolves a live session to its identity and touches `last_used_at`.
    pub async fn find_identity(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Identity>> {
        let token_hash = hash_token(token);
        let now_naive = now.naive_utc();

        let row = sqlx::query_as::<_, SessionIdentityRow>(
            r#"
            SELECT s.identity_id, i.email
            FROM sessions s
            JOIN identities i ON i.id = s.identity_id
            WHERE s.token_hash = ? AND s.expires_at > ?
            "#
        )
        .bind(&token_hash)
        .bind(now_naive)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("UPDATE sessions SET last_used_at = ? WHERE token_hash = ?")
            .bind(now_naive)
            .bind(&token_hash)
            .execute(&self.pool)
            .await?;

        Ok(Some(Identity {
            id: parse_id(&row.identity_id)?,
            email: row.email,
        }))
    }

    pub async fn delete_by_token(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_by_identity(&self, identity_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE identity_id = ?")
            .bind(identity_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now.naive_utc())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

pub(crate) fn hash_token(token: &str) -> String {
    use sha2::{Sha256, Digest};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
