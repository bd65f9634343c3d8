use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Identity, Invite, Membership, NewInvite, Redemption},
    error::{is_unique_violation, AppError, Result},
    repository::{parse_id, parse_role, utc, InviteRepository},
};

#[derive(FromRow)]
struct InviteRow {
    id: String,
    club_id: String,
    token: String,
    full_name: String,
    email: Option<String>,
    role: String,
    created_by: String,
    created_at: NaiveDateTime,
    expires_at: NaiveDateTime,
    used_at: Option<NaiveDateTime>,
    resent_at: Option<NaiveDateTime>,
    resend_count: i64,
}

const INVITE_COLUMNS: &str = "id, club_id, token, full_name, email, role, created_by, \
     created_at, expires_at, used_at, resent_at, resend_count";

pub struct SqliteInviteRepository {
    pool: SqlitePool,
}

impl SqliteInviteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_invite(row: InviteRow) -> Result<Invite> {
        Ok(Invite {
            id: parse_id(&row.id)?,
            club_id: parse_id(&row.club_id)?,
            token: row.token,
            full_name: row.full_name,
            email: row.email,
            role: parse_role(&row.role)?,
            created_by: parse_id(&row.created_by)?,
            created_at: utc(row.created_at),
            expires_at: utc(row.expires_at),
            used_at: row.used_at.map(utc),
            resent_at: row.resent_at.map(utc),
            resend_count: row.resend_count,
        })
    }
}

#[async_trait]
impl InviteRepository for SqliteInviteRepository {
    async fn create(&self, invite: NewInvite) -> Result<Invite> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO club_invites (
                id, club_id, token, full_name, email, role,
                created_by, created_at, expires_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(invite.club_id.to_string())
        .bind(&invite.token)
        .bind(&invite.full_name)
        .bind(&invite.email)
        .bind(invite.role.as_str())
        .bind(invite.created_by.to_string())
        .bind(invite.created_at.naive_utc())
        .bind(invite.expires_at.naive_utc())
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created invite".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invite>> {
        let row = sqlx::query_as::<_, InviteRow>(&format!(
            "SELECT {} FROM club_invites WHERE id = ?",
            INVITE_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_invite).transpose()
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Invite>> {
        let row = sqlx::query_as::<_, InviteRow>(&format!(
            "SELECT {} FROM club_invites WHERE token = ?",
            INVITE_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_invite).transpose()
    }

    async fn list_by_club(&self, club_id: Uuid) -> Result<Vec<Invite>> {
        let rows = sqlx::query_as::<_, InviteRow>(&format!(
            "SELECT {} FROM club_invites WHERE club_id = ? ORDER BY created_at DESC",
            INVITE_COLUMNS
        ))
        .bind(club_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_invite)
            .collect()
    }

    async fn rotate_token(
        &self,
        id: Uuid,
        club_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        resent_at: DateTime<Utc>,
    ) -> Result<Option<Invite>> {
        // used_at, role, club and target fields are never part of the SET list.
        let result = sqlx::query(
            r#"
            UPDATE club_invites
            SET token = ?, expires_at = ?, resent_at = ?, resend_count = resend_count + 1
            WHERE id = ? AND club_id = ? AND used_at IS NULL
            "#
        )
        .bind(token)
        .bind(expires_at.naive_utc())
        .bind(resent_at.naive_utc())
        .bind(id.to_string())
        .bind(club_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn delete(&self, id: Uuid, club_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM club_invites WHERE id = ? AND club_id = ?")
            .bind(id.to_string())
            .bind(club_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn redeem(&self, token: &str, redemption: Redemption) -> Result<(Identity, Membership, Invite)> {
        let now = redemption.redeemed_at.naive_utc();
        let mut tx = self.pool.begin().await?;

        // Claim first. Of two racing redemptions only one sees a row here; the
        // other blocks on the write lock and then matches nothing.
        let claimed = sqlx::query(
            r#"
            UPDATE club_invites
            SET used_at = ?
            WHERE token = ? AND used_at IS NULL AND expires_at > ?
            "#
        )
        .bind(now)
        .bind(token)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() != 1 {
            return Err(AppError::InvalidOrExpiredInvite);
        }

        let row = sqlx::query_as::<_, InviteRow>(&format!(
            "SELECT {} FROM club_invites WHERE token = ?",
            INVITE_COLUMNS
        ))
        .bind(token)
        .fetch_one(&mut *tx)
        .await?;
        let invite = Self::row_to_invite(row)?;

        let identity_id = Uuid::new_v4();
        let id_str = identity_id.to_string();
        let email = redemption.email.trim().to_lowercase();

        sqlx::query(
            "INSERT INTO identities (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)"
        )
        .bind(&id_str)
        .bind(&email)
        .bind(&redemption.password_hash)
        .bind(now)
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
        .bind(&redemption.full_name)
        .bind(invite.role.as_str())
        .bind(invite.club_id.to_string())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let identity = Identity { id: identity_id, email };
        let membership = Membership {
            id: identity_id,
            full_name: redemption.full_name,
            role: invite.role,
            club_id: Some(invite.club_id),
            avatar_url: None,
            created_at: redemption.redeemed_at,
            updated_at: redemption.redeemed_at,
        };

        Ok((identity, membership, invite))
    }
}
