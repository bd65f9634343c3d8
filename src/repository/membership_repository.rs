use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{MemberListing, Membership, Role},
    error::{is_unique_violation, AppError, Result},
    repository::{parse_id, parse_opt_id, parse_role, utc, MembershipRepository},
};

// Database row struct that matches the profiles table
#[derive(FromRow)]
pub(crate) struct MembershipRow {
    id: String,
    full_name: String,
    role: String,
    club_id: Option<String>,
    avatar_url: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub(crate) const MEMBERSHIP_COLUMNS: &str =
    "id, full_name, role, club_id, avatar_url, created_at, updated_at";

pub(crate) fn row_to_membership(row: MembershipRow) -> Result<Membership> {
    Ok(Membership {
        id: parse_id(&row.id)?,
        full_name: row.full_name,
        role: parse_role(&row.role)?,
        club_id: parse_opt_id(row.club_id.as_deref())?,
        avatar_url: row.avatar_url,
        created_at: utc(row.created_at),
        updated_at: utc(row.updated_at),
    })
}

#[derive(FromRow)]
struct MemberListingRow {
    id: String,
    email: String,
    full_name: String,
    role: String,
    avatar_url: Option<String>,
    team_id: Option<String>,
    team_name: Option<String>,
    position: Option<String>,
    created_at: NaiveDateTime,
}

pub struct SqliteMembershipRepository {
    pool: SqlitePool,
}

impl SqliteMembershipRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_listing(row: MemberListingRow) -> Result<MemberListing> {
        Ok(MemberListing {
            id: parse_id(&row.id)?,
            email: row.email,
            full_name: row.full_name,
            role: parse_role(&row.role)?,
            avatar_url: row.avatar_url,
            team_id: parse_opt_id(row.team_id.as_deref())?,
            team_name: row.team_name,
            position: row.position,
            joined_at: utc(row.created_at),
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<Membership> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated membership".to_string())
        })
    }
}

#[async_trait]
impl MembershipRepository for SqliteMembershipRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!(
            "SELECT {} FROM profiles WHERE id = ?",
            MEMBERSHIP_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_membership).transpose()
    }

    async fn list_by_club(&self, club_id: Uuid) -> Result<Vec<MemberListing>> {
        let rows = sqlx::query_as::<_, MemberListingRow>(
            r#"
            SELECT p.id, i.email, p.full_name, p.role, p.avatar_url,
                   tm.team_id, t.name AS team_name, tm.position, p.created_at
            FROM profiles p
            JOIN identities i ON i.id = p.id
            LEFT JOIN team_members tm ON tm.profile_id = p.id
            LEFT JOIN teams t ON t.id = tm.team_id
            WHERE p.club_id = ?
            ORDER BY p.full_name COLLATE NOCASE
            "#
        )
        .bind(club_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_listing)
            .collect()
    }

    async fn join_club(&self, id: Uuid, club_id: Uuid, role: Role) -> Result<Membership> {
        sqlx::query(
            "UPDATE profiles SET club_id = ?, role = ?, updated_at = ? WHERE id = ?"
        )
        .bind(club_id.to_string())
        .bind(role.as_str())
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.fetch(id).await
    }

    async fn update_role(&self, id: Uuid, club_id: Uuid, role: Role) -> Result<()> {
        let result = sqlx::query(
            "UPDATE profiles SET role = ?, updated_at = ? WHERE id = ? AND club_id = ?"
        )
        .bind(role.as_str())
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .bind(club_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Member not found".to_string()));
        }
        Ok(())
    }

    async fn remove_from_club(&self, id: Uuid, club_id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET club_id = NULL, role = 'player', updated_at = ?
            WHERE id = ? AND club_id = ?
            "#
        )
        .bind(Utc::now().naive_utc())
        .bind(&id_str)
        .bind(club_id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Member not found".to_string()));
        }

        sqlx::query("DELETE FROM team_members WHERE profile_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn assign_team(&self, id: Uuid, team_id: Option<Uuid>, position: Option<String>) -> Result<()> {
        let id_str = id.to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM team_members WHERE profile_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        if let Some(team_id) = team_id {
            sqlx::query(
                r#"
                INSERT INTO team_members (team_id, profile_id, position, joined_at)
                VALUES (?, ?, ?, ?)
                "#
            )
            .bind(team_id.to_string())
            .bind(&id_str)
            .bind(&position)
            .bind(Utc::now().naive_utc())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Member was reassigned concurrently".to_string())
                } else {
                    AppError::from(e)
                }
            })?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_full_name(&self, id: Uuid, full_name: &str) -> Result<Membership> {
        sqlx::query("UPDATE profiles SET full_name = ?, updated_at = ? WHERE id = ?")
            .bind(full_name)
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        self.fetch(id).await
    }

    async fn update_avatar(&self, id: Uuid, avatar_url: &str) -> Result<Membership> {
        sqlx::query("UPDATE profiles SET avatar_url = ?, updated_at = ? WHERE id = ?")
            .bind(avatar_url)
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        self.fetch(id).await
    }
}
