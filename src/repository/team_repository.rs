use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Team, TeamRequest},
    error::{AppError, Result},
    repository::{parse_id, utc, TeamRepository},
};

#[derive(FromRow)]
struct TeamRow {
    id: String,
    club_id: String,
    name: String,
    league: Option<String>,
    member_count: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const TEAM_SELECT: &str = r#"
    SELECT t.id, t.club_id, t.name, t.league,
           (SELECT COUNT(*) FROM team_members tm WHERE tm.team_id = t.id) AS member_count,
           t.created_at, t.updated_at
    FROM teams t
"#;

pub struct SqliteTeamRepository {
    pool: SqlitePool,
}

impl SqliteTeamRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_team(row: TeamRow) -> Result<Team> {
        Ok(Team {
            id: parse_id(&row.id)?,
            club_id: parse_id(&row.club_id)?,
            name: row.name,
            league: row.league,
            member_count: row.member_count,
            created_at: utc(row.created_at),
            updated_at: utc(row.updated_at),
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<Team> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve team".to_string())
        })
    }
}

#[async_trait]
impl TeamRepository for SqliteTeamRepository {
    async fn create(&self, club_id: Uuid, request: TeamRequest) -> Result<Team> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO teams (id, club_id, name, league, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(club_id.to_string())
        .bind(&request.name)
        .bind(&request.league)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.fetch(id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>> {
        let row = sqlx::query_as::<_, TeamRow>(&format!("{} WHERE t.id = ?", TEAM_SELECT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_team).transpose()
    }

    async fn list_by_club(&self, club_id: Uuid) -> Result<Vec<Team>> {
        let rows = sqlx::query_as::<_, TeamRow>(&format!(
            "{} WHERE t.club_id = ? ORDER BY t.name COLLATE NOCASE",
            TEAM_SELECT
        ))
        .bind(club_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_team)
            .collect()
    }

    async fn update(&self, id: Uuid, request: TeamRequest) -> Result<Team> {
        sqlx::query("UPDATE teams SET name = ?, league = ?, updated_at = ? WHERE id = ?")
            .bind(&request.name)
            .bind(&request.league)
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        self.fetch(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
