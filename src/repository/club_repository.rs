use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Club, CreateClubRequest},
    error::{AppError, Result},
    repository::{parse_id, utc, ClubRepository},
};

#[derive(FromRow)]
pub(crate) struct ClubRow {
    id: String,
    name: String,
    description: Option<String>,
    logo_url: Option<String>,
    primary_color: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub(crate) fn row_to_club(row: ClubRow) -> Result<Club> {
    Ok(Club {
        id: parse_id(&row.id)?,
        name: row.name,
        description: row.description,
        logo_url: row.logo_url,
        primary_color: row.primary_color,
        created_at: utc(row.created_at),
        updated_at: utc(row.updated_at),
    })
}

pub struct SqliteClubRepository {
    pool: SqlitePool,
}

impl SqliteClubRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: Uuid) -> Result<Club> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve club".to_string())
        })
    }
}

#[async_trait]
impl ClubRepository for SqliteClubRepository {
    async fn create(&self, request: CreateClubRequest) -> Result<Club> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO clubs (id, name, description, primary_color, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.primary_color)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.fetch(id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Club>> {
        let row = sqlx::query_as::<_, ClubRow>(
            r#"
            SELECT id, name, description, logo_url, primary_color, created_at, updated_at
            FROM clubs
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_club).transpose()
    }

    async fn update_settings(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
        primary_color: Option<&str>,
    ) -> Result<Club> {
        sqlx::query(
            r#"
            UPDATE clubs
            SET name = ?, description = ?, primary_color = ?, updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(name)
        .bind(description)
        .bind(primary_color)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.fetch(id).await
    }

    async fn update_logo(&self, id: Uuid, logo_url: &str) -> Result<Club> {
        sqlx::query("UPDATE clubs SET logo_url = ?, updated_at = ? WHERE id = ?")
            .bind(logo_url)
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        self.fetch(id).await
    }
}
