use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{ClubModule, ModuleId},
    error::{AppError, Result},
    repository::{utc, ModuleRepository},
};

#[derive(FromRow)]
struct ClubModuleRow {
    module_id: String,
    is_active: i32,
    activated_at: Option<NaiveDateTime>,
}

pub struct SqliteModuleRepository {
    pool: SqlitePool,
}

impl SqliteModuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModuleRepository for SqliteModuleRepository {
    async fn list_for_club(&self, club_id: Uuid) -> Result<Vec<ClubModule>> {
        let rows = sqlx::query_as::<_, ClubModuleRow>(
            "SELECT module_id, is_active, activated_at FROM club_modules WHERE club_id = ?"
        )
        .bind(club_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut modules = Vec::with_capacity(rows.len());
        for row in rows {
            // Rows for modules dropped from the catalog are ignored.
            let Some(module_id) = ModuleId::from_str(&row.module_id) else {
                tracing::warn!("Ignoring unknown module id in club_modules: {}", row.module_id);
                continue;
            };
            modules.push(ClubModule {
                module_id,
                is_active: row.is_active != 0,
                activated_at: row.activated_at.map(utc),
            });
        }
        Ok(modules)
    }

    async fn activate(&self, club_id: Uuid, module_id: ModuleId, activated_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO club_modules (club_id, module_id, is_active, activated_at)
            VALUES (?, ?, 1, ?)
            ON CONFLICT(club_id, module_id) DO UPDATE SET
                is_active = 1,
                activated_at = excluded.activated_at
            "#
        )
        .bind(club_id.to_string())
        .bind(module_id.as_str())
        .bind(activated_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn deactivate(&self, club_id: Uuid, module_id: ModuleId) -> Result<()> {
        sqlx::query("UPDATE club_modules SET is_active = 0 WHERE club_id = ? AND module_id = ?")
            .bind(club_id.to_string())
            .bind(module_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn is_active(&self, club_id: Uuid, module_id: ModuleId) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM club_modules WHERE club_id = ? AND module_id = ? AND is_active = 1"
        )
        .bind(club_id.to_string())
        .bind(module_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}
