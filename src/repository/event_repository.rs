use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Attendance, AttendanceStatus, Event, EventType},
    error::{AppError, Result},
    repository::{parse_id, parse_opt_id, utc, EventRepository},
};

#[derive(FromRow)]
struct EventRow {
    id: String,
    club_id: String,
    team_id: Option<String>,
    event_type: String,
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start_time: NaiveDateTime,
    end_time: Option<NaiveDateTime>,
    created_by: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct AttendanceRow {
    event_id: String,
    profile_id: String,
    full_name: String,
    status: String,
    reason: Option<String>,
    responded_at: Option<NaiveDateTime>,
}

const EVENT_COLUMNS: &str = "id, club_id, team_id, event_type, title, description, location, \
     start_time, end_time, created_by, created_at, updated_at";

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_event(row: EventRow) -> Result<Event> {
        Ok(Event {
            id: parse_id(&row.id)?,
            club_id: parse_id(&row.club_id)?,
            team_id: parse_opt_id(row.team_id.as_deref())?,
            event_type: EventType::from_str(&row.event_type)
                .ok_or_else(|| AppError::Database(format!("Invalid event type: {}", row.event_type)))?,
            title: row.title,
            description: row.description,
            location: row.location,
            start_time: utc(row.start_time),
            end_time: row.end_time.map(utc),
            created_by: parse_id(&row.created_by)?,
            created_at: utc(row.created_at),
            updated_at: utc(row.updated_at),
        })
    }

    fn row_to_attendance(row: AttendanceRow) -> Result<Attendance> {
        Ok(Attendance {
            event_id: parse_id(&row.event_id)?,
            profile_id: parse_id(&row.profile_id)?,
            full_name: row.full_name,
            status: AttendanceStatus::from_str(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid attendance status: {}", row.status)))?,
            reason: row.reason,
            responded_at: row.responded_at.map(utc),
        })
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn create(&self, event: Event) -> Result<Event> {
        let id_str = event.id.to_string();
        let club_id_str = event.club_id.to_string();
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO events (
                id, club_id, team_id, event_type, title, description, location,
                start_time, end_time, created_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&club_id_str)
        .bind(event.team_id.map(|id| id.to_string()))
        .bind(event.event_type.as_str())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start_time.naive_utc())
        .bind(event.end_time.map(|dt| dt.naive_utc()))
        .bind(event.created_by.to_string())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // Team events invite the team's players; club-wide events invite every player.
        match event.team_id {
            Some(team_id) => {
                sqlx::query(
                    r#"
                    INSERT INTO attendance (event_id, profile_id, status)
                    SELECT ?, p.id, 'pending'
                    FROM profiles p
                    JOIN team_members tm ON tm.profile_id = p.id
                    WHERE tm.team_id = ? AND p.club_id = ? AND p.role = 'player'
                    "#
                )
                .bind(&id_str)
                .bind(team_id.to_string())
                .bind(&club_id_str)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO attendance (event_id, profile_id, status)
                    SELECT ?, id, 'pending'
                    FROM profiles
                    WHERE club_id = ? AND role = 'player'
                    "#
                )
                .bind(&id_str)
                .bind(&club_id_str)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.find_by_id(event.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created event".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events WHERE id = ?",
            EVENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_event).transpose()
    }

    async fn list_by_club(&self, club_id: Uuid, starting_after: Option<DateTime<Utc>>) -> Result<Vec<Event>> {
        let rows = match starting_after {
            Some(after) => {
                sqlx::query_as::<_, EventRow>(&format!(
                    "SELECT {} FROM events WHERE club_id = ? AND start_time >= ? ORDER BY start_time ASC",
                    EVENT_COLUMNS
                ))
                .bind(club_id.to_string())
                .bind(after.naive_utc())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, EventRow>(&format!(
                    "SELECT {} FROM events WHERE club_id = ? ORDER BY start_time ASC",
                    EVENT_COLUMNS
                ))
                .bind(club_id.to_string())
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter()
            .map(Self::row_to_event)
            .collect()
    }

    async fn update(&self, event: Event) -> Result<Event> {
        sqlx::query(
            r#"
            UPDATE events
            SET team_id = ?, event_type = ?, title = ?, description = ?, location = ?,
                start_time = ?, end_time = ?, updated_at = ?
            WHERE id = ? AND club_id = ?
            "#
        )
        .bind(event.team_id.map(|id| id.to_string()))
        .bind(event.event_type.as_str())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start_time.naive_utc())
        .bind(event.end_time.map(|dt| dt.naive_utc()))
        .bind(Utc::now().naive_utc())
        .bind(event.id.to_string())
        .bind(event.club_id.to_string())
        .execute(&self.pool)
        .await?;

        self.find_by_id(event.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated event".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_attendance(&self, event_id: Uuid) -> Result<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT a.event_id, a.profile_id, p.full_name, a.status, a.reason, a.responded_at
            FROM attendance a
            JOIN profiles p ON p.id = a.profile_id
            WHERE a.event_id = ?
            ORDER BY p.full_name COLLATE NOCASE
            "#
        )
        .bind(event_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_attendance)
            .collect()
    }

    async fn upsert_attendance(
        &self,
        event_id: Uuid,
        profile_id: Uuid,
        status: AttendanceStatus,
        reason: Option<String>,
        responded_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO attendance (event_id, profile_id, status, reason, responded_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(event_id, profile_id) DO UPDATE SET
                status = excluded.status,
                reason = excluded.reason,
                responded_at = excluded.responded_at
            "#
        )
        .bind(event_id.to_string())
        .bind(profile_id.to_string())
        .bind(status.as_str())
        .bind(&reason)
        .bind(responded_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
