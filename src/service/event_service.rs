use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::{
        guard::{ANY_MEMBER, STAFF},
        Actor, AuthorizationGuard,
    },
    clock::Clock,
    domain::*,
    error::{AppError, Result},
    repository::{EventRepository, TeamRepository},
};

#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub attendance: Vec<Attendance>,
    pub summary: AttendanceSummary,
}

pub struct EventService {
    events: Arc<dyn EventRepository>,
    teams: Arc<dyn TeamRepository>,
    guard: Arc<AuthorizationGuard>,
    clock: Arc<dyn Clock>,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        teams: Arc<dyn TeamRepository>,
        guard: Arc<AuthorizationGuard>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            teams,
            guard,
            clock,
        }
    }

    /// Events of the caller's club by start time. `upcoming` drops those
    /// that already started.
    pub async fn list(&self, caller: Option<&Identity>, upcoming: bool) -> Result<Vec<Event>> {
        let actor = self.guard.authorize(caller, ANY_MEMBER, None).await?;
        let starting_after = upcoming.then(|| self.clock.now());
        self.events.list_by_club(actor.club_id, starting_after).await
    }

    pub async fn get(&self, caller: Option<&Identity>, event_id: Uuid) -> Result<EventDetail> {
        let event = self.events.find_by_id(event_id).await?;
        self.guard
            .authorize_existing(caller, ANY_MEMBER, event.as_ref().map(|e| e.club_id))
            .await?;

        let event = event.ok_or(AppError::Unauthorized)?;
        self.detail(event).await
    }

    /// Every player the event concerns starts out `pending`.
    pub async fn create(&self, caller: Option<&Identity>, request: EventRequest) -> Result<Event> {
        let actor = self.guard.authorize(caller, STAFF, None).await?;
        self.check_request(&actor, &request).await?;

        let now = self.clock.now();
        let event = self
            .events
            .create(Event {
                id: Uuid::new_v4(),
                club_id: actor.club_id,
                team_id: request.team_id,
                event_type: request.event_type,
                title: clean(request.title),
                description: clean(request.description),
                location: clean(request.location),
                start_time: request.start_time,
                end_time: request.end_time,
                created_by: actor.id,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(
            event_id = %event.id,
            club_id = %event.club_id,
            event_type = event.event_type.as_str(),
            "Event created"
        );
        Ok(event)
    }

    pub async fn update(
        &self,
        caller: Option<&Identity>,
        event_id: Uuid,
        request: EventRequest,
    ) -> Result<Event> {
        let existing = self.events.find_by_id(event_id).await?;
        let actor = self
            .guard
            .authorize_existing(caller, STAFF, existing.as_ref().map(|e| e.club_id))
            .await?;
        let existing = existing.ok_or(AppError::Unauthorized)?;
        self.check_request(&actor, &request).await?;

        self.events
            .update(Event {
                team_id: request.team_id,
                event_type: request.event_type,
                title: clean(request.title),
                description: clean(request.description),
                location: clean(request.location),
                start_time: request.start_time,
                end_time: request.end_time,
                updated_at: self.clock.now(),
                ..existing
            })
            .await
    }

    pub async fn delete(&self, caller: Option<&Identity>, event_id: Uuid) -> Result<()> {
        let existing = self.events.find_by_id(event_id).await?;
        let actor = self
            .guard
            .authorize_existing(caller, STAFF, existing.map(|e| e.club_id))
            .await?;

        self.events.delete(event_id).await?;
        tracing::info!(event_id = %event_id, club_id = %actor.club_id, "Event deleted");
        Ok(())
    }

    /// Records the caller's own response to an event of their club.
    pub async fn update_attendance(
        &self,
        caller: Option<&Identity>,
        event_id: Uuid,
        request: AttendanceRequest,
    ) -> Result<EventDetail> {
        let event = self.events.find_by_id(event_id).await?;
        let actor = self
            .guard
            .authorize_existing(caller, ANY_MEMBER, event.as_ref().map(|e| e.club_id))
            .await?;
        let event = event.ok_or(AppError::Unauthorized)?;

        self.events
            .upsert_attendance(
                event.id,
                actor.id,
                request.status,
                clean(request.reason),
                self.clock.now(),
            )
            .await?;

        tracing::debug!(
            event_id = %event.id,
            member_id = %actor.id,
            status = request.status.as_str(),
            "Attendance updated"
        );

        self.detail(event).await
    }

    async fn check_request(&self, actor: &Actor, request: &EventRequest) -> Result<()> {
        if let Some(end_time) = request.end_time {
            if end_time < request.start_time {
                return Err(AppError::Validation(
                    "End time must not be before start time".to_string(),
                ));
            }
        }

        if let Some(team_id) = request.team_id {
            let team = self.teams.find_by_id(team_id).await?;
            if team.map(|t| t.club_id) != Some(actor.club_id) {
                return Err(AppError::Unauthorized);
            }
        }

        Ok(())
    }

    async fn detail(&self, event: Event) -> Result<EventDetail> {
        let attendance = self.events.list_attendance(event.id).await?;
        Ok(EventDetail {
            summary: AttendanceSummary::from_records(&attendance),
            event,
            attendance,
        })
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
