use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        guard::{ADMIN_ONLY, ANY_MEMBER},
        AuthorizationGuard,
    },
    domain::*,
    error::{AppError, Result},
    repository::TeamRepository,
};

pub struct TeamService {
    teams: Arc<dyn TeamRepository>,
    guard: Arc<AuthorizationGuard>,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamRepository>, guard: Arc<AuthorizationGuard>) -> Self {
        Self { teams, guard }
    }

    pub async fn list(&self, caller: Option<&Identity>) -> Result<Vec<Team>> {
        let actor = self.guard.authorize(caller, ANY_MEMBER, None).await?;
        self.teams.list_by_club(actor.club_id).await
    }

    pub async fn create(&self, caller: Option<&Identity>, request: TeamRequest) -> Result<Team> {
        let actor = self.guard.authorize(caller, ADMIN_ONLY, None).await?;
        let request = normalize(request);
        request.validate()?;

        let team = self.teams.create(actor.club_id, request).await?;
        tracing::info!(team_id = %team.id, club_id = %team.club_id, "Team created");
        Ok(team)
    }

    pub async fn update(
        &self,
        caller: Option<&Identity>,
        team_id: Uuid,
        request: TeamRequest,
    ) -> Result<Team> {
        let existing = self.teams.find_by_id(team_id).await?;
        self.guard
            .authorize_existing(caller, ADMIN_ONLY, existing.map(|t| t.club_id))
            .await?;

        let request = normalize(request);
        request.validate()?;

        self.teams.update(team_id, request).await
    }

    /// Refused while the team still has members.
    pub async fn delete(&self, caller: Option<&Identity>, team_id: Uuid) -> Result<()> {
        let existing = self.teams.find_by_id(team_id).await?;
        let actor = self
            .guard
            .authorize_existing(caller, ADMIN_ONLY, existing.as_ref().map(|t| t.club_id))
            .await?;

        let team = existing.ok_or(AppError::Unauthorized)?;
        if team.member_count > 0 {
            return Err(AppError::Conflict(format!(
                "Team still has {} member(s)",
                team.member_count
            )));
        }

        self.teams.delete(team_id).await?;
        tracing::info!(team_id = %team_id, club_id = %actor.club_id, "Team deleted");
        Ok(())
    }
}

fn normalize(request: TeamRequest) -> TeamRequest {
    TeamRequest {
        name: request.name.trim().to_string(),
        league: request
            .league
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
    }
}
