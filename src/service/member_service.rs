use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        guard::{forbid_self_action, ADMIN_ONLY, ANY_MEMBER, STAFF},
        AuthorizationGuard,
    },
    domain::*,
    error::{AppError, Result},
    repository::{ClubRepository, MembershipRepository, TeamRepository},
    storage::{validate_image, ObjectStore, UploadKind, AVATAR_BUCKET},
};

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub identity: Identity,
    pub membership: Membership,
    pub club: Option<Club>,
    pub dashboard: &'static str,
}

pub struct MemberService {
    memberships: Arc<dyn MembershipRepository>,
    teams: Arc<dyn TeamRepository>,
    clubs: Arc<dyn ClubRepository>,
    guard: Arc<AuthorizationGuard>,
    store: Arc<dyn ObjectStore>,
}

impl MemberService {
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        teams: Arc<dyn TeamRepository>,
        clubs: Arc<dyn ClubRepository>,
        guard: Arc<AuthorizationGuard>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            memberships,
            teams,
            clubs,
            guard,
            store,
        }
    }

    pub async fn list(&self, caller: Option<&Identity>) -> Result<Vec<MemberListing>> {
        let actor = self.guard.authorize(caller, ANY_MEMBER, None).await?;
        self.memberships.list_by_club(actor.club_id).await
    }

    pub async fn update_role(
        &self,
        caller: Option<&Identity>,
        member_id: Uuid,
        role: Role,
    ) -> Result<()> {
        let target_club = self.target_club(member_id).await?;
        let actor = self
            .guard
            .authorize_existing(caller, ADMIN_ONLY, target_club)
            .await?;
        forbid_self_action(&actor, member_id)?;

        self.memberships.update_role(member_id, actor.club_id, role).await?;

        tracing::info!(
            member_id = %member_id,
            club_id = %actor.club_id,
            role = role.as_str(),
            changed_by = %actor.id,
            "Member role changed"
        );
        Ok(())
    }

    pub async fn remove(&self, caller: Option<&Identity>, member_id: Uuid) -> Result<()> {
        let target_club = self.target_club(member_id).await?;
        let actor = self
            .guard
            .authorize_existing(caller, ADMIN_ONLY, target_club)
            .await?;
        forbid_self_action(&actor, member_id)?;

        self.memberships.remove_from_club(member_id, actor.club_id).await?;

        tracing::info!(
            member_id = %member_id,
            club_id = %actor.club_id,
            removed_by = %actor.id,
            "Member removed from club"
        );
        Ok(())
    }

    /// Moves a member to `team_id`, or out of any team when it is `None`.
    pub async fn assign_to_team(
        &self,
        caller: Option<&Identity>,
        member_id: Uuid,
        assignment: TeamAssignment,
    ) -> Result<()> {
        let target_club = self.target_club(member_id).await?;
        let actor = self
            .guard
            .authorize_existing(caller, STAFF, target_club)
            .await?;
        forbid_self_action(&actor, member_id)?;

        if let Some(team_id) = assignment.team_id {
            let team = self.teams.find_by_id(team_id).await?;
            if team.map(|t| t.club_id) != Some(actor.club_id) {
                return Err(AppError::Unauthorized);
            }
        }

        let position = assignment
            .position
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        self.memberships
            .assign_team(member_id, assignment.team_id, position)
            .await?;

        tracing::info!(
            member_id = %member_id,
            club_id = %actor.club_id,
            team_id = ?assignment.team_id,
            "Member team assignment changed"
        );
        Ok(())
    }

    pub async fn update_profile(
        &self,
        caller: Option<&Identity>,
        request: UpdateProfileRequest,
    ) -> Result<Membership> {
        let actor = self.guard.authorize(caller, ANY_MEMBER, None).await?;

        let request = UpdateProfileRequest {
            full_name: request.full_name.trim().to_string(),
        };
        request.validate()?;

        self.memberships.update_full_name(actor.id, &request.full_name).await
    }

    pub async fn upload_avatar(
        &self,
        caller: Option<&Identity>,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<Membership> {
        let actor = self.guard.authorize(caller, ANY_MEMBER, None).await?;
        let extension = validate_image(UploadKind::Avatar, bytes.len(), content_type)?;

        let previous = self
            .memberships
            .find_by_id(actor.id)
            .await?
            .and_then(|m| m.avatar_url);

        let key = format!("{}/avatar.{}", actor.id, extension);
        let url = self.store.upload(AVATAR_BUCKET, &key, bytes, content_type).await?;
        let membership = self.memberships.update_avatar(actor.id, &url).await?;

        if let Some(previous) = previous.filter(|p| *p != url) {
            if let Err(e) = self.store.remove(&previous).await {
                tracing::warn!(member_id = %actor.id, error = %e, "Could not delete previous avatar");
            }
        }
        Ok(membership)
    }

    /// The caller's own account. Works without a club so a detached member
    /// can still see who they are.
    pub async fn me(&self, caller: Option<&Identity>) -> Result<CurrentUser> {
        let membership = self.guard.membership(caller).await?;
        let identity = caller.cloned().ok_or(AppError::Unauthenticated)?;

        let club = match membership.club_id {
            Some(club_id) => self.clubs.find_by_id(club_id).await?,
            None => None,
        };

        Ok(CurrentUser {
            dashboard: membership.role.dashboard_path(),
            identity,
            membership,
            club,
        })
    }

    /// Club of the target membership; `None` when it does not exist or has no club.
    async fn target_club(&self, member_id: Uuid) -> Result<Option<Uuid>> {
        Ok(self
            .memberships
            .find_by_id(member_id)
            .await?
            .and_then(|m| m.club_id))
    }
}
