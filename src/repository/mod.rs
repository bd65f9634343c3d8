use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;
use crate::domain::*;
use crate::error::{AppError, Result};

pub mod membership_repository;
pub mod club_repository;
pub mod invite_repository;
pub mod team_repository;
pub mod event_repository;
pub mod module_repository;

pub use membership_repository::SqliteMembershipRepository;
pub use club_repository::SqliteClubRepository;
pub use invite_repository::SqliteInviteRepository;
pub use team_repository::SqliteTeamRepository;
pub use event_repository::SqliteEventRepository;
pub use module_repository::SqliteModuleRepository;

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Membership>>;
    async fn list_by_club(&self, club_id: Uuid) -> Result<Vec<MemberListing>>;
    async fn join_club(&self, id: Uuid, club_id: Uuid, role: Role) -> Result<Membership>;
    async fn update_role(&self, id: Uuid, club_id: Uuid, role: Role) -> Result<()>;
    /// Detaches the member from the club: club cleared, role reset, team link dropped.
    async fn remove_from_club(&self, id: Uuid, club_id: Uuid) -> Result<()>;
    /// Clears any team link, then links `team_id` if given. One transaction.
    async fn assign_team(&self, id: Uuid, team_id: Option<Uuid>, position: Option<String>) -> Result<()>;
    async fn update_full_name(&self, id: Uuid, full_name: &str) -> Result<Membership>;
    async fn update_avatar(&self, id: Uuid, avatar_url: &str) -> Result<Membership>;
}

#[async_trait]
pub trait ClubRepository: Send + Sync {
    async fn create(&self, request: CreateClubRequest) -> Result<Club>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Club>>;
    async fn update_settings(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
        primary_color: Option<&str>,
    ) -> Result<Club>;
    async fn update_logo(&self, id: Uuid, logo_url: &str) -> Result<Club>;
}

#[async_trait]
pub trait InviteRepository: Send + Sync {
    async fn create(&self, invite: NewInvite) -> Result<Invite>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invite>>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Invite>>;
    async fn list_by_club(&self, club_id: Uuid) -> Result<Vec<Invite>>;
    /// Swaps in a new token and expiry. Returns `None` when the invite is
    /// missing, in another club, or already used.
    async fn rotate_token(
        &self,
        id: Uuid,
        club_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        resent_at: DateTime<Utc>,
    ) -> Result<Option<Invite>>;
    async fn delete(&self, id: Uuid, club_id: Uuid) -> Result<bool>;
    /// Claims the invite and creates the identity and membership it grants,
    /// all in one transaction. Fails with `InvalidOrExpiredInvite` when the
    /// token is not redeemable at `redemption.redeemed_at`.
    async fn redeem(&self, token: &str, redemption: Redemption) -> Result<(Identity, Membership, Invite)>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn create(&self, club_id: Uuid, request: TeamRequest) -> Result<Team>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>>;
    async fn list_by_club(&self, club_id: Uuid) -> Result<Vec<Team>>;
    async fn update(&self, id: Uuid, request: TeamRequest) -> Result<Team>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Inserts the event plus a pending attendance row for each player it concerns.
    async fn create(&self, event: Event) -> Result<Event>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>>;
    async fn list_by_club(&self, club_id: Uuid, starting_after: Option<DateTime<Utc>>) -> Result<Vec<Event>>;
    async fn update(&self, event: Event) -> Result<Event>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn list_attendance(&self, event_id: Uuid) -> Result<Vec<Attendance>>;
    async fn upsert_attendance(
        &self,
        event_id: Uuid,
        profile_id: Uuid,
        status: AttendanceStatus,
        reason: Option<String>,
        responded_at: DateTime<Utc>,
    ) -> Result<()>;
}

#[async_trait]
pub trait ModuleRepository: Send + Sync {
    async fn list_for_club(&self, club_id: Uuid) -> Result<Vec<ClubModule>>;
    async fn activate(&self, club_id: Uuid, module_id: ModuleId, activated_at: DateTime<Utc>) -> Result<()>;
    async fn deactivate(&self, club_id: Uuid, module_id: ModuleId) -> Result<()>;
    async fn is_active(&self, club_id: Uuid, module_id: ModuleId) -> Result<bool>;
}

pub(crate) fn parse_id(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
}

pub(crate) fn parse_opt_id(s: Option<&str>) -> Result<Option<Uuid>> {
    s.map(parse_id).transpose()
}

pub(crate) fn utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(dt, Utc)
}

pub(crate) fn parse_role(s: &str) -> Result<Role> {
    Role::from_str(s).ok_or_else(|| AppError::Database(format!("Invalid role: {}", s)))
}
