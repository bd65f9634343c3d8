pub mod account_service;
pub mod club_service;
pub mod event_service;
pub mod invite_service;
pub mod member_service;
pub mod module_service;
pub mod team_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::auth::{AuthService, AuthorizationGuard};
use crate::clock::Clock;
use crate::config::Settings;
use crate::mail::Mailer;
use crate::storage::ObjectStore;
use account_service::AccountService;
use club_service::ClubService;
use event_service::EventService;
use invite_service::InviteService;
use member_service::MemberService;
use module_service::ModuleService;
use team_service::TeamService;

pub struct ServiceContext {
    pub auth_service: Arc<AuthService>,
    pub guard: Arc<AuthorizationGuard>,
    pub account_service: Arc<AccountService>,
    pub invite_service: Arc<InviteService>,
    pub member_service: Arc<MemberService>,
    pub team_service: Arc<TeamService>,
    pub event_service: Arc<EventService>,
    pub club_service: Arc<ClubService>,
    pub module_service: Arc<ModuleService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        db_pool: SqlitePool,
        settings: &Settings,
        clock: Arc<dyn Clock>,
        mailer: Option<Arc<dyn Mailer>>,
        object_store: Arc<dyn ObjectStore>,
    ) -> Self {
        // Repositories
        let membership_repo: Arc<dyn MembershipRepository> =
            Arc::new(SqliteMembershipRepository::new(db_pool.clone()));
        let club_repo: Arc<dyn ClubRepository> = Arc::new(SqliteClubRepository::new(db_pool.clone()));
        let invite_repo: Arc<dyn InviteRepository> = Arc::new(SqliteInviteRepository::new(db_pool.clone()));
        let team_repo: Arc<dyn TeamRepository> = Arc::new(SqliteTeamRepository::new(db_pool.clone()));
        let event_repo: Arc<dyn EventRepository> = Arc::new(SqliteEventRepository::new(db_pool.clone()));
        let module_repo: Arc<dyn ModuleRepository> = Arc::new(SqliteModuleRepository::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(db_pool.clone(), clock.clone(), &settings.auth));
        let guard = Arc::new(AuthorizationGuard::new(membership_repo.clone()));

        let account_service = Arc::new(AccountService::new(
            auth_service.clone(),
            membership_repo.clone(),
            club_repo.clone(),
            mailer.clone(),
            &settings.auth,
            settings.server.base_url.clone(),
        ));
        let invite_service = Arc::new(InviteService::new(
            invite_repo,
            club_repo.clone(),
            guard.clone(),
            auth_service.clone(),
            mailer,
            clock.clone(),
            settings.server.base_url.clone(),
        ));
        let member_service = Arc::new(MemberService::new(
            membership_repo,
            team_repo.clone(),
            club_repo.clone(),
            guard.clone(),
            object_store.clone(),
        ));
        let team_service = Arc::new(TeamService::new(team_repo.clone(), guard.clone()));
        let event_service = Arc::new(EventService::new(
            event_repo,
            team_repo,
            guard.clone(),
            clock.clone(),
        ));
        let club_service = Arc::new(ClubService::new(club_repo, guard.clone(), object_store));
        let module_service = Arc::new(ModuleService::new(module_repo, guard.clone(), clock));

        Self {
            auth_service,
            guard,
            account_service,
            invite_service,
            member_service,
            team_service,
            event_service,
            club_service,
            module_service,
            db_pool,
        }
    }
}
