//! Invite lifecycle: issue, look up, redeem, resend and delete.
//!
//! An invite is `Pending` while unused and unexpired, `Expired` once its
//! seven days have passed, and `Used` for good after redemption. Only a
//! resend brings an expired invite back, and it does so with a fresh token.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{generate_token, guard::{ADMIN_ONLY, STAFF}, AuthService, AuthorizationGuard},
    clock::Clock,
    domain::*,
    error::{AppError, Result},
    mail::{dispatch, templates::InviteEmail, Mailer, NotificationOutcome},
    repository::{ClubRepository, InviteRepository},
};

/// A created or resent invite, plus what happened to its email.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedInvite {
    pub invite: Invite,
    pub acceptance_url: String,
    pub notification: NotificationOutcome,
}

/// Staff view of an invite. Unlike the public lookup it tells the states apart.
#[derive(Debug, Clone, Serialize)]
pub struct InviteDetail {
    #[serde(flatten)]
    pub invite: Invite,
    pub state: InviteState,
    pub acceptance_url: String,
}

#[derive(Debug, Clone)]
pub struct RedeemedInvite {
    pub identity: Identity,
    pub membership: Membership,
    pub session_token: String,
    pub redirect_to: &'static str,
}

pub struct InviteService {
    invites: Arc<dyn InviteRepository>,
    clubs: Arc<dyn ClubRepository>,
    guard: Arc<AuthorizationGuard>,
    auth: Arc<AuthService>,
    mailer: Option<Arc<dyn Mailer>>,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl InviteService {
    pub fn new(
        invites: Arc<dyn InviteRepository>,
        clubs: Arc<dyn ClubRepository>,
        guard: Arc<AuthorizationGuard>,
        auth: Arc<AuthService>,
        mailer: Option<Arc<dyn Mailer>>,
        clock: Arc<dyn Clock>,
        base_url: String,
    ) -> Self {
        Self {
            invites,
            clubs,
            guard,
            auth,
            mailer,
            clock,
            base_url,
        }
    }

    pub async fn create(
        &self,
        caller: Option<&Identity>,
        request: CreateInviteRequest,
    ) -> Result<IssuedInvite> {
        let actor = self.guard.authorize(caller, STAFF, None).await?;

        let request = request.normalized();
        request.validate()?;

        let now = self.clock.now();
        let invite = self
            .invites
            .create(NewInvite {
                club_id: actor.club_id,
                token: generate_token(),
                full_name: request.full_name,
                email: request.email,
                role: request.role.unwrap_or_default(),
                created_by: actor.id,
                created_at: now,
                expires_at: invite_expiry(now),
            })
            .await?;

        tracing::info!(
            invite_id = %invite.id,
            club_id = %invite.club_id,
            role = invite.role.as_str(),
            created_by = %actor.id,
            "Invite created"
        );

        Ok(self.issued(invite).await)
    }

    /// Anonymous lookup. Unknown, used and expired tokens all fail the same way.
    pub async fn get_by_token(&self, token: &str) -> Result<PublicInvite> {
        let invite = self
            .invites
            .find_by_token(token)
            .await?
            .filter(|invite| invite.is_redeemable_at(self.clock.now()))
            .ok_or(AppError::NotFoundOrExpired)?;

        let club = self
            .clubs
            .find_by_id(invite.club_id)
            .await?
            .ok_or(AppError::NotFoundOrExpired)?;

        Ok(PublicInvite {
            full_name: invite.full_name,
            email: invite.email,
            role: invite.role,
            expires_at: invite.expires_at,
            club: ClubBranding::from(&club),
        })
    }

    pub async fn get(&self, caller: Option<&Identity>, invite_id: Uuid) -> Result<InviteDetail> {
        let invite = self.invites.find_by_id(invite_id).await?;
        self.guard
            .authorize_existing(caller, STAFF, invite.as_ref().map(|i| i.club_id))
            .await?;

        let invite = invite.ok_or(AppError::Unauthorized)?;
        Ok(self.detail(invite))
    }

    pub async fn list(&self, caller: Option<&Identity>) -> Result<Vec<InviteDetail>> {
        let actor = self.guard.authorize(caller, STAFF, None).await?;
        let invites = self.invites.list_by_club(actor.club_id).await?;
        Ok(invites.into_iter().map(|invite| self.detail(invite)).collect())
    }

    /// Creates the account the invite offers and signs the caller in as it.
    ///
    /// Any session the caller already holds is ended first so it never ends
    /// up attached to the new identity. The validity check is repeated inside
    /// the redeeming transaction, so a token that expired or was consumed
    /// after the form was shown is rejected here.
    pub async fn redeem(
        &self,
        current_session: Option<&str>,
        token: &str,
        request: RedeemInviteRequest,
    ) -> Result<RedeemedInvite> {
        if let Some(session_token) = current_session {
            self.auth.sign_out(session_token).await?;
        }

        let request = RedeemInviteRequest {
            full_name: request.full_name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password: request.password,
        };
        request.validate()?;

        let password_hash = AuthService::hash_password(&request.password).await?;
        let redemption = Redemption {
            full_name: request.full_name,
            email: request.email,
            password_hash,
            redeemed_at: self.clock.now(),
        };

        let (identity, membership, invite) = self.invites.redeem(token, redemption).await?;
        let session_token = self.auth.create_session(identity.id).await?;

        tracing::info!(
            invite_id = %invite.id,
            club_id = %invite.club_id,
            role = invite.role.as_str(),
            identity_id = %identity.id,
            "Invite redeemed"
        );

        Ok(RedeemedInvite {
            redirect_to: membership.role.dashboard_path(),
            identity,
            membership,
            session_token,
        })
    }

    /// Issues a new token valid for another seven days. Role, club, name and
    /// email stay as they were.
    pub async fn resend(&self, caller: Option<&Identity>, invite_id: Uuid) -> Result<IssuedInvite> {
        let invite = self.invites.find_by_id(invite_id).await?;
        let actor = self
            .guard
            .authorize_existing(caller, STAFF, invite.as_ref().map(|i| i.club_id))
            .await?;

        let invite = invite.ok_or(AppError::Unauthorized)?;
        if invite.used_at.is_some() {
            return Err(AppError::AlreadyUsed);
        }

        let now = self.clock.now();
        let rotated = self
            .invites
            .rotate_token(invite.id, actor.club_id, &generate_token(), invite_expiry(now), now)
            .await?;

        let invite = match rotated {
            Some(invite) => invite,
            // Redeemed or deleted since we read it.
            None => {
                return match self.invites.find_by_id(invite_id).await? {
                    Some(_) => Err(AppError::AlreadyUsed),
                    None => Err(AppError::Unauthorized),
                };
            }
        };

        tracing::info!(
            invite_id = %invite.id,
            club_id = %invite.club_id,
            resend_count = invite.resend_count,
            "Invite resent"
        );

        Ok(self.issued(invite).await)
    }

    /// Admin only. Works in any state.
    pub async fn delete(&self, caller: Option<&Identity>, invite_id: Uuid) -> Result<()> {
        let invite = self.invites.find_by_id(invite_id).await?;
        let actor = self
            .guard
            .authorize_existing(caller, ADMIN_ONLY, invite.as_ref().map(|i| i.club_id))
            .await?;

        if !self.invites.delete(invite_id, actor.club_id).await? {
            return Err(AppError::Unauthorized);
        }

        tracing::info!(invite_id = %invite_id, club_id = %actor.club_id, "Invite deleted");
        Ok(())
    }

    async fn issued(&self, invite: Invite) -> IssuedInvite {
        let acceptance_url = acceptance_url(&self.base_url, &invite.token);
        let notification = self.notify(&invite, &acceptance_url).await;
        IssuedInvite {
            invite,
            acceptance_url,
            notification,
        }
    }

    async fn notify(&self, invite: &Invite, acceptance_url: &str) -> NotificationOutcome {
        let Some(email) = invite.email.as_deref() else {
            return NotificationOutcome::NotRequested;
        };

        let club_name = match self.clubs.find_by_id(invite.club_id).await {
            Ok(Some(club)) => club.name,
            Ok(None) => String::from("your club"),
            Err(e) => {
                tracing::warn!(invite_id = %invite.id, error = %e, "Could not load club for invite email");
                String::from("your club")
            }
        };

        let mail = InviteEmail {
            to: email,
            full_name: &invite.full_name,
            club_name: &club_name,
            role: invite.role,
            acceptance_url,
        }
        .render();
        let mail = match mail {
            Ok(mail) => mail,
            Err(e) => {
                tracing::warn!(invite_id = %invite.id, error = %e, "Could not render invite email");
                return NotificationOutcome::Failed { reason: e.to_string() };
            }
        };

        let outcome = dispatch(self.mailer.as_deref(), mail).await;
        if outcome.warning().is_some() {
            tracing::warn!(invite_id = %invite.id, "Invite stored but its email was not delivered");
        }
        outcome
    }

    fn detail(&self, invite: Invite) -> InviteDetail {
        InviteDetail {
            state: invite.state_at(self.clock.now()),
            acceptance_url: acceptance_url(&self.base_url, &invite.token),
            invite,
        }
    }
}
