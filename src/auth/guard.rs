//! Per-operation authorization.
//!
//! Every guarded operation resolves the caller, loads their membership and
//! decides from scratch. Nothing is cached between calls because role and
//! club can change at any time.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::{Identity, Membership, Role},
    error::{AppError, Result},
    repository::MembershipRepository,
};

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const STAFF: &[Role] = &[Role::Admin, Role::Coach];
pub const ANY_MEMBER: &[Role] = &[Role::Admin, Role::Coach, Role::Player];

/// A caller that passed authorization, bound to their club.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: Uuid,
    pub club_id: Uuid,
    pub role: Role,
}

/// Role and tenant decision for an already loaded membership.
///
/// A membership without a club has nothing it may act on, so it is
/// rejected for every role set.
pub fn check(
    membership: &Membership,
    required_roles: &[Role],
    resource_club_id: Option<Uuid>,
) -> Result<Actor> {
    let club_id = membership.club_id.ok_or(AppError::Unauthorized)?;

    if !required_roles.contains(&membership.role) {
        return Err(AppError::Unauthorized);
    }

    if let Some(resource_club_id) = resource_club_id {
        if resource_club_id != club_id {
            return Err(AppError::Unauthorized);
        }
    }

    Ok(Actor {
        id: membership.id,
        club_id,
        role: membership.role,
    })
}

/// Admin-facing member management may not target the acting member.
pub fn forbid_self_action(actor: &Actor, target_id: Uuid) -> Result<()> {
    if actor.id == target_id {
        return Err(AppError::SelfActionForbidden);
    }
    Ok(())
}

pub struct AuthorizationGuard {
    memberships: Arc<dyn MembershipRepository>,
}

impl AuthorizationGuard {
    pub fn new(memberships: Arc<dyn MembershipRepository>) -> Self {
        Self { memberships }
    }

    /// Loads the caller's membership. An identity without one is treated as
    /// not yet onboarded.
    pub async fn membership(&self, caller: Option<&Identity>) -> Result<Membership> {
        let identity = caller.ok_or(AppError::Unauthenticated)?;
        self.memberships
            .find_by_id(identity.id)
            .await?
            .ok_or(AppError::Unauthenticated)
    }

    pub async fn authorize(
        &self,
        caller: Option<&Identity>,
        required_roles: &[Role],
        resource_club_id: Option<Uuid>,
    ) -> Result<Actor> {
        let membership = self.membership(caller).await?;
        check(&membership, required_roles, resource_club_id)
    }

    /// Like [`authorize`](Self::authorize) for an operation on an existing row.
    /// `None` means the row was not found; the caller is still resolved first
    /// so anonymous requests fail as unauthenticated, and a missing row looks
    /// the same as one in another club.
    pub async fn authorize_existing(
        &self,
        caller: Option<&Identity>,
        required_roles: &[Role],
        resource_club_id: Option<Uuid>,
    ) -> Result<Actor> {
        match resource_club_id {
            Some(club_id) => self.authorize(caller, required_roles, Some(club_id)).await,
            None => {
                self.authorize(caller, required_roles, None).await?;
                Err(AppError::Unauthorized)
            }
        }
    }
}
