use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    auth::{
        guard::{ADMIN_ONLY, ANY_MEMBER},
        AuthorizationGuard,
    },
    clock::Clock,
    domain::*,
    error::{AppError, Result},
    repository::ModuleRepository,
};

/// Marketplace of optional feature areas. Only gates access; the modules
/// themselves have no behaviour here.
pub struct ModuleService {
    modules: Arc<dyn ModuleRepository>,
    guard: Arc<AuthorizationGuard>,
    clock: Arc<dyn Clock>,
}

impl ModuleService {
    pub fn new(
        modules: Arc<dyn ModuleRepository>,
        guard: Arc<AuthorizationGuard>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            modules,
            guard,
            clock,
        }
    }

    /// The whole catalog with the caller's club activation state.
    pub async fn list(&self, caller: Option<&Identity>) -> Result<Vec<ModuleStatus>> {
        let actor = self.guard.authorize(caller, ANY_MEMBER, None).await?;

        let activations: HashMap<ModuleId, ClubModule> = self
            .modules
            .list_for_club(actor.club_id)
            .await?
            .into_iter()
            .map(|m| (m.module_id, m))
            .collect();

        Ok(ModuleId::ALL
            .iter()
            .map(|id| {
                let activation = activations.get(id);
                ModuleStatus {
                    info: id.info(),
                    is_active: activation.map(|a| a.is_active).unwrap_or(false),
                    activated_at: activation.and_then(|a| a.activated_at),
                }
            })
            .collect())
    }

    pub async fn set_active(
        &self,
        caller: Option<&Identity>,
        module_id: ModuleId,
        active: bool,
    ) -> Result<()> {
        let actor = self.guard.authorize(caller, ADMIN_ONLY, None).await?;

        if active {
            self.modules
                .activate(actor.club_id, module_id, self.clock.now())
                .await?;
        } else {
            self.modules.deactivate(actor.club_id, module_id).await?;
        }

        tracing::info!(
            club_id = %actor.club_id,
            module = module_id.as_str(),
            active,
            "Module toggled"
        );
        Ok(())
    }

    pub async fn require_module(&self, club_id: Uuid, module_id: ModuleId) -> Result<()> {
        if self.modules.is_active(club_id, module_id).await? {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }
}
