use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{
        guard::{ADMIN_ONLY, ANY_MEMBER},
        AuthorizationGuard,
    },
    domain::*,
    error::{AppError, Result},
    repository::ClubRepository,
    storage::{validate_image, ObjectStore, UploadKind, CLUB_LOGO_BUCKET},
};

pub struct ClubService {
    clubs: Arc<dyn ClubRepository>,
    guard: Arc<AuthorizationGuard>,
    store: Arc<dyn ObjectStore>,
}

impl ClubService {
    pub fn new(
        clubs: Arc<dyn ClubRepository>,
        guard: Arc<AuthorizationGuard>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self { clubs, guard, store }
    }

    pub async fn get(&self, caller: Option<&Identity>) -> Result<Club> {
        let actor = self.guard.authorize(caller, ANY_MEMBER, None).await?;
        self.clubs
            .find_by_id(actor.club_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Club not found".to_string()))
    }

    pub async fn update_settings(
        &self,
        caller: Option<&Identity>,
        request: UpdateClubRequest,
    ) -> Result<Club> {
        let actor = self
            .guard
            .authorize(caller, ADMIN_ONLY, Some(request.club_id))
            .await?;

        let request = UpdateClubRequest {
            club_id: request.club_id,
            name: request.name.trim().to_string(),
            description: request
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            primary_color: request
                .primary_color
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        };
        request.validate()?;

        if let Some(color) = request.primary_color.as_deref() {
            if !validate_hex_color(color) {
                return Err(AppError::Validation(
                    "Invalid color format. Use #RGB or #RRGGBB".to_string(),
                ));
            }
        }

        let club = self
            .clubs
            .update_settings(
                actor.club_id,
                &request.name,
                request.description.as_deref(),
                request.primary_color.as_deref(),
            )
            .await?;

        tracing::info!(club_id = %club.id, updated_by = %actor.id, "Club settings updated");
        Ok(club)
    }

    pub async fn upload_logo(
        &self,
        caller: Option<&Identity>,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<Club> {
        let actor = self.guard.authorize(caller, ADMIN_ONLY, None).await?;
        let extension = validate_image(UploadKind::ClubLogo, bytes.len(), content_type)?;

        let previous = self
            .clubs
            .find_by_id(actor.club_id)
            .await?
            .and_then(|c| c.logo_url);

        let key = format!("{}/logo.{}", actor.club_id, extension);
        let url = self
            .store
            .upload(CLUB_LOGO_BUCKET, &key, bytes, content_type)
            .await?;
        let club = self.clubs.update_logo(actor.club_id, &url).await?;

        if let Some(previous) = previous.filter(|p| *p != url) {
            if let Err(e) = self.store.remove(&previous).await {
                tracing::warn!(club_id = %actor.club_id, error = %e, "Could not delete previous logo");
            }
        }
        Ok(club)
    }
}
