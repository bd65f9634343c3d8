use axum::{
    extract::{Extension, Multipart, State},
    Json,
};

use crate::{
    api::{handlers::read_upload, middleware::auth::CurrentIdentity, state::AppState},
    domain::{Club, UpdateClubRequest},
    error::Result,
};

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
) -> Result<Json<Club>> {
    let club = state.service_context.club_service.get(current.identity()).await?;
    Ok(Json(club))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Json(req): Json<UpdateClubRequest>,
) -> Result<Json<Club>> {
    let club = state
        .service_context
        .club_service
        .update_settings(current.identity(), req)
        .await?;
    Ok(Json(club))
}

pub async fn upload_logo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    multipart: Multipart,
) -> Result<Json<Club>> {
    let (bytes, content_type) = read_upload(multipart).await?;
    let club = state
        .service_context
        .club_service
        .upload_logo(current.identity(), &bytes, &content_type)
        .await?;
    Ok(Json(club))
}
