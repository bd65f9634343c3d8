use axum::{
    extract::{Extension, Multipart, State},
    Json,
};

use crate::{
    api::{handlers::read_upload, middleware::auth::CurrentIdentity, state::AppState},
    domain::{Membership, UpdateProfileRequest},
    error::Result,
    service::member_service::CurrentUser,
};

pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
) -> Result<Json<CurrentUser>> {
    let user = state
        .service_context
        .member_service
        .me(current.identity())
        .await?;
    Ok(Json(user))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Membership>> {
    let membership = state
        .service_context
        .member_service
        .update_profile(current.identity(), req)
        .await?;
    Ok(Json(membership))
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    multipart: Multipart,
) -> Result<Json<Membership>> {
    let (bytes, content_type) = read_upload(multipart).await?;
    let membership = state
        .service_context
        .member_service
        .upload_avatar(current.identity(), &bytes, &content_type)
        .await?;
    Ok(Json(membership))
}
