use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentIdentity, state::AppState},
    domain::{MemberListing, Role, TeamAssignment},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
) -> Result<Json<Vec<MemberListing>>> {
    let members = state
        .service_context
        .member_service
        .list(current.identity())
        .await?;
    Ok(Json(members))
}

pub async fn update_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
    Json(req): Json<RoleUpdate>,
) -> Result<StatusCode> {
    state
        .service_context
        .member_service
        .update_role(current.identity(), id, req.role)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .member_service
        .remove(current.identity(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_team(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
    Json(req): Json<TeamAssignment>,
) -> Result<StatusCode> {
    state
        .service_context
        .member_service
        .assign_to_team(current.identity(), id, req)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
