use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentIdentity, state::AppState},
    domain::{Team, TeamRequest},
    error::Result,
};

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
) -> Result<Json<Vec<Team>>> {
    let teams = state.service_context.team_service.list(current.identity()).await?;
    Ok(Json(teams))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Json(req): Json<TeamRequest>,
) -> Result<(StatusCode, Json<Team>)> {
    let team = state
        .service_context
        .team_service
        .create(current.identity(), req)
        .await?;
    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
    Json(req): Json<TeamRequest>,
) -> Result<Json<Team>> {
    let team = state
        .service_context
        .team_service
        .update(current.identity(), id, req)
        .await?;
    Ok(Json(team))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .team_service
        .delete(current.identity(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
