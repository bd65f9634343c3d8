use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentIdentity, state::AppState},
    domain::{AttendanceRequest, Event, EventRequest},
    error::Result,
    service::event_service::EventDetail,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    upcoming: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Event>>> {
    let events = state
        .service_context
        .event_service
        .list(current.identity(), params.upcoming)
        .await?;
    Ok(Json(events))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetail>> {
    let event = state
        .service_context
        .event_service
        .get(current.identity(), id)
        .await?;
    Ok(Json(event))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Json(req): Json<EventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state
        .service_context
        .event_service
        .create(current.identity(), req)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
    Json(req): Json<EventRequest>,
) -> Result<Json<Event>> {
    let event = state
        .service_context
        .event_service
        .update(current.identity(), id, req)
        .await?;
    Ok(Json(event))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .event_service
        .delete(current.identity(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_attendance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
    Json(req): Json<AttendanceRequest>,
) -> Result<Json<EventDetail>> {
    let event = state
        .service_context
        .event_service
        .update_attendance(current.identity(), id, req)
        .await?;
    Ok(Json(event))
}
