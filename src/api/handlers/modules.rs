use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{middleware::auth::CurrentIdentity, state::AppState},
    domain::{ModuleId, ModuleStatus, ModuleToggleRequest},
    error::{AppError, Result},
};

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
) -> Result<Json<Vec<ModuleStatus>>> {
    let modules = state
        .service_context
        .module_service
        .list(current.identity())
        .await?;
    Ok(Json(modules))
}

pub async fn set_active(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(module_id): Path<String>,
    Json(req): Json<ModuleToggleRequest>,
) -> Result<StatusCode> {
    let module_id = ModuleId::from_str(&module_id)
        .ok_or_else(|| AppError::NotFound(format!("Unknown module: {}", module_id)))?;

    state
        .service_context
        .module_service
        .set_active(current.identity(), module_id, req.active)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
