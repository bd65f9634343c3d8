use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{
    api::{handlers::auth::{signed_in_response, SessionResponse}, middleware::auth::CurrentIdentity, state::AppState},
    domain::{CreateInviteRequest, PublicInvite, RedeemInviteRequest},
    error::Result,
    service::invite_service::{InviteDetail, IssuedInvite},
};

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
) -> Result<Json<Vec<InviteDetail>>> {
    let invites = state
        .service_context
        .invite_service
        .list(current.identity())
        .await?;
    Ok(Json(invites))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Json(req): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<IssuedInvite>)> {
    let issued = state
        .service_context
        .invite_service
        .create(current.identity(), req)
        .await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<InviteDetail>> {
    let invite = state
        .service_context
        .invite_service
        .get(current.identity(), id)
        .await?;
    Ok(Json(invite))
}

pub async fn resend(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<IssuedInvite>> {
    let issued = state
        .service_context
        .invite_service
        .resend(current.identity(), id)
        .await?;
    Ok(Json(issued))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .invite_service
        .delete(current.identity(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn public_get(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<PublicInvite>> {
    let invite = state
        .service_context
        .invite_service
        .get_by_token(&token)
        .await?;
    Ok(Json(invite))
}

pub async fn accept(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    jar: CookieJar,
    Path(token): Path<String>,
    Json(req): Json<RedeemInviteRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    let redeemed = state
        .service_context
        .invite_service
        .redeem(current.session_token.as_deref(), &token, req)
        .await?;

    let (jar, body) = signed_in_response(
        &state,
        jar,
        &redeemed.session_token,
        redeemed.membership,
        redeemed.redirect_to,
    );
    Ok((StatusCode::CREATED, jar, body))
}
