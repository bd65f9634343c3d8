use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentIdentity, state::AppState},
    auth::AuthService,
    domain::{Membership, RegisterRequest},
    error::Result,
    service::account_service::SignedIn,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub membership: Membership,
    pub redirect_to: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct MagicLinkRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct MagicLinkConfirmRequest {
    pub token: String,
}

/// Sets the session cookie for a fresh sign-in.
pub(crate) fn signed_in_response(
    state: &AppState,
    jar: CookieJar,
    session_token: &str,
    membership: Membership,
    redirect_to: &'static str,
) -> (CookieJar, Json<SessionResponse>) {
    let cookie = state
        .service_context
        .auth_service
        .create_session_cookie(session_token, state.settings.auth.secure_cookies);

    (
        jar.add(cookie),
        Json(SessionResponse {
            membership,
            redirect_to,
        }),
    )
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    let SignedIn {
        membership,
        session_token,
        redirect_to,
        ..
    } = state.service_context.account_service.register(req).await?;

    let (jar, body) = signed_in_response(&state, jar, &session_token, membership, redirect_to);
    Ok((StatusCode::CREATED, jar, body))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let SignedIn {
        membership,
        session_token,
        redirect_to,
        ..
    } = state
        .service_context
        .account_service
        .login(&req.email, &req.password)
        .await?;

    Ok(signed_in_response(&state, jar, &session_token, membership, redirect_to))
}

/// Always 202, whether or not the address has an account.
pub async fn request_magic_link(
    State(state): State<AppState>,
    Json(req): Json<MagicLinkRequest>,
) -> Result<StatusCode> {
    state
        .service_context
        .account_service
        .request_magic_link(&req.email)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn confirm_magic_link(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<MagicLinkConfirmRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let SignedIn {
        membership,
        session_token,
        redirect_to,
        ..
    } = state
        .service_context
        .account_service
        .consume_magic_link(&req.token)
        .await?;

    Ok(signed_in_response(&state, jar, &session_token, membership, redirect_to))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(token) = current.session_token.as_deref() {
        state.service_context.account_service.logout(token).await?;
    }

    let jar = jar.add(AuthService::create_logout_cookie());
    Ok((jar, StatusCode::NO_CONTENT))
}

/// Always 202, whether or not the address has an account.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> Result<StatusCode> {
    state
        .service_context
        .account_service
        .request_password_reset(&req.email)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<PasswordResetConfirmRequest>,
) -> Result<(CookieJar, StatusCode)> {
    state
        .service_context
        .account_service
        .reset_password(&req.token, &req.password)
        .await?;

    let jar = jar.add(AuthService::create_logout_cookie());
    Ok((jar, StatusCode::NO_CONTENT))
}
