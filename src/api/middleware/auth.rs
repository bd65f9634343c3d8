use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::SESSION_COOKIE,
    domain::Identity,
};

/// Who is calling, as far as the session cookie tells. Handlers pass the
/// identity on to the services, which decide what it may do.
#[derive(Clone, Debug, Default)]
pub struct CurrentIdentity {
    pub identity: Option<Identity>,
    pub session_token: Option<String>,
}

impl CurrentIdentity {
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

pub async fn resolve_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let mut current = CurrentIdentity::default();

    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        let token = session_cookie.value();
        if !token.is_empty() {
            match state.service_context.auth_service.current_identity(token).await {
                Ok(identity) => current.identity = identity,
                Err(e) => tracing::warn!(error = %e, "Session lookup failed"),
            }
            current.session_token = Some(token.to_string());
        }
    }

    request.extensions_mut().insert(current);
    next.run(request).await
}
