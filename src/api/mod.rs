pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    Router,
    routing::{get, post, put},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
    storage::MAX_UPLOAD_SIZE,
};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let storage_dir = settings.storage.root_dir.clone();
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // Auth routes
        .nest("/auth", auth_routes())

        // Invite acceptance (no session required)
        .nest("/public", public_routes())
        .route("/invite/:token", get(handlers::invites::public_get))

        // API routes
        .nest("/api", api_routes())

        // Uploaded files
        .nest_service("/storage", ServeDir::new(storage_dir))

        // Every request carries the caller's identity, if any
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::resolve_session,
        ))

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/magic-link", post(handlers::auth::request_magic_link))
        .route("/magic-link/confirm", post(handlers::auth::confirm_magic_link))
        .route("/password-reset", post(handlers::auth::request_password_reset))
        .route("/password-reset/confirm", post(handlers::auth::confirm_password_reset))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/invites/:token", get(handlers::invites::public_get))
        .route("/invites/:token/accept", post(handlers::invites::accept))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/invites", invite_routes())
        .nest("/me", profile_routes())
        .nest("/members", member_routes())
        .nest("/teams", team_routes())
        .nest("/events", event_routes())
        .nest("/club", club_routes())
        .nest("/modules", module_routes())
}

fn invite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::invites::list).post(handlers::invites::create))
        .route("/:id", get(handlers::invites::get).delete(handlers::invites::delete))
        .route("/:id/resend", post(handlers::invites::resend))
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::profile::me).put(handlers::profile::update))
        .route("/avatar", post(handlers::profile::upload_avatar))
        .layer(upload_limit())
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::members::list))
        .route("/:id", axum::routing::delete(handlers::members::remove))
        .route("/:id/role", put(handlers::members::update_role))
        .route("/:id/team", put(handlers::members::assign_team))
}

fn team_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::teams::list).post(handlers::teams::create))
        .route("/:id", put(handlers::teams::update).delete(handlers::teams::delete))
}

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::events::list).post(handlers::events::create))
        .route(
            "/:id",
            get(handlers::events::get)
                .put(handlers::events::update)
                .delete(handlers::events::delete),
        )
        .route("/:id/attendance", put(handlers::events::update_attendance))
}

fn club_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::club::get).put(handlers::club::update))
        .route("/logo", post(handlers::club::upload_logo))
        .layer(upload_limit())
}

fn module_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::modules::list))
        .route("/:module_id", put(handlers::modules::set_active))
}

/// Room for a full-size image plus multipart framing.
fn upload_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024)
}
