use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthService,
    config::AuthConfig,
    domain::*,
    error::{AppError, Result},
    mail::{
        dispatch,
        templates::{magic_link_email, password_reset_email},
        Mailer,
    },
    repository::{ClubRepository, MembershipRepository},
};

/// A freshly opened session and where its owner should land.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub identity: Identity,
    pub membership: Membership,
    pub session_token: String,
    pub redirect_to: &'static str,
}

/// Sign up, sign in (password or emailed link) and password recovery.
pub struct AccountService {
    auth: Arc<AuthService>,
    memberships: Arc<dyn MembershipRepository>,
    clubs: Arc<dyn ClubRepository>,
    mailer: Option<Arc<dyn Mailer>>,
    default_club_id: Option<Uuid>,
    password_reset_minutes: i64,
    magic_link_minutes: i64,
    base_url: String,
}

impl AccountService {
    pub fn new(
        auth: Arc<AuthService>,
        memberships: Arc<dyn MembershipRepository>,
        clubs: Arc<dyn ClubRepository>,
        mailer: Option<Arc<dyn Mailer>>,
        config: &AuthConfig,
        base_url: String,
    ) -> Self {
        Self {
            auth,
            memberships,
            clubs,
            mailer,
            default_club_id: config.default_club_id,
            password_reset_minutes: config.password_reset_minutes,
            magic_link_minutes: config.magic_link_minutes,
            base_url,
        }
    }

    /// Open registration. New accounts join the configured default club as players.
    pub async fn register(&self, request: RegisterRequest) -> Result<SignedIn> {
        let request = RegisterRequest {
            full_name: request.full_name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password: request.password,
        };
        request.validate()?;

        let club_id = self.default_club_id.ok_or_else(|| {
            AppError::Validation("Registration requires an invite".to_string())
        })?;
        if self.clubs.find_by_id(club_id).await?.is_none() {
            tracing::error!(club_id = %club_id, "Configured default club does not exist");
            return Err(AppError::Validation("Registration requires an invite".to_string()));
        }

        let (identity, membership) = self
            .auth
            .sign_up_into_club(
                &request.email,
                &request.password,
                &request.full_name,
                club_id,
                Role::Player,
            )
            .await?;
        let session_token = self.auth.create_session(identity.id).await?;

        tracing::info!(identity_id = %identity.id, club_id = %club_id, "Member registered");

        Ok(SignedIn {
            redirect_to: membership.role.dashboard_path(),
            identity,
            membership,
            session_token,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn> {
        let (identity, session_token) = self
            .auth
            .sign_in(&email.trim().to_lowercase(), password)
            .await?;

        tracing::info!(identity_id = %identity.id, "Signed in");
        self.signed_in(identity, session_token).await
    }

    /// Mails a one-time sign-in link if the account exists. Answers the same
    /// either way.
    pub async fn request_magic_link(&self, email: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        let Some((identity, token)) = self.auth.create_login_link(&email).await? else {
            tracing::debug!("Sign-in link requested for unknown email");
            return Ok(());
        };

        let login_url = self.link("magic-link", &token);
        let mail = magic_link_email(&identity.email, &login_url, self.magic_link_minutes)?;
        dispatch(self.mailer.as_deref(), mail).await;

        tracing::info!(identity_id = %identity.id, "Sign-in link requested");
        Ok(())
    }

    pub async fn consume_magic_link(&self, token: &str) -> Result<SignedIn> {
        let (identity, session_token) = self.auth.sign_in_with_link(token.trim()).await?;

        tracing::info!(identity_id = %identity.id, "Signed in with emailed link");
        self.signed_in(identity, session_token).await
    }

    async fn signed_in(&self, identity: Identity, session_token: String) -> Result<SignedIn> {
        let membership = self
            .memberships
            .find_by_id(identity.id)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        Ok(SignedIn {
            redirect_to: membership.role.dashboard_path(),
            identity,
            membership,
            session_token,
        })
    }

    fn link(&self, path: &str, token: &str) -> String {
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), path, token)
    }

    pub async fn logout(&self, session_token: &str) -> Result<()> {
        self.auth.sign_out(session_token).await
    }

    /// Mails a reset link if the account exists. Answers the same either way.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        let Some((identity, token)) = self.auth.create_password_reset(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let reset_url = self.link("reset-password", &token);
        let mail = password_reset_email(&identity.email, &reset_url, self.password_reset_minutes)?;
        dispatch(self.mailer.as_deref(), mail).await;

        tracing::info!(identity_id = %identity.id, "Password reset requested");
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        if new_password.chars().count() < 8 {
            return Err(AppError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        self.auth.reset_password(token, new_password).await
    }
}
