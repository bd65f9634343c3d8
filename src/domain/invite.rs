use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{ClubBranding, Role};

/// Days an invite token stays valid after issuance or resend.
pub const INVITE_VALIDITY_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invite {
    pub id: Uuid,
    pub club_id: Uuid,
    pub token: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Role,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub resent_at: Option<DateTime<Utc>>,
    pub resend_count: i64,
}

/// Lifecycle of an invite.
///
/// `Pending` → `Expired` happens by the clock alone; `Expired` → `Pending` only
/// through a resend; `Used` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InviteState {
    Pending,
    Expired,
    Used,
}

impl Invite {
    pub fn state_at(&self, now: DateTime<Utc>) -> InviteState {
        if self.used_at.is_some() {
            InviteState::Used
        } else if self.expires_at > now {
            InviteState::Pending
        } else {
            InviteState::Expired
        }
    }

    /// `used_at IS NULL AND expires_at > now`
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == InviteState::Pending
    }
}

pub fn invite_expiry(issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + Duration::days(INVITE_VALIDITY_DAYS)
}

/// `{base_url}/invite/{token}`
pub fn acceptance_url(base_url: &str, token: &str) -> String {
    format!("{}/invite/{}", base_url.trim_end_matches('/'), token)
}

/// Row handed to the repository on creation.
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub club_id: Uuid,
    pub token: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Role,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInviteRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl CreateInviteRequest {
    /// Trims input and turns a blank email into "no email".
    pub fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            email: self
                .email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RedeemInviteRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// What the identity and membership rows get when an invite is redeemed.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub redeemed_at: DateTime<Utc>,
}

/// Invite as shown on the public acceptance page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicInvite {
    pub full_name: String,
    pub email: Option<String>,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
    pub club: ClubBranding,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn invite_issued_at(t0: DateTime<Utc>) -> Invite {
        Invite {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            token: "abc".to_string(),
            full_name: "Max Mustermann".to_string(),
            email: None,
            role: Role::Player,
            created_by: Uuid::new_v4(),
            created_at: t0,
            expires_at: invite_expiry(t0),
            used_at: None,
            resent_at: None,
            resend_count: 0,
        }
    }

    #[test]
    fn test_pending_until_exactly_seven_days() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let invite = invite_issued_at(t0);

        assert_eq!(invite.state_at(t0), InviteState::Pending);
        assert_eq!(
            invite.state_at(t0 + Duration::days(7) - Duration::seconds(1)),
            InviteState::Pending
        );
        assert_eq!(invite.state_at(t0 + Duration::days(7)), InviteState::Expired);
        assert_eq!(invite.state_at(t0 + Duration::days(30)), InviteState::Expired);
    }

    #[test]
    fn test_used_is_terminal() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut invite = invite_issued_at(t0);
        invite.used_at = Some(t0 + Duration::hours(1));

        assert_eq!(invite.state_at(t0 + Duration::hours(2)), InviteState::Used);
        assert_eq!(invite.state_at(t0 + Duration::days(8)), InviteState::Used);
        assert!(!invite.is_redeemable_at(t0 + Duration::hours(2)));
    }

    #[test]
    fn test_acceptance_url() {
        assert_eq!(
            acceptance_url("https://club.example/", "t0k3n"),
            "https://club.example/invite/t0k3n"
        );
        assert_eq!(
            acceptance_url("http://localhost:3000", "t0k3n"),
            "http://localhost:3000/invite/t0k3n"
        );
    }

    #[test]
    fn test_normalized_drops_blank_email() {
        let request = CreateInviteRequest {
            full_name: "  Max Mustermann ".to_string(),
            email: Some("   ".to_string()),
            role: None,
        }
        .normalized();

        assert_eq!(request.full_name, "Max Mustermann");
        assert_eq!(request.email, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_empty_name() {
        let request = CreateInviteRequest {
            full_name: "   ".to_string(),
            email: None,
            role: Some(Role::Coach),
        }
        .normalized();

        assert!(request.validate().is_err());
    }
}
