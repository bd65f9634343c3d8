use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Role of a member inside their club. Authorization checks match on it
/// exhaustively.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Coach,
    #[default]
    Player,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Coach, Role::Player];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Coach => "coach",
            Role::Player => "player",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "coach" => Some(Role::Coach),
            "player" => Some(Role::Player),
            _ => None,
        }
    }

    /// Human readable label used in emails.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Coach => "Coach",
            Role::Player => "Player",
        }
    }

    /// Dashboard a member of this role lands on after signing in.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Coach => "/coach",
            Role::Player => "/player",
        }
    }
}

/// An authenticated account. Carries no club or role on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// A person's role and club affiliation. Shares its id with the identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Membership {
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub club_id: Option<Uuid>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership as listed on the club's member page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberListing {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub team_id: Option<Uuid>,
    pub team_name: Option<String>,
    pub position: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamAssignment {
    pub team_id: Option<Uuid>,
    pub position: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_str("trainer"), None);
    }

    #[test]
    fn test_role_defaults_to_player() {
        assert_eq!(Role::default(), Role::Player);
    }

    #[test]
    fn test_dashboard_paths() {
        assert_eq!(Role::Admin.dashboard_path(), "/admin");
        assert_eq!(Role::Coach.dashboard_path(), "/coach");
        assert_eq!(Role::Player.dashboard_path(), "/player");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Coach).unwrap(), "\"coach\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
