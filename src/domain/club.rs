use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The public face of a club, shown to people who are not members yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClubBranding {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
}

impl From<&Club> for ClubBranding {
    fn from(club: &Club) -> Self {
        Self {
            id: club.id,
            name: club.name.clone(),
            logo_url: club.logo_url.clone(),
            primary_color: club.primary_color.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClubRequest {
    pub name: String,
    pub description: Option<String>,
    pub primary_color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateClubRequest {
    pub club_id: Uuid,
    #[validate(length(min = 1, max = 120, message = "Club name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub primary_color: Option<String>,
}

/// Validate hex color format
pub fn validate_hex_color(color: &str) -> bool {
    if !color.starts_with('#') {
        return false;
    }
    let hex = &color[1..];
    (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}
