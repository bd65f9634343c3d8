use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub club_id: Uuid,
    pub team_id: Option<Uuid>,
    pub event_type: EventType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Training,
    Matchday,
    Meeting,
    Social,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Training => "training",
            EventType::Matchday => "matchday",
            EventType::Meeting => "meeting",
            EventType::Social => "social",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "training" => Some(EventType::Training),
            "matchday" => Some(EventType::Matchday),
            "meeting" => Some(EventType::Meeting),
            "social" => Some(EventType::Social),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Confirmed,
    Declined,
    Pending,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Confirmed => "confirmed",
            AttendanceStatus::Declined => "declined",
            AttendanceStatus::Pending => "pending",
            AttendanceStatus::Late => "late",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "confirmed" => Some(AttendanceStatus::Confirmed),
            "declined" => Some(AttendanceStatus::Declined),
            "pending" => Some(AttendanceStatus::Pending),
            "late" => Some(AttendanceStatus::Late),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attendance {
    pub event_id: Uuid,
    pub profile_id: Uuid,
    pub full_name: String,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttendanceSummary {
    pub confirmed: usize,
    pub declined: usize,
    pub pending: usize,
    pub late: usize,
}

impl AttendanceSummary {
    pub fn from_records(records: &[Attendance]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.status {
                AttendanceStatus::Confirmed => summary.confirmed += 1,
                AttendanceStatus::Declined => summary.declined += 1,
                AttendanceStatus::Pending => summary.pending += 1,
                AttendanceStatus::Late => summary.late += 1,
            }
        }
        summary
    }
}

/// Fields a coach sets when creating or editing an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    pub team_id: Option<Uuid>,
    pub event_type: EventType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceRequest {
    pub status: AttendanceStatus,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: AttendanceStatus) -> Attendance {
        Attendance {
            event_id: Uuid::nil(),
            profile_id: Uuid::new_v4(),
            full_name: "Player".to_string(),
            status,
            reason: None,
            responded_at: None,
        }
    }

    #[test]
    fn test_attendance_summary_counts_each_status() {
        let records = vec![
            record(AttendanceStatus::Confirmed),
            record(AttendanceStatus::Confirmed),
            record(AttendanceStatus::Declined),
            record(AttendanceStatus::Pending),
            record(AttendanceStatus::Late),
        ];
        let summary = AttendanceSummary::from_records(&records);
        assert_eq!(
            summary,
            AttendanceSummary { confirmed: 2, declined: 1, pending: 1, late: 1 }
        );
    }

    #[test]
    fn test_event_type_parsing() {
        assert_eq!(EventType::from_str("Matchday"), Some(EventType::Matchday));
        assert_eq!(EventType::from_str("party"), None);
        assert_eq!(AttendanceStatus::from_str("late"), Some(AttendanceStatus::Late));
    }
}
