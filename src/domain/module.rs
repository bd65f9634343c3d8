use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional feature areas a club can switch on. Gating only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    SkillArena,
    AiTraining,
    Inventory,
    Finance,
    TeamChat,
    Documents,
    MatchAnalysis,
    Medical,
    ParentPortal,
    Sponsoring,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModuleCategory {
    Training,
    Communication,
    Analysis,
    Finance,
    Administration,
    Health,
    Marketing,
    Gamification,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModuleInfo {
    pub id: ModuleId,
    pub name: &'static str,
    pub description: &'static str,
    pub category: ModuleCategory,
    pub is_premium: bool,
}

impl ModuleId {
    pub const ALL: [ModuleId; 10] = [
        ModuleId::SkillArena,
        ModuleId::AiTraining,
        ModuleId::Inventory,
        ModuleId::Finance,
        ModuleId::TeamChat,
        ModuleId::Documents,
        ModuleId::MatchAnalysis,
        ModuleId::Medical,
        ModuleId::ParentPortal,
        ModuleId::Sponsoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleId::SkillArena => "skill_arena",
            ModuleId::AiTraining => "ai_training",
            ModuleId::Inventory => "inventory",
            ModuleId::Finance => "finance",
            ModuleId::TeamChat => "team_chat",
            ModuleId::Documents => "documents",
            ModuleId::MatchAnalysis => "match_analysis",
            ModuleId::Medical => "medical",
            ModuleId::ParentPortal => "parent_portal",
            ModuleId::Sponsoring => "sponsoring",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    pub fn info(&self) -> ModuleInfo {
        let (name, description, category, is_premium) = match self {
            ModuleId::SkillArena => (
                "Skill Arena",
                "XP, levels and achievements for players",
                ModuleCategory::Gamification,
                false,
            ),
            ModuleId::AiTraining => (
                "AI Training Assistant",
                "Generated training plans and exercise library",
                ModuleCategory::Training,
                true,
            ),
            ModuleId::Inventory => (
                "Inventory Manager",
                "Equipment tracking and lending",
                ModuleCategory::Administration,
                false,
            ),
            ModuleId::Finance => (
                "Finance",
                "Budgets, membership fees and invoices",
                ModuleCategory::Finance,
                false,
            ),
            ModuleId::TeamChat => (
                "Team Chat",
                "Group chats, direct messages and file sharing",
                ModuleCategory::Communication,
                false,
            ),
            ModuleId::Documents => (
                "Documents",
                "Contracts, forms and club records",
                ModuleCategory::Administration,
                false,
            ),
            ModuleId::MatchAnalysis => (
                "Match Analysis",
                "Video tagging, statistics and tactics",
                ModuleCategory::Analysis,
                true,
            ),
            ModuleId::Medical => (
                "Medical & Fitness",
                "Injury records, rehab plans and fitness tests",
                ModuleCategory::Health,
                true,
            ),
            ModuleId::ParentPortal => (
                "Parent Portal",
                "Calendar, messages and payments for parents",
                ModuleCategory::Communication,
                false,
            ),
            ModuleId::Sponsoring => (
                "Sponsoring Manager",
                "Sponsor database and contract tracking",
                ModuleCategory::Marketing,
                true,
            ),
        };

        ModuleInfo {
            id: *self,
            name,
            description,
            category,
            is_premium,
        }
    }
}

/// Activation row for one club and one module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClubModule {
    pub module_id: ModuleId,
    pub is_active: bool,
    pub activated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleStatus {
    #[serde(flatten)]
    pub info: ModuleInfo,
    pub is_active: bool,
    pub activated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleToggleRequest {
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_ids_round_trip() {
        for module in ModuleId::ALL {
            assert_eq!(ModuleId::from_str(module.as_str()), Some(module));
            assert_eq!(module.info().id, module);
        }
        assert_eq!(ModuleId::from_str("unknown"), None);
    }
}
