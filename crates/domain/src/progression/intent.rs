//! Progression intents: one discrete player decision each.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{Ability, ClassId, FeatId, ForcePowerId, SkillId, TalentId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressionIntent {
    #[serde(rename_all = "camelCase")]
    AddClassLevel { class_id: ClassId },
    #[serde(rename_all = "camelCase")]
    SelectFeat { feat_id: FeatId },
    #[serde(rename_all = "camelCase")]
    SelectTalent { talent_id: TalentId },
    #[serde(rename_all = "camelCase")]
    IncreaseAbility { ability: Ability },
    #[serde(rename_all = "camelCase")]
    TrainSkill { skill_id: SkillId },
    #[serde(rename_all = "camelCase")]
    SelectForcePower { force_power_id: ForcePowerId },
}

impl ProgressionIntent {
    pub fn add_class_level(class_id: ClassId) -> Self {
        Self::AddClassLevel { class_id }
    }

    pub fn select_feat(feat_id: FeatId) -> Self {
        Self::SelectFeat { feat_id }
    }

    pub fn select_talent(talent_id: TalentId) -> Self {
        Self::SelectTalent { talent_id }
    }

    pub fn increase_ability(ability: Ability) -> Self {
        Self::IncreaseAbility { ability }
    }

    pub fn train_skill(skill_id: SkillId) -> Self {
        Self::TrainSkill { skill_id }
    }

    pub fn select_force_power(force_power_id: ForcePowerId) -> Self {
        Self::SelectForcePower { force_power_id }
    }

    /// Stable name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddClassLevel { .. } => "addClassLevel",
            Self::SelectFeat { .. } => "selectFeat",
            Self::SelectTalent { .. } => "selectTalent",
            Self::IncreaseAbility { .. } => "increaseAbility",
            Self::TrainSkill { .. } => "trainSkill",
            Self::SelectForcePower { .. } => "selectForcePower",
        }
    }
}

impl fmt::Display for ProgressionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddClassLevel { class_id } => write!(f, "add a level of {}", class_id),
            Self::SelectFeat { feat_id } => write!(f, "select feat {}", feat_id),
            Self::SelectTalent { talent_id } => write!(f, "select talent {}", talent_id),
            Self::IncreaseAbility { ability } => write!(f, "increase {}", ability),
            Self::TrainSkill { skill_id } => write!(f, "train {}", skill_id),
            Self::SelectForcePower { force_power_id } => {
                write!(f, "select Force power {}", force_power_id)
            }
        }
    }
}
