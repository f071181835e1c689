//! Rule-system switches for the progression pipeline.
//!
//! Everything that varies between tabletop rulesets (milestone schedules,
//! hit-point method, how prestige entry is gated) lives here rather than
//! being hard-coded in the calculators. Two switches exist because the
//! source rules are ambiguous and must be chosen per table:
//! `prestige_grants_starting_feats` and `ability_milestone_basis`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// What a general milestone level grants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MilestoneGrant {
    #[default]
    Feat,
    Talent,
}

/// Which level count drives ability-increase milestones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbilityMilestoneBasis {
    /// Every Nth character level, whatever the class.
    #[default]
    CharacterLevel,
    /// Every Nth level within a single class.
    ClassLevel,
}

/// How a prestige class's minimum level is compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrestigeLevelRule {
    /// The prestige level itself may be the required level:
    /// passes when `level + 1 >= min_level`.
    #[default]
    EntryLevel,
    /// The character must already have the required level:
    /// passes when `level >= min_level`.
    PriorLevel,
}

impl PrestigeLevelRule {
    /// Whether a character at `current_level` meets `min_level` for a new prestige level.
    pub fn satisfied(&self, current_level: u32, min_level: u32) -> bool {
        match self {
            Self::EntryLevel => current_level + 1 >= min_level,
            Self::PriorLevel => current_level >= min_level,
        }
    }
}

/// How hit points are gained after the first character level.
///
/// There is no random option: progression must be reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HitPointMethod {
    /// Half the die plus one (d10 -> 6).
    #[default]
    Average,
    /// The full die.
    Maximum,
}

impl HitPointMethod {
    pub fn per_level(&self, hit_die: u32) -> u32 {
        match self {
            Self::Average => hit_die / 2 + 1,
            Self::Maximum => hit_die,
        }
    }
}

/// Progression rule switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressionConfig {
    /// Feat slots granted with the very first character level.
    pub starting_feat_slots: u32,
    /// Species/start-of-life bonus feat slots, granted once per character.
    pub species_bonus_feat_slots: u32,
    /// General milestone every N character levels.
    pub general_milestone_interval: u32,
    /// What a general milestone grants.
    pub general_milestone_grant: MilestoneGrant,
    /// Ability-increase milestone every N levels.
    pub ability_milestone_interval: u32,
    /// Ability increases granted per ability milestone.
    pub ability_increases_per_milestone: u32,
    pub ability_milestone_basis: AbilityMilestoneBasis,
    /// Whether entering a prestige class grants its listed starting feats.
    pub prestige_grants_starting_feats: bool,
    pub prestige_level_rule: PrestigeLevelRule,
    pub hit_point_method: HitPointMethod,
    /// Floor on hit points gained at every level, the first included.
    pub min_hit_points_per_level: u32,
    pub max_character_level: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            starting_feat_slots: 1,
            species_bonus_feat_slots: 1,
            general_milestone_interval: 3,
            general_milestone_grant: MilestoneGrant::Feat,
            ability_milestone_interval: 4,
            ability_increases_per_milestone: 2,
            ability_milestone_basis: AbilityMilestoneBasis::CharacterLevel,
            prestige_grants_starting_feats: false,
            prestige_level_rule: PrestigeLevelRule::EntryLevel,
            hit_point_method: HitPointMethod::Average,
            min_hit_points_per_level: 1,
            max_character_level: 20,
        }
    }
}

impl ProgressionConfig {
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidConfig` for zero intervals or a
    /// zero level cap.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.general_milestone_interval == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "generalMilestoneInterval must be at least 1".into(),
            ));
        }
        if self.ability_milestone_interval == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "abilityMilestoneInterval must be at least 1".into(),
            ));
        }
        if self.max_character_level == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "maxCharacterLevel must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn is_general_milestone(&self, character_level: u32) -> bool {
        character_level > 0 && character_level % self.general_milestone_interval == 0
    }

    /// Whether a level step lands on an ability-increase milestone.
    pub fn is_ability_milestone(&self, character_level: u32, class_level: u32) -> bool {
        let counted = match self.ability_milestone_basis {
            AbilityMilestoneBasis::CharacterLevel => character_level,
            AbilityMilestoneBasis::ClassLevel => class_level,
        };
        counted > 0 && counted % self.ability_milestone_interval == 0
    }
}
