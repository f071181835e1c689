//! Value objects - immutable, validated-by-construction domain values.

mod ability;
mod ability_increases;
mod class_level;
mod defense;
mod keys;
mod names;
mod progression_config;

pub use ability::{
    ability_modifier, Ability, AbilityScores, ActorKind, MAX_ABILITY_SCORE, MIN_ABILITY_SCORE,
};
pub use ability_increases::AbilityIncreaseLog;
pub use class_level::{ClassLevel, ClassLevels, LevelStep};
pub use defense::{Defense, DefenseSet};
pub use keys::{ClassId, FeatId, ForcePowerId, SkillId, SpecialRuleId, TalentId, TalentTreeId};
pub use names::CharacterName;
pub use progression_config::{
    AbilityMilestoneBasis, HitPointMethod, MilestoneGrant, PrestigeLevelRule, ProgressionConfig,
};
