//! Rule entities - read-only content the progression pipeline queries by key.

mod class_definition;
mod feat;
mod skill;
mod talent;

pub use class_definition::{
    ClassDefinition, ClassKind, ClassLevelRow, PrestigeRequirements, DEFAULT_FORCE_POINT_BASE,
};
pub use feat::{FeatDefinition, Prerequisite, FORCE_TRAINING_TAG, SKILL_TRAINING_TAG};
pub use skill::SkillDefinition;
pub use talent::{ForcePowerDefinition, TalentDefinition};
