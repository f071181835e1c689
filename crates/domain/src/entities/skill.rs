//! Skill metadata.

use serde::{Deserialize, Serialize};

use crate::value_objects::{Ability, SkillId};

/// A skill that can be trained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkillDefinition {
    pub id: SkillId,
    pub name: String,
    /// Ability whose modifier the skill adds
    pub ability: Ability,
}

impl SkillDefinition {
    pub fn new(id: SkillId, name: impl Into<String>, ability: Ability) -> Self {
        Self {
            id,
            name: name.into(),
            ability,
        }
    }
}
