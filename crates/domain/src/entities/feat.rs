//! Feat metadata and the prerequisite vocabulary shared by feats,
//! talents and Force powers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::value_objects::{
    Ability, ClassId, FeatId, SkillId, SpecialRuleId, TalentId, TalentTreeId,
};

/// Tag on feats that grant Force power slots.
pub const FORCE_TRAINING_TAG: &str = "force_training";

/// Tag on feats that grant an extra trained skill.
pub const SKILL_TRAINING_TAG: &str = "skill_training";

/// A feat a character can select or be granted.
///
/// Simple data struct: any combination of fields is valid on its own;
/// cross-references are checked when a catalog is assembled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatDefinition {
    /// Unique identifier for this feat
    pub id: FeatId,
    /// Display name of the feat
    pub name: String,
    /// Full description of what the feat does
    #[serde(default)]
    pub description: String,
    /// Requirements to take this feat
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
    /// Tags for filtering and for rules keyed on feat families
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl FeatDefinition {
    pub fn new(id: FeatId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            prerequisites: Vec::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_prerequisite(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisites.push(prerequisite);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// A requirement that must hold before something can be taken.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Prerequisite {
    /// Minimum character level (sum of all class levels)
    MinLevel { level: u32 },
    /// Minimum base attack bonus
    MinBab { value: i32 },
    /// Minimum base ability score
    MinAbility { ability: Ability, score: i32 },
    /// Skill must be trained
    TrainedSkill { skill_id: SkillId },
    /// Must hold a feat (selected or granted)
    HasFeat { feat_id: FeatId },
    /// Must hold a talent
    HasTalent { talent_id: TalentId },
    /// Must hold at least `count` talents from a tree
    TalentFromTree { tree_id: TalentTreeId, count: u32 },
    /// Must have levels in a class
    HasClass {
        class_id: ClassId,
        #[serde(default)]
        min_level: Option<u32>,
    },
    /// Named semantic rule evaluated by a registered predicate
    Special { rule_id: SpecialRuleId },
    /// Any one of the listed prerequisites
    AnyOf { options: Vec<Prerequisite> },
    /// All of the listed prerequisites
    AllOf { requirements: Vec<Prerequisite> },
}

impl Prerequisite {
    pub fn min_level(level: u32) -> Self {
        Prerequisite::MinLevel { level }
    }

    pub fn min_bab(value: i32) -> Self {
        Prerequisite::MinBab { value }
    }

    pub fn min_ability(ability: Ability, score: i32) -> Self {
        Prerequisite::MinAbility { ability, score }
    }

    pub fn trained(skill_id: SkillId) -> Self {
        Prerequisite::TrainedSkill { skill_id }
    }

    pub fn has_feat(feat_id: FeatId) -> Self {
        Prerequisite::HasFeat { feat_id }
    }

    pub fn has_talent(talent_id: TalentId) -> Self {
        Prerequisite::HasTalent { talent_id }
    }

    pub fn special(rule_id: SpecialRuleId) -> Self {
        Prerequisite::Special { rule_id }
    }

    /// Every feat id referenced anywhere in this prerequisite tree.
    pub fn referenced_feats(&self) -> Vec<&FeatId> {
        let mut out = Vec::new();
        self.collect_feats(&mut out);
        out
    }

    fn collect_feats<'a>(&'a self, out: &mut Vec<&'a FeatId>) {
        match self {
            Prerequisite::HasFeat { feat_id } => out.push(feat_id),
            Prerequisite::AnyOf { options: nested } | Prerequisite::AllOf { requirements: nested } => {
                for inner in nested {
                    inner.collect_feats(out);
                }
            }
            _ => {}
        }
    }

    /// Every special rule referenced anywhere in this prerequisite tree.
    pub fn referenced_special_rules(&self) -> Vec<&SpecialRuleId> {
        let mut out = Vec::new();
        self.collect_special(&mut out);
        out
    }

    fn collect_special<'a>(&'a self, out: &mut Vec<&'a SpecialRuleId>) {
        match self {
            Prerequisite::Special { rule_id } => out.push(rule_id),
            Prerequisite::AnyOf { options: nested } | Prerequisite::AllOf { requirements: nested } => {
                for inner in nested {
                    inner.collect_special(out);
                }
            }
            _ => {}
        }
    }
}
