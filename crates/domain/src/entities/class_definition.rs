//! Class definitions and their per-level tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::ConfigurationError;
use crate::value_objects::{ClassId, DefenseSet, FeatId, SkillId, SpecialRuleId, TalentId, TalentTreeId};

/// Force point base most classes supply.
pub const DEFAULT_FORCE_POINT_BASE: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassKind {
    #[default]
    Base,
    /// Gated behind [`PrestigeRequirements`].
    Prestige,
}

/// One row of a class level table.
///
/// `bab` is the cumulative, possibly fractional, attack bonus at this
/// class level. Calculators sum raw rows across classes and floor once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassLevelRow {
    pub bab: f64,
    #[serde(default)]
    pub defense_bonuses: DefenseSet,
    /// Bonus feat slots granted at this class level
    #[serde(default)]
    pub feat_grant: u32,
    /// Talent slots granted at this class level
    #[serde(default)]
    pub talent_grant: u32,
    /// Feats granted outright at this class level
    #[serde(default)]
    pub granted_feats: Vec<FeatId>,
}

impl ClassLevelRow {
    pub fn new(bab: f64, defense_bonuses: DefenseSet) -> Self {
        Self {
            bab,
            defense_bonuses,
            feat_grant: 0,
            talent_grant: 0,
            granted_feats: Vec::new(),
        }
    }
}

/// Gate for taking a level in a prestige class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrestigeRequirements {
    /// Minimum character level, compared per the configured prestige level rule
    pub min_level: u32,
    pub min_bab: i32,
    pub required_feats: Vec<FeatId>,
    pub required_talents: Vec<TalentId>,
    /// Any one talent from each listed tree
    pub required_talent_trees: Vec<TalentTreeId>,
    pub required_skills: Vec<SkillId>,
    /// Named semantic rules, each evaluated by a registered predicate
    pub special: Vec<SpecialRuleId>,
}

/// A class as the rule data defines it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDefinition {
    pub id: ClassId,
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    /// Die used for hit points after the first character level
    pub hit_die: u32,
    /// Hit points when this is the character's first level ever
    pub starting_hit_points: u32,
    /// Skills trained when this is the character's first class
    #[serde(default)]
    pub trained_skills: u32,
    #[serde(default)]
    pub class_skills: BTreeSet<SkillId>,
    #[serde(default)]
    pub talent_trees: BTreeSet<TalentTreeId>,
    /// Feats granted when this class is taken as the first class
    #[serde(default)]
    pub starting_feats: Vec<FeatId>,
    #[serde(default = "default_force_point_base")]
    pub force_point_base: u32,
    /// Levels in this class make a character Force-sensitive
    #[serde(default)]
    pub force_user: bool,
    /// Cumulative per-level table, index 0 is class level 1
    pub levels: Vec<ClassLevelRow>,
    #[serde(default)]
    pub requirements: Option<PrestigeRequirements>,
}

fn default_force_point_base() -> u32 {
    DEFAULT_FORCE_POINT_BASE
}

impl ClassDefinition {
    pub fn new(
        id: ClassId,
        name: impl Into<String>,
        kind: ClassKind,
        hit_die: u32,
        starting_hit_points: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            hit_die,
            starting_hit_points,
            trained_skills: 0,
            class_skills: BTreeSet::new(),
            talent_trees: BTreeSet::new(),
            starting_feats: Vec::new(),
            force_point_base: DEFAULT_FORCE_POINT_BASE,
            force_user: false,
            levels: Vec::new(),
            requirements: None,
        }
    }

    /// Fill `levels` with a linear table: `bab_rate` per level, the same
    /// defense bonuses throughout, a talent at odd levels and a bonus
    /// feat at even levels.
    pub fn with_standard_table(mut self, max_level: u32, bab_rate: f64, defenses: DefenseSet) -> Self {
        self.levels = (1..=max_level)
            .map(|level| {
                let mut row = ClassLevelRow::new(bab_rate * f64::from(level), defenses);
                if level % 2 == 1 {
                    row.talent_grant = 1;
                } else {
                    row.feat_grant = 1;
                }
                row
            })
            .collect();
        self
    }

    /// Grant `feat_id` outright at `class_level`. No-op past the table end.
    pub fn with_granted_feat(mut self, class_level: u32, feat_id: FeatId) -> Self {
        if let Some(row) = class_level
            .checked_sub(1)
            .and_then(|idx| self.levels.get_mut(idx as usize))
        {
            row.granted_feats.push(feat_id);
        }
        self
    }

    pub fn is_prestige(&self) -> bool {
        self.kind == ClassKind::Prestige
    }

    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Table row for a 1-indexed class level.
    ///
    /// # Errors
    ///
    /// `ClassLevelOutOfRange` when the table has no such row.
    pub fn row(&self, class_level: u32) -> Result<&ClassLevelRow, ConfigurationError> {
        class_level
            .checked_sub(1)
            .and_then(|idx| self.levels.get(idx as usize))
            .ok_or_else(|| ConfigurationError::ClassLevelOutOfRange {
                class_id: self.id.clone(),
                level: class_level,
                max: self.max_level(),
            })
    }

    /// Defense bonuses offered at class level 1.
    pub fn first_level_defenses(&self) -> Result<DefenseSet, ConfigurationError> {
        self.row(1).map(|row| row.defense_bonuses)
    }

    /// Structural checks that need no other catalog entries.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.levels.is_empty() {
            return Err(ConfigurationError::EmptyClassTable(self.id.clone()));
        }
        if self.hit_die == 0 {
            return Err(ConfigurationError::Malformed(format!(
                "class {} has a zero hit die",
                self.id
            )));
        }
        let mut previous = 0.0_f64;
        for (idx, row) in self.levels.iter().enumerate() {
            if !row.bab.is_finite() || row.bab < previous {
                return Err(ConfigurationError::Malformed(format!(
                    "class {} BAB table is not non-decreasing at level {}",
                    self.id,
                    idx + 1
                )));
            }
            previous = row.bab;
        }
        match (self.kind, &self.requirements) {
            (ClassKind::Prestige, None) => Err(ConfigurationError::Malformed(format!(
                "prestige class {} has no requirements",
                self.id
            ))),
            (ClassKind::Base, Some(_)) => Err(ConfigurationError::Malformed(format!(
                "base class {} declares prestige requirements",
                self.id
            ))),
            _ => Ok(()),
        }
    }
}
