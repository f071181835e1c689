//! The prerequisite checker.
//!
//! One entry point per kind of thing that can be gated. The validator, the
//! preview use case and any advisory layer all call through here; nothing
//! else re-implements a prerequisite rule.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::snapshot::CharacterSnapshot;
use crate::entities::{Prerequisite, PrestigeRequirements};
use crate::error::ConfigurationError;
use crate::rules::{RuleContext, RuleDataSource};
use crate::value_objects::{ClassId, FeatId, ForcePowerId, SkillId, TalentId, TalentTreeId};

/// What is being checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum PrerequisiteTarget {
    Feat(FeatId),
    Talent(TalentId),
    ForcePower(ForcePowerId),
    /// Any class; prestige classes are checked against their gate
    Class(ClassId),
    PrestigeClass(ClassId),
}

impl fmt::Display for PrerequisiteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feat(id) => write!(f, "feat {}", id),
            Self::Talent(id) => write!(f, "talent {}", id),
            Self::ForcePower(id) => write!(f, "Force power {}", id),
            Self::Class(id) => write!(f, "class {}", id),
            Self::PrestigeClass(id) => write!(f, "prestige class {}", id),
        }
    }
}

/// Result of a check: met, or the reasons it is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteCheck {
    pub met: bool,
    pub missing_reasons: Vec<String>,
}

impl PrerequisiteCheck {
    pub fn met() -> Self {
        Self {
            met: true,
            missing_reasons: Vec::new(),
        }
    }

    pub fn missing(reason: impl Into<String>) -> Self {
        Self {
            met: false,
            missing_reasons: vec![reason.into()],
        }
    }

    fn require(&mut self, ok: bool, reason: impl FnOnce() -> String) {
        if !ok {
            self.met = false;
            self.missing_reasons.push(reason());
        }
    }

    fn merge(&mut self, other: PrerequisiteCheck) {
        self.met &= other.met;
        self.missing_reasons.extend(other.missing_reasons);
    }
}

/// Dispatch on the target kind.
///
/// # Errors
///
/// The target or anything it references is missing from the rule data,
/// or a special rule is not registered.
pub fn check_prerequisites(
    target: &PrerequisiteTarget,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
) -> Result<PrerequisiteCheck, ConfigurationError> {
    match target {
        PrerequisiteTarget::Feat(id) => check_feat(id, snapshot, ctx),
        PrerequisiteTarget::Talent(id) => check_talent(id, snapshot, ctx),
        PrerequisiteTarget::ForcePower(id) => check_force_power(id, snapshot, ctx),
        PrerequisiteTarget::Class(id) => check_class(id, snapshot, ctx),
        PrerequisiteTarget::PrestigeClass(id) => check_prestige_class(id, snapshot, ctx),
    }
}

pub fn check_feat(
    feat_id: &FeatId,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
) -> Result<PrerequisiteCheck, ConfigurationError> {
    let feat = ctx.data().feat_metadata(feat_id)?;
    evaluate_all(&feat.prerequisites, snapshot, ctx)
}

/// Talent prerequisites plus tree availability: some class taken must
/// offer the talent's tree.
pub fn check_talent(
    talent_id: &TalentId,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
) -> Result<PrerequisiteCheck, ConfigurationError> {
    let data = ctx.data();
    let talent = data.require_talent(talent_id)?;

    let mut tree_available = false;
    for class_id in snapshot.class_levels().classes_taken() {
        if data.require_class(class_id)?.talent_trees.contains(&talent.tree) {
            tree_available = true;
            break;
        }
    }

    let mut check = evaluate_all(&talent.prerequisites, snapshot, ctx)?;
    check.require(tree_available, || {
        format!(
            "Requires a class offering the {} talent tree",
            talent.tree
        )
    });
    Ok(check)
}

pub fn check_force_power(
    force_power_id: &ForcePowerId,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
) -> Result<PrerequisiteCheck, ConfigurationError> {
    let power = ctx.data().require_force_power(force_power_id)?;
    evaluate_all(&power.prerequisites, snapshot, ctx)
}

/// Base classes are always open; prestige classes go through their gate.
pub fn check_class(
    class_id: &ClassId,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
) -> Result<PrerequisiteCheck, ConfigurationError> {
    match ctx.data().prestige_requirements(class_id)? {
        Some(requirements) => check_requirements(requirements, snapshot, ctx),
        None => Ok(PrerequisiteCheck::met()),
    }
}

/// # Errors
///
/// `Malformed` when the class is not a prestige class.
pub fn check_prestige_class(
    class_id: &ClassId,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
) -> Result<PrerequisiteCheck, ConfigurationError> {
    let requirements = ctx.data().prestige_requirements(class_id)?.ok_or_else(|| {
        ConfigurationError::Malformed(format!("{} is not a prestige class", class_id))
    })?;
    check_requirements(requirements, snapshot, ctx)
}

/// Prestige gate. Level is always the sum of all class levels, compared
/// per the configured prestige level rule.
fn check_requirements(
    requirements: &PrestigeRequirements,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
) -> Result<PrerequisiteCheck, ConfigurationError> {
    let data = ctx.data();
    let mut check = PrerequisiteCheck::met();
    let level = snapshot.level();

    check.require(
        ctx.config()
            .prestige_level_rule
            .satisfied(level, requirements.min_level),
        || {
            format!(
                "Requires character level {} (current {})",
                requirements.min_level, level
            )
        },
    );
    let bab = snapshot.derived().bab;
    check.require(bab >= requirements.min_bab, || {
        format!("Requires BAB +{} (current +{})", requirements.min_bab, bab)
    });
    for feat_id in &requirements.required_feats {
        check.require(snapshot.holds_feat(feat_id), || {
            format!("Requires feat {}", feat_name(data, feat_id))
        });
    }
    for talent_id in &requirements.required_talents {
        check.require(snapshot.holds_talent(talent_id), || {
            format!("Requires talent {}", talent_name(data, talent_id))
        });
    }
    for tree in &requirements.required_talent_trees {
        let have = talents_in_tree(tree, snapshot, data)?;
        check.require(have >= 1, || {
            format!("Requires a talent from the {} tree", tree)
        });
    }
    for skill_id in &requirements.required_skills {
        check.require(snapshot.is_trained(skill_id), || {
            format!("Requires trained skill {}", skill_name(data, skill_id))
        });
    }
    for rule_id in &requirements.special {
        let ok = ctx.special().evaluate(rule_id, snapshot, data)?;
        if !ok {
            check.merge(special_missing(ctx, rule_id));
        }
    }
    Ok(check)
}

fn evaluate_all(
    prerequisites: &[Prerequisite],
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
) -> Result<PrerequisiteCheck, ConfigurationError> {
    let mut check = PrerequisiteCheck::met();
    for prerequisite in prerequisites {
        check.merge(evaluate(prerequisite, snapshot, ctx)?);
    }
    Ok(check)
}

/// Evaluate a single prerequisite against a snapshot.
pub fn evaluate(
    prerequisite: &Prerequisite,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
) -> Result<PrerequisiteCheck, ConfigurationError> {
    let data = ctx.data();
    let check = match prerequisite {
        Prerequisite::MinLevel { level } => {
            if snapshot.level() >= *level {
                PrerequisiteCheck::met()
            } else {
                PrerequisiteCheck::missing(format!(
                    "Requires character level {} (current {})",
                    level,
                    snapshot.level()
                ))
            }
        }
        Prerequisite::MinBab { value } => {
            let bab = snapshot.derived().bab;
            if bab >= *value {
                PrerequisiteCheck::met()
            } else {
                PrerequisiteCheck::missing(format!("Requires BAB +{} (current +{})", value, bab))
            }
        }
        Prerequisite::MinAbility { ability, score } => {
            let current = snapshot.ability_scores().score(*ability);
            if current >= *score {
                PrerequisiteCheck::met()
            } else {
                PrerequisiteCheck::missing(format!(
                    "Requires {} {} (current {})",
                    ability, score, current
                ))
            }
        }
        Prerequisite::TrainedSkill { skill_id } => {
            if snapshot.is_trained(skill_id) {
                PrerequisiteCheck::met()
            } else {
                PrerequisiteCheck::missing(format!(
                    "Requires trained skill {}",
                    skill_name(data, skill_id)
                ))
            }
        }
        Prerequisite::HasFeat { feat_id } => {
            if snapshot.holds_feat(feat_id) {
                PrerequisiteCheck::met()
            } else {
                PrerequisiteCheck::missing(format!("Requires feat {}", feat_name(data, feat_id)))
            }
        }
        Prerequisite::HasTalent { talent_id } => {
            if snapshot.holds_talent(talent_id) {
                PrerequisiteCheck::met()
            } else {
                PrerequisiteCheck::missing(format!(
                    "Requires talent {}",
                    talent_name(data, talent_id)
                ))
            }
        }
        Prerequisite::TalentFromTree { tree_id, count } => {
            let have = talents_in_tree(tree_id, snapshot, data)?;
            if have >= *count {
                PrerequisiteCheck::met()
            } else {
                PrerequisiteCheck::missing(format!(
                    "Requires {} talent(s) from the {} tree (have {})",
                    count, tree_id, have
                ))
            }
        }
        Prerequisite::HasClass {
            class_id,
            min_level,
        } => {
            let have = snapshot.class_levels().levels_in(class_id);
            let need = min_level.unwrap_or(1);
            if have >= need {
                PrerequisiteCheck::met()
            } else {
                let class_name = data
                    .class(class_id)
                    .map_or_else(|| class_id.to_string(), |c| c.name.clone());
                PrerequisiteCheck::missing(format!(
                    "Requires {} level(s) in {} (have {})",
                    need, class_name, have
                ))
            }
        }
        Prerequisite::Special { rule_id } => {
            if ctx.special().evaluate(rule_id, snapshot, data)? {
                PrerequisiteCheck::met()
            } else {
                special_missing(ctx, rule_id)
            }
        }
        Prerequisite::AnyOf { options } => {
            let mut reasons = Vec::new();
            let mut any_met = options.is_empty();
            for option in options {
                let result = evaluate(option, snapshot, ctx)?;
                if result.met {
                    any_met = true;
                    break;
                }
                reasons.extend(result.missing_reasons);
            }
            if any_met {
                PrerequisiteCheck::met()
            } else {
                PrerequisiteCheck::missing(format!("Requires one of: {}", reasons.join("; ")))
            }
        }
        Prerequisite::AllOf { requirements } => evaluate_all(requirements, snapshot, ctx)?,
    };
    Ok(check)
}

fn talents_in_tree(
    tree: &TalentTreeId,
    snapshot: &CharacterSnapshot,
    data: &dyn RuleDataSource,
) -> Result<u32, ConfigurationError> {
    let mut count = 0;
    for talent_id in snapshot.talent_ids() {
        if &data.require_talent(talent_id)?.tree == tree {
            count += 1;
        }
    }
    Ok(count)
}

fn special_missing(ctx: &RuleContext, rule_id: &crate::value_objects::SpecialRuleId) -> PrerequisiteCheck {
    let description = ctx
        .special()
        .get(rule_id)
        .map_or_else(|| rule_id.to_string(), |rule| rule.description().to_string());
    PrerequisiteCheck::missing(format!("Requires {}", description))
}

fn feat_name(data: &dyn RuleDataSource, id: &FeatId) -> String {
    data.feat(id).map_or_else(|| id.to_string(), |f| f.name.clone())
}

fn talent_name(data: &dyn RuleDataSource, id: &TalentId) -> String {
    data.talent(id).map_or_else(|| id.to_string(), |t| t.name.clone())
}

fn skill_name(data: &dyn RuleDataSource, id: &SkillId) -> String {
    data.skill(id).map_or_else(|| id.to_string(), |s| s.name.clone())
}
