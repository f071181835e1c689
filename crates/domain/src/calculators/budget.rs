//! Feat, talent, ability-increase and skill budgets.
//!
//! Budgets are totals earned to date, recomputed from the full class list
//! every time. Spending is implicit: the held set grows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::entities::SKILL_TRAINING_TAG;
use crate::error::ConfigurationError;
use crate::rules::RuleDataSource;
use crate::value_objects::{
    Ability, AbilityScores, ClassLevels, FeatId, MilestoneGrant, ProgressionConfig,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budgets {
    pub feats: u32,
    pub talents: u32,
    pub ability_increases: u32,
    /// Ability milestones reached; each allows `ability_increases_per_milestone`.
    pub ability_milestones: u32,
    pub skills: u32,
}

/// Slots earned by a class-level list.
///
/// Sources, in order:
/// - the first character level: starting feats plus the species bonus,
///   granted once for the whole history
/// - general milestones (every Nth character level), a feat or a talent
/// - ability milestones, earmarked ability increases
/// - each class table row's own feat and talent grants
///
/// Skills come from the first class (trained skills plus Intelligence
/// modifier, at least one) plus one per held feat tagged `skill_training`.
///
/// # Errors
///
/// A class or held feat missing from the rule data.
pub fn progression_budgets(
    class_levels: &ClassLevels,
    scores: &AbilityScores,
    held_feats: &BTreeSet<FeatId>,
    data: &dyn RuleDataSource,
    config: &ProgressionConfig,
) -> Result<Budgets, ConfigurationError> {
    let mut budgets = Budgets::default();

    for step in class_levels.timeline() {
        let row = data.require_class(&step.class_id)?.row(step.class_level)?;
        budgets.feats += row.feat_grant;
        budgets.talents += row.talent_grant;

        if step.character_level == 1 {
            budgets.feats += config.starting_feat_slots + config.species_bonus_feat_slots;
        }
        if config.is_general_milestone(step.character_level) {
            match config.general_milestone_grant {
                MilestoneGrant::Feat => budgets.feats += 1,
                MilestoneGrant::Talent => budgets.talents += 1,
            }
        }
        if config.is_ability_milestone(step.character_level, step.class_level) {
            budgets.ability_milestones += 1;
            budgets.ability_increases += config.ability_increases_per_milestone;
        }
    }

    if let Some(first) = class_levels.first_class() {
        let class = data.require_class(first)?;
        let from_class = (class.trained_skills as i32 + scores.modifier(Ability::Int)).max(1);
        let mut from_feats = 0;
        for feat_id in held_feats {
            if data.feat_metadata(feat_id)?.has_tag(SKILL_TRAINING_TAG) {
                from_feats += 1;
            }
        }
        budgets.skills = from_class as u32 + from_feats;
    }

    Ok(budgets)
}

/// Fails when any recomputed budget is below its previous value.
pub fn ensure_monotonic(previous: &Budgets, recomputed: &Budgets) -> Result<(), ConfigurationError> {
    let pairs = [
        ("feat", previous.feats, recomputed.feats),
        ("talent", previous.talents, recomputed.talents),
        (
            "ability increase",
            previous.ability_increases,
            recomputed.ability_increases,
        ),
        ("skill", previous.skills, recomputed.skills),
    ];
    for (budget, previous, recomputed) in pairs {
        if recomputed < previous {
            return Err(ConfigurationError::BudgetRegression {
                budget,
                previous,
                recomputed,
            });
        }
    }
    Ok(())
}
