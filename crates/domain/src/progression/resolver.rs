//! Intent resolution: turn a validated intent into a delta.
//!
//! The resolver projects the next authoritative state (class levels,
//! scores, held feats), recomputes every derived value from scratch and
//! writes only the fields that differ from the snapshot.

use std::collections::{BTreeMap, BTreeSet};

use super::delta::{ComputedMirror, FieldPath, FieldValue, ProgressionDelta};
use super::intent::ProgressionIntent;
use super::snapshot::CharacterSnapshot;
use crate::calculators::{derive_stats, ensure_monotonic, StatInputs};
use crate::entities::ClassDefinition;
use crate::error::ConfigurationError;
use crate::rules::RuleContext;
use crate::value_objects::{Defense, FeatId, ProgressionConfig};

/// Resolve `intent` against `snapshot`.
///
/// Assumes `validate` returned ok. Calling it twice on the same inputs
/// yields equal deltas.
///
/// # Errors
///
/// - rule data missing for anything touched
/// - a budget would shrink
/// - `UnvalidatedIntent` when the intent cannot be expressed at all
pub fn resolve(
    snapshot: &CharacterSnapshot,
    intent: &ProgressionIntent,
    ctx: &RuleContext,
) -> Result<ProgressionDelta, ConfigurationError> {
    let data = ctx.data();
    let mut delta = ProgressionDelta::new(snapshot.character_id(), snapshot.revision(), intent.clone());
    let mut class_levels = snapshot.class_levels().clone();
    let mut scores = *snapshot.ability_scores();
    let mut held = snapshot.held_feats();

    match intent {
        ProgressionIntent::AddClassLevel { class_id } => {
            let class = data.require_class(class_id)?;
            let next = class_levels.with_level_added(class_id);
            let class_level = next.levels_in(class_id);
            let row = class.row(class_level)?;

            let mut granted: BTreeSet<FeatId> = row.granted_feats.iter().cloned().collect();
            if receives_starting_feats(snapshot, class, class_level, ctx.config()) {
                granted.extend(class.starting_feats.iter().cloned());
            }
            granted.retain(|feat| !held.contains(feat));
            for feat in &granted {
                data.require_feat(feat)?;
            }
            held.extend(granted.iter().cloned());
            delta.add.granted_feats = granted;

            delta
                .set
                .insert(FieldPath::ClassLevels, FieldValue::ClassLevels(next.clone()));
            class_levels = next;
        }
        ProgressionIntent::SelectFeat { feat_id } => {
            data.require_feat(feat_id)?;
            held.insert(feat_id.clone());
            delta.add.feats.insert(feat_id.clone());
        }
        ProgressionIntent::SelectTalent { talent_id } => {
            data.require_talent(talent_id)?;
            delta.add.talents.insert(talent_id.clone());
        }
        ProgressionIntent::SelectForcePower { force_power_id } => {
            data.require_force_power(force_power_id)?;
            delta.add.force_powers.insert(force_power_id.clone());
        }
        ProgressionIntent::TrainSkill { skill_id } => {
            data.require_skill(skill_id)?;
            delta.add.trained_skills.insert(skill_id.clone());
        }
        ProgressionIntent::IncreaseAbility { ability } => {
            let milestone = snapshot
                .ability_increases()
                .open_milestone_for(
                    *ability,
                    snapshot.budgets().ability_milestones,
                    ctx.config().ability_increases_per_milestone,
                )
                .ok_or_else(|| unvalidated(intent, "no ability increase available"))?;
            let score = scores.score(*ability) + 1;
            scores = scores
                .with_score(*ability, score)
                .map_err(|e| unvalidated(intent, e.to_string()))?;

            delta
                .set
                .insert(FieldPath::AbilityScore(*ability), FieldValue::Int(score.into()));
            delta.set.insert(
                FieldPath::AbilityIncreases,
                FieldValue::AbilityIncreases(
                    snapshot.ability_increases().with_increase(milestone, *ability),
                ),
            );
        }
    }

    let stats = derive_stats(
        &StatInputs {
            actor_kind: snapshot.actor_kind(),
            class_levels: &class_levels,
            ability_scores: &scores,
            held_feats: &held,
        },
        ctx,
    )?;
    ensure_monotonic(snapshot.budgets(), &stats.budgets)?;

    let before = snapshot.derived();
    let budgets = snapshot.budgets();
    let set = &mut delta.set;
    set_if_changed(set, FieldPath::Level, snapshot.level(), stats.level);
    set_if_changed(set, FieldPath::Bab, before.bab, stats.bab);
    set_if_changed(set, FieldPath::MaxHitPoints, before.max_hit_points, stats.max_hit_points);
    for defense in Defense::all() {
        set_if_changed(
            set,
            FieldPath::DefenseBonus(defense),
            before.defense_bonuses.get(defense),
            stats.defense_bonuses.get(defense),
        );
    }
    set_if_changed(set, FieldPath::MaxForcePoints, before.max_force_points, stats.max_force_points);
    set_if_changed(set, FieldPath::FeatBudget, budgets.feats, stats.budgets.feats);
    set_if_changed(set, FieldPath::TalentBudget, budgets.talents, stats.budgets.talents);
    set_if_changed(
        set,
        FieldPath::AbilityIncreaseBudget,
        budgets.ability_increases,
        stats.budgets.ability_increases,
    );
    set_if_changed(
        set,
        FieldPath::AbilityMilestones,
        budgets.ability_milestones,
        stats.budgets.ability_milestones,
    );
    set_if_changed(set, FieldPath::SkillBudget, budgets.skills, stats.budgets.skills);

    delta.computed = ComputedMirror {
        bab: stats.bab,
        defense_totals: stats.defense_totals,
        max_hit_points: stats.max_hit_points,
    };
    Ok(delta)
}

/// Starting feats come with the character's first level, or with a
/// prestige class's first level when configured.
fn receives_starting_feats(
    snapshot: &CharacterSnapshot,
    class: &ClassDefinition,
    class_level: u32,
    config: &ProgressionConfig,
) -> bool {
    class_level == 1
        && (snapshot.level() == 0 || (class.is_prestige() && config.prestige_grants_starting_feats))
}

fn set_if_changed<T: Into<i64> + PartialEq>(
    set: &mut BTreeMap<FieldPath, FieldValue>,
    path: FieldPath,
    before: T,
    after: T,
) {
    if before != after {
        set.insert(path, FieldValue::Int(after.into()));
    }
}

fn unvalidated(intent: &ProgressionIntent, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::UnvalidatedIntent {
        intent: intent.to_string(),
        reason: reason.into(),
    }
}
