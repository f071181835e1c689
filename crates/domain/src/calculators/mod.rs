//! Derived-value calculators.
//!
//! Pure functions of the class-level list and ability scores plus the rule
//! data. None of them read or write a character record.

mod bab;
mod budget;
mod defenses;
mod force;
mod hit_points;

use std::collections::BTreeSet;

pub use bab::{base_attack_bonus, raw_base_attack_bonus};
pub use budget::{ensure_monotonic, progression_budgets, Budgets};
pub use defenses::{class_defense_bonuses, defense_ability, defense_totals, DEFENSE_BASE};
pub use force::{force_power_budget, max_force_points};
pub use hit_points::max_hit_points;

use crate::error::ConfigurationError;
use crate::rules::RuleContext;
use crate::value_objects::{AbilityScores, ActorKind, ClassLevels, DefenseSet, FeatId};

/// What the calculators read.
#[derive(Debug, Clone, Copy)]
pub struct StatInputs<'a> {
    pub actor_kind: ActorKind,
    pub class_levels: &'a ClassLevels,
    pub ability_scores: &'a AbilityScores,
    /// Selected and granted feats together
    pub held_feats: &'a BTreeSet<FeatId>,
}

/// Every derived value, computed in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedStats {
    pub level: u32,
    pub bab: i32,
    pub max_hit_points: i32,
    /// Class contribution to each defense (progression-owned)
    pub defense_bonuses: DefenseSet,
    /// Full defense totals (presentation mirror)
    pub defense_totals: DefenseSet,
    pub max_force_points: u32,
    pub force_power_budget: u32,
    pub budgets: Budgets,
}

/// # Errors
///
/// Any missing class or feat, or a class level past its table.
pub fn derive_stats(
    inputs: &StatInputs<'_>,
    ctx: &RuleContext,
) -> Result<DerivedStats, ConfigurationError> {
    let data = ctx.data();
    let config = ctx.config();
    let level = inputs.class_levels.character_level();

    let defense_bonuses = class_defense_bonuses(inputs.class_levels, data)?;
    Ok(DerivedStats {
        level,
        bab: base_attack_bonus(inputs.class_levels, data)?,
        max_hit_points: max_hit_points(
            inputs.class_levels,
            inputs.ability_scores,
            inputs.actor_kind,
            data,
            config,
        )?,
        defense_bonuses,
        defense_totals: defense_totals(
            level,
            defense_bonuses,
            inputs.ability_scores,
            inputs.actor_kind,
        ),
        max_force_points: max_force_points(inputs.class_levels, data)?,
        force_power_budget: force_power_budget(inputs.held_feats, inputs.ability_scores, data)?,
        budgets: progression_budgets(
            inputs.class_levels,
            inputs.ability_scores,
            inputs.held_feats,
            data,
            config,
        )?,
    })
}
