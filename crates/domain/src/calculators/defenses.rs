//! Defense class contribution and totals.

use crate::error::ConfigurationError;
use crate::rules::RuleDataSource;
use crate::value_objects::{Ability, AbilityScores, ActorKind, ClassLevels, Defense, DefenseSet};

/// Base of every defense total.
pub const DEFENSE_BASE: i32 = 10;

/// Per-track maximum of the level-1 bonuses of every class ever taken.
///
/// Always recomputed from the whole class list.
pub fn class_defense_bonuses(
    class_levels: &ClassLevels,
    data: &dyn RuleDataSource,
) -> Result<DefenseSet, ConfigurationError> {
    class_levels
        .classes_taken()
        .into_iter()
        .try_fold(DefenseSet::default(), |best, class_id| {
            let bonuses = data.require_class(class_id)?.first_level_defenses()?;
            Ok(best.max(bonuses))
        })
}

/// Ability feeding a defense track for this actor.
///
/// Fortitude falls back to Strength for actors without Constitution.
pub fn defense_ability(defense: Defense, actor_kind: ActorKind) -> Ability {
    match defense {
        Defense::Fortitude if !actor_kind.has_constitution() => Ability::Str,
        other => other.key_ability(),
    }
}

/// `10 + level + class bonus + ability modifier` per track.
pub fn defense_totals(
    level: u32,
    class_bonuses: DefenseSet,
    scores: &AbilityScores,
    actor_kind: ActorKind,
) -> DefenseSet {
    let mut totals = DefenseSet::default();
    for defense in Defense::all() {
        let ability = defense_ability(defense, actor_kind);
        totals.set(
            defense,
            DEFENSE_BASE + level as i32 + class_bonuses.get(defense) + scores.modifier(ability),
        );
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::core_catalog;
    use crate::value_objects::{ClassId, ClassLevel};

    fn levels(entries: &[(&str, u32)]) -> ClassLevels {
        ClassLevels::from_entries(
            entries
                .iter()
                .map(|(id, n)| ClassLevel::new(ClassId::new(*id).unwrap(), *n).unwrap())
                .collect(),
        )
    }

    #[test]
    fn class_bonus_is_maximum_not_sum() {
        let catalog = core_catalog().unwrap();
        // jedi 1/1/1, scout 1/2/0
        let bonuses = class_defense_bonuses(&levels(&[("jedi", 4), ("scout", 2)]), &catalog).unwrap();
        assert_eq!(bonuses, DefenseSet::new(1, 2, 1));
    }

    #[test]
    fn class_bonus_ignores_order() {
        let catalog = core_catalog().unwrap();
        let a = class_defense_bonuses(&levels(&[("soldier", 1), ("noble", 1)]), &catalog).unwrap();
        let b = class_defense_bonuses(&levels(&[("noble", 1), ("soldier", 1)]), &catalog).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, DefenseSet::new(2, 1, 2));
    }

    #[test]
    fn unknown_class_is_fatal() {
        let catalog = core_catalog().unwrap();
        assert!(class_defense_bonuses(&levels(&[("bounty_hunter", 1)]), &catalog).is_err());
    }

    #[test]
    fn totals_use_strength_for_droid_fortitude() {
        let scores = AbilityScores::new(14, 12, 18, 10, 8, 10).unwrap();
        let bonuses = DefenseSet::new(2, 1, 0);

        let organic = defense_totals(3, bonuses, &scores, ActorKind::Organic);
        assert_eq!(organic, DefenseSet::new(10 + 3 + 2 + 4, 10 + 3 + 1 + 1, 10 + 3 - 1));

        let droid = defense_totals(3, bonuses, &scores, ActorKind::Droid);
        assert_eq!(droid.fortitude, 10 + 3 + 2 + 2);
    }
}
