//! Force points and Force power slots.

use std::collections::BTreeSet;

use crate::entities::FORCE_TRAINING_TAG;
use crate::error::ConfigurationError;
use crate::rules::RuleDataSource;
use crate::value_objects::{Ability, AbilityScores, ClassLevels, FeatId};

/// Highest Force point base among classes taken plus half the character
/// level, rounded down. Zero before the first level.
pub fn max_force_points(
    class_levels: &ClassLevels,
    data: &dyn RuleDataSource,
) -> Result<u32, ConfigurationError> {
    let mut base = None;
    for class_id in class_levels.classes_taken() {
        let class_base = data.require_class(class_id)?.force_point_base;
        base = Some(base.map_or(class_base, |b: u32| b.max(class_base)));
    }
    Ok(base.map_or(0, |b| b + class_levels.character_level() / 2))
}

/// Power slots: `max(1, 1 + WIS modifier)` per held feat tagged `force_training`.
pub fn force_power_budget(
    held_feats: &BTreeSet<FeatId>,
    scores: &AbilityScores,
    data: &dyn RuleDataSource,
) -> Result<u32, ConfigurationError> {
    let per_feat = (1 + scores.modifier(Ability::Wis)).max(1) as u32;
    let mut total = 0;
    for feat_id in held_feats {
        if data.feat_metadata(feat_id)?.has_tag(FORCE_TRAINING_TAG) {
            total += per_feat;
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::core_catalog;
    use crate::value_objects::{ClassId, ClassLevel};

    #[test]
    fn force_points_take_highest_base() {
        let catalog = core_catalog().unwrap();
        let class_levels = ClassLevels::from_entries(vec![
            ClassLevel::new(ClassId::new("jedi").unwrap(), 7).unwrap(),
            ClassLevel::new(ClassId::new("jedi_knight").unwrap(), 1).unwrap(),
        ]);
        assert_eq!(max_force_points(&class_levels, &catalog).unwrap(), 6 + 4);
        assert_eq!(max_force_points(&ClassLevels::new(), &catalog).unwrap(), 0);
    }

    #[test]
    fn force_training_scales_with_wisdom() {
        let catalog = core_catalog().unwrap();
        let held: BTreeSet<FeatId> = [
            FeatId::new("force_training").unwrap(),
            FeatId::new("force_sensitivity").unwrap(),
        ]
        .into_iter()
        .collect();

        let wise = AbilityScores::average().with_score(Ability::Wis, 14).unwrap();
        assert_eq!(force_power_budget(&held, &wise, &catalog).unwrap(), 3);

        let foolish = AbilityScores::average().with_score(Ability::Wis, 6).unwrap();
        assert_eq!(force_power_budget(&held, &foolish, &catalog).unwrap(), 1);
    }

    #[test]
    fn unknown_held_feat_is_fatal() {
        let catalog = core_catalog().unwrap();
        let held: BTreeSet<FeatId> = [FeatId::new("sith_alchemy").unwrap()].into_iter().collect();
        assert!(matches!(
            force_power_budget(&held, &AbilityScores::average(), &catalog),
            Err(ConfigurationError::UnknownFeat(_))
        ));
    }
}
