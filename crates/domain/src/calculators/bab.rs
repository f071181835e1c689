//! Base attack bonus.

use crate::error::ConfigurationError;
use crate::rules::RuleDataSource;
use crate::value_objects::ClassLevels;

/// Absorbs binary rounding of fractional table rows before the final floor.
const BAB_EPSILON: f64 = 1e-9;

/// Unfloored BAB: the table row at each class's total levels, summed.
///
/// Levels from non-contiguous entries of the same class are added up first
/// so the table is indexed by the class's real level.
///
/// # Errors
///
/// A class missing from the rule data, or a level past its table.
pub fn raw_base_attack_bonus(
    class_levels: &ClassLevels,
    data: &dyn RuleDataSource,
) -> Result<f64, ConfigurationError> {
    let mut total = 0.0;
    for (class_id, levels) in class_levels.totals_by_class() {
        let class = data.require_class(&class_id)?;
        total += class.row(levels)?.bab;
    }
    Ok(total)
}

/// BAB with a single floor applied to the fractional sum.
pub fn base_attack_bonus(
    class_levels: &ClassLevels,
    data: &dyn RuleDataSource,
) -> Result<i32, ConfigurationError> {
    let raw = raw_base_attack_bonus(class_levels, data)?;
    Ok((raw + BAB_EPSILON).floor() as i32)
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
    fn fractional_rows_are_summed_before_flooring() {
        let catalog = core_catalog().unwrap();
        let class_levels = levels(&[("scout", 3), ("noble", 1)]);

        assert_eq!(raw_base_attack_bonus(&class_levels, &catalog).unwrap(), 3.0);
        assert_eq!(base_attack_bonus(&class_levels, &catalog).unwrap(), 3);

        // Flooring each entry first would give 2 + 0.
        let per_entry: i32 = [2.25_f64, 0.75].iter().map(|v| v.floor() as i32).sum();
        assert_eq!(per_entry, 2);
    }

    #[test]
    fn reentered_class_indexes_by_total_levels() {
        let catalog = core_catalog().unwrap();
        let class_levels = levels(&[("scout", 1), ("jedi", 2), ("scout", 1)]);
        // scout row 2 (1.5) + jedi row 2 (2.0)
        assert_eq!(base_attack_bonus(&class_levels, &catalog).unwrap(), 3);
    }

    #[test]
    fn missing_class_is_fatal() {
        let catalog = core_catalog().unwrap();
        let class_levels = levels(&[("jedi", 4), ("sith_lord", 1)]);
        assert!(matches!(
            base_attack_bonus(&class_levels, &catalog),
            Err(ConfigurationError::UnknownClass(id)) if id.as_str() == "sith_lord"
        ));
    }

    #[test]
    fn level_past_table_is_fatal() {
        let catalog = core_catalog().unwrap();
        let class_levels = levels(&[("jedi_knight", 11)]);
        assert!(matches!(
            base_attack_bonus(&class_levels, &catalog),
            Err(ConfigurationError::ClassLevelOutOfRange { .. })
        ));
    }

    #[test]
    fn empty_class_list_has_zero_bab() {
        let catalog = core_catalog().unwrap();
        assert_eq!(base_attack_bonus(&ClassLevels::new(), &catalog).unwrap(), 0);
    }
}
