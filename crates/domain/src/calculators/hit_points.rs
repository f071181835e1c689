//! Maximum hit points.

use crate::error::ConfigurationError;
use crate::rules::RuleDataSource;
use crate::value_objects::{AbilityScores, ActorKind, ClassLevels, ProgressionConfig};

/// Sum over every character level gained.
///
/// The first character level gives the class's starting hit points, later
/// levels the configured per-die amount. Each level adds the Constitution
/// modifier computed from the actual score, except for actors without
/// Constitution, and contributes at least `min_hit_points_per_level`.
pub fn max_hit_points(
    class_levels: &ClassLevels,
    scores: &AbilityScores,
    actor_kind: ActorKind,
    data: &dyn RuleDataSource,
    config: &ProgressionConfig,
) -> Result<i32, ConfigurationError> {
    let con = actor_kind.constitution_modifier(scores);
    let floor = config.min_hit_points_per_level as i32;

    let mut total = 0;
    for step in class_levels.timeline() {
        let class = data.require_class(&step.class_id)?;
        class.row(step.class_level)?;
        let base = if step.character_level == 1 {
            class.starting_hit_points
        } else {
            config.hit_point_method.per_level(class.hit_die)
        };
        total += (base as i32 + con).max(floor);
    }
    Ok(total)
}
