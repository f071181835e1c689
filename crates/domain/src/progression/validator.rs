//! Intent validation.
//!
//! Rejections come back as data with human-readable reasons. Only missing
//! rule data is raised, as a [`ConfigurationError`].

use serde::{Deserialize, Serialize};

use super::intent::ProgressionIntent;
use super::prerequisites::{check_class, check_feat, check_force_power, check_talent};
use super::snapshot::CharacterSnapshot;
use crate::calculators::force_power_budget;
use crate::error::ConfigurationError;
use crate::rules::RuleContext;
use crate::value_objects::{
    Ability, ClassId, FeatId, ForcePowerId, SkillId, TalentId, MAX_ABILITY_SCORE,
};

/// Outcome of validating one intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn new() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn error(&mut self, reason: impl Into<String>) {
        self.ok = false;
        self.errors.push(reason.into());
    }

    fn warn(&mut self, reason: impl Into<String>) {
        self.warnings.push(reason.into());
    }

    fn extend_errors(&mut self, reasons: Vec<String>) {
        for reason in reasons {
            self.error(reason);
        }
    }
}

/// Validate `intent` against `snapshot`.
///
/// Reads only the snapshot and the rule data; never recomputes stored
/// budgets.
///
/// # Errors
///
/// Anything the intent references is missing from the rule data.
pub fn validate(
    snapshot: &CharacterSnapshot,
    intent: &ProgressionIntent,
    ctx: &RuleContext,
) -> Result<ValidationReport, ConfigurationError> {
    let mut report = ValidationReport::new();
    match intent {
        ProgressionIntent::AddClassLevel { class_id } => {
            validate_class_level(class_id, snapshot, ctx, &mut report)?
        }
        ProgressionIntent::SelectFeat { feat_id } => {
            validate_feat(feat_id, snapshot, ctx, &mut report)?
        }
        ProgressionIntent::SelectTalent { talent_id } => {
            validate_talent(talent_id, snapshot, ctx, &mut report)?
        }
        ProgressionIntent::IncreaseAbility { ability } => {
            validate_ability_increase(*ability, snapshot, ctx, &mut report)
        }
        ProgressionIntent::TrainSkill { skill_id } => {
            validate_skill(skill_id, snapshot, ctx, &mut report)?
        }
        ProgressionIntent::SelectForcePower { force_power_id } => {
            validate_force_power(force_power_id, snapshot, ctx, &mut report)?
        }
    }
    Ok(report)
}

fn validate_class_level(
    class_id: &ClassId,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
    report: &mut ValidationReport,
) -> Result<(), ConfigurationError> {
    let class = ctx.data().require_class(class_id)?;
    let max_level = ctx.config().max_character_level;
    if snapshot.level() >= max_level {
        report.error(format!("Character is already at the maximum level ({})", max_level));
    }

    let next_class_level = snapshot.class_levels().levels_in(class_id) + 1;
    if next_class_level > class.max_level() {
        report.error(format!(
            "{} has only {} levels",
            class.name,
            class.max_level()
        ));
    }

    let check = check_class(class_id, snapshot, ctx)?;
    report.extend_errors(check.missing_reasons);

    if snapshot.available_feats() > 0 {
        report.warn(format!(
            "{} unspent feat slot(s) carried into the next level",
            snapshot.available_feats()
        ));
    }
    if snapshot.available_talents() > 0 {
        report.warn(format!(
            "{} unspent talent slot(s) carried into the next level",
            snapshot.available_talents()
        ));
    }
    Ok(())
}

fn validate_feat(
    feat_id: &FeatId,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
    report: &mut ValidationReport,
) -> Result<(), ConfigurationError> {
    let feat = ctx.data().require_feat(feat_id)?;
    if snapshot.feat_ids().contains(feat_id) {
        report.error(format!("{} is already selected", feat.name));
    } else if snapshot.granted_feat_ids().contains(feat_id) {
        report.error(format!("{} is already granted by a class", feat.name));
    }

    let check = check_feat(feat_id, snapshot, ctx)?;
    report.extend_errors(check.missing_reasons);

    if snapshot.available_feats() == 0 {
        report.error(format!(
            "No feat slots available ({} of {} used)",
            snapshot.feat_ids().len(),
            snapshot.budgets().feats
        ));
    }
    Ok(())
}

fn validate_talent(
    talent_id: &TalentId,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
    report: &mut ValidationReport,
) -> Result<(), ConfigurationError> {
    let talent = ctx.data().require_talent(talent_id)?;
    if snapshot.holds_talent(talent_id) {
        report.error(format!("{} is already selected", talent.name));
    }

    let check = check_talent(talent_id, snapshot, ctx)?;
    report.extend_errors(check.missing_reasons);

    if snapshot.available_talents() == 0 {
        report.error(format!(
            "No talent slots available ({} of {} used)",
            snapshot.talent_ids().len(),
            snapshot.budgets().talents
        ));
    }
    Ok(())
}

fn validate_ability_increase(
    ability: Ability,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
    report: &mut ValidationReport,
) {
    if ability == Ability::Con && !snapshot.actor_kind().has_constitution() {
        report.error("Droids have no Constitution score to increase");
    }

    let log = snapshot.ability_increases();
    let reached = snapshot.budgets().ability_milestones;
    let per_milestone = ctx.config().ability_increases_per_milestone;
    if log.open_milestone(reached, per_milestone).is_none() {
        report.error("No ability increase available");
    } else if log
        .open_milestone_for(ability, reached, per_milestone)
        .is_none()
    {
        report.error(format!(
            "{} was already increased at this milestone",
            ability.display_name()
        ));
    }

    if snapshot.ability_scores().score(ability) >= MAX_ABILITY_SCORE {
        report.error(format!(
            "{} is already at the maximum score ({})",
            ability.display_name(),
            MAX_ABILITY_SCORE
        ));
    }
}

fn validate_skill(
    skill_id: &SkillId,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
    report: &mut ValidationReport,
) -> Result<(), ConfigurationError> {
    let data = ctx.data();
    let skill = data.require_skill(skill_id)?;
    if snapshot.is_trained(skill_id) {
        report.error(format!("{} is already trained", skill.name));
    }

    let mut class_skill = false;
    for class_id in snapshot.class_levels().classes_taken() {
        if data.require_class(class_id)?.class_skills.contains(skill_id) {
            class_skill = true;
            break;
        }
    }
    if !class_skill {
        report.error(format!("{} is not a class skill of any class taken", skill.name));
    }

    if snapshot.available_skills() == 0 {
        report.error(format!(
            "No trained skill slots available ({} of {} used)",
            snapshot.trained_skills().len(),
            snapshot.budgets().skills
        ));
    }
    Ok(())
}

fn validate_force_power(
    force_power_id: &ForcePowerId,
    snapshot: &CharacterSnapshot,
    ctx: &RuleContext,
    report: &mut ValidationReport,
) -> Result<(), ConfigurationError> {
    let data = ctx.data();
    let power = data.require_force_power(force_power_id)?;
    if snapshot.holds_force_power(force_power_id) {
        report.error(format!("{} is already known", power.name));
    }

    let check = check_force_power(force_power_id, snapshot, ctx)?;
    report.extend_errors(check.missing_reasons);

    let budget = force_power_budget(&snapshot.held_feats(), snapshot.ability_scores(), data)?;
    if snapshot.force_power_ids().len() as u32 >= budget {
        report.error(format!(
            "No Force power slots available ({} of {} used)",
            snapshot.force_power_ids().len(),
            budget
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::ProgressionCharacter;
    use crate::ids::CharacterId;
    use crate::progression::{capture, resolve};
    use crate::value_objects::{AbilityScores, ActorKind, CharacterName};
    use chrono::{TimeZone, Utc};

    fn ctx() -> RuleContext {
        RuleContext::core().unwrap()
    }

    fn character(kind: ActorKind, scores: AbilityScores) -> ProgressionCharacter {
        ProgressionCharacter::new(
            CharacterId::new(),
            CharacterName::new("Validator Test").unwrap(),
            kind,
            scores,
        )
    }

    fn step(
        character: ProgressionCharacter,
        intent: ProgressionIntent,
        ctx: &RuleContext,
    ) -> ProgressionCharacter {
        let snapshot = capture(&character, Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap());
        let report = validate(&snapshot, &intent, ctx).unwrap();
        assert!(report.ok, "{}: {:?}", intent, report.errors);
        let delta = resolve(&snapshot, &intent, ctx).unwrap();
        character.apply_delta(&delta, ctx).unwrap().0
    }

    fn check(
        character: &ProgressionCharacter,
        intent: ProgressionIntent,
        ctx: &RuleContext,
    ) -> ValidationReport {
        let snapshot = capture(character, Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap());
        validate(&snapshot, &intent, ctx).unwrap()
    }

    fn class(id: &str) -> ProgressionIntent {
        ProgressionIntent::add_class_level(ClassId::new(id).unwrap())
    }

    fn feat(id: &str) -> ProgressionIntent {
        ProgressionIntent::select_feat(FeatId::new(id).unwrap())
    }

    fn talent(id: &str) -> ProgressionIntent {
        ProgressionIntent::select_talent(TalentId::new(id).unwrap())
    }

    #[test]
    fn granted_feat_cannot_be_selected() {
        let ctx = ctx();
        let jedi = step(character(ActorKind::Organic, AbilityScores::average()), class("jedi"), &ctx);
        let report = check(&jedi, feat("force_sensitivity"), &ctx);
        assert!(!report.ok);
        assert_eq!(report.errors, vec!["Force Sensitivity is already granted by a class"]);
    }

    #[test]
    fn selected_feat_is_a_duplicate() {
        let ctx = ctx();
        let soldier = step(
            character(ActorKind::Organic, AbilityScores::average()),
            class("soldier"),
            &ctx,
        );
        let soldier = step(soldier, feat("toughness"), &ctx);
        let report = check(&soldier, feat("toughness"), &ctx);
        assert_eq!(report.errors, vec!["Toughness is already selected"]);
    }

    #[test]
    fn feat_budget_is_enforced() {
        let ctx = ctx();
        // Level 1: one starting slot plus one species slot.
        let mut soldier = step(
            character(ActorKind::Organic, AbilityScores::average()),
            class("soldier"),
            &ctx,
        );
        soldier = step(soldier, feat("toughness"), &ctx);
        soldier = step(soldier, feat("skill_focus"), &ctx);

        let report = check(&soldier, feat("improved_defenses"), &ctx);
        assert!(!report.ok);
        assert!(report.errors.iter().any(|e| e.starts_with("No feat slots available")));
    }

    #[test]
    fn talent_needs_tree_and_slot() {
        let ctx = ctx();
        let noble = step(character(ActorKind::Organic, AbilityScores::average()), class("noble"), &ctx);
        let report = check(&noble, talent("block"), &ctx);
        assert_eq!(
            report.errors,
            vec!["Requires a class offering the lightsaber_combat talent tree"]
        );

        let noble = step(noble, talent("born_leader"), &ctx);
        let report = check(&noble, talent("presence"), &ctx);
        assert!(report.errors.iter().any(|e| e.starts_with("No talent slots available")));
    }

    #[test]
    fn unmet_prestige_gate_is_rejected() {
        let ctx = ctx();
        let scout = step(character(ActorKind::Organic, AbilityScores::average()), class("scout"), &ctx);
        let report = check(&scout, class("ace_pilot"), &ctx);
        assert!(!report.ok);
        assert!(report
            .errors
            .contains(&"Requires character level 7 (current 1)".to_string()));
    }

    #[test]
    fn unspent_slots_only_warn() {
        let ctx = ctx();
        let scout = step(character(ActorKind::Organic, AbilityScores::average()), class("scout"), &ctx);
        let report = check(&scout, class("scout"), &ctx);
        assert!(report.ok);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn droid_cannot_raise_constitution() {
        let ctx = ctx();
        let mut droid = character(ActorKind::Droid, AbilityScores::average());
        for _ in 0..4 {
            droid = step(droid, class("soldier"), &ctx);
        }
        let report = check(&droid, ProgressionIntent::increase_ability(Ability::Con), &ctx);
        assert_eq!(report.errors, vec!["Droids have no Constitution score to increase"]);
        assert!(check(&droid, ProgressionIntent::increase_ability(Ability::Str), &ctx).ok);
    }

    #[test]
    fn ability_increases_need_a_milestone_and_distinct_abilities() {
        let ctx = ctx();
        let mut scout = character(ActorKind::Organic, AbilityScores::average());
        for _ in 0..3 {
            scout = step(scout, class("scout"), &ctx);
        }
        let report = check(&scout, ProgressionIntent::increase_ability(Ability::Dex), &ctx);
        assert_eq!(report.errors, vec!["No ability increase available"]);

        scout = step(scout, class("scout"), &ctx);
        scout = step(scout, ProgressionIntent::increase_ability(Ability::Dex), &ctx);
        let report = check(&scout, ProgressionIntent::increase_ability(Ability::Dex), &ctx);
        assert_eq!(report.errors, vec!["Dexterity was already increased at this milestone"]);

        scout = step(scout, ProgressionIntent::increase_ability(Ability::Wis), &ctx);
        let report = check(&scout, ProgressionIntent::increase_ability(Ability::Int), &ctx);
        assert_eq!(report.errors, vec!["No ability increase available"]);
    }

    #[test]
    fn same_ability_may_use_a_later_open_milestone() {
        let ctx = ctx();
        let mut scout = character(ActorKind::Organic, AbilityScores::average());
        for _ in 0..8 {
            scout = step(scout, class("scout"), &ctx);
        }
        scout = step(scout, ProgressionIntent::increase_ability(Ability::Dex), &ctx);
        scout = step(scout, ProgressionIntent::increase_ability(Ability::Dex), &ctx);
        assert_eq!(scout.ability_scores().score(Ability::Dex), 12);
        assert!(scout.ability_increases().at(2).is_some_and(|set| set.contains(&Ability::Dex)));

        let report = check(&scout, ProgressionIntent::increase_ability(Ability::Dex), &ctx);
        assert_eq!(report.errors, vec!["Dexterity was already increased at this milestone"]);
        assert!(check(&scout, ProgressionIntent::increase_ability(Ability::Wis), &ctx).ok);
    }

    #[test]
    fn skill_must_be_a_class_skill() {
        let ctx = ctx();
        let soldier = step(
            character(ActorKind::Organic, AbilityScores::average()),
            class("soldier"),
            &ctx,
        );
        let report = check(
            &soldier,
            ProgressionIntent::train_skill(SkillId::new("use_the_force").unwrap()),
            &ctx,
        );
        assert_eq!(
            report.errors,
            vec!["Use the Force is not a class skill of any class taken"]
        );
    }

    #[test]
    fn force_powers_need_force_training() {
        let ctx = ctx();
        let jedi = step(character(ActorKind::Organic, AbilityScores::average()), class("jedi"), &ctx);
        let move_object = ProgressionIntent::select_force_power(ForcePowerId::new("move_object").unwrap());
        let report = check(&jedi, move_object.clone(), &ctx);
        assert_eq!(report.errors, vec!["No Force power slots available (0 of 0 used)"]);

        let jedi = step(
            jedi,
            ProgressionIntent::train_skill(SkillId::new("use_the_force").unwrap()),
            &ctx,
        );
        let jedi = step(jedi, feat("force_training"), &ctx);
        // WIS 10: max(1, 1 + 0) powers per Force Training.
        let jedi = step(jedi, move_object.clone(), &ctx);
        let report = check(&jedi, move_object, &ctx);
        assert_eq!(
            report.errors,
            vec![
                "Move Object is already known",
                "No Force power slots available (1 of 1 used)"
            ]
        );
    }

    #[test]
    fn level_cap_is_enforced() {
        let config = crate::value_objects::ProgressionConfig {
            max_character_level: 2,
            ..Default::default()
        };
        let ctx = RuleContext::with_config(config).unwrap();
        let mut soldier = character(ActorKind::Organic, AbilityScores::average());
        soldier = step(soldier, class("soldier"), &ctx);
        soldier = step(soldier, class("soldier"), &ctx);
        let report = check(&soldier, class("soldier"), &ctx);
        assert!(report
            .errors
            .contains(&"Character is already at the maximum level (2)".to_string()));
    }

    #[test]
    fn unknown_class_is_raised_not_reported() {
        let ctx = ctx();
        let fresh = character(ActorKind::Organic, AbilityScores::average());
        let snapshot = capture(&fresh, Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap());
        assert!(matches!(
            validate(&snapshot, &class("sith_lord"), &ctx),
            Err(ConfigurationError::UnknownClass(_))
        ));
    }
}
