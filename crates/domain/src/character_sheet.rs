//! Read-only character sheet projection.
//!
//! A display-oriented view rebuilt from the progression record on demand.
//! It is never written back and never used as input to the pipeline.
//!
//! # Field ownership
//!
//! - **Progression-owned** values (level, BAB, hit points, class defense
//!   bonuses, Force points, budgets) are copied from the record.
//! - **Presentation** values (defense totals, ability modifiers, available
//!   slots, display names) are computed here.

use serde::{Deserialize, Serialize};

use crate::aggregates::ProgressionCharacter;
use crate::calculators::{derive_stats, StatInputs};
use crate::error::ConfigurationError;
use crate::ids::CharacterId;
use crate::rules::{RuleContext, RuleDataSource};
use crate::value_objects::{Ability, ActorKind, ClassId, DefenseSet};

// =============================================================================
// Sheet
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSheet {
    pub character_id: CharacterId,
    pub name: String,
    pub actor_kind: ActorKind,
    pub revision: u64,
    pub level: u32,
    /// One line per class, in the order classes were first taken
    pub classes: Vec<ClassLine>,
    pub abilities: Vec<AbilityLine>,
    pub base_attack_bonus: i32,
    pub max_hit_points: i32,
    pub max_force_points: u32,
    pub defense_bonuses: DefenseSet,
    pub defenses: DefenseSet,
    pub feats: Vec<EntryLine>,
    pub talents: Vec<EntryLine>,
    pub force_powers: Vec<EntryLine>,
    pub trained_skills: Vec<EntryLine>,
    pub available: AvailableSlots,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassLine {
    pub class_id: ClassId,
    pub name: String,
    pub levels: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityLine {
    pub ability: Ability,
    pub score: i32,
    /// `None` for an ability the actor does not have (droid Constitution)
    pub modifier: Option<i32>,
}

/// A named entry on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryLine {
    pub id: String,
    pub name: String,
    /// Granted by a class rather than chosen
    #[serde(default)]
    pub granted: bool,
}

/// Earned but unspent choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlots {
    pub feats: u32,
    pub talents: u32,
    pub ability_increases: u32,
    pub skills: u32,
    pub force_powers: u32,
}

impl CharacterSheet {
    /// Project a record into a sheet.
    ///
    /// In debug builds, asserts that the recomputed BAB agrees with the
    /// record; a mismatch means something other than the pipeline wrote it.
    ///
    /// # Errors
    ///
    /// Rule data missing for anything the record holds.
    pub fn project(
        record: &ProgressionCharacter,
        ctx: &RuleContext,
    ) -> Result<Self, ConfigurationError> {
        let data = ctx.data();
        let held = record.held_feats();
        let stats = derive_stats(
            &StatInputs {
                actor_kind: record.actor_kind(),
                class_levels: record.class_levels(),
                ability_scores: record.ability_scores(),
                held_feats: &held,
            },
            ctx,
        )?;
        debug_assert_eq!(
            stats.bab,
            record.bab(),
            "sheet BAB disagrees with the progression record"
        );

        let mut classes: Vec<ClassLine> = Vec::new();
        for class_id in record.class_levels().classes_taken() {
            classes.push(ClassLine {
                class_id: class_id.clone(),
                name: data.require_class(class_id)?.name.clone(),
                levels: record.class_levels().levels_in(class_id),
            });
        }

        let scores = record.ability_scores();
        let abilities = Ability::all()
            .into_iter()
            .map(|ability| AbilityLine {
                ability,
                score: scores.score(ability),
                modifier: if ability == Ability::Con && !record.actor_kind().has_constitution() {
                    None
                } else {
                    Some(scores.modifier(ability))
                },
            })
            .collect();

        let mut feats = Vec::new();
        for id in record.feats() {
            feats.push(entry(id.as_str(), &data.require_feat(id)?.name, false));
        }
        for id in record.granted_feats() {
            feats.push(entry(id.as_str(), &data.require_feat(id)?.name, true));
        }
        feats.sort_by(|a, b| a.name.cmp(&b.name));

        let mut talents = Vec::new();
        for id in record.talents() {
            talents.push(entry(id.as_str(), &data.require_talent(id)?.name, false));
        }
        let mut force_powers = Vec::new();
        for id in record.force_powers() {
            force_powers.push(entry(id.as_str(), &data.require_force_power(id)?.name, false));
        }
        let trained_skills = skill_lines(record, data)?;

        let budgets = record.budgets();
        let available = AvailableSlots {
            feats: budgets.feats.saturating_sub(record.feats().len() as u32),
            talents: budgets.talents.saturating_sub(record.talents().len() as u32),
            ability_increases: budgets
                .ability_increases
                .saturating_sub(record.ability_increases().spent()),
            skills: budgets.skills.saturating_sub(record.trained_skills().len() as u32),
            force_powers: stats
                .force_power_budget
                .saturating_sub(record.force_powers().len() as u32),
        };

        Ok(Self {
            character_id: record.id(),
            name: record.name().to_string(),
            actor_kind: record.actor_kind(),
            revision: record.revision(),
            level: record.level(),
            classes,
            abilities,
            base_attack_bonus: record.bab(),
            max_hit_points: record.max_hit_points(),
            max_force_points: record.max_force_points(),
            defense_bonuses: record.defense_bonuses(),
            defenses: stats.defense_totals,
            feats,
            talents,
            force_powers,
            trained_skills,
            available,
        })
    }

    /// Short text rendering for the command-line tool.
    pub fn render(&self) -> String {
        let classes: Vec<String> = self
            .classes
            .iter()
            .map(|c| format!("{} {}", c.name, c.levels))
            .collect();
        let names = |lines: &[EntryLine]| -> String {
            lines.iter().map(|l| l.name.as_str()).collect::<Vec<_>>().join(", ")
        };
        let mut out = String::new();
        out.push_str(&format!("{} (level {}: {})\n", self.name, self.level, classes.join(" / ")));
        out.push_str(&format!(
            "BAB +{}  HP {}  Force points {}\n",
            self.base_attack_bonus, self.max_hit_points, self.max_force_points
        ));
        out.push_str(&format!(
            "Fortitude {}  Reflex {}  Will {}\n",
            self.defenses.fortitude, self.defenses.reflex, self.defenses.will
        ));
        out.push_str(&format!("Feats: {}\n", names(&self.feats)));
        out.push_str(&format!("Talents: {}\n", names(&self.talents)));
        out.push_str(&format!("Force powers: {}\n", names(&self.force_powers)));
        out.push_str(&format!("Trained skills: {}\n", names(&self.trained_skills)));
        out
    }
}

fn entry(id: &str, name: &str, granted: bool) -> EntryLine {
    EntryLine {
        id: id.to_string(),
        name: name.to_string(),
        granted,
    }
}

fn skill_lines(
    record: &ProgressionCharacter,
    data: &dyn RuleDataSource,
) -> Result<Vec<EntryLine>, ConfigurationError> {
    let mut lines = Vec::new();
    for id in record.trained_skills() {
        lines.push(entry(id.as_str(), &data.require_skill(id)?.name, false));
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::{replay, ProgressionHistory, ProgressionIntent};
    use crate::value_objects::{AbilityScores, CharacterName, SkillId};
    use chrono::{TimeZone, Utc};

    #[test]
    fn sheet_reflects_record() {
        let ctx = RuleContext::core().unwrap();
        let history = ProgressionHistory::new(
            CharacterName::new("Unit K-9").unwrap(),
            ActorKind::Droid,
            AbilityScores::new(14, 12, 16, 10, 10, 8).unwrap(),
        )
        .with_intent(ProgressionIntent::add_class_level(ClassId::new("soldier").unwrap()))
        .with_intent(ProgressionIntent::train_skill(SkillId::new("endurance").unwrap()));
        let record = replay(
            &history,
            CharacterId::new(),
            &ctx,
            Utc.with_ymd_and_hms(2026, 4, 4, 0, 0, 0).unwrap(),
        )
        .unwrap();

        let sheet = CharacterSheet::project(&record, &ctx).unwrap();
        assert_eq!(sheet.level, 1);
        assert_eq!(sheet.classes[0].name, "Soldier");
        // Droid: no CON anywhere. 30 starting HP, Fortitude from STR.
        assert_eq!(sheet.max_hit_points, 30);
        assert_eq!(sheet.defenses.fortitude, 10 + 1 + 2 + 2);
        let con = sheet
            .abilities
            .iter()
            .find(|line| line.ability == Ability::Con)
            .unwrap();
        assert_eq!(con.modifier, None);
        assert_eq!(sheet.trained_skills[0].name, "Endurance");
        assert_eq!(sheet.available.feats, 2);
        assert!(sheet.render().contains("Soldier 1"));
    }

    #[test]
    fn granted_feats_are_marked() {
        let ctx = RuleContext::core().unwrap();
        let history = ProgressionHistory::new(
            CharacterName::new("Ela Vos").unwrap(),
            ActorKind::Organic,
            AbilityScores::average(),
        )
        .with_intent(ProgressionIntent::add_class_level(ClassId::new("jedi").unwrap()));
        let record = replay(
            &history,
            CharacterId::new(),
            &ctx,
            Utc.with_ymd_and_hms(2026, 4, 4, 0, 0, 0).unwrap(),
        )
        .unwrap();
        let sheet = CharacterSheet::project(&record, &ctx).unwrap();
        assert_eq!(sheet.feats.len(), 3);
        assert!(sheet.feats.iter().all(|f| f.granted));
    }
}
