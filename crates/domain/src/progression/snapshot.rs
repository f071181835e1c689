//! Snapshot capture: an immutable, self-contained view of a record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::aggregates::ProgressionCharacter;
use crate::calculators::{defense_totals, Budgets};
use crate::ids::CharacterId;
use crate::value_objects::{
    AbilityIncreaseLog, AbilityScores, ActorKind, ClassLevels, DefenseSet, FeatId, ForcePowerId,
    SkillId, TalentId,
};

/// Derived values as stored on the record, for validation reference only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedValues {
    pub bab: i32,
    pub max_hit_points: i32,
    pub defense_bonuses: DefenseSet,
    pub defense_totals: DefenseSet,
    pub max_force_points: u32,
}

/// Everything the pipeline reads, as plain data.
///
/// Created fresh for each decision and discarded after use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSnapshot {
    character_id: CharacterId,
    revision: u64,
    captured_at: DateTime<Utc>,
    actor_kind: ActorKind,
    level: u32,
    class_levels: ClassLevels,
    ability_scores: AbilityScores,
    ability_increases: AbilityIncreaseLog,
    feat_ids: BTreeSet<FeatId>,
    granted_feat_ids: BTreeSet<FeatId>,
    talent_ids: BTreeSet<TalentId>,
    force_power_ids: BTreeSet<ForcePowerId>,
    trained_skills: BTreeSet<SkillId>,
    budgets: Budgets,
    derived: DerivedValues,
}

/// Capture a record. Total and free of I/O; the caller supplies the time.
pub fn capture(record: &ProgressionCharacter, captured_at: DateTime<Utc>) -> CharacterSnapshot {
    let defense_bonuses = record.defense_bonuses();
    CharacterSnapshot {
        character_id: record.id(),
        revision: record.revision(),
        captured_at,
        actor_kind: record.actor_kind(),
        level: record.level(),
        class_levels: record.class_levels().clone(),
        ability_scores: *record.ability_scores(),
        ability_increases: record.ability_increases().clone(),
        feat_ids: record.feats().clone(),
        granted_feat_ids: record.granted_feats().clone(),
        talent_ids: record.talents().clone(),
        force_power_ids: record.force_powers().clone(),
        trained_skills: record.trained_skills().clone(),
        budgets: *record.budgets(),
        derived: DerivedValues {
            bab: record.bab(),
            max_hit_points: record.max_hit_points(),
            defense_bonuses,
            defense_totals: defense_totals(
                record.level(),
                defense_bonuses,
                record.ability_scores(),
                record.actor_kind(),
            ),
            max_force_points: record.max_force_points(),
        },
    }
}

impl CharacterSnapshot {
    pub fn character_id(&self) -> CharacterId {
        self.character_id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Staleness token checked by the applier.
    pub fn freshness(&self) -> (CharacterId, u64) {
        (self.character_id, self.revision)
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn actor_kind(&self) -> ActorKind {
        self.actor_kind
    }

    /// Sum of all class levels.
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn class_levels(&self) -> &ClassLevels {
        &self.class_levels
    }

    pub fn ability_scores(&self) -> &AbilityScores {
        &self.ability_scores
    }

    pub fn ability_increases(&self) -> &AbilityIncreaseLog {
        &self.ability_increases
    }

    pub fn feat_ids(&self) -> &BTreeSet<FeatId> {
        &self.feat_ids
    }

    pub fn granted_feat_ids(&self) -> &BTreeSet<FeatId> {
        &self.granted_feat_ids
    }

    pub fn talent_ids(&self) -> &BTreeSet<TalentId> {
        &self.talent_ids
    }

    pub fn force_power_ids(&self) -> &BTreeSet<ForcePowerId> {
        &self.force_power_ids
    }

    pub fn trained_skills(&self) -> &BTreeSet<SkillId> {
        &self.trained_skills
    }

    pub fn budgets(&self) -> &Budgets {
        &self.budgets
    }

    pub fn derived(&self) -> &DerivedValues {
        &self.derived
    }

    /// Selected or granted.
    pub fn holds_feat(&self, feat_id: &FeatId) -> bool {
        self.feat_ids.contains(feat_id) || self.granted_feat_ids.contains(feat_id)
    }

    pub fn held_feats(&self) -> BTreeSet<FeatId> {
        self.feat_ids.union(&self.granted_feat_ids).cloned().collect()
    }

    pub fn holds_talent(&self, talent_id: &TalentId) -> bool {
        self.talent_ids.contains(talent_id)
    }

    pub fn holds_force_power(&self, force_power_id: &ForcePowerId) -> bool {
        self.force_power_ids.contains(force_power_id)
    }

    pub fn is_trained(&self, skill_id: &SkillId) -> bool {
        self.trained_skills.contains(skill_id)
    }

    /// Unspent feat slots.
    pub fn available_feats(&self) -> u32 {
        self.budgets.feats.saturating_sub(self.feat_ids.len() as u32)
    }

    pub fn available_talents(&self) -> u32 {
        self.budgets.talents.saturating_sub(self.talent_ids.len() as u32)
    }

    pub fn available_ability_increases(&self) -> u32 {
        self.budgets
            .ability_increases
            .saturating_sub(self.ability_increases.spent())
    }

    pub fn available_skills(&self) -> u32 {
        self.budgets.skills.saturating_sub(self.trained_skills.len() as u32)
    }

    /// Byte-stable JSON: every collection is ordered.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::CharacterName;
    use chrono::TimeZone;

    fn record() -> ProgressionCharacter {
        ProgressionCharacter::new(
            CharacterId::new(),
            CharacterName::new("Tor Adan").unwrap(),
            ActorKind::Organic,
            AbilityScores::new(12, 14, 10, 13, 15, 8).unwrap(),
        )
    }

    #[test]
    fn capture_is_byte_stable() {
        let record = record();
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let a = capture(&record, at).to_canonical_json().unwrap();
        let b = capture(&record, at).to_canonical_json().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fresh_snapshot_has_level_zero_and_no_budget() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let snapshot = capture(&record(), at);
        assert_eq!(snapshot.level(), 0);
        assert!(snapshot.class_levels().is_empty());
        assert_eq!(snapshot.available_feats(), 0);
        assert_eq!(snapshot.freshness().1, 0);
        // 10 + 0 + 0 + DEX 14
        assert_eq!(snapshot.derived().defense_totals.reflex, 12);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let snapshot = capture(&record(), at);
        let json = snapshot.to_canonical_json().unwrap();
        let back: CharacterSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
