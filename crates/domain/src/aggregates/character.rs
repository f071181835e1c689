//! Progression character aggregate
//!
//! # Single writer
//!
//! Every field here is progression-owned. After construction the only way
//! to change one is [`ProgressionCharacter::apply_delta`], which applies a
//! resolved delta all-or-nothing, bumps the revision and re-verifies the
//! derived values against the delta's audit mirror.
//!
//! Presentation values (defense totals, skill totals, current hit points)
//! are not stored; see [`crate::character_sheet::CharacterSheet`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::calculators::{derive_stats, Budgets, DerivedStats, StatInputs};
use crate::error::ApplyError;
use crate::events::{ApplyOutcome, FieldChange};
use crate::ids::CharacterId;
use crate::progression::{
    Collection, ComputedMirror, FieldPath, FieldValue, ItemChanges, ProgressionDelta,
};
use crate::rules::RuleContext;
use crate::value_objects::{
    AbilityIncreaseLog, AbilityScores, ActorKind, CharacterName, ClassLevels, Defense, DefenseSet,
    FeatId, ForcePowerId, SkillId, TalentId,
};

/// A character's progression record.
///
/// # Invariants
///
/// - `level` equals the sum of `class_levels`
/// - `bab`, `max_hit_points` and `defense_bonuses` equal what the
///   calculators derive from `class_levels` and `ability_scores`
/// - `feats` and `granted_feats` are disjoint
/// - `revision` increases by one per applied delta
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionCharacter {
    // Identity
    id: CharacterId,
    name: CharacterName,
    actor_kind: ActorKind,
    revision: u64,

    // Authoritative progression state
    class_levels: ClassLevels,
    ability_scores: AbilityScores,
    ability_increases: AbilityIncreaseLog,
    feats: BTreeSet<FeatId>,
    granted_feats: BTreeSet<FeatId>,
    talents: BTreeSet<TalentId>,
    force_powers: BTreeSet<ForcePowerId>,
    trained_skills: BTreeSet<SkillId>,

    // Progression-owned derived fields
    level: u32,
    bab: i32,
    max_hit_points: i32,
    defense_bonuses: DefenseSet,
    max_force_points: u32,
    budgets: Budgets,
}

impl ProgressionCharacter {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// A fresh level-0 character.
    pub fn new(
        id: CharacterId,
        name: CharacterName,
        actor_kind: ActorKind,
        ability_scores: AbilityScores,
    ) -> Self {
        Self {
            id,
            name,
            actor_kind,
            revision: 0,
            class_levels: ClassLevels::new(),
            ability_scores,
            ability_increases: AbilityIncreaseLog::new(),
            feats: BTreeSet::new(),
            granted_feats: BTreeSet::new(),
            talents: BTreeSet::new(),
            force_powers: BTreeSet::new(),
            trained_skills: BTreeSet::new(),
            level: 0,
            bab: 0,
            max_hit_points: 0,
            defense_bonuses: DefenseSet::default(),
            max_force_points: 0,
            budgets: Budgets::default(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn name(&self) -> &CharacterName {
        &self.name
    }

    pub fn actor_kind(&self) -> ActorKind {
        self.actor_kind
    }

    pub fn revision(&self) -> u64 {
        self.revision
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

    /// Feats chosen with feat slots.
    pub fn feats(&self) -> &BTreeSet<FeatId> {
        &self.feats
    }

    /// Feats granted by class tables; they consume no slot.
    pub fn granted_feats(&self) -> &BTreeSet<FeatId> {
        &self.granted_feats
    }

    /// Selected and granted feats together.
    pub fn held_feats(&self) -> BTreeSet<FeatId> {
        self.feats.union(&self.granted_feats).cloned().collect()
    }

    pub fn talents(&self) -> &BTreeSet<TalentId> {
        &self.talents
    }

    pub fn force_powers(&self) -> &BTreeSet<ForcePowerId> {
        &self.force_powers
    }

    pub fn trained_skills(&self) -> &BTreeSet<SkillId> {
        &self.trained_skills
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn bab(&self) -> i32 {
        self.bab
    }

    pub fn max_hit_points(&self) -> i32 {
        self.max_hit_points
    }

    /// Class contribution to each defense.
    pub fn defense_bonuses(&self) -> DefenseSet {
        self.defense_bonuses
    }

    pub fn max_force_points(&self) -> u32 {
        self.max_force_points
    }

    pub fn budgets(&self) -> &Budgets {
        &self.budgets
    }

    /// Recompute every derived value from the authoritative state.
    pub fn derive(&self, ctx: &RuleContext) -> Result<DerivedStats, ApplyError> {
        let held = self.held_feats();
        let inputs = StatInputs {
            actor_kind: self.actor_kind,
            class_levels: &self.class_levels,
            ability_scores: &self.ability_scores,
            held_feats: &held,
        };
        Ok(derive_stats(&inputs, ctx)?)
    }

    // =========================================================================
    // Apply
    // =========================================================================

    /// Apply a resolved delta, returning the new record and what changed.
    ///
    /// All-or-nothing: `self` is never touched, and any failure returns an
    /// error with no new record.
    ///
    /// # Errors
    ///
    /// - `CharacterMismatch` / `StaleDelta` when the delta was resolved
    ///   against a different record or revision
    /// - `MissingItem` / `DuplicateItem` / `InvalidValue` for writes that
    ///   cannot be applied
    /// - `InvariantViolation` when the result disagrees with `delta.computed`
    pub fn apply_delta(
        &self,
        delta: &ProgressionDelta,
        ctx: &RuleContext,
    ) -> Result<(Self, ApplyOutcome), ApplyError> {
        if delta.character_id != self.id {
            return Err(ApplyError::CharacterMismatch {
                expected: self.id,
                actual: delta.character_id,
            });
        }
        if delta.base_revision != self.revision {
            return Err(ApplyError::StaleDelta {
                character_id: self.id,
                expected_revision: delta.base_revision,
                actual_revision: self.revision,
            });
        }

        let mut next = self.clone();
        let mut changes = Vec::with_capacity(delta.set.len());
        for (path, value) in &delta.set {
            let from = next.field_value(*path);
            next.write_field(*path, value)?;
            changes.push(FieldChange {
                field: *path,
                from,
                to: value.clone(),
            });
        }
        next.remove_items(&delta.remove)?;
        next.add_items(&delta.add)?;
        next.revision += 1;

        next.verify_against(&delta.computed, ctx)?;

        let outcome = ApplyOutcome {
            character_id: next.id,
            revision: next.revision,
            intent: delta.intent.clone(),
            changes,
            added: delta.add.by_collection(),
            removed: delta.remove.by_collection(),
        };
        Ok((next, outcome))
    }

    /// Check stored and recomputed values against an audit mirror.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` naming the first field that disagrees.
    pub fn verify_against(
        &self,
        computed: &ComputedMirror,
        ctx: &RuleContext,
    ) -> Result<DerivedStats, ApplyError> {
        let derived = self.verify(ctx)?;
        check("computed.bab", computed.bab, derived.bab)?;
        check(
            "computed.maxHitPoints",
            computed.max_hit_points,
            derived.max_hit_points,
        )?;
        for defense in Defense::all() {
            check(
                &format!("computed.defenseTotals.{}", defense),
                computed.defense_totals.get(defense),
                derived.defense_totals.get(defense),
            )?;
        }
        Ok(derived)
    }

    /// Check stored derived fields against a fresh recomputation.
    pub fn verify(&self, ctx: &RuleContext) -> Result<DerivedStats, ApplyError> {
        let derived = self.derive(ctx)?;
        check(
            "level",
            self.class_levels.character_level() as i64,
            self.level as i64,
        )?;
        check("bab", derived.bab, self.bab)?;
        check("maxHitPoints", derived.max_hit_points, self.max_hit_points)?;
        for defense in Defense::all() {
            check(
                &format!("defenseBonuses.{}", defense),
                derived.defense_bonuses.get(defense),
                self.defense_bonuses.get(defense),
            )?;
        }
        check(
            "maxForcePoints",
            derived.max_force_points,
            self.max_force_points,
        )?;
        if let Some(overlap) = self.feats.intersection(&self.granted_feats).next() {
            return Err(ApplyError::DuplicateItem {
                collection: Collection::GrantedFeats,
                id: overlap.to_string(),
            });
        }
        Ok(derived)
    }

    fn field_value(&self, path: FieldPath) -> FieldValue {
        let int = |v: i64| FieldValue::Int(v);
        match path {
            FieldPath::Level => int(self.level.into()),
            FieldPath::ClassLevels => FieldValue::ClassLevels(self.class_levels.clone()),
            FieldPath::Bab => int(self.bab.into()),
            FieldPath::MaxHitPoints => int(self.max_hit_points.into()),
            FieldPath::DefenseBonus(defense) => int(self.defense_bonuses.get(defense).into()),
            FieldPath::FeatBudget => int(self.budgets.feats.into()),
            FieldPath::TalentBudget => int(self.budgets.talents.into()),
            FieldPath::AbilityIncreaseBudget => int(self.budgets.ability_increases.into()),
            FieldPath::AbilityMilestones => int(self.budgets.ability_milestones.into()),
            FieldPath::SkillBudget => int(self.budgets.skills.into()),
            FieldPath::MaxForcePoints => int(self.max_force_points.into()),
            FieldPath::AbilityScore(ability) => int(self.ability_scores.score(ability).into()),
            FieldPath::AbilityIncreases => {
                FieldValue::AbilityIncreases(self.ability_increases.clone())
            }
        }
    }

    fn write_field(&mut self, path: FieldPath, value: &FieldValue) -> Result<(), ApplyError> {
        match (path, value) {
            (FieldPath::ClassLevels, FieldValue::ClassLevels(levels)) => {
                self.class_levels = levels.clone();
            }
            (FieldPath::AbilityIncreases, FieldValue::AbilityIncreases(log)) => {
                self.ability_increases = log.clone();
            }
            (FieldPath::AbilityScore(ability), FieldValue::Int(score)) => {
                let score = to_i32(path, *score)?;
                self.ability_scores = self
                    .ability_scores
                    .with_score(ability, score)
                    .map_err(|e| ApplyError::InvalidValue {
                        field: path,
                        reason: e.to_string(),
                    })?;
            }
            (FieldPath::Bab, FieldValue::Int(v)) => self.bab = to_i32(path, *v)?,
            (FieldPath::MaxHitPoints, FieldValue::Int(v)) => self.max_hit_points = to_i32(path, *v)?,
            (FieldPath::DefenseBonus(defense), FieldValue::Int(v)) => {
                let v = to_i32(path, *v)?;
                self.defense_bonuses.set(defense, v);
            }
            (FieldPath::Level, FieldValue::Int(v)) => self.level = to_u32(path, *v)?,
            (FieldPath::FeatBudget, FieldValue::Int(v)) => self.budgets.feats = to_u32(path, *v)?,
            (FieldPath::TalentBudget, FieldValue::Int(v)) => {
                self.budgets.talents = to_u32(path, *v)?
            }
            (FieldPath::AbilityIncreaseBudget, FieldValue::Int(v)) => {
                self.budgets.ability_increases = to_u32(path, *v)?
            }
            (FieldPath::AbilityMilestones, FieldValue::Int(v)) => {
                self.budgets.ability_milestones = to_u32(path, *v)?
            }
            (FieldPath::SkillBudget, FieldValue::Int(v)) => self.budgets.skills = to_u32(path, *v)?,
            (FieldPath::MaxForcePoints, FieldValue::Int(v)) => {
                self.max_force_points = to_u32(path, *v)?
            }
            (path, value) => {
                return Err(ApplyError::InvalidValue {
                    field: path,
                    reason: format!("value of the wrong shape: {}", value),
                })
            }
        }
        Ok(())
    }

    fn remove_items(&mut self, remove: &ItemChanges) -> Result<(), ApplyError> {
        remove_all(&mut self.feats, &remove.feats, Collection::Feats)?;
        remove_all(
            &mut self.granted_feats,
            &remove.granted_feats,
            Collection::GrantedFeats,
        )?;
        remove_all(&mut self.talents, &remove.talents, Collection::Talents)?;
        remove_all(
            &mut self.force_powers,
            &remove.force_powers,
            Collection::ForcePowers,
        )?;
        remove_all(
            &mut self.trained_skills,
            &remove.trained_skills,
            Collection::TrainedSkills,
        )
    }

    fn add_items(&mut self, add: &ItemChanges) -> Result<(), ApplyError> {
        for feat in add.feats.iter().chain(add.granted_feats.iter()) {
            if self.feats.contains(feat) || self.granted_feats.contains(feat) {
                return Err(ApplyError::DuplicateItem {
                    collection: if add.feats.contains(feat) {
                        Collection::Feats
                    } else {
                        Collection::GrantedFeats
                    },
                    id: feat.to_string(),
                });
            }
        }
        add_all(&mut self.feats, &add.feats, Collection::Feats)?;
        add_all(
            &mut self.granted_feats,
            &add.granted_feats,
            Collection::GrantedFeats,
        )?;
        add_all(&mut self.talents, &add.talents, Collection::Talents)?;
        add_all(
            &mut self.force_powers,
            &add.force_powers,
            Collection::ForcePowers,
        )?;
        add_all(
            &mut self.trained_skills,
            &add.trained_skills,
            Collection::TrainedSkills,
        )
    }
}

fn check<T: Into<i64>>(field: &str, expected: T, actual: T) -> Result<(), ApplyError> {
    let (expected, actual) = (expected.into(), actual.into());
    if expected == actual {
        Ok(())
    } else {
        Err(ApplyError::InvariantViolation {
            field: field.to_string(),
            expected,
            actual,
        })
    }
}

fn to_i32(field: FieldPath, value: i64) -> Result<i32, ApplyError> {
    i32::try_from(value).map_err(|_| ApplyError::InvalidValue {
        field,
        reason: format!("{} does not fit in i32", value),
    })
}

fn to_u32(field: FieldPath, value: i64) -> Result<u32, ApplyError> {
    u32::try_from(value).map_err(|_| ApplyError::InvalidValue {
        field,
        reason: format!("{} is negative or too large", value),
    })
}

fn remove_all<T: Ord + ToString>(
    set: &mut BTreeSet<T>,
    items: &BTreeSet<T>,
    collection: Collection,
) -> Result<(), ApplyError> {
    for item in items {
        if !set.remove(item) {
            return Err(ApplyError::MissingItem {
                collection,
                id: item.to_string(),
            });
        }
    }
    Ok(())
}

fn add_all<T: Ord + Clone + ToString>(
    set: &mut BTreeSet<T>,
    items: &BTreeSet<T>,
    collection: Collection,
) -> Result<(), ApplyError> {
    for item in items {
        if !set.insert(item.clone()) {
            return Err(ApplyError::DuplicateItem {
                collection,
                id: item.to_string(),
            });
        }
    }
    Ok(())
}
