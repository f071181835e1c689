//! The Resolver's output: field writes and item changes for one intent.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::intent::ProgressionIntent;
use crate::error::DomainError;
use crate::ids::CharacterId;
use crate::value_objects::{
    Ability, AbilityIncreaseLog, ClassLevels, Defense, DefenseSet, FeatId, ForcePowerId, SkillId,
    TalentId,
};

/// A progression-owned scalar or structured field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldPath {
    Level,
    ClassLevels,
    Bab,
    MaxHitPoints,
    DefenseBonus(Defense),
    FeatBudget,
    TalentBudget,
    AbilityIncreaseBudget,
    AbilityMilestones,
    SkillBudget,
    MaxForcePoints,
    AbilityScore(Ability),
    AbilityIncreases,
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level => write!(f, "level"),
            Self::ClassLevels => write!(f, "classLevels"),
            Self::Bab => write!(f, "bab"),
            Self::MaxHitPoints => write!(f, "maxHitPoints"),
            Self::DefenseBonus(defense) => write!(f, "defenseBonuses.{}", defense.as_str()),
            Self::FeatBudget => write!(f, "featBudget"),
            Self::TalentBudget => write!(f, "talentBudget"),
            Self::AbilityIncreaseBudget => write!(f, "abilityIncreaseBudget"),
            Self::AbilityMilestones => write!(f, "abilityMilestones"),
            Self::SkillBudget => write!(f, "skillBudget"),
            Self::MaxForcePoints => write!(f, "maxForcePoints"),
            Self::AbilityScore(ability) => write!(f, "abilityScores.{}", ability.as_str()),
            Self::AbilityIncreases => write!(f, "abilityIncreases"),
        }
    }
}

impl FromStr for FieldPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = match s {
            "level" => Self::Level,
            "classLevels" => Self::ClassLevels,
            "bab" => Self::Bab,
            "maxHitPoints" => Self::MaxHitPoints,
            "defenseBonuses.fortitude" => Self::DefenseBonus(Defense::Fortitude),
            "defenseBonuses.reflex" => Self::DefenseBonus(Defense::Reflex),
            "defenseBonuses.will" => Self::DefenseBonus(Defense::Will),
            "featBudget" => Self::FeatBudget,
            "talentBudget" => Self::TalentBudget,
            "abilityIncreaseBudget" => Self::AbilityIncreaseBudget,
            "abilityMilestones" => Self::AbilityMilestones,
            "skillBudget" => Self::SkillBudget,
            "maxForcePoints" => Self::MaxForcePoints,
            "abilityIncreases" => Self::AbilityIncreases,
            other => match other.strip_prefix("abilityScores.") {
                Some(ability) => Self::AbilityScore(ability.parse()?),
                None => return Err(DomainError::parse(format!("Unknown field path: {}", other))),
            },
        };
        Ok(path)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// New value for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    Int(i64),
    ClassLevels(ClassLevels),
    AbilityIncreases(AbilityIncreaseLog),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            Self::ClassLevels(levels) => {
                let parts: Vec<String> = levels
                    .entries()
                    .iter()
                    .map(|e| format!("{} {}", e.class_id(), e.levels_in_class()))
                    .collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::AbilityIncreases(log) => write!(f, "{} increase(s)", log.spent()),
        }
    }
}

/// Item collections a delta can add to or remove from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Feats,
    GrantedFeats,
    Talents,
    ForcePowers,
    TrainedSkills,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Feats => "feats",
            Self::GrantedFeats => "grantedFeats",
            Self::Talents => "talents",
            Self::ForcePowers => "forcePowers",
            Self::TrainedSkills => "trainedSkills",
        };
        write!(f, "{}", name)
    }
}

/// Identifiers to add or remove, per collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChanges {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub feats: BTreeSet<FeatId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub granted_feats: BTreeSet<FeatId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub talents: BTreeSet<TalentId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub force_powers: BTreeSet<ForcePowerId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub trained_skills: BTreeSet<SkillId>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.feats.is_empty()
            && self.granted_feats.is_empty()
            && self.talents.is_empty()
            && self.force_powers.is_empty()
            && self.trained_skills.is_empty()
    }

    /// Identifiers per non-empty collection, as strings.
    pub fn by_collection(&self) -> Vec<(Collection, Vec<String>)> {
        fn ids<T: fmt::Display>(set: &BTreeSet<T>) -> Vec<String> {
            set.iter().map(ToString::to_string).collect()
        }
        [
            (Collection::Feats, ids(&self.feats)),
            (Collection::GrantedFeats, ids(&self.granted_feats)),
            (Collection::Talents, ids(&self.talents)),
            (Collection::ForcePowers, ids(&self.force_powers)),
            (Collection::TrainedSkills, ids(&self.trained_skills)),
        ]
        .into_iter()
        .filter(|(_, ids)| !ids.is_empty())
        .collect()
    }
}

/// Values the record must show once the delta is applied.
///
/// Audit only: never written, compared after apply to catch a second writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedMirror {
    pub bab: i32,
    pub defense_totals: DefenseSet,
    pub max_hit_points: i32,
}

/// Minimal, deterministic set of changes for one `(snapshot, intent)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionDelta {
    pub character_id: CharacterId,
    /// Revision of the record the snapshot was captured from
    pub base_revision: u64,
    pub intent: ProgressionIntent,
    pub set: BTreeMap<FieldPath, FieldValue>,
    pub add: ItemChanges,
    pub remove: ItemChanges,
    pub computed: ComputedMirror,
}

impl ProgressionDelta {
    pub fn new(character_id: CharacterId, base_revision: u64, intent: ProgressionIntent) -> Self {
        Self {
            character_id,
            base_revision,
            intent,
            set: BTreeMap::new(),
            add: ItemChanges::default(),
            remove: ItemChanges::default(),
            computed: ComputedMirror::default(),
        }
    }

    /// Staleness token: which record, at which revision.
    pub fn freshness(&self) -> (CharacterId, u64) {
        (self.character_id, self.base_revision)
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.add.is_empty() && self.remove.is_empty()
    }

    /// Byte-stable JSON form.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_paths_parse_their_display_form() {
        let paths = [
            FieldPath::Level,
            FieldPath::DefenseBonus(Defense::Will),
            FieldPath::AbilityScore(Ability::Cha),
            FieldPath::MaxForcePoints,
        ];
        for path in paths {
            assert_eq!(path.to_string().parse::<FieldPath>().unwrap(), path);
        }
        assert!("hitPoints".parse::<FieldPath>().is_err());
    }

    #[test]
    fn set_map_serializes_with_string_keys() {
        let mut delta = ProgressionDelta::new(
            CharacterId::new(),
            0,
            ProgressionIntent::increase_ability(Ability::Str),
        );
        delta
            .set
            .insert(FieldPath::AbilityScore(Ability::Str), FieldValue::Int(14));
        let json = delta.to_canonical_json().unwrap();
        assert!(json.contains(r#""abilityScores.STR":{"type":"int","value":14}"#));
        let back: ProgressionDelta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, delta);
    }

    #[test]
    fn empty_item_collections_are_omitted() {
        let mut changes = ItemChanges::default();
        assert!(changes.is_empty());
        changes.talents.insert(TalentId::new("block").unwrap());
        assert_eq!(serde_json::to_string(&changes).unwrap(), r#"{"talents":["block"]}"#);
        assert_eq!(
            changes.by_collection(),
            vec![(Collection::Talents, vec!["block".to_string()])]
        );
    }
}
