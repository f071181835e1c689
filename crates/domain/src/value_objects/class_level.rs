//! The ordered class-level list.
//!
//! `ClassLevels` is the single authoritative record of which classes a
//! character has taken and in what order. Every calculator and validator
//! reads it; any other view (per-class totals, the level timeline) is a
//! projection rebuilt from it on demand.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ClassId;
use crate::error::DomainError;

/// One run of consecutive levels taken in a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawClassLevel")]
pub struct ClassLevel {
    class_id: ClassId,
    levels_in_class: u32,
}

impl ClassLevel {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `levels_in_class` is zero.
    pub fn new(class_id: ClassId, levels_in_class: u32) -> Result<Self, DomainError> {
        if levels_in_class == 0 {
            return Err(DomainError::validation(format!(
                "Class entry {} must have at least one level",
                class_id
            )));
        }
        Ok(Self {
            class_id,
            levels_in_class,
        })
    }

    pub fn class_id(&self) -> &ClassId {
        &self.class_id
    }

    pub fn levels_in_class(&self) -> u32 {
        self.levels_in_class
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClassLevel {
    class_id: ClassId,
    levels_in_class: u32,
}

impl TryFrom<RawClassLevel> for ClassLevel {
    type Error = DomainError;

    fn try_from(raw: RawClassLevel) -> Result<Self, Self::Error> {
        Self::new(raw.class_id, raw.levels_in_class)
    }
}

/// One character level in the order it was gained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStep {
    /// Character level reached by this step (1-indexed).
    pub character_level: u32,
    /// Class the level was taken in.
    pub class_id: ClassId,
    /// Total levels in that class after this step (1-indexed).
    pub class_level: u32,
    /// First level ever taken in this class.
    pub first_in_class: bool,
}

/// Ordered class-level list; order is the order classes were taken.
///
/// A class may appear more than once when it is re-entered after
/// another class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLevels(Vec<ClassLevel>);

impl ClassLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an ordered list of entries.
    pub fn from_entries(entries: Vec<ClassLevel>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[ClassLevel] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Character level: the sum of levels across every entry.
    pub fn character_level(&self) -> u32 {
        self.0.iter().map(ClassLevel::levels_in_class).sum()
    }

    /// Total levels in one class across all of its entries.
    pub fn levels_in(&self, class_id: &ClassId) -> u32 {
        self.0
            .iter()
            .filter(|entry| &entry.class_id == class_id)
            .map(ClassLevel::levels_in_class)
            .sum()
    }

    /// Per-class totals, keyed by class.
    pub fn totals_by_class(&self) -> BTreeMap<ClassId, u32> {
        let mut totals = BTreeMap::new();
        for entry in &self.0 {
            *totals.entry(entry.class_id.clone()).or_insert(0) += entry.levels_in_class;
        }
        totals
    }

    /// Distinct classes in the order first taken.
    pub fn classes_taken(&self) -> Vec<&ClassId> {
        let mut seen: Vec<&ClassId> = Vec::new();
        for entry in &self.0 {
            if !seen.contains(&&entry.class_id) {
                seen.push(&entry.class_id);
            }
        }
        seen
    }

    pub fn has_class(&self, class_id: &ClassId) -> bool {
        self.0.iter().any(|entry| &entry.class_id == class_id)
    }

    /// The class of the very first character level.
    pub fn first_class(&self) -> Option<&ClassId> {
        self.0.first().map(ClassLevel::class_id)
    }

    /// Copy with one more level in `class_id`.
    ///
    /// Extends the last entry when it is the same class; otherwise a new
    /// entry is appended, which is how re-entering a class shows up.
    pub fn with_level_added(&self, class_id: &ClassId) -> Self {
        let mut entries = self.0.clone();
        match entries.last_mut() {
            Some(last) if &last.class_id == class_id => last.levels_in_class += 1,
            _ => entries.push(ClassLevel {
                class_id: class_id.clone(),
                levels_in_class: 1,
            }),
        }
        Self(entries)
    }

    /// Expand into one step per character level, in the order gained.
    pub fn timeline(&self) -> Vec<LevelStep> {
        let mut steps = Vec::with_capacity(self.character_level() as usize);
        let mut per_class: BTreeMap<&ClassId, u32> = BTreeMap::new();
        let mut character_level = 0;
        for entry in &self.0 {
            for _ in 0..entry.levels_in_class {
                character_level += 1;
                let class_level = per_class.entry(&entry.class_id).or_insert(0);
                *class_level += 1;
                steps.push(LevelStep {
                    character_level,
                    class_id: entry.class_id.clone(),
                    class_level: *class_level,
                    first_in_class: *class_level == 1,
                });
            }
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(id: &str) -> ClassId {
        ClassId::new(id).unwrap()
    }

    fn levels(entries: &[(&str, u32)]) -> ClassLevels {
        ClassLevels::from_entries(
            entries
                .iter()
                .map(|(id, n)| ClassLevel::new(class(id), *n).unwrap())
                .collect(),
        )
    }

    #[test]
    fn character_level_sums_all_entries() {
        let list = levels(&[("jedi", 4), ("scout", 2)]);
        assert_eq!(list.character_level(), 6);
        assert_eq!(list.entries().len(), 2);
    }

    #[test]
    fn character_level_independent_of_order() {
        let a = levels(&[("jedi", 4), ("scout", 2)]);
        let b = levels(&[("scout", 2), ("jedi", 4)]);
        assert_eq!(a.character_level(), b.character_level());
    }

    #[test]
    fn entry_deserialization_validates() {
        let ok: ClassLevels =
            serde_json::from_str(r#"[{"classId":"jedi","levelsInClass":2}]"#).unwrap();
        assert_eq!(ok.character_level(), 2);
        assert!(
            serde_json::from_str::<ClassLevels>(r#"[{"classId":"jedi","levelsInClass":0}]"#)
                .is_err()
        );
    }

    #[test]
    fn adding_same_class_extends_last_entry() {
        let list = levels(&[("jedi", 1)]).with_level_added(&class("jedi"));
        assert_eq!(list.entries().len(), 1);
        assert_eq!(list.levels_in(&class("jedi")), 2);
    }

    #[test]
    fn reentering_class_appends_new_entry() {
        let list = levels(&[("jedi", 2), ("scout", 1)]).with_level_added(&class("jedi"));
        assert_eq!(list.entries().len(), 3);
        assert_eq!(list.levels_in(&class("jedi")), 3);
        assert_eq!(list.classes_taken(), vec![&class("jedi"), &class("scout")]);
    }

    #[test]
    fn timeline_tracks_class_levels_across_reentry() {
        let list = levels(&[("jedi", 2), ("scout", 1), ("jedi", 1)]);
        let steps = list.timeline();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[2].class_id, class("scout"));
        assert!(steps[2].first_in_class);
        assert_eq!(steps[3].class_id, class("jedi"));
        assert_eq!(steps[3].class_level, 3);
        assert_eq!(steps[3].character_level, 4);
        assert!(!steps[3].first_in_class);
    }

    #[test]
    fn zero_level_entry_rejected() {
        assert!(ClassLevel::new(class("jedi"), 0).is_err());
    }

    #[test]
    fn serializes_as_plain_list() {
        let list = levels(&[("jedi", 1)]);
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, r#"[{"classId":"jedi","levelsInClass":1}]"#);
    }
}
