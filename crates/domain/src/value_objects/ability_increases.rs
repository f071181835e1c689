//! Record of ability increases spent per milestone.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::Ability;

/// Abilities increased at each ability milestone, keyed by the milestone's
/// ordinal (1 for the first milestone reached, 2 for the second, ...).
///
/// Increases are spent against the earliest milestone that still has room
/// for that ability, and an ability may be raised at most once per milestone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityIncreaseLog(BTreeMap<u32, BTreeSet<Ability>>);

impl AbilityIncreaseLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total increases spent across all milestones.
    pub fn spent(&self) -> u32 {
        self.0.values().map(|set| set.len() as u32).sum()
    }

    pub fn at(&self, milestone: u32) -> Option<&BTreeSet<Ability>> {
        self.0.get(&milestone)
    }

    pub fn milestones(&self) -> impl Iterator<Item = (u32, &BTreeSet<Ability>)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Earliest reached milestone with an unspent increase.
    pub fn open_milestone(&self, milestones_reached: u32, per_milestone: u32) -> Option<u32> {
        (1..=milestones_reached).find(|m| {
            let used = self.0.get(m).map_or(0, |set| set.len() as u32);
            used < per_milestone
        })
    }

    /// Earliest reached milestone with an unspent increase that has not
    /// already raised `ability`.
    pub fn open_milestone_for(
        &self,
        ability: Ability,
        milestones_reached: u32,
        per_milestone: u32,
    ) -> Option<u32> {
        (1..=milestones_reached).find(|m| match self.0.get(m) {
            None => per_milestone > 0,
            Some(set) => (set.len() as u32) < per_milestone && !set.contains(&ability),
        })
    }

    /// Copy with `ability` recorded at `milestone`.
    pub fn with_increase(&self, milestone: u32, ability: Ability) -> Self {
        let mut next = self.0.clone();
        next.entry(milestone).or_default().insert(ability);
        Self(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_milestone_fills_earliest_first() {
        let log = AbilityIncreaseLog::new();
        assert_eq!(log.open_milestone(0, 2), None);
        assert_eq!(log.open_milestone(2, 2), Some(1));

        let log = log.with_increase(1, Ability::Str).with_increase(1, Ability::Dex);
        assert_eq!(log.spent(), 2);
        assert_eq!(log.open_milestone(1, 2), None);
        assert_eq!(log.open_milestone(2, 2), Some(2));
    }

    #[test]
    fn repeated_ability_moves_to_a_later_milestone() {
        let log = AbilityIncreaseLog::new().with_increase(1, Ability::Dex);
        assert_eq!(log.open_milestone(2, 2), Some(1));
        assert_eq!(log.open_milestone_for(Ability::Dex, 1, 2), None);
        assert_eq!(log.open_milestone_for(Ability::Dex, 2, 2), Some(2));
        assert_eq!(log.open_milestone_for(Ability::Wis, 2, 2), Some(1));
    }

    #[test]
    fn serializes_as_plain_map() {
        let log = AbilityIncreaseLog::new().with_increase(1, Ability::Wis);
        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(json, r#"{"1":["WIS"]}"#);
    }
}
