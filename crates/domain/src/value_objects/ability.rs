//! Ability scores and the actor kinds that interpret them.
//!
//! Only base scores are stored. Modifiers are always recomputed from the
//! score with `floor((score - 10) / 2)`; there is no cached modifier to
//! fall back on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Lowest base score a character may have.
pub const MIN_ABILITY_SCORE: i32 = 1;
/// Highest base score a character may have.
pub const MAX_ABILITY_SCORE: i32 = 40;

/// The six abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ability {
    /// Strength - physical power
    Str,
    /// Dexterity - agility and reflexes
    Dex,
    /// Constitution - endurance and health
    Con,
    /// Intelligence - reasoning and memory
    Int,
    /// Wisdom - perception and insight
    Wis,
    /// Charisma - force of personality
    Cha,
}

impl Ability {
    /// Returns the short uppercase string representation (e.g., "STR", "DEX").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Dex => "DEX",
            Self::Con => "CON",
            Self::Int => "INT",
            Self::Wis => "WIS",
            Self::Cha => "CHA",
        }
    }

    /// Returns the full name of the ability (e.g., "Strength").
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Str => "Strength",
            Self::Dex => "Dexterity",
            Self::Con => "Constitution",
            Self::Int => "Intelligence",
            Self::Wis => "Wisdom",
            Self::Cha => "Charisma",
        }
    }

    /// All abilities in sheet order.
    pub fn all() -> [Ability; 6] {
        [
            Self::Str,
            Self::Dex,
            Self::Con,
            Self::Int,
            Self::Wis,
            Self::Cha,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Ability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STR" | "STRENGTH" => Ok(Self::Str),
            "DEX" | "DEXTERITY" => Ok(Self::Dex),
            "CON" | "CONSTITUTION" => Ok(Self::Con),
            "INT" | "INTELLIGENCE" => Ok(Self::Int),
            "WIS" | "WISDOM" => Ok(Self::Wis),
            "CHA" | "CHARISMA" => Ok(Self::Cha),
            other => Err(DomainError::parse(format!("Unknown ability: {}", other))),
        }
    }
}

/// Ability modifier for a base score: `floor((score - 10) / 2)`.
///
/// Rust's `/` truncates toward zero, so this uses Euclidean division to
/// floor odd scores below 10 correctly (9 -> -1, 7 -> -2).
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Six base ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawAbilityScores")]
pub struct AbilityScores {
    strength: i32,
    dexterity: i32,
    constitution: i32,
    intelligence: i32,
    wisdom: i32,
    charisma: i32,
}

impl AbilityScores {
    /// Create a validated set of scores in STR, DEX, CON, INT, WIS, CHA order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if any score is outside
    /// `MIN_ABILITY_SCORE..=MAX_ABILITY_SCORE`.
    pub fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Result<Self, DomainError> {
        let scores = Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        };
        for ability in Ability::all() {
            check_range(ability, scores.score(ability))?;
        }
        Ok(scores)
    }

    /// All scores at 10.
    pub fn average() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }

    /// Base score for an ability.
    pub fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.strength,
            Ability::Dex => self.dexterity,
            Ability::Con => self.constitution,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    /// Modifier computed from the base score.
    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.score(ability))
    }

    /// Copy with one score replaced.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the new score is out of range.
    pub fn with_score(self, ability: Ability, score: i32) -> Result<Self, DomainError> {
        check_range(ability, score)?;
        let mut next = self;
        match ability {
            Ability::Str => next.strength = score,
            Ability::Dex => next.dexterity = score,
            Ability::Con => next.constitution = score,
            Ability::Int => next.intelligence = score,
            Ability::Wis => next.wisdom = score,
            Ability::Cha => next.charisma = score,
        }
        Ok(next)
    }
}

/// Wire shape of [`AbilityScores`]; deserialization goes through
/// [`AbilityScores::new`] so stored and loaded scores obey the same range.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAbilityScores {
    strength: i32,
    dexterity: i32,
    constitution: i32,
    intelligence: i32,
    wisdom: i32,
    charisma: i32,
}

impl TryFrom<RawAbilityScores> for AbilityScores {
    type Error = DomainError;

    fn try_from(raw: RawAbilityScores) -> Result<Self, Self::Error> {
        Self::new(
            raw.strength,
            raw.dexterity,
            raw.constitution,
            raw.intelligence,
            raw.wisdom,
            raw.charisma,
        )
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::average()
    }
}

fn check_range(ability: Ability, score: i32) -> Result<(), DomainError> {
    if !(MIN_ABILITY_SCORE..=MAX_ABILITY_SCORE).contains(&score) {
        return Err(DomainError::validation(format!(
            "{} score {} is outside {}..={}",
            ability.display_name(),
            score,
            MIN_ABILITY_SCORE,
            MAX_ABILITY_SCORE
        )));
    }
    Ok(())
}

/// What kind of body a character has.
///
/// Droids have no Constitution score: nothing derived from Constitution
/// (hit points, Fortitude) may read it, whatever value is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorKind {
    #[default]
    Organic,
    Droid,
}

impl ActorKind {
    pub fn has_constitution(&self) -> bool {
        matches!(self, Self::Organic)
    }

    /// Constitution modifier contribution, zero for actors without the score.
    pub fn constitution_modifier(&self, scores: &AbilityScores) -> i32 {
        if self.has_constitution() {
            scores.modifier(Ability::Con)
        } else {
            0
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organic => write!(f, "organic"),
            Self::Droid => write!(f, "droid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_floors_below_ten() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(12), 1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(7), -2);
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(18), 4);
    }

    #[test]
    fn ability_from_str_accepts_both_forms() {
        assert_eq!("str".parse::<Ability>().unwrap(), Ability::Str);
        assert_eq!("Wisdom".parse::<Ability>().unwrap(), Ability::Wis);
        assert!("LUCK".parse::<Ability>().is_err());
    }

    #[test]
    fn scores_reject_out_of_range() {
        assert!(AbilityScores::new(10, 10, 0, 10, 10, 10).is_err());
        assert!(AbilityScores::new(10, 10, 10, 10, 10, 41).is_err());
    }

    #[test]
    fn score_deserialization_validates() {
        let ok: AbilityScores = serde_json::from_str(
            r#"{"strength":10,"dexterity":14,"constitution":12,"intelligence":10,"wisdom":13,"charisma":8}"#,
        )
        .unwrap();
        assert_eq!(ok.score(Ability::Dex), 14);

        assert!(serde_json::from_str::<AbilityScores>(
            r#"{"strength":0,"dexterity":99,"constitution":10,"intelligence":10,"wisdom":10,"charisma":10}"#,
        )
        .is_err());
        assert!(serde_json::from_str::<AbilityScores>(
            r#"{"strength":10,"dexterity":-2147483648,"constitution":10,"intelligence":10,"wisdom":10,"charisma":10}"#,
        )
        .is_err());
    }

    #[test]
    fn with_score_replaces_one_value() {
        let scores = AbilityScores::new(10, 14, 12, 10, 13, 8).unwrap();
        let raised = scores.with_score(Ability::Wis, 14).unwrap();
        assert_eq!(raised.score(Ability::Wis), 14);
        assert_eq!(raised.modifier(Ability::Wis), 2);
        assert_eq!(raised.score(Ability::Dex), 14);
    }

    #[test]
    fn droid_constitution_contributes_nothing() {
        let scores = AbilityScores::new(10, 10, 18, 10, 10, 10).unwrap();
        assert_eq!(ActorKind::Organic.constitution_modifier(&scores), 4);
        assert_eq!(ActorKind::Droid.constitution_modifier(&scores), 0);
    }

    #[test]
    fn ability_serializes_uppercase() {
        let json = serde_json::to_string(&Ability::Con).unwrap();
        assert_eq!(json, "\"CON\"");
    }
}
