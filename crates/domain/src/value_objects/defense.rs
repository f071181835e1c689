//! The three defense tracks.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Ability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Defense {
    Fortitude,
    Reflex,
    Will,
}

impl Defense {
    pub fn all() -> [Defense; 3] {
        [Self::Fortitude, Self::Reflex, Self::Will]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fortitude => "fortitude",
            Self::Reflex => "reflex",
            Self::Will => "will",
        }
    }

    /// Ability that feeds this defense for a character with a Constitution score.
    pub fn key_ability(&self) -> Ability {
        match self {
            Self::Fortitude => Ability::Con,
            Self::Reflex => Ability::Dex,
            Self::Will => Ability::Wis,
        }
    }
}

impl fmt::Display for Defense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One value per defense track.
///
/// Used both for class contributions and for presentation totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefenseSet {
    pub fortitude: i32,
    pub reflex: i32,
    pub will: i32,
}

impl DefenseSet {
    pub fn new(fortitude: i32, reflex: i32, will: i32) -> Self {
        Self {
            fortitude,
            reflex,
            will,
        }
    }

    pub fn get(&self, defense: Defense) -> i32 {
        match defense {
            Defense::Fortitude => self.fortitude,
            Defense::Reflex => self.reflex,
            Defense::Will => self.will,
        }
    }

    pub fn set(&mut self, defense: Defense, value: i32) {
        match defense {
            Defense::Fortitude => self.fortitude = value,
            Defense::Reflex => self.reflex = value,
            Defense::Will => self.will = value,
        }
    }

    /// Track-by-track maximum of two sets.
    pub fn max(self, other: DefenseSet) -> DefenseSet {
        DefenseSet {
            fortitude: self.fortitude.max(other.fortitude),
            reflex: self.reflex.max(other.reflex),
            will: self.will.max(other.will),
        }
    }
}
