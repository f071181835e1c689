//! Validated rule-content keys
//!
//! Classes, feats, talents, skills and Force powers are referenced by
//! stable string keys (e.g. `jedi`, `force_sensitivity`). Keys are
//! valid by construction:
//! - Trimmed of leading/trailing whitespace
//! - Non-empty and at most 64 characters
//! - Lowercase ASCII letters, digits and underscores only
//!
//! All keys order lexicographically so they can live in `BTreeSet`s,
//! which keeps snapshot and delta serialization byte-stable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Maximum length for a rule-content key
const MAX_KEY_LENGTH: usize = 64;

fn validate_key(kind: &str, raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", kind)));
    }
    if trimmed.len() > MAX_KEY_LENGTH {
        return Err(DomainError::validation(format!(
            "{} cannot exceed {} characters",
            kind, MAX_KEY_LENGTH
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(DomainError::validation(format!(
            "{} must be lowercase snake_case: {}",
            kind, trimmed
        )));
    }
    Ok(trimmed.to_string())
}

macro_rules! define_key {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new validated key.
            ///
            /// # Errors
            ///
            /// Returns `DomainError::Validation` if the key is empty, too
            /// long, or not lowercase snake_case.
            pub fn new(key: impl Into<String>) -> Result<Self, DomainError> {
                let key = key.into();
                validate_key($kind, &key).map(Self)
            }

            /// Returns the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = DomainError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> String {
                key.0
            }
        }
    };
}

define_key!(ClassId, "Class id");
define_key!(FeatId, "Feat id");
define_key!(TalentId, "Talent id");
define_key!(TalentTreeId, "Talent tree id");
define_key!(SkillId, "Skill id");
define_key!(ForcePowerId, "Force power id");
define_key!(SpecialRuleId, "Special rule id");
