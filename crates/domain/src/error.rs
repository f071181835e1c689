//! Unified error types for the domain layer
//!
//! Three families live here:
//! - [`DomainError`] for value-object construction and parsing
//! - [`ConfigurationError`] for rule data that is missing or malformed (fatal)
//! - [`ApplyError`] for deltas that cannot be committed to a character record

use thiserror::Error;

use crate::ids::CharacterId;
use crate::progression::{Collection, FieldPath, ProgressionIntent};
use crate::value_objects::{ClassId, FeatId, ForcePowerId, SkillId, SpecialRuleId, TalentId};

/// Unified error type for domain value construction
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when domain invariants or constraints are violated:
    /// - Required fields are empty or missing
    /// - Values are outside allowed ranges
    ///
    /// # Example
    /// ```ignore
    /// if name.is_empty() {
    ///     return Err(DomainError::validation("Character name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }
}

/// Rule data is missing or inconsistent.
///
/// Never user-facing and never recoverable: an operation that hits one of
/// these must abort instead of skipping the missing contribution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Class not found in rule data: {0}")]
    UnknownClass(ClassId),

    #[error("Feat not found in rule data: {0}")]
    UnknownFeat(FeatId),

    #[error("Talent not found in rule data: {0}")]
    UnknownTalent(TalentId),

    #[error("Force power not found in rule data: {0}")]
    UnknownForcePower(ForcePowerId),

    #[error("Skill not found in rule data: {0}")]
    UnknownSkill(SkillId),

    #[error("Special rule not registered: {0}")]
    UnknownSpecialRule(SpecialRuleId),

    #[error("Special rule registered twice: {0}")]
    DuplicateSpecialRule(SpecialRuleId),

    #[error("Duplicate {kind} in rule data: {id}")]
    DuplicateEntry { kind: &'static str, id: String },

    #[error("Class {class_id} has no table row for level {level} (table has {max} levels)")]
    ClassLevelOutOfRange {
        class_id: ClassId,
        level: u32,
        max: u32,
    },

    #[error("Class {0} has an empty level table")]
    EmptyClassTable(ClassId),

    #[error("{budget} budget would shrink from {previous} to {recomputed}")]
    BudgetRegression {
        budget: &'static str,
        previous: u32,
        recomputed: u32,
    },

    #[error("Invalid progression configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed rule data: {0}")]
    Malformed(String),

    /// The resolver was handed an intent that validation would reject.
    #[error("Cannot resolve {intent}: {reason}")]
    UnvalidatedIntent { intent: String, reason: String },
}

impl From<DomainError> for ConfigurationError {
    fn from(err: DomainError) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// A delta could not be committed to a character record.
///
/// Nothing is mutated when any of these is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplyError {
    /// The record changed between snapshot capture and apply.
    #[error("Stale delta for character {character_id}: captured at revision {expected_revision}, live revision is {actual_revision}")]
    StaleDelta {
        character_id: CharacterId,
        expected_revision: u64,
        actual_revision: u64,
    },

    #[error("Delta belongs to character {expected}, not {actual}")]
    CharacterMismatch {
        expected: CharacterId,
        actual: CharacterId,
    },

    /// Recomputed values disagree with the delta's audit mirror; a second
    /// writer touched a progression-owned field.
    #[error("Invariant violation on {field}: expected {expected}, found {actual}")]
    InvariantViolation {
        field: String,
        expected: i64,
        actual: i64,
    },

    #[error("Cannot remove {id} from {collection}: not present")]
    MissingItem { collection: Collection, id: String },

    #[error("Cannot add {id} to {collection}: already present")]
    DuplicateItem { collection: Collection, id: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: FieldPath, reason: String },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl ApplyError {
    /// Whether the caller should re-capture and retry.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleDelta { .. })
    }

    /// Whether this signals a broken single-writer invariant.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }
}

/// An intent failed somewhere in capture, validate, resolve, apply.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// Validation said no. Returned as data; nothing was resolved.
    #[error("Intent rejected: {}", .errors.join("; "))]
    Rejected {
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Apply(#[from] ApplyError),
}

impl PipelineError {
    pub fn rejected(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self::Rejected { errors, warnings }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// A recorded history could not be replayed.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Replay failed at step {step} ({intent}): {source}")]
pub struct ReplayError {
    /// Zero-based index into the history
    pub step: usize,
    pub intent: ProgressionIntent,
    pub source: PipelineError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("name cannot be empty");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: name cannot be empty");
    }

    #[test]
    fn test_constraint_error() {
        let err = DomainError::constraint("feat already held");
        assert_eq!(err.to_string(), "Constraint violation: feat already held");
    }

    #[test]
    fn domain_error_converts_to_malformed_configuration() {
        let err: ConfigurationError = DomainError::parse("Unknown ability: LUCK").into();
        assert!(matches!(err, ConfigurationError::Malformed(_)));
        assert!(err.to_string().contains("LUCK"));
    }

    #[test]
    fn class_level_out_of_range_message() {
        let err = ConfigurationError::ClassLevelOutOfRange {
            class_id: ClassId::new("jedi_knight").unwrap(),
            level: 11,
            max: 10,
        };
        assert_eq!(
            err.to_string(),
            "Class jedi_knight has no table row for level 11 (table has 10 levels)"
        );
    }

    #[test]
    fn stale_delta_is_recoverable() {
        let err = ApplyError::StaleDelta {
            character_id: CharacterId::new(),
            expected_revision: 3,
            actual_revision: 4,
        };
        assert!(err.is_stale());
        assert!(!err.is_invariant_violation());
        assert!(err.to_string().contains("revision 3"));
    }

    #[test]
    fn rejection_lists_every_reason() {
        let err = PipelineError::rejected(
            vec!["Feat already selected".into(), "No feat slots available".into()],
            vec![],
        );
        assert!(err.is_rejected());
        assert_eq!(
            err.to_string(),
            "Intent rejected: Feat already selected; No feat slots available"
        );
    }
}
