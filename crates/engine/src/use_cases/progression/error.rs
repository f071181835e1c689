//! Errors surfaced by the progression use cases.

use sagaforge_domain::{ApplyError, CharacterId, ConfigurationError, ReplayError};

use crate::infrastructure::ports::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum ProgressionError {
    /// Validation said no. Returned as data for the caller to display.
    #[error("Intent rejected: {}", .errors.join("; "))]
    Rejected {
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),

    /// The record moved on between capture and commit. Re-capture and retry.
    #[error("Character {character_id} changed: captured revision {expected_revision}, live revision {actual_revision}")]
    Stale {
        character_id: CharacterId,
        expected_revision: u64,
        actual_revision: u64,
    },

    /// A second writer touched a progression-owned field. Never retried.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl ProgressionError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Whether re-running the same intent may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    /// Map a failed compare-and-swap commit.
    pub(crate) fn from_commit(character_id: CharacterId, err: RepoError) -> Self {
        match err {
            RepoError::Conflict {
                expected_revision,
                actual_revision,
                ..
            } => Self::Stale {
                character_id,
                expected_revision,
                actual_revision,
            },
            RepoError::NotFound { .. } => Self::CharacterNotFound(character_id),
            other => Self::Repo(other),
        }
    }
}

impl From<ApplyError> for ProgressionError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::StaleDelta {
                character_id,
                expected_revision,
                actual_revision,
            } => Self::Stale {
                character_id,
                expected_revision,
                actual_revision,
            },
            ApplyError::Configuration(inner) => Self::Configuration(inner),
            // A resolved delta that does not fit its own record is a bug,
            // same as a mirror mismatch.
            other => Self::InvariantViolation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_becomes_stale() {
        let id = CharacterId::new();
        let err = ProgressionError::from_commit(id, RepoError::conflict("Character", id, 2, 3));
        assert!(err.is_retryable());
        assert!(matches!(
            err,
            ProgressionError::Stale {
                expected_revision: 2,
                actual_revision: 3,
                ..
            }
        ));
    }

    #[test]
    fn apply_invariant_violation_is_not_retryable() {
        let err = ProgressionError::from(ApplyError::InvariantViolation {
            field: "bab".into(),
            expected: 3,
            actual: 2,
        });
        assert!(matches!(err, ProgressionError::InvariantViolation(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn rejection_lists_reasons() {
        let err = ProgressionError::Rejected {
            errors: vec!["a".into(), "b".into()],
            warnings: vec![],
        };
        assert!(err.is_rejected());
        assert_eq!(err.to_string(), "Intent rejected: a; b");
    }
}
