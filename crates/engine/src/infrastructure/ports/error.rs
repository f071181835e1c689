//! Error types for port operations.

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A compare-and-swap commit lost the race: the stored revision moved on.
    #[error("{entity_type} {id} changed: expected revision {expected_revision}, stored revision is {actual_revision}")]
    Conflict {
        entity_type: &'static str,
        id: String,
        expected_revision: u64,
        actual_revision: u64,
    },

    /// Storage operation failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// Business constraint violated.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn conflict(
        entity_type: &'static str,
        id: impl ToString,
        expected_revision: u64,
        actual_revision: u64,
    ) -> Self {
        Self::Conflict {
            entity_type,
            id: id.to_string(),
            expected_revision,
            actual_revision,
        }
    }

    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a ConstraintViolation error.
    pub fn constraint(message: impl ToString) -> Self {
        Self::ConstraintViolation(message.to_string())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if a concurrent writer got there first.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_both_revisions() {
        let err = RepoError::conflict("Character", "abc", 3, 4);
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Character abc changed: expected revision 3, stored revision is 4"
        );
    }
}
