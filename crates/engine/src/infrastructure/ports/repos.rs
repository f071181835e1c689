//! Persistence ports.

use async_trait::async_trait;
use sagaforge_domain::{CharacterId, ProgressionCharacter};

use super::RepoError;

// =============================================================================
// Character Store
// =============================================================================

/// Persisted progression records.
///
/// Writes are transactional per character: `commit` replaces the stored
/// record only when its revision still matches, so an apply that raced
/// another writer fails instead of overwriting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Current live record, if any.
    async fn get(&self, id: CharacterId) -> Result<Option<ProgressionCharacter>, RepoError>;

    /// Insert a new record. `ConstraintViolation` when the id is taken.
    async fn create(&self, record: &ProgressionCharacter) -> Result<(), RepoError>;

    /// Compare-and-swap: store `record` if the stored revision equals
    /// `expected_revision`, otherwise `Conflict`.
    async fn commit(
        &self,
        expected_revision: u64,
        record: &ProgressionCharacter,
    ) -> Result<(), RepoError>;

    async fn list_ids(&self) -> Result<Vec<CharacterId>, RepoError>;
}
