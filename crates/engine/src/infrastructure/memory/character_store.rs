//! In-process character store.

use async_trait::async_trait;
use dashmap::DashMap;
use sagaforge_domain::{CharacterId, ProgressionCharacter};

use crate::infrastructure::ports::{CharacterStore, RepoError};

/// Records keyed by id. Each commit runs under the shard's write guard, so
/// the revision check and the replacement are one atomic step.
#[derive(Default)]
pub struct InMemoryCharacterStore {
    records: DashMap<CharacterId, ProgressionCharacter>,
}

impl InMemoryCharacterStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CharacterStore for InMemoryCharacterStore {
    async fn get(&self, id: CharacterId) -> Result<Option<ProgressionCharacter>, RepoError> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, record: &ProgressionCharacter) -> Result<(), RepoError> {
        match self.records.entry(record.id()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(RepoError::constraint(format!(
                "Character {} already exists",
                record.id()
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn commit(
        &self,
        expected_revision: u64,
        record: &ProgressionCharacter,
    ) -> Result<(), RepoError> {
        let mut stored = self
            .records
            .get_mut(&record.id())
            .ok_or_else(|| RepoError::not_found("Character", record.id()))?;
        if stored.revision() != expected_revision {
            return Err(RepoError::conflict(
                "Character",
                record.id(),
                expected_revision,
                stored.revision(),
            ));
        }
        *stored = record.clone();
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<CharacterId>, RepoError> {
        let mut ids: Vec<CharacterId> = self.records.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sagaforge_domain::{
        run_intent, AbilityScores, ActorKind, CharacterName, ClassId, ProgressionIntent,
        RuleContext,
    };

    fn fresh() -> ProgressionCharacter {
        ProgressionCharacter::new(
            CharacterId::new(),
            CharacterName::new("Tam Rell").unwrap(),
            ActorKind::Organic,
            AbilityScores::average(),
        )
    }

    fn advanced(record: &ProgressionCharacter) -> ProgressionCharacter {
        let ctx = RuleContext::core().unwrap();
        let intent = ProgressionIntent::add_class_level(ClassId::new("scout").unwrap());
        run_intent(
            record,
            &intent,
            &ctx,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
        .0
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryCharacterStore::new();
        let record = fresh();
        store.create(&record).await.unwrap();

        assert_eq!(store.get(record.id()).await.unwrap(), Some(record.clone()));
        assert_eq!(store.list_ids().await.unwrap(), vec![record.id()]);
        assert!(store.get(CharacterId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let store = InMemoryCharacterStore::new();
        let record = fresh();
        store.create(&record).await.unwrap();
        let err = store.create(&record).await.unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn commit_checks_the_stored_revision() {
        let store = InMemoryCharacterStore::new();
        let record = fresh();
        store.create(&record).await.unwrap();

        let next = advanced(&record);
        store.commit(0, &next).await.unwrap();
        assert_eq!(store.get(record.id()).await.unwrap().unwrap().revision(), 1);

        // A second writer still holding revision 0 loses.
        let err = store.commit(0, &next).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.get(record.id()).await.unwrap(), Some(next));
    }

    #[tokio::test]
    async fn commit_of_unknown_character_is_not_found() {
        let store = InMemoryCharacterStore::new();
        let err = store.commit(0, &fresh()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.is_empty());
    }
}
