//! Rebuild character use case.
//!
//! Replays a recorded intent history against a fresh record and compares
//! the result with what the store holds, if anything.

use std::sync::Arc;

use sagaforge_domain::{replay, CharacterId, ProgressionCharacter, ProgressionHistory, RuleContext};

use super::ProgressionError;
use crate::infrastructure::ports::{CharacterStore, ClockPort};

#[derive(Debug, Clone)]
pub struct RebuildReport {
    pub record: ProgressionCharacter,
    /// `None` when the store has no record under that id
    pub matches_stored: Option<bool>,
}

pub struct RebuildCharacter {
    store: Arc<dyn CharacterStore>,
    clock: Arc<dyn ClockPort>,
    rules: Arc<RuleContext>,
}

impl RebuildCharacter {
    pub fn new(
        store: Arc<dyn CharacterStore>,
        clock: Arc<dyn ClockPort>,
        rules: Arc<RuleContext>,
    ) -> Self {
        Self {
            store,
            clock,
            rules,
        }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        history: &ProgressionHistory,
    ) -> Result<RebuildReport, ProgressionError> {
        let record = replay(history, character_id, &self.rules, self.clock.now())?;

        let matches_stored = self
            .store
            .get(character_id)
            .await?
            .map(|stored| stored == record);
        if matches_stored == Some(false) {
            tracing::warn!(
                character_id = %character_id,
                steps = history.intents.len(),
                "Rebuilt record differs from the stored record"
            );
        } else {
            tracing::info!(
                character_id = %character_id,
                steps = history.intents.len(),
                level = record.level(),
                "Rebuilt character from history"
            );
        }

        Ok(RebuildReport {
            record,
            matches_stored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sagaforge_domain::{
        AbilityScores, ActorKind, CharacterName, ClassId, FeatId, ProgressionIntent,
    };

    use crate::infrastructure::ports::{MockCharacterStore, MockClockPort};

    fn clock() -> Arc<MockClockPort> {
        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2026, 7, 4, 0, 0, 0).unwrap());
        Arc::new(clock)
    }

    fn history() -> ProgressionHistory {
        ProgressionHistory::new(
            CharacterName::new("Oro Vask").unwrap(),
            ActorKind::Organic,
            AbilityScores::average(),
        )
        .with_intent(ProgressionIntent::add_class_level(ClassId::new("soldier").unwrap()))
        .with_intent(ProgressionIntent::select_feat(FeatId::new("toughness").unwrap()))
        .with_intent(ProgressionIntent::add_class_level(ClassId::new("soldier").unwrap()))
    }

    fn rebuild(store: MockCharacterStore) -> RebuildCharacter {
        RebuildCharacter::new(
            Arc::new(store),
            clock(),
            Arc::new(RuleContext::core().unwrap()),
        )
    }

    #[tokio::test]
    async fn matches_the_record_it_was_built_from() {
        let id = CharacterId::new();
        let rules = RuleContext::core().unwrap();
        let stored = replay(
            &history(),
            id,
            &rules,
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap();

        let mut store = MockCharacterStore::new();
        store
            .expect_get()
            .withf(move |got| *got == id)
            .returning(move |_| Ok(Some(stored.clone())));

        let report = rebuild(store).execute(id, &history()).await.unwrap();
        assert_eq!(report.matches_stored, Some(true));
        assert_eq!(report.record.level(), 2);
        assert_eq!(report.record.revision(), 3);
    }

    #[tokio::test]
    async fn unknown_character_has_nothing_to_compare() {
        let mut store = MockCharacterStore::new();
        store.expect_get().returning(|_| Ok(None));

        let report = rebuild(store)
            .execute(CharacterId::new(), &history())
            .await
            .unwrap();
        assert_eq!(report.matches_stored, None);
    }

    #[tokio::test]
    async fn diverging_store_is_flagged() {
        let id = CharacterId::new();
        let other = history().initial_record(id);
        let mut store = MockCharacterStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(other.clone())));

        let report = rebuild(store).execute(id, &history()).await.unwrap();
        assert_eq!(report.matches_stored, Some(false));
    }

    #[tokio::test]
    async fn failing_step_is_reported() {
        let history = history().with_intent(ProgressionIntent::select_feat(
            FeatId::new("toughness").unwrap(),
        ));
        let err = rebuild(MockCharacterStore::new())
            .execute(CharacterId::new(), &history)
            .await
            .unwrap_err();
        match err {
            ProgressionError::Replay(replay) => assert_eq!(replay.step, 3),
            other => panic!("expected replay failure, got {other:?}"),
        }
    }
}
