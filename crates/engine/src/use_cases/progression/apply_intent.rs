//! Apply intent use case.
//!
//! The only write path for progression-owned fields. One intent runs
//! Capture → Validate → Resolve → Apply → Commit while holding the
//! character's lock, so intents against the same character never overlap.

use std::sync::Arc;

use sagaforge_domain::{
    capture, resolve, validate, ApplyOutcome, CharacterId, ProgressionCharacter,
    ProgressionIntent, RuleContext,
};

use super::{CharacterLocks, ProgressionError};
use crate::infrastructure::ports::{CharacterStore, ClockPort};

/// Result of a committed intent.
#[derive(Debug, Clone)]
pub struct IntentApplied {
    /// The record as stored after the commit
    pub record: ProgressionCharacter,
    pub outcome: ApplyOutcome,
    /// Non-blocking notes from validation (unspent slots and the like)
    pub warnings: Vec<String>,
}

pub struct ApplyIntent {
    store: Arc<dyn CharacterStore>,
    clock: Arc<dyn ClockPort>,
    rules: Arc<RuleContext>,
    locks: Arc<CharacterLocks>,
}

impl ApplyIntent {
    pub fn new(
        store: Arc<dyn CharacterStore>,
        clock: Arc<dyn ClockPort>,
        rules: Arc<RuleContext>,
        locks: Arc<CharacterLocks>,
    ) -> Self {
        Self {
            store,
            clock,
            rules,
            locks,
        }
    }

    /// Validate, resolve and commit one intent.
    ///
    /// # Returns
    /// * `Ok(IntentApplied)` - committed record and what changed
    /// * `Err(ProgressionError::Rejected)` - validation failed; nothing was written
    /// * `Err(ProgressionError::Stale)` - the record moved on; re-capture and retry
    /// * `Err(ProgressionError::InvariantViolation)` - a second writer was detected
    pub async fn execute(
        &self,
        character_id: CharacterId,
        intent: ProgressionIntent,
    ) -> Result<IntentApplied, ProgressionError> {
        let result = self.run(character_id, &intent).await;
        if let Err(err) = &result {
            log_failure(character_id, &intent, err);
        }
        result
    }

    async fn run(
        &self,
        character_id: CharacterId,
        intent: &ProgressionIntent,
    ) -> Result<IntentApplied, ProgressionError> {
        let _guard = self.locks.acquire(character_id).await;

        // 1. Capture the live record
        let record = self
            .store
            .get(character_id)
            .await?
            .ok_or(ProgressionError::CharacterNotFound(character_id))?;
        let snapshot = capture(&record, self.clock.now());

        // 2. Validate; rejection is data, not a failure of the engine
        let report = validate(&snapshot, intent, &self.rules)?;
        if !report.ok {
            return Err(ProgressionError::Rejected {
                errors: report.errors,
                warnings: report.warnings,
            });
        }

        // 3. Resolve and apply in memory
        let delta = resolve(&snapshot, intent, &self.rules)?;
        let (next, outcome) = record.apply_delta(&delta, &self.rules)?;

        // 4. Commit against the captured revision
        self.store
            .commit(snapshot.revision(), &next)
            .await
            .map_err(|e| ProgressionError::from_commit(character_id, e))?;

        // 5. Read back and check the stored record against the audit mirror
        let stored = self
            .store
            .get(character_id)
            .await?
            .ok_or(ProgressionError::CharacterNotFound(character_id))?;
        stored
            .verify_against(&delta.computed, &self.rules)
            .map_err(|e| ProgressionError::InvariantViolation(e.to_string()))?;

        tracing::info!(
            character_id = %character_id,
            intent = %intent,
            revision = outcome.revision,
            changes = outcome.changes.len(),
            "Progression intent applied"
        );

        Ok(IntentApplied {
            record: stored,
            outcome,
            warnings: report.warnings,
        })
    }
}

fn log_failure(character_id: CharacterId, intent: &ProgressionIntent, err: &ProgressionError) {
    match err {
        ProgressionError::Rejected { errors, .. } => tracing::warn!(
            character_id = %character_id,
            intent = %intent,
            errors = ?errors,
            "Progression intent rejected"
        ),
        ProgressionError::Stale { .. } => tracing::warn!(
            character_id = %character_id,
            intent = %intent,
            error = %err,
            "Stale progression intent"
        ),
        ProgressionError::InvariantViolation(_) | ProgressionError::Configuration(_) => {
            tracing::error!(
                character_id = %character_id,
                intent = %intent,
                error = %err,
                "Progression intent failed"
            )
        }
        _ => tracing::warn!(
            character_id = %character_id,
            intent = %intent,
            error = %err,
            "Progression intent failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::Sequence;
    use sagaforge_domain::{
        run_intent, AbilityScores, ActorKind, CharacterName, ClassId, FeatId,
    };

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::memory::InMemoryCharacterStore;
    use crate::infrastructure::ports::{MockCharacterStore, MockClockPort, RepoError};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap()
    }

    fn clock() -> Arc<MockClockPort> {
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(now);
        Arc::new(clock)
    }

    fn rules() -> Arc<RuleContext> {
        Arc::new(RuleContext::core().unwrap())
    }

    fn fresh(id: CharacterId) -> ProgressionCharacter {
        ProgressionCharacter::new(
            id,
            CharacterName::new("Kael Dorne").unwrap(),
            ActorKind::Organic,
            AbilityScores::average(),
        )
    }

    fn class(id: &str) -> ProgressionIntent {
        ProgressionIntent::add_class_level(ClassId::new(id).unwrap())
    }

    fn use_case(store: MockCharacterStore) -> ApplyIntent {
        ApplyIntent::new(
            Arc::new(store),
            clock(),
            rules(),
            Arc::new(CharacterLocks::new()),
        )
    }

    #[tokio::test]
    async fn when_character_missing_then_not_found() {
        let id = CharacterId::new();
        let mut store = MockCharacterStore::new();
        store
            .expect_get()
            .withf(move |got| *got == id)
            .returning(|_| Ok(None));

        let err = use_case(store).execute(id, class("scout")).await.unwrap_err();
        assert!(matches!(err, ProgressionError::CharacterNotFound(got) if got == id));
    }

    #[tokio::test]
    async fn when_intent_invalid_then_rejected_without_commit() {
        let id = CharacterId::new();
        let record = fresh(id);
        let mut store = MockCharacterStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(record.clone())));
        store.expect_commit().never();

        let err = use_case(store)
            .execute(id, ProgressionIntent::select_feat(FeatId::new("toughness").unwrap()))
            .await
            .unwrap_err();

        match err {
            ProgressionError::Rejected { errors, .. } => {
                assert!(errors.iter().any(|e| e.starts_with("No feat slots available")));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn when_valid_then_commits_against_captured_revision() {
        let id = CharacterId::new();
        let record = fresh(id);
        let (expected, _) = run_intent(&record, &class("soldier"), &rules(), now()).unwrap();

        let mut seq = Sequence::new();
        let mut store = MockCharacterStore::new();
        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(record.clone())));
        store
            .expect_commit()
            .withf(|expected_revision, next| *expected_revision == 0 && next.revision() == 1)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let stored = expected.clone();
        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(stored.clone())));

        let applied = use_case(store).execute(id, class("soldier")).await.unwrap();
        assert_eq!(applied.record, expected);
        assert_eq!(applied.outcome.revision, 1);
        assert_eq!(applied.record.bab(), 1);
        assert!(!applied.outcome.is_noop());
        assert!(applied.warnings.is_empty());
    }

    #[tokio::test]
    async fn when_commit_loses_race_then_stale() {
        let id = CharacterId::new();
        let record = fresh(id);
        let mut store = MockCharacterStore::new();
        store
            .expect_get()
            .times(1)
            .returning(move |_| Ok(Some(record.clone())));
        store
            .expect_commit()
            .returning(move |_, _| Err(RepoError::conflict("Character", id, 0, 1)));

        let err = use_case(store).execute(id, class("scout")).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(
            err,
            ProgressionError::Stale {
                expected_revision: 0,
                actual_revision: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn when_stored_record_disagrees_then_invariant_violation() {
        let id = CharacterId::new();
        let record = fresh(id);
        // Another writer stored a soldier where this intent committed a scout.
        let (tampered, _) = run_intent(&record, &class("soldier"), &rules(), now()).unwrap();

        let mut seq = Sequence::new();
        let mut store = MockCharacterStore::new();
        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(record.clone())));
        store
            .expect_commit()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(tampered.clone())));

        let err = use_case(store).execute(id, class("scout")).await.unwrap_err();
        assert!(matches!(err, ProgressionError::InvariantViolation(_)), "{err}");
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn concurrent_intents_on_one_character_are_serialized() {
        let id = CharacterId::new();
        let store = Arc::new(InMemoryCharacterStore::new());
        store.create(&fresh(id)).await.unwrap();

        let apply = Arc::new(ApplyIntent::new(
            store.clone(),
            Arc::new(FixedClock(now())),
            rules(),
            Arc::new(CharacterLocks::new()),
        ));
        let (a, b) = tokio::join!(
            apply.execute(id, class("scout")),
            apply.execute(id, class("scout"))
        );
        a.unwrap();
        b.unwrap();

        let record = store.get(id).await.unwrap().unwrap();
        assert_eq!(record.revision(), 2);
        assert_eq!(record.level(), 2);
        record.verify(&rules()).unwrap();
    }
}
