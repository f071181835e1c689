//! Create character use case.

use std::sync::Arc;

use sagaforge_domain::{AbilityScores, ActorKind, CharacterId, CharacterName, ProgressionCharacter};

use super::ProgressionError;
use crate::infrastructure::ports::CharacterStore;

/// Store a fresh level-0 record. Levels come only through intents.
pub struct CreateCharacter {
    store: Arc<dyn CharacterStore>,
}

impl CreateCharacter {
    pub fn new(store: Arc<dyn CharacterStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        name: CharacterName,
        actor_kind: ActorKind,
        ability_scores: AbilityScores,
    ) -> Result<ProgressionCharacter, ProgressionError> {
        let record = ProgressionCharacter::new(CharacterId::new(), name, actor_kind, ability_scores);
        self.store.create(&record).await?;

        tracing::info!(
            character_id = %record.id(),
            name = %record.name(),
            actor_kind = ?actor_kind,
            "Character created"
        );
        Ok(record)
    }
}
