//! Character sheet use case.

use std::sync::Arc;

use sagaforge_domain::{CharacterId, CharacterSheet, RuleContext};

use super::ProgressionError;
use crate::infrastructure::ports::CharacterStore;

/// Read-only sheet for a stored character.
pub struct GetCharacterSheet {
    store: Arc<dyn CharacterStore>,
    rules: Arc<RuleContext>,
}

impl GetCharacterSheet {
    pub fn new(store: Arc<dyn CharacterStore>, rules: Arc<RuleContext>) -> Self {
        Self { store, rules }
    }

    pub async fn execute(&self, character_id: CharacterId) -> Result<CharacterSheet, ProgressionError> {
        let record = self
            .store
            .get(character_id)
            .await?
            .ok_or(ProgressionError::CharacterNotFound(character_id))?;
        Ok(CharacterSheet::project(&record, &self.rules)?)
    }
}
