//! Preview intent use case.
//!
//! What UI and advisory callers use to ask "could I take this?" without
//! reimplementing any prerequisite logic. Never writes.

use std::sync::Arc;

use sagaforge_domain::{
    capture, check_prerequisites, evaluate_intent, CharacterId, IntentPreview,
    PrerequisiteCheck, PrerequisiteTarget, ProgressionIntent, RuleContext,
};

use super::ProgressionError;
use crate::infrastructure::ports::{CharacterStore, ClockPort};

pub struct PreviewIntent {
    store: Arc<dyn CharacterStore>,
    clock: Arc<dyn ClockPort>,
    rules: Arc<RuleContext>,
}

impl PreviewIntent {
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

    /// Validation report, plus the delta an apply would commit when valid.
    pub async fn execute(
        &self,
        character_id: CharacterId,
        intent: &ProgressionIntent,
    ) -> Result<IntentPreview, ProgressionError> {
        let record = self
            .store
            .get(character_id)
            .await?
            .ok_or(ProgressionError::CharacterNotFound(character_id))?;
        let snapshot = capture(&record, self.clock.now());
        let preview = evaluate_intent(&snapshot, intent, &self.rules)?;

        tracing::debug!(
            character_id = %character_id,
            intent = %intent,
            ok = preview.report.ok,
            "Previewed progression intent"
        );
        Ok(preview)
    }

    /// Prerequisites only, for listing options with their missing reasons.
    pub async fn prerequisites(
        &self,
        character_id: CharacterId,
        target: &PrerequisiteTarget,
    ) -> Result<PrerequisiteCheck, ProgressionError> {
        let record = self
            .store
            .get(character_id)
            .await?
            .ok_or(ProgressionError::CharacterNotFound(character_id))?;
        let snapshot = capture(&record, self.clock.now());
        Ok(check_prerequisites(target, &snapshot, &self.rules)?)
    }
}
