//! Application state and composition.

use std::sync::Arc;

use sagaforge_domain::RuleContext;

use crate::infrastructure::{
    clock::SystemClock,
    importers::ImportError,
    memory::InMemoryCharacterStore,
    ports::{CharacterStore, ClockPort},
    settings::EngineSettings,
};
use crate::use_cases;
use crate::use_cases::progression::{
    ApplyIntent, CharacterLocks, CreateCharacter, GetCharacterSheet, PreviewIntent,
    RebuildCharacter,
};

/// Main application state.
///
/// Holds the rule context, the ports and every use case wired to them.
pub struct App {
    pub rules: Arc<RuleContext>,
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for all repository ports.
pub struct Repositories {
    pub character: Arc<dyn CharacterStore>,
}

/// Container for all use cases.
pub struct UseCases {
    pub progression: use_cases::ProgressionUseCases,
}

impl App {
    pub fn new(
        rules: RuleContext,
        character: Arc<dyn CharacterStore>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let rules = Arc::new(rules);
        let locks = Arc::new(CharacterLocks::new());

        let progression = use_cases::ProgressionUseCases::new(
            Arc::new(CreateCharacter::new(character.clone())),
            Arc::new(ApplyIntent::new(
                character.clone(),
                clock.clone(),
                rules.clone(),
                locks,
            )),
            Arc::new(PreviewIntent::new(
                character.clone(),
                clock.clone(),
                rules.clone(),
            )),
            Arc::new(RebuildCharacter::new(
                character.clone(),
                clock,
                rules.clone(),
            )),
            Arc::new(GetCharacterSheet::new(character.clone(), rules.clone())),
        );

        Self {
            rules,
            repositories: Repositories { character },
            use_cases: UseCases { progression },
        }
    }

    /// Rule content from the configured files, an in-memory store and the
    /// system clock.
    pub async fn from_settings(settings: &EngineSettings) -> Result<Self, ImportError> {
        let rules = settings.importer().import_context().await?;
        tracing::info!(rules = ?rules, "Rule context loaded");
        Ok(Self::new(
            rules,
            Arc::new(InMemoryCharacterStore::new()),
            Arc::new(SystemClock::new()),
        ))
    }
}
