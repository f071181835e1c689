//! Progression use cases.
//!
//! Wraps the domain pipeline with persistence, locking and logging. The flow
//! for a level-up or selection is:
//! 1. Caller previews the intent (PreviewIntent) and shows any reasons
//! 2. Caller applies it (ApplyIntent): capture, validate, resolve, apply
//! 3. The new record is committed against the captured revision
//! 4. The stored record is read back and checked against the delta's mirror

use std::sync::Arc;

mod apply_intent;
mod create;
mod error;
mod locks;
mod preview;
mod rebuild;
mod sheet;

pub use apply_intent::{ApplyIntent, IntentApplied};
pub use create::CreateCharacter;
pub use error::ProgressionError;
pub use locks::{CharacterGuard, CharacterLocks};
pub use preview::PreviewIntent;
pub use rebuild::{RebuildCharacter, RebuildReport};
pub use sheet::GetCharacterSheet;

/// Container for progression use cases.
pub struct ProgressionUseCases {
    pub create: Arc<CreateCharacter>,
    pub apply: Arc<ApplyIntent>,
    pub preview: Arc<PreviewIntent>,
    pub rebuild: Arc<RebuildCharacter>,
    pub sheet: Arc<GetCharacterSheet>,
}

impl ProgressionUseCases {
    pub fn new(
        create: Arc<CreateCharacter>,
        apply: Arc<ApplyIntent>,
        preview: Arc<PreviewIntent>,
        rebuild: Arc<RebuildCharacter>,
        sheet: Arc<GetCharacterSheet>,
    ) -> Self {
        Self {
            create,
            apply,
            preview,
            rebuild,
            sheet,
        }
    }
}
