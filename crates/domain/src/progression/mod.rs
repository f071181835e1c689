//! The progression pipeline.
//!
//! ```text
//! record ──capture──▶ snapshot ──validate──▶ report
//!                        │                     │ ok
//!                        └───────resolve───────┴──▶ delta ──apply_delta──▶ record'
//! ```
//!
//! Everything here is synchronous and free of I/O. The only mutation point
//! is [`ProgressionCharacter::apply_delta`](crate::aggregates::ProgressionCharacter::apply_delta).

mod delta;
mod intent;
mod pipeline;
mod prerequisites;
mod resolver;
mod snapshot;
mod validator;

pub use delta::{
    Collection, ComputedMirror, FieldPath, FieldValue, ItemChanges, ProgressionDelta,
};
pub use intent::ProgressionIntent;
pub use pipeline::{evaluate_intent, replay, run_intent, IntentPreview, ProgressionHistory};
pub use prerequisites::{
    check_class, check_feat, check_force_power, check_prerequisites, check_prestige_class,
    check_talent, evaluate, PrerequisiteCheck, PrerequisiteTarget,
};
pub use resolver::resolve;
pub use snapshot::{capture, CharacterSnapshot, DerivedValues};
pub use validator::{validate, ValidationReport};
