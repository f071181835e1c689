//! Domain Events
//!
//! Return types of aggregate mutations, communicating what happened when
//! state was modified.

pub mod progression_events;

pub use progression_events::{ApplyOutcome, FieldChange};
