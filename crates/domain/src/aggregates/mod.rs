//! Aggregate roots - domain objects that own their related data
//!
//! The progression record is the only aggregate. It:
//! - Has a unique identity and a revision used as the staleness token
//! - Keeps its fields private; reads go through accessors
//! - Changes only through `apply_delta`, which returns a new record and an
//!   [`ApplyOutcome`](crate::events::ApplyOutcome) describing the change

pub mod character;

pub use character::ProgressionCharacter;
