//! In-memory persistence adapters.

mod character_store;

pub use character_store::InMemoryCharacterStore;
