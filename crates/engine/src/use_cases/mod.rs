//! Use cases - user story orchestration over the domain and ports.

pub mod progression;

pub use progression::ProgressionUseCases;
