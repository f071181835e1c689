//! Content importers.
//!
//! Loads rule content and progression configuration from JSON files,
//! converting them to the domain's catalog and config types.

mod rule_files;

pub use rule_files::{ImportError, RuleFileImporter};
