//! Sagaforge domain: character progression for a d20-style ruleset.
//!
//! Pure types and pure functions. Rule data arrives through the
//! [`RuleDataSource`] trait inside a [`RuleContext`]; nothing here performs
//! I/O or reads global state.

pub mod aggregates;
pub mod calculators;
pub mod character_sheet;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod progression;
pub mod rules;
pub mod value_objects;

pub use aggregates::ProgressionCharacter;
pub use character_sheet::{AbilityLine, AvailableSlots, CharacterSheet, ClassLine, EntryLine};
pub use entities::{
    ClassDefinition, ClassKind, ClassLevelRow, FeatDefinition, ForcePowerDefinition,
    Prerequisite, PrestigeRequirements, SkillDefinition, TalentDefinition,
};
pub use error::{ApplyError, ConfigurationError, DomainError, PipelineError, ReplayError};
pub use events::{ApplyOutcome, FieldChange};
pub use ids::CharacterId;
pub use progression::{
    capture, check_prerequisites, evaluate_intent, replay, resolve, run_intent, validate,
    CharacterSnapshot, IntentPreview, PrerequisiteCheck, PrerequisiteTarget, ProgressionDelta,
    ProgressionHistory, ProgressionIntent, ValidationReport,
};
pub use rules::{
    core_catalog, CatalogDocument, RuleCatalog, RuleContext, RuleDataSource, SpecialRule,
    SpecialRuleRegistry,
};
pub use value_objects::{
    Ability, AbilityScores, ActorKind, CharacterName, ClassId, ClassLevel, ClassLevels, Defense,
    DefenseSet, FeatId, ForcePowerId, ProgressionConfig, SkillId, TalentId,
};
