//! Named semantic prerequisites.
//!
//! Some requirements ("must be Force-sensitive") cannot be expressed as a
//! threshold. Each one is a [`SpecialRule`] registered exactly once; the
//! prerequisite checker is the only caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::traits::RuleDataSource;
use crate::error::ConfigurationError;
use crate::progression::CharacterSnapshot;
use crate::value_objects::{ClassId, FeatId, SpecialRuleId};

/// A pure predicate over a snapshot.
pub trait SpecialRule: Send + Sync {
    fn rule_id(&self) -> &SpecialRuleId;

    /// Human-readable requirement, used in rejection reasons.
    fn description(&self) -> &str;

    fn is_satisfied(&self, snapshot: &CharacterSnapshot, data: &dyn RuleDataSource) -> bool;
}

/// Registry of special rules, one implementation per id.
pub struct SpecialRuleRegistry {
    rules: BTreeMap<SpecialRuleId, Arc<dyn SpecialRule>>,
}

impl std::fmt::Debug for SpecialRuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecialRuleRegistry")
            .field("rules", &self.list_rules())
            .finish()
    }
}

impl SpecialRuleRegistry {
    /// Create a registry with the built-in core rules.
    pub fn new() -> Result<Self, ConfigurationError> {
        let mut registry = Self::empty();
        registry.register(Arc::new(ForceSensitive::new()?))?;
        registry.register(Arc::new(JediMember::new()?))?;
        Ok(registry)
    }

    /// Create an empty registry without built-in rules.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// # Errors
    ///
    /// `DuplicateSpecialRule` if the id is already registered.
    pub fn register(&mut self, rule: Arc<dyn SpecialRule>) -> Result<(), ConfigurationError> {
        let id = rule.rule_id().clone();
        if self.rules.contains_key(&id) {
            return Err(ConfigurationError::DuplicateSpecialRule(id));
        }
        self.rules.insert(id, rule);
        Ok(())
    }

    pub fn get(&self, id: &SpecialRuleId) -> Option<Arc<dyn SpecialRule>> {
        self.rules.get(id).cloned()
    }

    pub fn contains(&self, id: &SpecialRuleId) -> bool {
        self.rules.contains_key(id)
    }

    /// # Errors
    ///
    /// `UnknownSpecialRule` when nothing is registered under `id`.
    pub fn evaluate(
        &self,
        id: &SpecialRuleId,
        snapshot: &CharacterSnapshot,
        data: &dyn RuleDataSource,
    ) -> Result<bool, ConfigurationError> {
        self.rules
            .get(id)
            .map(|rule| rule.is_satisfied(snapshot, data))
            .ok_or_else(|| ConfigurationError::UnknownSpecialRule(id.clone()))
    }

    pub fn list_rules(&self) -> Vec<&str> {
        self.rules.keys().map(SpecialRuleId::as_str).collect()
    }

    pub fn list_rules_with_descriptions(&self) -> Vec<(&str, &str)> {
        self.rules
            .iter()
            .map(|(id, rule)| (id.as_str(), rule.description()))
            .collect()
    }
}

// =============================================================================
// Built-in rules
// =============================================================================

/// Holds Force Sensitivity, or has levels in a Force-using class.
pub struct ForceSensitive {
    id: SpecialRuleId,
    feat: FeatId,
}

impl ForceSensitive {
    pub fn new() -> Result<Self, ConfigurationError> {
        Ok(Self {
            id: SpecialRuleId::new("force_sensitive")?,
            feat: FeatId::new("force_sensitivity")?,
        })
    }
}

impl SpecialRule for ForceSensitive {
    fn rule_id(&self) -> &SpecialRuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Force-sensitive (Force Sensitivity feat or a Force-using class)"
    }

    fn is_satisfied(&self, snapshot: &CharacterSnapshot, data: &dyn RuleDataSource) -> bool {
        snapshot.holds_feat(&self.feat)
            || snapshot
                .class_levels()
                .classes_taken()
                .into_iter()
                .any(|class_id| data.class(class_id).is_some_and(|class| class.force_user))
    }
}

/// Has at least one level in the Jedi class.
pub struct JediMember {
    id: SpecialRuleId,
    class: ClassId,
}

impl JediMember {
    pub fn new() -> Result<Self, ConfigurationError> {
        Ok(Self {
            id: SpecialRuleId::new("jedi_member")?,
            class: ClassId::new("jedi")?,
        })
    }
}

impl SpecialRule for JediMember {
    fn rule_id(&self) -> &SpecialRuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Member of the Jedi order (a level in Jedi)"
    }

    fn is_satisfied(&self, snapshot: &CharacterSnapshot, _data: &dyn RuleDataSource) -> bool {
        snapshot.class_levels().has_class(&self.class)
    }
}
