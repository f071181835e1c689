//! Rule Data Source, special-rule registry and the context bundle the
//! pipeline receives.

mod catalog;
mod saga_core;
mod special;
mod traits;

use std::sync::Arc;

pub use catalog::{CatalogDocument, RuleCatalog, RuleCatalogBuilder};
pub use saga_core::core_catalog;
pub use special::{ForceSensitive, JediMember, SpecialRule, SpecialRuleRegistry};
pub use traits::RuleDataSource;

use crate::error::ConfigurationError;
use crate::value_objects::ProgressionConfig;

/// Everything the pipeline reads besides the snapshot itself.
#[derive(Clone)]
pub struct RuleContext {
    data: Arc<dyn RuleDataSource>,
    special: Arc<SpecialRuleRegistry>,
    config: ProgressionConfig,
}

impl std::fmt::Debug for RuleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleContext")
            .field("classes", &self.data.classes().len())
            .field("special", &self.special)
            .field("config", &self.config)
            .finish()
    }
}

impl RuleContext {
    /// # Errors
    ///
    /// Invalid configuration, or rule data naming a special rule that is
    /// not registered.
    pub fn new(
        data: Arc<dyn RuleDataSource>,
        special: Arc<SpecialRuleRegistry>,
        config: ProgressionConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let feat_rules = data
            .feats()
            .into_iter()
            .flat_map(|feat| feat.prerequisites.iter())
            .chain(data.talents().into_iter().flat_map(|t| t.prerequisites.iter()))
            .chain(data.force_powers().into_iter().flat_map(|p| p.prerequisites.iter()))
            .flat_map(|prerequisite| prerequisite.referenced_special_rules())
            .cloned()
            .collect::<Vec<_>>();
        let class_rules = data
            .classes()
            .into_iter()
            .filter_map(|class| class.requirements.as_ref())
            .flat_map(|req| req.special.iter())
            .cloned()
            .collect::<Vec<_>>();
        for rule_id in feat_rules.into_iter().chain(class_rules) {
            if !special.contains(&rule_id) {
                return Err(ConfigurationError::UnknownSpecialRule(rule_id));
            }
        }

        Ok(Self {
            data,
            special,
            config,
        })
    }

    /// Core content, core special rules and default configuration.
    pub fn core() -> Result<Self, ConfigurationError> {
        Self::with_config(ProgressionConfig::default())
    }

    /// Core content and special rules with a custom configuration.
    pub fn with_config(config: ProgressionConfig) -> Result<Self, ConfigurationError> {
        Self::new(
            Arc::new(core_catalog()?),
            Arc::new(SpecialRuleRegistry::new()?),
            config,
        )
    }

    pub fn data(&self) -> &dyn RuleDataSource {
        self.data.as_ref()
    }

    pub fn special(&self) -> &SpecialRuleRegistry {
        &self.special
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }
}
