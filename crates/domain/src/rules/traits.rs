//! The Rule Data Source seam.

use crate::entities::{
    ClassDefinition, ClassLevelRow, FeatDefinition, ForcePowerDefinition, PrestigeRequirements,
    SkillDefinition, TalentDefinition,
};
use crate::error::ConfigurationError;
use crate::value_objects::{ClassId, FeatId, ForcePowerId, SkillId, TalentId};

/// Read-only keyed lookup of static rule content.
///
/// Injected explicitly into every calculator and validator; there is no
/// ambient global table. The `require_*` methods turn an absent entry into
/// a [`ConfigurationError`], which callers must propagate rather than skip.
pub trait RuleDataSource: Send + Sync {
    fn class(&self, id: &ClassId) -> Option<&ClassDefinition>;
    fn feat(&self, id: &FeatId) -> Option<&FeatDefinition>;
    fn talent(&self, id: &TalentId) -> Option<&TalentDefinition>;
    fn force_power(&self, id: &ForcePowerId) -> Option<&ForcePowerDefinition>;
    fn skill(&self, id: &SkillId) -> Option<&SkillDefinition>;

    fn classes(&self) -> Vec<&ClassDefinition>;
    fn feats(&self) -> Vec<&FeatDefinition>;
    fn talents(&self) -> Vec<&TalentDefinition>;
    fn force_powers(&self) -> Vec<&ForcePowerDefinition>;
    fn skills(&self) -> Vec<&SkillDefinition>;

    fn require_class(&self, id: &ClassId) -> Result<&ClassDefinition, ConfigurationError> {
        self.class(id)
            .ok_or_else(|| ConfigurationError::UnknownClass(id.clone()))
    }

    fn require_feat(&self, id: &FeatId) -> Result<&FeatDefinition, ConfigurationError> {
        self.feat(id)
            .ok_or_else(|| ConfigurationError::UnknownFeat(id.clone()))
    }

    fn require_talent(&self, id: &TalentId) -> Result<&TalentDefinition, ConfigurationError> {
        self.talent(id)
            .ok_or_else(|| ConfigurationError::UnknownTalent(id.clone()))
    }

    fn require_force_power(
        &self,
        id: &ForcePowerId,
    ) -> Result<&ForcePowerDefinition, ConfigurationError> {
        self.force_power(id)
            .ok_or_else(|| ConfigurationError::UnknownForcePower(id.clone()))
    }

    fn require_skill(&self, id: &SkillId) -> Result<&SkillDefinition, ConfigurationError> {
        self.skill(id)
            .ok_or_else(|| ConfigurationError::UnknownSkill(id.clone()))
    }

    /// Per-level table of a class.
    fn class_level_table(&self, id: &ClassId) -> Result<&[ClassLevelRow], ConfigurationError> {
        self.require_class(id).map(|class| class.levels.as_slice())
    }

    /// Prestige gate of a class, `None` for base classes.
    fn prestige_requirements(
        &self,
        id: &ClassId,
    ) -> Result<Option<&PrestigeRequirements>, ConfigurationError> {
        self.require_class(id).map(|class| class.requirements.as_ref())
    }

    /// Feat metadata (prerequisites and tags).
    fn feat_metadata(&self, id: &FeatId) -> Result<&FeatDefinition, ConfigurationError> {
        self.require_feat(id)
    }
}
