//! In-memory rule catalog.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::traits::RuleDataSource;
use crate::entities::{
    ClassDefinition, FeatDefinition, ForcePowerDefinition, Prerequisite, SkillDefinition,
    TalentDefinition,
};
use crate::error::ConfigurationError;
use crate::value_objects::{ClassId, FeatId, ForcePowerId, SkillId, TalentId, TalentTreeId};

/// Serialized form of a catalog, as stored in rule content files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogDocument {
    pub classes: Vec<ClassDefinition>,
    pub feats: Vec<FeatDefinition>,
    pub talents: Vec<TalentDefinition>,
    pub force_powers: Vec<ForcePowerDefinition>,
    pub skills: Vec<SkillDefinition>,
}

/// Validated, immutable rule content keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    classes: BTreeMap<ClassId, ClassDefinition>,
    feats: BTreeMap<FeatId, FeatDefinition>,
    talents: BTreeMap<TalentId, TalentDefinition>,
    force_powers: BTreeMap<ForcePowerId, ForcePowerDefinition>,
    skills: BTreeMap<SkillId, SkillDefinition>,
}

impl RuleCatalog {
    pub fn builder() -> RuleCatalogBuilder {
        RuleCatalogBuilder::default()
    }

    /// # Errors
    ///
    /// Any duplicate id or dangling cross-reference in the document.
    pub fn from_document(document: CatalogDocument) -> Result<Self, ConfigurationError> {
        Self::collect(document).build()
    }

    /// Copy with a document's entries layered on top, the document winning
    /// on id clashes. The document may reference entries of `self`; only the
    /// combined catalog has to be consistent.
    ///
    /// # Errors
    ///
    /// A duplicate id inside the document, or a dangling cross-reference in
    /// the combined catalog.
    pub fn extended_with(&self, document: CatalogDocument) -> Result<Self, ConfigurationError> {
        let overlay = Self::collect(document).unchecked()?;
        self.merged_with(&overlay)
    }

    fn collect(document: CatalogDocument) -> RuleCatalogBuilder {
        let mut builder = Self::builder();
        for class in document.classes {
            builder = builder.class(class);
        }
        for feat in document.feats {
            builder = builder.feat(feat);
        }
        for talent in document.talents {
            builder = builder.talent(talent);
        }
        for power in document.force_powers {
            builder = builder.force_power(power);
        }
        for skill in document.skills {
            builder = builder.skill(skill);
        }
        builder
    }

    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            classes: self.classes.values().cloned().collect(),
            feats: self.feats.values().cloned().collect(),
            talents: self.talents.values().cloned().collect(),
            force_powers: self.force_powers.values().cloned().collect(),
            skills: self.skills.values().cloned().collect(),
        }
    }

    /// Copy with every entry of `other` added, `other` winning on id clashes.
    pub fn merged_with(&self, other: &RuleCatalog) -> Result<Self, ConfigurationError> {
        let mut merged = self.clone();
        merged.classes.extend(other.classes.clone());
        merged.feats.extend(other.feats.clone());
        merged.talents.extend(other.talents.clone());
        merged.force_powers.extend(other.force_powers.clone());
        merged.skills.extend(other.skills.clone());
        merged.validate()?;
        Ok(merged)
    }

    /// Cross-reference checks: every id the content mentions must resolve.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let trees: BTreeSet<&TalentTreeId> = self
            .classes
            .values()
            .flat_map(|class| class.talent_trees.iter())
            .collect();

        for class in self.classes.values() {
            class.validate()?;
            for feat in class
                .starting_feats
                .iter()
                .chain(class.levels.iter().flat_map(|row| row.granted_feats.iter()))
            {
                self.require_feat(feat)?;
            }
            for skill in &class.class_skills {
                self.require_skill(skill)?;
            }
            if let Some(req) = &class.requirements {
                for feat in &req.required_feats {
                    self.require_feat(feat)?;
                }
                for talent in &req.required_talents {
                    self.require_talent(talent)?;
                }
                for skill in &req.required_skills {
                    self.require_skill(skill)?;
                }
            }
        }

        for talent in self.talents.values() {
            if !trees.contains(&talent.tree) {
                return Err(ConfigurationError::Malformed(format!(
                    "talent {} belongs to tree {} which no class offers",
                    talent.id, talent.tree
                )));
            }
        }

        let prerequisites = self
            .feats
            .values()
            .flat_map(|feat| feat.prerequisites.iter())
            .chain(self.talents.values().flat_map(|t| t.prerequisites.iter()))
            .chain(self.force_powers.values().flat_map(|p| p.prerequisites.iter()));
        for prerequisite in prerequisites {
            self.check_references(prerequisite)?;
        }
        Ok(())
    }

    fn check_references(&self, prerequisite: &Prerequisite) -> Result<(), ConfigurationError> {
        match prerequisite {
            Prerequisite::TrainedSkill { skill_id } => self.require_skill(skill_id).map(|_| ()),
            Prerequisite::HasFeat { feat_id } => self.require_feat(feat_id).map(|_| ()),
            Prerequisite::HasTalent { talent_id } => self.require_talent(talent_id).map(|_| ()),
            Prerequisite::HasClass { class_id, .. } => self.require_class(class_id).map(|_| ()),
            Prerequisite::AnyOf { options: nested } | Prerequisite::AllOf { requirements: nested } => {
                nested.iter().try_for_each(|inner| self.check_references(inner))
            }
            _ => Ok(()),
        }
    }
}

impl RuleDataSource for RuleCatalog {
    fn class(&self, id: &ClassId) -> Option<&ClassDefinition> {
        self.classes.get(id)
    }

    fn feat(&self, id: &FeatId) -> Option<&FeatDefinition> {
        self.feats.get(id)
    }

    fn talent(&self, id: &TalentId) -> Option<&TalentDefinition> {
        self.talents.get(id)
    }

    fn force_power(&self, id: &ForcePowerId) -> Option<&ForcePowerDefinition> {
        self.force_powers.get(id)
    }

    fn skill(&self, id: &SkillId) -> Option<&SkillDefinition> {
        self.skills.get(id)
    }

    fn classes(&self) -> Vec<&ClassDefinition> {
        self.classes.values().collect()
    }

    fn feats(&self) -> Vec<&FeatDefinition> {
        self.feats.values().collect()
    }

    fn talents(&self) -> Vec<&TalentDefinition> {
        self.talents.values().collect()
    }

    fn force_powers(&self) -> Vec<&ForcePowerDefinition> {
        self.force_powers.values().collect()
    }

    fn skills(&self) -> Vec<&SkillDefinition> {
        self.skills.values().collect()
    }
}

/// Collects entries and rejects duplicates at `build` time.
#[derive(Debug, Default)]
pub struct RuleCatalogBuilder {
    catalog: RuleCatalog,
    duplicate: Option<ConfigurationError>,
}

impl RuleCatalogBuilder {
    fn note_duplicate(&mut self, kind: &'static str, id: &str) {
        if self.duplicate.is_none() {
            self.duplicate = Some(ConfigurationError::DuplicateEntry {
                kind,
                id: id.to_string(),
            });
        }
    }

    pub fn class(mut self, class: ClassDefinition) -> Self {
        if self.catalog.classes.contains_key(&class.id) {
            self.note_duplicate("class", class.id.as_str());
        } else {
            self.catalog.classes.insert(class.id.clone(), class);
        }
        self
    }

    pub fn feat(mut self, feat: FeatDefinition) -> Self {
        if self.catalog.feats.contains_key(&feat.id) {
            self.note_duplicate("feat", feat.id.as_str());
        } else {
            self.catalog.feats.insert(feat.id.clone(), feat);
        }
        self
    }

    pub fn talent(mut self, talent: TalentDefinition) -> Self {
        if self.catalog.talents.contains_key(&talent.id) {
            self.note_duplicate("talent", talent.id.as_str());
        } else {
            self.catalog.talents.insert(talent.id.clone(), talent);
        }
        self
    }

    pub fn force_power(mut self, power: ForcePowerDefinition) -> Self {
        if self.catalog.force_powers.contains_key(&power.id) {
            self.note_duplicate("force power", power.id.as_str());
        } else {
            self.catalog.force_powers.insert(power.id.clone(), power);
        }
        self
    }

    pub fn skill(mut self, skill: SkillDefinition) -> Self {
        if self.catalog.skills.contains_key(&skill.id) {
            self.note_duplicate("skill", skill.id.as_str());
        } else {
            self.catalog.skills.insert(skill.id.clone(), skill);
        }
        self
    }

    /// # Errors
    ///
    /// The first duplicate seen, or the first failed cross-reference.
    pub fn build(self) -> Result<RuleCatalog, ConfigurationError> {
        let catalog = self.unchecked()?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Duplicates only; cross-references are left to the caller.
    fn unchecked(self) -> Result<RuleCatalog, ConfigurationError> {
        match self.duplicate {
            Some(err) => Err(err),
            None => Ok(self.catalog),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ClassKind;
    use crate::value_objects::{Ability, DefenseSet};

    fn soldier() -> ClassDefinition {
        ClassDefinition::new(
            ClassId::new("soldier").unwrap(),
            "Soldier",
            ClassKind::Base,
            10,
            30,
        )
        .with_standard_table(20, 1.0, DefenseSet::new(2, 1, 0))
    }

    #[test]
    fn duplicate_class_is_rejected() {
        let result = RuleCatalog::builder().class(soldier()).class(soldier()).build();
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::DuplicateEntry {
                kind: "class",
                id: "soldier".into()
            }
        );
    }

    #[test]
    fn dangling_feat_reference_is_rejected() {
        let feat = FeatDefinition::new(FeatId::new("cleave").unwrap(), "Cleave")
            .with_prerequisite(Prerequisite::has_feat(FeatId::new("power_attack").unwrap()));
        let result = RuleCatalog::builder().class(soldier()).feat(feat).build();
        assert!(matches!(
            result,
            Err(ConfigurationError::UnknownFeat(id)) if id.as_str() == "power_attack"
        ));
    }

    #[test]
    fn orphan_talent_tree_is_rejected() {
        let talent = TalentDefinition::new(
            TalentId::new("block").unwrap(),
            "Block",
            TalentTreeId::new("lightsaber_combat").unwrap(),
        );
        let result = RuleCatalog::builder().class(soldier()).talent(talent).build();
        assert!(matches!(result, Err(ConfigurationError::Malformed(_))));
    }

    #[test]
    fn document_round_trip_keeps_entries() {
        let catalog = RuleCatalog::builder()
            .class(soldier())
            .skill(SkillDefinition::new(
                SkillId::new("climb").unwrap(),
                "Climb",
                Ability::Str,
            ))
            .build()
            .unwrap();

        let json = serde_json::to_string(&catalog.to_document()).unwrap();
        let document: CatalogDocument = serde_json::from_str(&json).unwrap();
        let reloaded = RuleCatalog::from_document(document).unwrap();

        assert!(reloaded.class(&ClassId::new("soldier").unwrap()).is_some());
        assert_eq!(reloaded.skills().len(), 1);
    }

    #[test]
    fn missing_class_is_configuration_error() {
        let catalog = RuleCatalog::builder().build().unwrap();
        let missing = ClassId::new("jedi_knight").unwrap();
        assert_eq!(
            catalog.class_level_table(&missing).unwrap_err(),
            ConfigurationError::UnknownClass(missing)
        );
    }

    #[test]
    fn document_may_reference_the_base_catalog() {
        let base = RuleCatalog::builder()
            .class(soldier())
            .feat(FeatDefinition::new(FeatId::new("power_attack").unwrap(), "Power Attack"))
            .build()
            .unwrap();
        let document = CatalogDocument {
            feats: vec![FeatDefinition::new(FeatId::new("cleave").unwrap(), "Cleave")
                .with_prerequisite(Prerequisite::has_feat(FeatId::new("power_attack").unwrap()))],
            ..CatalogDocument::default()
        };

        assert!(RuleCatalog::from_document(document.clone()).is_err());
        let extended = base.extended_with(document).unwrap();
        assert_eq!(extended.feats().len(), 2);
    }
}
