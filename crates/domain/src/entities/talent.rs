//! Talent and Force power metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::feat::Prerequisite;
use crate::value_objects::{ForcePowerId, TalentId, TalentTreeId};

/// A talent drawn from a class talent tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TalentDefinition {
    pub id: TalentId,
    pub name: String,
    /// Tree this talent belongs to; only classes offering the tree can take it
    pub tree: TalentTreeId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl TalentDefinition {
    pub fn new(id: TalentId, name: impl Into<String>, tree: TalentTreeId) -> Self {
        Self {
            id,
            name: name.into(),
            tree,
            description: String::new(),
            prerequisites: Vec::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_prerequisite(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisites.push(prerequisite);
        self
    }
}

/// A Force power that can fill a Force power slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForcePowerDefinition {
    pub id: ForcePowerId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl ForcePowerDefinition {
    pub fn new(id: ForcePowerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            prerequisites: Vec::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_prerequisite(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisites.push(prerequisite);
        self
    }
}
