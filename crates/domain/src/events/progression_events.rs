//! Outcomes of applying a progression delta.

use serde::{Deserialize, Serialize};

use crate::ids::CharacterId;
use crate::progression::{Collection, FieldPath, FieldValue, ProgressionIntent};

/// One field write as it was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: FieldPath,
    pub from: FieldValue,
    pub to: FieldValue,
}

/// What a successful apply did to the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub character_id: CharacterId,
    /// Revision of the record after the apply
    pub revision: u64,
    pub intent: ProgressionIntent,
    pub changes: Vec<FieldChange>,
    pub added: Vec<(Collection, Vec<String>)>,
    pub removed: Vec<(Collection, Vec<String>)>,
}

impl ApplyOutcome {
    /// Whether anything beyond the revision changed.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }

    /// One line per change, for logs and the command-line tool.
    pub fn summary(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .changes
            .iter()
            .map(|c| format!("{}: {} -> {}", c.field, c.from, c.to))
            .collect();
        for (collection, ids) in &self.added {
            lines.push(format!("+{}: {}", collection, ids.join(", ")));
        }
        for (collection, ids) in &self.removed {
            lines.push(format!("-{}: {}", collection, ids.join(", ")));
        }
        lines
    }
}
