//! Capture → validate → resolve → apply, as one synchronous call.
//!
//! The engine wraps these with persistence and locking; the domain versions
//! are what replay and the tests drive directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::delta::ProgressionDelta;
use super::intent::ProgressionIntent;
use super::resolver::resolve;
use super::snapshot::{capture, CharacterSnapshot};
use super::validator::{validate, ValidationReport};
use crate::aggregates::ProgressionCharacter;
use crate::error::{ConfigurationError, PipelineError, ReplayError};
use crate::events::ApplyOutcome;
use crate::ids::CharacterId;
use crate::rules::RuleContext;
use crate::value_objects::{AbilityScores, ActorKind, CharacterName};

/// What an intent would do, without doing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentPreview {
    pub report: ValidationReport,
    /// Present only when the report is ok
    pub delta: Option<ProgressionDelta>,
}

/// Validate and, when valid, resolve. Never mutates anything.
///
/// # Errors
///
/// Missing rule data.
pub fn evaluate_intent(
    snapshot: &CharacterSnapshot,
    intent: &ProgressionIntent,
    ctx: &RuleContext,
) -> Result<IntentPreview, ConfigurationError> {
    let report = validate(snapshot, intent, ctx)?;
    let delta = if report.ok {
        Some(resolve(snapshot, intent, ctx)?)
    } else {
        None
    };
    Ok(IntentPreview { report, delta })
}

/// Run one intent through the whole pipeline against `record`.
///
/// Returns the new record; `record` itself is never modified.
///
/// # Errors
///
/// - `Rejected` with the validator's reasons
/// - `Configuration` for missing rule data
/// - `Apply` when the delta cannot be committed
pub fn run_intent(
    record: &ProgressionCharacter,
    intent: &ProgressionIntent,
    ctx: &RuleContext,
    captured_at: DateTime<Utc>,
) -> Result<(ProgressionCharacter, ApplyOutcome), PipelineError> {
    let snapshot = capture(record, captured_at);
    let preview = evaluate_intent(&snapshot, intent, ctx)?;
    match preview.delta {
        Some(delta) => Ok(record.apply_delta(&delta, ctx)?),
        None => Err(PipelineError::rejected(
            preview.report.errors,
            preview.report.warnings,
        )),
    }
}

/// Ordered record of every intent a character went through, from creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionHistory {
    pub name: CharacterName,
    #[serde(default)]
    pub actor_kind: ActorKind,
    #[serde(default)]
    pub ability_scores: AbilityScores,
    pub intents: Vec<ProgressionIntent>,
}

impl ProgressionHistory {
    pub fn new(name: CharacterName, actor_kind: ActorKind, ability_scores: AbilityScores) -> Self {
        Self {
            name,
            actor_kind,
            ability_scores,
            intents: Vec::new(),
        }
    }

    pub fn with_intent(mut self, intent: ProgressionIntent) -> Self {
        self.intents.push(intent);
        self
    }

    /// Fresh record the history starts from.
    pub fn initial_record(&self, id: CharacterId) -> ProgressionCharacter {
        ProgressionCharacter::new(id, self.name.clone(), self.actor_kind, self.ability_scores)
    }
}

/// Replay a history against a fresh record, intent by intent.
///
/// # Errors
///
/// The first step that fails, with its index and intent.
pub fn replay(
    history: &ProgressionHistory,
    id: CharacterId,
    ctx: &RuleContext,
    captured_at: DateTime<Utc>,
) -> Result<ProgressionCharacter, ReplayError> {
    let mut record = history.initial_record(id);
    for (step, intent) in history.intents.iter().enumerate() {
        record = run_intent(&record, intent, ctx, captured_at)
            .map(|(next, _)| next)
            .map_err(|source| ReplayError {
                step,
                intent: intent.clone(),
                source,
            })?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{ClassId, FeatId, SkillId};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 9, 9, 0, 0).unwrap()
    }

    fn class(id: &str) -> ProgressionIntent {
        ProgressionIntent::add_class_level(ClassId::new(id).unwrap())
    }

    fn history() -> ProgressionHistory {
        ProgressionHistory::new(
            CharacterName::new("Ras Oltan").unwrap(),
            ActorKind::Organic,
            AbilityScores::new(10, 14, 12, 10, 13, 14).unwrap(),
        )
        .with_intent(class("jedi"))
        .with_intent(ProgressionIntent::train_skill(SkillId::new("use_the_force").unwrap()))
        .with_intent(ProgressionIntent::select_feat(FeatId::new("force_training").unwrap()))
        .with_intent(class("jedi"))
    }

    #[test]
    fn preview_of_rejected_intent_has_no_delta() {
        let ctx = RuleContext::core().unwrap();
        let record = history().initial_record(CharacterId::new());
        let snapshot = capture(&record, now());
        let preview = evaluate_intent(
            &snapshot,
            &ProgressionIntent::select_feat(FeatId::new("toughness").unwrap()),
            &ctx,
        )
        .unwrap();
        assert!(!preview.report.ok);
        assert!(preview.delta.is_none());
    }

    #[test]
    fn run_intent_rejects_as_data() {
        let ctx = RuleContext::core().unwrap();
        let record = history().initial_record(CharacterId::new());
        let err = run_intent(
            &record,
            &ProgressionIntent::select_feat(FeatId::new("toughness").unwrap()),
            &ctx,
            now(),
        )
        .unwrap_err();
        assert!(err.is_rejected());
    }

    #[test]
    fn replay_is_deterministic() {
        let ctx = RuleContext::core().unwrap();
        let id = CharacterId::new();
        let a = replay(&history(), id, &ctx, now()).unwrap();
        let b = replay(&history(), id, &ctx, now()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.revision(), 4);
        assert_eq!(a.level(), 2);
    }

    #[test]
    fn replay_reports_the_failing_step() {
        let ctx = RuleContext::core().unwrap();
        let history = history().with_intent(ProgressionIntent::select_feat(
            FeatId::new("force_training").unwrap(),
        ));
        let err = replay(&history, CharacterId::new(), &ctx, now()).unwrap_err();
        assert_eq!(err.step, 4);
        assert!(err.source.is_rejected());
        assert!(err.to_string().starts_with("Replay failed at step 4"));
    }

    #[test]
    fn history_reads_from_json() {
        let json = r#"{
            "name": "Ras Oltan",
            "intents": [
                {"type": "addClassLevel", "classId": "scout"},
                {"type": "trainSkill", "skillId": "pilot"}
            ]
        }"#;
        let history: ProgressionHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.actor_kind, ActorKind::Organic);
        assert_eq!(history.intents.len(), 2);
        let record = replay(&history, CharacterId::new(), &RuleContext::core().unwrap(), now()).unwrap();
        assert_eq!(record.level(), 1);
    }
}
