//! The per-scene decision handed to the template builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyboard_rules::InteractivityTypeId;

/// How a decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// Ranked from filtered, scored candidates.
    Scored,
    /// No candidate survived filtering; a safe default was used.
    Fallback,
    /// The scene is not one of the module's interaction placements.
    Placement,
    /// The scene was left without interaction because cumulative load is too high.
    LoadGate,
    /// Decision-making failed for this scene and was replaced by "none".
    Neutral,
}

/// A runner-up candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeOption {
    pub interactivity_type: InteractivityTypeId,
    pub score: f64,
    pub reason: String,
}

/// Outcome of one scene decision. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractivityDecision {
    pub scene_number: u32,
    /// `None` means no interaction; serialized as `"none"`.
    #[serde(with = "choice")]
    pub interactivity_type: Option<InteractivityTypeId>,
    pub justification: String,
    pub suggested_template: Option<String>,
    /// 0 - 100.
    pub score: f64,
    pub alternative_options: Vec<AlternativeOption>,
    /// Digest over the chosen type, the score and `input_checksum`.
    pub checksum: String,
    /// Digest of the normalized scene metadata the decision was made from.
    pub input_checksum: String,
    pub source: DecisionSource,
    pub timestamp: DateTime<Utc>,
}

impl InteractivityDecision {
    /// Wire name of the chosen type, `"none"` when there is no interaction.
    pub fn type_label(&self) -> &'static str {
        self.interactivity_type
            .map(|id| id.as_str())
            .unwrap_or(NONE_LABEL)
    }

    /// Whether an interaction type was chosen.
    pub fn has_interaction(&self) -> bool {
        self.interactivity_type.is_some()
    }
}

pub(crate) const NONE_LABEL: &str = "none";

mod choice {
    use serde::{Deserialize, Deserializer, Serializer};
    use storyboard_rules::InteractivityTypeId;

    use super::NONE_LABEL;

    pub fn serialize<S: Serializer>(
        value: &Option<InteractivityTypeId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map(|id| id.as_str()).unwrap_or(NONE_LABEL))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<InteractivityTypeId>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.eq_ignore_ascii_case(NONE_LABEL) {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}
