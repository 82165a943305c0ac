//! Multi-criteria scoring of filtered candidates.

use serde::{Deserialize, Serialize};
use storyboard_rules::{InteractivityType, InteractivityTypeId, SceneMetadata};

use super::NoveltyHistory;
use crate::error::{EngineError, Result};

/// Relative weight of each sub-score. The default weights sum to exactly 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub bloom_alignment: f64,
    pub novelty: f64,
    pub cognitive_load_balance: f64,
    pub module_level_fit: f64,
    pub purpose_alignment: f64,
}

impl ScoreWeights {
    pub const DEFAULT: ScoreWeights = ScoreWeights {
        bloom_alignment: 0.40,
        novelty: 0.25,
        cognitive_load_balance: 0.20,
        module_level_fit: 0.10,
        purpose_alignment: 0.05,
    };

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.bloom_alignment
            + self.novelty
            + self.cognitive_load_balance
            + self.module_level_fit
            + self.purpose_alignment
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Novelty sub-score by recency inside the window: most recent, second, third.
pub const NOVELTY_PENALTIES: [f64; 3] = [30.0, 50.0, 70.0];

/// Every sub-score (0-100) of one candidate plus the weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub id: InteractivityTypeId,
    pub bloom_alignment: f64,
    pub novelty: f64,
    pub cognitive_load_balance: f64,
    pub module_level_fit: f64,
    pub purpose_alignment: f64,
    pub total: f64,
}

/// Scores one candidate for one scene.
///
/// Implementations must be pure: the same inputs always give the same breakdown.
pub trait CandidateScorer: Send + Sync {
    fn score(
        &self,
        scene: &SceneMetadata,
        candidate: &InteractivityType,
        history: &NoveltyHistory,
    ) -> Result<ScoreBreakdown>;
}

/// Weighted sum of the five fixed criteria.
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    weights: ScoreWeights,
    novelty_window: usize,
}

impl WeightedScorer {
    /// Create a scorer with the default weights.
    pub fn new(novelty_window: usize) -> Self {
        Self {
            weights: ScoreWeights::DEFAULT,
            novelty_window,
        }
    }

    /// Weights in use.
    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self::new(3)
    }
}

impl CandidateScorer for WeightedScorer {
    fn score(
        &self,
        scene: &SceneMetadata,
        candidate: &InteractivityType,
        history: &NoveltyHistory,
    ) -> Result<ScoreBreakdown> {
        let w = &self.weights;
        let bloom = bloom_alignment(scene, candidate);
        let novelty = novelty(candidate.id, history, self.novelty_window);
        let load = cognitive_load_balance(scene, candidate);
        let level = module_level_fit(scene, candidate);
        let purpose = purpose_alignment(scene, candidate);

        let total = bloom * w.bloom_alignment
            + novelty * w.novelty
            + load * w.cognitive_load_balance
            + level * w.module_level_fit
            + purpose * w.purpose_alignment;

        if !total.is_finite() {
            return Err(EngineError::NonFiniteScore { id: candidate.id });
        }

        Ok(ScoreBreakdown {
            id: candidate.id,
            bloom_alignment: bloom,
            novelty,
            cognitive_load_balance: load,
            module_level_fit: level,
            purpose_alignment: purpose,
            total,
        })
    }
}

/// 100 for the candidate's primary Bloom level, 85 for any other supported level.
/// Unsupported levels score 0; the candidate filter keeps those out.
pub fn bloom_alignment(scene: &SceneMetadata, candidate: &InteractivityType) -> f64 {
    if candidate.primary_bloom_level() == Some(scene.bloom_level) {
        100.0
    } else if candidate.supports_bloom(scene.bloom_level) {
        85.0
    } else {
        0.0
    }
}

/// 100 when unused in the window, otherwise a penalty by recency.
pub fn novelty(id: InteractivityTypeId, history: &NoveltyHistory, window: usize) -> f64 {
    match history.recency(id, window) {
        None => 100.0,
        Some(rank) => NOVELTY_PENALTIES
            .get(rank)
            .copied()
            .unwrap_or(NOVELTY_PENALTIES[NOVELTY_PENALTIES.len() - 1]),
    }
}

/// 100 on an exact load match, 80 when merely allowed at the module level.
pub fn cognitive_load_balance(scene: &SceneMetadata, candidate: &InteractivityType) -> f64 {
    if candidate.cognitive_load == scene.cognitive_load {
        100.0
    } else if scene
        .module_level
        .allowed_loads()
        .contains(&candidate.cognitive_load)
    {
        80.0
    } else {
        0.0
    }
}

/// 100 when the module level is one of the candidate's two optimal levels, else 80.
pub fn module_level_fit(scene: &SceneMetadata, candidate: &InteractivityType) -> f64 {
    if candidate.is_optimal_module_level(scene.module_level) {
        100.0
    } else if candidate.supports_module_level(scene.module_level) {
        80.0
    } else {
        0.0
    }
}

/// Purpose is a soft preference: absence still scores 50.
pub fn purpose_alignment(scene: &SceneMetadata, candidate: &InteractivityType) -> f64 {
    let purpose = scene.instructional_purpose;
    if candidate.primary_purpose() == Some(purpose) {
        100.0
    } else if candidate.instructional_purposes.contains(&purpose) {
        85.0
    } else {
        50.0
    }
}
