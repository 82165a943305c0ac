//! Decision Engine - picks the interaction type for one scene.
//!
//! The pipeline for a scene is:
//! 1. **Filter**: keep catalog entries that support the scene's Bloom level, module
//!    level and the loads allowed at that level, then drop recently used types
//!    unless that would leave fewer than two candidates
//! 2. **Score**: weighted multi-criteria score per candidate
//! 3. **Rank**: highest score wins, ties go to catalog declaration order
//! 4. **Assemble**: justification, runners-up and audit checksums
//!
//! An empty candidate set is not an error; it goes to the fallback resolver.

mod decision;
mod history;
mod planner;
mod scoring;

pub use decision::*;
pub use history::*;
pub use planner::*;
pub use scoring::*;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use storyboard_rules::{Catalog, InteractivityType, InteractivityTypeId, SceneMetadata};

use crate::checksum;
use crate::error::{EngineError, Result};

/// Configuration for candidate filtering and decision assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// How many of the most recent choices count as "recent".
    pub novelty_window: usize,

    /// The novelty filter is skipped if it would leave fewer candidates than this.
    pub min_candidates_after_novelty: usize,

    /// Number of runners-up reported with a decision.
    pub alternative_count: usize,

    /// Safe defaults tried in order when no candidate survives filtering.
    pub fallback_order: Vec<InteractivityTypeId>,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            novelty_window: 3,
            min_candidates_after_novelty: 2,
            alternative_count: 3,
            fallback_order: vec![
                InteractivityTypeId::ClickToReveal,
                InteractivityTypeId::SingleSelectQuiz,
            ],
        }
    }
}

impl DecisionConfig {
    /// Reject an empty novelty window.
    pub fn validate(&self) -> Result<()> {
        if self.novelty_window == 0 {
            return Err(EngineError::Settings(
                "decision.novelty_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A candidate together with its score breakdown.
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub candidate: &'a InteractivityType,
    pub breakdown: ScoreBreakdown,
}

/// Selects interaction types for scenes against a fixed catalog.
pub struct InteractivityEngine {
    catalog: Catalog,
    config: DecisionConfig,
    scorer: Box<dyn CandidateScorer>,
}

impl InteractivityEngine {
    /// Create an engine using the weighted scorer.
    pub fn new(catalog: Catalog, config: DecisionConfig) -> Self {
        let scorer = WeightedScorer::new(config.novelty_window);
        Self {
            catalog,
            config,
            scorer: Box::new(scorer),
        }
    }

    /// Create an engine over the built-in catalog with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(Catalog::builtin()?, DecisionConfig::default()))
    }

    /// Replace the scorer.
    pub fn with_scorer(mut self, scorer: Box<dyn CandidateScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// The catalog decisions are drawn from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Filtering and assembly settings in use.
    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Narrow the catalog to the entries allowed for this scene.
    ///
    /// The result keeps catalog declaration order and may be empty.
    pub fn filter_candidates<'a>(&'a self, scene: &SceneMetadata) -> Vec<&'a InteractivityType> {
        let by_bloom: Vec<_> = self
            .catalog
            .iter()
            .filter(|entry| entry.supports_bloom(scene.bloom_level))
            .collect();

        let by_level: Vec<_> = by_bloom
            .into_iter()
            .filter(|entry| entry.supports_module_level(scene.module_level))
            .collect();

        let allowed_loads = scene.module_level.allowed_loads();
        let by_load: Vec<_> = by_level
            .into_iter()
            .filter(|entry| allowed_loads.contains(&entry.cognitive_load))
            .collect();

        let history = NoveltyHistory::from(scene.previous_interactivities.clone());
        let window = history.window(self.config.novelty_window);
        let fresh: Vec<_> = by_load
            .iter()
            .copied()
            .filter(|entry| !window.contains(&entry.id))
            .collect();

        let candidates = if fresh.len() >= self.config.min_candidates_after_novelty {
            fresh
        } else {
            tracing::debug!(
                scene = scene.scene_number,
                fresh = fresh.len(),
                kept = by_load.len(),
                "novelty filter skipped to keep enough candidates"
            );
            by_load
        };

        tracing::debug!(
            scene = scene.scene_number,
            candidates = candidates.len(),
            "filtered candidates"
        );
        candidates
    }

    /// Score candidates and rank them, best first. Ties keep the input order.
    pub fn rank_candidates<'a>(
        &self,
        scene: &SceneMetadata,
        candidates: Vec<&'a InteractivityType>,
    ) -> Result<Vec<ScoredCandidate<'a>>> {
        let history = NoveltyHistory::from(scene.previous_interactivities.clone());

        let mut scored = candidates
            .into_iter()
            .map(|candidate| {
                let breakdown = self.scorer.score(scene, candidate, &history)?;
                Ok(ScoredCandidate {
                    candidate,
                    breakdown,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Stable sort: equal totals stay in catalog order.
        scored.sort_by(|a, b| b.breakdown.total.total_cmp(&a.breakdown.total));
        Ok(scored)
    }

    /// Decide the interaction for one scene, using the scene's own history.
    pub fn decide(&self, scene: &SceneMetadata) -> Result<InteractivityDecision> {
        let input_checksum = input_checksum(scene);
        let candidates = self.filter_candidates(scene);
        if candidates.is_empty() {
            return Ok(self.resolve_fallback(scene));
        }

        let ranked = self.rank_candidates(scene, candidates)?;
        let Some(best) = ranked.first() else {
            return Ok(self.resolve_fallback(scene));
        };

        let score = best.breakdown.total;
        let alternative_options = ranked
            .iter()
            .skip(1)
            .take(self.config.alternative_count)
            .map(|alt| AlternativeOption {
                interactivity_type: alt.candidate.id,
                score: alt.breakdown.total,
                reason: self.justify(scene, alt),
            })
            .collect();

        tracing::debug!(
            scene = scene.scene_number,
            chosen = %best.candidate.id,
            score,
            "interactivity decided"
        );

        Ok(InteractivityDecision {
            scene_number: scene.scene_number,
            interactivity_type: Some(best.candidate.id),
            justification: self.justify(scene, best),
            suggested_template: Some(best.candidate.template_ref.clone()),
            score,
            alternative_options,
            checksum: decision_checksum(best.candidate.id.as_str(), score, &input_checksum),
            input_checksum,
            source: DecisionSource::Scored,
            timestamp: Utc::now(),
        })
    }

    /// Decide for `scene` given the module history so far, and return the history
    /// extended with this decision.
    ///
    /// `history` replaces the scene's own `previous_interactivities`; seed it with
    /// [`seed_history`] to start from what the caller supplied.
    pub fn decide_next(
        &self,
        scene: &SceneMetadata,
        history: NoveltyHistory,
    ) -> Result<(InteractivityDecision, NoveltyHistory)> {
        let scene = scene
            .clone()
            .with_previous_interactivities(history.as_slice().iter().copied());
        let decision = self.decide(&scene)?;
        let history = history.record(decision.interactivity_type);
        Ok((decision, history))
    }

    /// Safe decision for a scene with no surviving candidates. Never fails.
    pub fn resolve_fallback(&self, scene: &SceneMetadata) -> InteractivityDecision {
        let input_checksum = input_checksum(scene);
        let context = format!(
            "No exact match found for {} outcomes at module level {} with {} load",
            scene.bloom_level, scene.module_level, scene.cognitive_load
        );

        let safe_default = self
            .config
            .fallback_order
            .iter()
            .find_map(|id| self.catalog.get(*id));

        let (interactivity_type, justification, suggested_template, score) = match safe_default {
            Some(entry) => (
                Some(entry.id),
                format!("{}; using safe default {}", context, entry.name),
                Some(entry.template_ref.clone()),
                FALLBACK_SCORE,
            ),
            None => (
                None,
                format!("{}; no safe default available in the catalog", context),
                None,
                0.0,
            ),
        };

        tracing::warn!(
            scene = scene.scene_number,
            bloom = %scene.bloom_level,
            level = %scene.module_level,
            chosen = interactivity_type.map(|id| id.as_str()).unwrap_or(NONE_LABEL),
            "no candidates survived filtering, using fallback"
        );

        let label = interactivity_type.map(|id| id.as_str()).unwrap_or(NONE_LABEL);
        InteractivityDecision {
            scene_number: scene.scene_number,
            interactivity_type,
            justification,
            suggested_template,
            score,
            alternative_options: Vec::new(),
            checksum: decision_checksum(label, score, &input_checksum),
            input_checksum,
            source: DecisionSource::Fallback,
            timestamp: Utc::now(),
        }
    }

    /// Compose a justification from the sub-scores that cleared notable thresholds.
    fn justify(&self, scene: &SceneMetadata, scored: &ScoredCandidate<'_>) -> String {
        let b = &scored.breakdown;
        let mut clauses = Vec::new();

        if b.bloom_alignment >= 100.0 {
            clauses.push(format!("primary fit for {} outcomes", scene.bloom_level));
        } else if b.bloom_alignment >= 85.0 {
            clauses.push(format!("supports {} outcomes", scene.bloom_level));
        }
        if b.novelty >= 80.0 {
            clauses.push(format!(
                "adds variety (not used in the last {} scenes)",
                self.config.novelty_window
            ));
        }
        if b.cognitive_load_balance >= 90.0 {
            clauses.push(format!(
                "matches the requested {} cognitive load",
                scene.cognitive_load
            ));
        }
        if b.purpose_alignment >= 85.0 {
            clauses.push(format!("serves the {} purpose", scene.instructional_purpose));
        }

        if clauses.is_empty() {
            format!("{}: best available match for this scene", scored.candidate.name)
        } else {
            format!("{}: {}", scored.candidate.name, clauses.join("; "))
        }
    }
}

/// Score assigned to a fallback decision that found a safe default.
pub const FALLBACK_SCORE: f64 = 50.0;

/// Digest of the normalized scene metadata.
pub fn input_checksum(scene: &SceneMetadata) -> String {
    checksum::digest_json(scene).unwrap_or_else(|err| {
        tracing::warn!(%err, "scene metadata did not serialize, hashing debug form");
        checksum::digest(&format!("{:?}", scene))
    })
}

/// Digest binding a chosen type and score to the input that produced them.
pub fn decision_checksum(type_label: &str, score: f64, input_checksum: &str) -> String {
    checksum::digest(&format!("{}|{:.4}|{}", type_label, score, input_checksum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_rules::{
        BloomLevel, InstructionalPurpose, LoadLevel, ModuleLevel,
    };
    use InteractivityTypeId as Id;

    fn engine() -> InteractivityEngine {
        InteractivityEngine::with_defaults().unwrap()
    }

    fn level(n: u8) -> ModuleLevel {
        ModuleLevel::new(n).unwrap()
    }

    fn apply_scene() -> SceneMetadata {
        SceneMetadata::new(1)
            .with_bloom_level(BloomLevel::Apply)
            .with_module_level(level(2))
            .with_cognitive_load(LoadLevel::Medium)
    }

    #[test]
    fn test_apply_scene_picks_scenario_simulation() {
        let engine = engine();
        let decision = engine.decide(&apply_scene()).unwrap();

        assert_eq!(decision.interactivity_type, Some(Id::ScenarioSimulation));
        assert_eq!(decision.source, DecisionSource::Scored);
        assert_eq!(decision.suggested_template.as_deref(), Some("scenario_decision"));
        assert!((decision.score - 99.25).abs() < 1e-9);
        assert_eq!(decision.alternative_options.len(), 3);
        assert!(decision
            .alternative_options
            .iter()
            .all(|alt| alt.score <= decision.score));
        assert!(decision.justification.contains("primary fit for apply"));
    }

    #[test]
    fn test_filter_applies_every_hard_constraint() {
        let engine = engine();
        let scene = apply_scene();
        let candidates = engine.filter_candidates(&scene);

        assert!(!candidates.is_empty());
        for entry in &candidates {
            assert!(entry.supports_bloom(BloomLevel::Apply));
            assert!(entry.supports_module_level(level(2)));
            assert!(level(2).allowed_loads().contains(&entry.cognitive_load));
        }
        // High-load types never pass at level 2.
        assert!(candidates.iter().all(|e| e.id != Id::BranchingScenario));
    }

    #[test]
    fn test_novelty_filter_removes_recent_types() {
        let engine = engine();
        let scene = apply_scene().with_previous_interactivities([Id::ScenarioSimulation]);
        let ids: Vec<_> = engine.filter_candidates(&scene).iter().map(|e| e.id).collect();
        assert!(!ids.contains(&Id::ScenarioSimulation));
    }

    #[test]
    fn test_novelty_filter_skipped_when_too_few_remain() {
        // Level 1 + create leaves only the reflection prompt.
        let engine = engine();
        let base = SceneMetadata::new(1)
            .with_bloom_level(BloomLevel::Create)
            .with_module_level(level(1))
            .with_cognitive_load(LoadLevel::Low);
        let before: Vec<_> = engine.filter_candidates(&base).iter().map(|e| e.id).collect();
        assert_eq!(before, vec![Id::Reflection]);

        let repeated = base.with_previous_interactivities([Id::Reflection]);
        let after: Vec<_> = engine.filter_candidates(&repeated).iter().map(|e| e.id).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_no_candidates_falls_back_to_click_to_reveal() {
        let engine = engine();
        let scene = SceneMetadata::new(5)
            .with_bloom_level(BloomLevel::Create)
            .with_module_level(level(4));
        assert!(engine.filter_candidates(&scene).is_empty());

        let decision = engine.decide(&scene).unwrap();
        assert_eq!(decision.interactivity_type, Some(Id::ClickToReveal));
        assert_eq!(decision.score, FALLBACK_SCORE);
        assert_eq!(decision.source, DecisionSource::Fallback);
        assert!(decision.justification.contains("No exact match"));
    }

    #[test]
    fn test_fallback_to_none_without_safe_defaults() {
        let catalog = Catalog::new(
            "tiny",
            vec![InteractivityType::new(Id::Reflection, "Reflection")
                .with_bloom_levels([BloomLevel::Evaluate])
                .with_module_levels([1])
                .with_cognitive_load(LoadLevel::Low)
                .with_purposes([InstructionalPurpose::Reinforcement])],
        )
        .unwrap();
        let engine = InteractivityEngine::new(catalog, DecisionConfig::default());

        let decision = engine.decide(&SceneMetadata::new(1)).unwrap();
        assert_eq!(decision.interactivity_type, None);
        assert_eq!(decision.score, 0.0);
        assert_eq!(decision.type_label(), "none");
    }

    #[test]
    fn test_checksums_are_deterministic() {
        let engine = engine();
        let first = engine.decide(&apply_scene()).unwrap();
        let second = engine.decide(&apply_scene()).unwrap();
        assert_eq!(first.checksum, second.checksum);
        assert_eq!(first.input_checksum, second.input_checksum);

        let other = engine
            .decide(&apply_scene().with_purpose(InstructionalPurpose::Practice))
            .unwrap();
        assert_ne!(first.input_checksum, other.input_checksum);
    }

    #[test]
    fn test_decide_next_threads_history() {
        let engine = engine();
        let (first, history) = engine
            .decide_next(&apply_scene(), NoveltyHistory::new())
            .unwrap();
        assert_eq!(history.as_slice(), &[first.interactivity_type.unwrap()]);

        let (second, history) = engine
            .decide_next(&apply_scene(), history)
            .unwrap();
        assert_ne!(first.interactivity_type, second.interactivity_type);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_ties_broken_by_catalog_order() {
        let twin = |id, name| {
            InteractivityType::new(id, name)
                .with_bloom_levels([BloomLevel::Understand])
                .with_module_levels([2])
                .with_cognitive_load(LoadLevel::Medium)
                .with_purposes([InstructionalPurpose::Foundation])
        };
        let catalog = Catalog::new(
            "twins",
            vec![twin(Id::Matching, "Matching"), twin(Id::DragAndDrop, "Drag")],
        )
        .unwrap();
        let engine = InteractivityEngine::new(catalog, DecisionConfig::default());

        let decision = engine.decide(&SceneMetadata::new(1)).unwrap();
        assert_eq!(decision.interactivity_type, Some(Id::Matching));
        assert_eq!(decision.alternative_options[0].score, decision.score);
    }

    struct BrokenScorer;

    impl CandidateScorer for BrokenScorer {
        fn score(
            &self,
            _scene: &SceneMetadata,
            candidate: &InteractivityType,
            _history: &NoveltyHistory,
        ) -> Result<ScoreBreakdown> {
            Err(EngineError::NonFiniteScore { id: candidate.id })
        }
    }

    #[test]
    fn test_scorer_errors_propagate() {
        let engine = engine().with_scorer(Box::new(BrokenScorer));
        assert!(matches!(
            engine.decide(&apply_scene()),
            Err(EngineError::NonFiniteScore { .. })
        ));
    }
}
