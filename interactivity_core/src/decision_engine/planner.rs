//! Module planning: runs scene decisions in order, threading the novelty history.
//!
//! A plan can be constrained to the interaction placements of a density profile
//! and to a cumulative-load gate. Scenes outside those limits get a "none"
//! decision that records why.

use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use storyboard_rules::{DensityProfile, SceneMetadata};
use uuid::Uuid;

use super::{
    decision_checksum, input_checksum, DecisionSource, InteractivityDecision, InteractivityEngine,
    NoveltyHistory, NONE_LABEL,
};
use crate::cognitive_load::{interaction_complexity, CumulativeLoad, LoadConfig};
use crate::density::DensityManager;

/// Identifier for one module plan, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub Uuid);

impl PlanId {
    /// Create a new random plan id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decisions for every scene of one module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulePlan {
    pub plan_id: PlanId,
    /// One decision per scene, in scene order.
    pub decisions: Vec<InteractivityDecision>,
    /// History after the last scene.
    pub history: NoveltyHistory,
}

impl ModulePlan {
    /// Number of scenes that received an interaction.
    pub fn interactive_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.has_interaction()).count()
    }

    /// Positions (0-based, in scene order) of the scenes that received an interaction.
    pub fn interactive_positions(&self) -> Vec<usize> {
        self.decisions
            .iter()
            .enumerate()
            .filter(|(_, d)| d.has_interaction())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Limits applied while planning a module. The default applies none.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanConstraints<'s> {
    /// Positions (0-based, in scene-number order) allowed to carry an interaction.
    /// `None` allows every scene.
    pub placements: Option<&'s [usize]>,

    /// Load (1-10) of each input scene before an interaction is attached, in input
    /// order. When set, scenes are left without interaction while the cumulative
    /// load of the preceding scenes shows overload risk.
    pub base_loads: Option<&'s [f64]>,
}

/// The history a module starts from: the `previous_interactivities` of its first
/// scene in scene-number order.
pub fn seed_history(scenes: &[SceneMetadata]) -> NoveltyHistory {
    scenes
        .iter()
        .min_by_key(|scene| scene.scene_number)
        .map(|scene| NoveltyHistory::from(scene.previous_interactivities.clone()))
        .unwrap_or_default()
}

/// Drives an [`InteractivityEngine`] across the scenes of a module.
pub struct ModulePlanner<'a> {
    engine: &'a InteractivityEngine,
    load: LoadConfig,
}

impl<'a> ModulePlanner<'a> {
    /// Create a planner with the default load thresholds.
    pub fn new(engine: &'a InteractivityEngine) -> Self {
        Self {
            engine,
            load: LoadConfig::default(),
        }
    }

    /// Use these thresholds for the load gate.
    pub fn with_load_config(mut self, load: LoadConfig) -> Self {
        self.load = load;
        self
    }

    /// Plan every scene, starting from the history the first scene carries.
    pub fn plan(&self, scenes: &[SceneMetadata]) -> ModulePlan {
        self.plan_from(scenes, seed_history(scenes))
    }

    /// Plan every scene, continuing from an explicit history.
    pub fn plan_from(&self, scenes: &[SceneMetadata], history: NoveltyHistory) -> ModulePlan {
        self.plan_with(scenes, history, PlanConstraints::default())
    }

    /// Plan a module behind the load gate.
    ///
    /// `base_loads[i]` is the 1-10 load of scene `i` before any interaction is
    /// attached; the chosen interaction's own cost is added on top.
    pub fn plan_gated(
        &self,
        scenes: &[SceneMetadata],
        base_loads: &[f64],
        history: NoveltyHistory,
    ) -> ModulePlan {
        let constraints = PlanConstraints {
            base_loads: Some(base_loads),
            ..Default::default()
        };
        self.plan_with(scenes, history, constraints)
    }

    /// Plan a module that only decides at the placements `density` computes for
    /// `profile`. Every other scene is left without interaction.
    pub fn plan_placed(
        &self,
        scenes: &[SceneMetadata],
        profile: &DensityProfile,
        density: &DensityManager,
        history: NoveltyHistory,
    ) -> ModulePlan {
        let placements = density.calculate_optimal_placements(scenes.len(), profile, &[]);
        let constraints = PlanConstraints {
            placements: Some(placements.as_slice()),
            ..Default::default()
        };
        self.plan_with(scenes, history, constraints)
    }

    /// Plan independent modules in parallel. Each module starts from its own
    /// first scene's history.
    pub fn plan_modules(&self, modules: &[Vec<SceneMetadata>]) -> Vec<ModulePlan> {
        modules.par_iter().map(|scenes| self.plan(scenes)).collect()
    }

    /// Plan a module under any combination of constraints.
    pub fn plan_with(
        &self,
        scenes: &[SceneMetadata],
        mut history: NoveltyHistory,
        constraints: PlanConstraints<'_>,
    ) -> ModulePlan {
        let plan_id = PlanId::new();
        let span = tracing::info_span!("module_plan", %plan_id, scenes = scenes.len());
        let _guard = span.enter();

        // History only makes sense applied in scene order.
        let mut ordered: Vec<(usize, &SceneMetadata)> = scenes.iter().enumerate().collect();
        ordered.sort_by_key(|(_, scene)| scene.scene_number);

        let mut cumulative = CumulativeLoad::new(self.load.decay);
        let mut decisions = Vec::with_capacity(scenes.len());

        for (position, (index, scene)) in ordered.into_iter().enumerate() {
            let base_load = constraints
                .base_loads
                .and_then(|loads| loads.get(index))
                .copied();
            let placed = constraints
                .placements
                .map_or(true, |placements| placements.contains(&position));

            let decision = if !placed {
                tracing::debug!(
                    scene = scene.scene_number,
                    "scene outside interaction placements"
                );
                placement_decision(scene)
            } else if base_load.is_some() && cumulative.exceeds(self.load.overload_threshold) {
                tracing::info!(
                    scene = scene.scene_number,
                    cumulative = cumulative.value(),
                    "interaction withheld by load gate"
                );
                gated_decision(scene, cumulative.value())
            } else {
                match self.engine.decide_next(scene, history.clone()) {
                    Ok((decision, next)) => {
                        history = next;
                        decision
                    }
                    Err(err) => {
                        tracing::warn!(
                            scene = scene.scene_number,
                            %err,
                            "scene decision failed, substituting neutral decision"
                        );
                        neutral_decision(scene, &err.to_string())
                    }
                }
            };

            if let Some(load) = base_load {
                let total = (load + interaction_complexity(decision.interactivity_type))
                    .clamp(1.0, 10.0);
                cumulative.push(total);
            }

            decisions.push(decision);
        }

        let plan = ModulePlan {
            plan_id,
            decisions,
            history,
        };
        tracing::info!(
            interactive = plan.interactive_count(),
            total = plan.decisions.len(),
            "module plan complete"
        );
        plan
    }
}

fn no_interaction(
    scene: &SceneMetadata,
    justification: String,
    source: DecisionSource,
) -> InteractivityDecision {
    let input_checksum = input_checksum(scene);
    InteractivityDecision {
        scene_number: scene.scene_number,
        interactivity_type: None,
        justification,
        suggested_template: None,
        score: 0.0,
        alternative_options: Vec::new(),
        checksum: decision_checksum(NONE_LABEL, 0.0, &input_checksum),
        input_checksum,
        source,
        timestamp: Utc::now(),
    }
}

/// "none" decision substituted when deciding a scene failed.
pub fn neutral_decision(scene: &SceneMetadata, reason: &str) -> InteractivityDecision {
    no_interaction(
        scene,
        format!("Decision unavailable ({}); scene left without interaction", reason),
        DecisionSource::Neutral,
    )
}

fn placement_decision(scene: &SceneMetadata) -> InteractivityDecision {
    no_interaction(
        scene,
        "Not an interaction placement for this module's density; scene stays passive"
            .to_string(),
        DecisionSource::Placement,
    )
}

fn gated_decision(scene: &SceneMetadata, cumulative: f64) -> InteractivityDecision {
    no_interaction(
        scene,
        format!(
            "Cumulative cognitive load {:.1} exceeds the safe limit; \
             scene left without interaction",
            cumulative
        ),
        DecisionSource::LoadGate,
    )
}
