//! Cognitive Load Assessor - per-scene and cumulative mental demand.
//!
//! Each scene gets a 1-10 load from a base of 3 plus content, interaction,
//! information and visual components. The sequence-level load is an exponential
//! moving average over scene loads, updated in O(1) per scene:
//!
//! `cumulative = decay * cumulative + (1 - decay) * scene_load`
//!
//! seeded with the first scene's load. It therefore stays inside the range of the
//! scene loads it has seen.

mod complexity;

pub use complexity::*;

use serde::{Deserialize, Serialize};
use storyboard_rules::Scene;

use crate::error::{EngineError, Result};

/// Thresholds for load aggregation and advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Maximum sustainable load.
    pub capacity: f64,

    /// Weight kept from the previous cumulative value at each step (0.0-1.0).
    pub decay: f64,

    /// Cumulative load above this is an overload risk.
    pub overload_threshold: f64,

    /// Cumulative load above this calls for simpler upcoming content.
    pub warning_threshold: f64,

    /// Cumulative load below this leaves room for extra engagement.
    pub low_threshold: f64,

    /// Scene loads inside this range can take a new interaction.
    pub safe_zone_min: f64,
    pub safe_zone_max: f64,

    /// Safety margin needed before adding an interaction.
    pub min_safety_margin: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            capacity: 10.0,
            decay: 0.7,
            overload_threshold: 9.0,
            warning_threshold: 7.0,
            low_threshold: 4.0,
            safe_zone_min: 4.0,
            safe_zone_max: 7.0,
            min_safety_margin: 2.0,
        }
    }
}

impl LoadConfig {
    /// Reject non-finite values, a decay outside [0, 1) and an inverted safe zone.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.capacity,
            self.decay,
            self.overload_threshold,
            self.warning_threshold,
            self.low_threshold,
            self.safe_zone_min,
            self.safe_zone_max,
            self.min_safety_margin,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::Settings("load values must be finite".to_string()));
        }
        if !(0.0..1.0).contains(&self.decay) {
            return Err(EngineError::Settings(format!(
                "load.decay must be in [0, 1), got {}",
                self.decay
            )));
        }
        if self.safe_zone_min > self.safe_zone_max {
            return Err(EngineError::Settings(
                "load.safe_zone_min exceeds load.safe_zone_max".to_string(),
            ));
        }
        Ok(())
    }
}

/// Running cumulative load, owned and threaded by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CumulativeLoad {
    decay: f64,
    value: Option<f64>,
}

impl CumulativeLoad {
    /// Create an empty accumulator.
    pub fn new(decay: f64) -> Self {
        Self { decay, value: None }
    }

    /// Fold in the next scene's load and return the updated cumulative value.
    pub fn push(&mut self, scene_load: f64) -> f64 {
        let next = match self.value {
            None => scene_load,
            Some(current) => {
                let blended = current * self.decay + scene_load * (1.0 - self.decay);
                // Keep rounding from stepping outside the two inputs.
                blended.clamp(current.min(scene_load), current.max(scene_load))
            }
        };
        self.value = Some(next);
        next
    }

    /// Current cumulative load; 0 before any scene.
    pub fn value(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }

    /// Whether the current value is strictly above `threshold`.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.value() > threshold
    }
}

impl Default for CumulativeLoad {
    fn default() -> Self {
        Self::new(LoadConfig::default().decay)
    }
}

/// How urgent the load situation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadSeverity {
    Critical,
    Warning,
    Normal,
    Low,
}

/// Sequence-level load picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveLoadAssessment {
    pub current_load: f64,
    pub capacity: f64,
    pub overload_risk: bool,
    pub safety_margin: f64,
    pub severity: LoadSeverity,
    pub recommendations: Vec<String>,
    pub scene_loads: Vec<SceneLoad>,
    /// Scene numbers at which the running cumulative exceeded the threshold.
    pub overloaded_scenes: Vec<u32>,
}

/// Scores scenes and sequences for cognitive demand.
#[derive(Debug, Clone, Default)]
pub struct CognitiveLoadAssessor {
    config: LoadConfig,
}

impl CognitiveLoadAssessor {
    /// Create an assessor with the given thresholds.
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Load breakdown of a single scene.
    pub fn scene_load(&self, scene: &Scene) -> SceneLoad {
        SceneLoad::of(scene)
    }

    /// A fresh accumulator using the configured decay.
    pub fn cumulative(&self) -> CumulativeLoad {
        CumulativeLoad::new(self.config.decay)
    }

    /// Assess a whole scene list.
    pub fn assess(&self, scenes: &[Scene]) -> CognitiveLoadAssessment {
        let scene_loads: Vec<_> = scenes.iter().map(SceneLoad::of).collect();
        self.assess_scene_loads(scene_loads)
    }

    /// Assess scenes `0..=index`.
    pub fn assess_up_to(&self, scenes: &[Scene], index: usize) -> CognitiveLoadAssessment {
        let end = index.saturating_add(1).min(scenes.len());
        self.assess(&scenes[..end])
    }

    /// Assess a sequence of precomputed scene totals.
    pub fn assess_loads(&self, loads: &[f64]) -> CognitiveLoadAssessment {
        let scene_loads = loads
            .iter()
            .enumerate()
            .map(|(i, total)| SceneLoad {
                scene_number: i as u32 + 1,
                content_complexity: 0.0,
                interaction_complexity: 0.0,
                information_density: 0.0,
                visual_complexity: 0.0,
                total: total.clamp(1.0, 10.0),
            })
            .collect();
        self.assess_scene_loads(scene_loads)
    }

    fn assess_scene_loads(&self, scene_loads: Vec<SceneLoad>) -> CognitiveLoadAssessment {
        let mut cumulative = self.cumulative();
        let mut overloaded_scenes = Vec::new();

        for load in &scene_loads {
            if cumulative.push(load.total) > self.config.overload_threshold {
                overloaded_scenes.push(load.scene_number);
            }
        }

        let current_load = cumulative.value().clamp(0.0, self.config.capacity);
        let overload_risk = current_load > self.config.overload_threshold;
        let severity = self.severity(current_load);

        if overload_risk {
            tracing::warn!(current_load, "cognitive overload risk in scene sequence");
        }

        CognitiveLoadAssessment {
            current_load,
            capacity: self.config.capacity,
            overload_risk,
            safety_margin: self.config.capacity - current_load,
            severity,
            recommendations: recommendations(severity),
            scene_loads,
            overloaded_scenes,
        }
    }

    fn severity(&self, load: f64) -> LoadSeverity {
        if load > self.config.overload_threshold {
            LoadSeverity::Critical
        } else if load > self.config.warning_threshold {
            LoadSeverity::Warning
        } else if load < self.config.low_threshold {
            LoadSeverity::Low
        } else {
            LoadSeverity::Normal
        }
    }

    /// Whether a new interaction can be added at `index` without risking overload.
    ///
    /// Requires the scene's own load to sit in the safe zone, no overload risk in
    /// the cumulative assessment through `index`, and enough safety margin.
    pub fn is_safe_zone(&self, scenes: &[Scene], index: usize) -> bool {
        let Some(scene) = scenes.get(index) else {
            return false;
        };
        let own = SceneLoad::of(scene).total;
        if own < self.config.safe_zone_min || own > self.config.safe_zone_max {
            return false;
        }

        let assessment = self.assess_up_to(scenes, index);
        !assessment.overload_risk && assessment.safety_margin >= self.config.min_safety_margin
    }

    /// Keep only the positions where [`is_safe_zone`](Self::is_safe_zone) holds.
    pub fn safe_positions(&self, scenes: &[Scene], positions: &[usize]) -> Vec<usize> {
        let safe: Vec<_> = positions
            .iter()
            .copied()
            .filter(|&index| self.is_safe_zone(scenes, index))
            .collect();
        if safe.len() < positions.len() {
            tracing::debug!(
                dropped = positions.len() - safe.len(),
                "placements outside the load safe zone"
            );
        }
        safe
    }
}

fn recommendations(severity: LoadSeverity) -> Vec<String> {
    match severity {
        LoadSeverity::Critical => vec![
            "Reduce cognitive load immediately: split dense scenes and cut on-screen text"
                .to_string(),
            "Remove interactions from the next 2-3 scenes to let learners recover".to_string(),
        ],
        LoadSeverity::Warning => vec![
            "Simplify upcoming content and prefer low-effort interactions".to_string(),
        ],
        LoadSeverity::Low => vec![
            "Load is light: opportunity to add a short engagement activity".to_string(),
        ],
        LoadSeverity::Normal => Vec::new(),
    }
}
