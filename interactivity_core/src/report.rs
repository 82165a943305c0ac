//! Sequence-level validation: cognitive load plus interaction density.

use serde::{Deserialize, Serialize};
use storyboard_rules::{DensityProfile, Scene};

use crate::cognitive_load::{CognitiveLoadAssessment, CognitiveLoadAssessor};
use crate::density::{DensityManager, DensityValidation};

/// Combined findings for a finished scene list. Advisory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceReport {
    pub profile: DensityProfile,
    pub interactive_scenes: Vec<usize>,
    pub load: CognitiveLoadAssessment,
    pub density: DensityValidation,
}

impl SequenceReport {
    /// No overload risk and no density issues.
    pub fn is_clean(&self) -> bool {
        !self.load.overload_risk && self.density.is_valid
    }

    /// Recommendations from both validators, load first.
    pub fn recommendations(&self) -> Vec<&str> {
        self.load
            .recommendations
            .iter()
            .chain(&self.density.recommendations)
            .map(String::as_str)
            .collect()
    }
}

/// Assess load and density of a finished scene list against `profile`.
pub fn validate_sequence(
    scenes: &[Scene],
    profile: &DensityProfile,
    assessor: &CognitiveLoadAssessor,
    density: &DensityManager,
) -> SequenceReport {
    let interactive_scenes = DensityManager::interactive_indices(scenes);
    let load = assessor.assess(scenes);
    let density = density.validate_density(&interactive_scenes, scenes.len(), profile);

    if !density.is_valid {
        tracing::info!(issues = density.issues.len(), "density findings in scene sequence");
    }

    SequenceReport {
        profile: *profile,
        interactive_scenes,
        load,
        density,
    }
}
