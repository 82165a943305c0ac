//! Density profiles: how often interactions should appear for each module tier.

use serde::{Deserialize, Serialize};

use crate::pedagogy::ModuleType;

/// Qualitative label for a profile's pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    Moderate,
    High,
    Intensive,
}

/// Target rate and spacing of interactive scenes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityProfile {
    pub module_type: ModuleType,
    /// Nominal number of scenes between interactions.
    pub interval_scenes: u32,
    pub intensity: Intensity,
    /// Fraction of scenes that should be interactive (0.0 - 1.0).
    pub target_interaction_rate: f64,
    /// Minimum number of non-interactive scenes between two interactive ones.
    pub min_spacing: u32,
}

impl DensityProfile {
    /// The static profile for a module type.
    pub fn for_module_type(module_type: ModuleType) -> Self {
        match module_type {
            ModuleType::Awareness => Self {
                module_type,
                interval_scenes: 5,
                intensity: Intensity::Light,
                target_interaction_rate: 0.20,
                min_spacing: 3,
            },
            ModuleType::SkillBuilding => Self {
                module_type,
                interval_scenes: 3,
                intensity: Intensity::Moderate,
                target_interaction_rate: 0.35,
                min_spacing: 2,
            },
            ModuleType::Application => Self {
                module_type,
                interval_scenes: 2,
                intensity: Intensity::High,
                target_interaction_rate: 0.50,
                min_spacing: 1,
            },
            ModuleType::Immersive => Self {
                module_type,
                interval_scenes: 1,
                intensity: Intensity::Intensive,
                target_interaction_rate: 0.75,
                min_spacing: 0,
            },
        }
    }

    /// All profiles, one per module type.
    pub fn table() -> [DensityProfile; 4] {
        ModuleType::ALL.map(Self::for_module_type)
    }

    /// Number of interactive scenes this profile wants in a module of `total_scenes`.
    pub fn target_count(&self, total_scenes: usize) -> usize {
        if total_scenes == 0 {
            return 0;
        }
        let wanted = (total_scenes as f64 * self.target_interaction_rate).round() as usize;
        wanted.clamp(1, total_scenes)
    }
}

impl Default for DensityProfile {
    fn default() -> Self {
        Self::for_module_type(ModuleType::default())
    }
}
