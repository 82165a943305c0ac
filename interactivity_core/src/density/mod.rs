//! Density Manager - how many interactive scenes a module gets, and where.
//!
//! A module tier maps to a [`DensityProfile`]. From it the manager computes evenly
//! spaced placements, validates an existing placement against target rate, minimum
//! spacing and clustering, and nudges the profile from engagement feedback.

mod inference;

pub use inference::*;

use serde::{Deserialize, Serialize};
use storyboard_rules::{DensityProfile, ModuleType, Scene};

use crate::error::{EngineError, Result};

/// Tolerances used when validating a placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    /// Allowed absolute deviation from the target interaction rate.
    pub rate_tolerance: f64,

    /// Cluster score above this is reported as uneven distribution.
    pub clustering_threshold: f64,

    /// Bounds for an adjusted target rate.
    pub min_rate: f64,
    pub max_rate: f64,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            rate_tolerance: 0.15,
            clustering_threshold: 0.3,
            min_rate: 0.15,
            max_rate: 0.8,
        }
    }
}

impl DensityConfig {
    /// Reject negative or non-finite values and rate bounds outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.rate_tolerance,
            self.clustering_threshold,
            self.min_rate,
            self.max_rate,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(EngineError::Settings(
                "density values must be finite and non-negative".to_string(),
            ));
        }
        if self.min_rate > self.max_rate || self.max_rate > 1.0 {
            return Err(EngineError::Settings(format!(
                "density rate bounds [{}, {}] are not inside [0, 1]",
                self.min_rate, self.max_rate
            )));
        }
        Ok(())
    }
}

/// Learner feedback used to tune a profile at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementSignals {
    /// 0 - 10.
    pub engagement_score: Option<f64>,
    /// 0.0 - 1.0.
    pub completion_rate: Option<f64>,
    pub time_budget_minutes: Option<f64>,
}

/// Outcome of validating a placement. Findings are advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityValidation {
    pub is_valid: bool,
    pub current_rate: f64,
    pub target_rate: f64,
    pub cluster_score: f64,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DensityManager {
    config: DensityConfig,
}

impl DensityManager {
    /// Create a manager with the given tolerances.
    pub fn new(config: DensityConfig) -> Self {
        Self { config }
    }

    /// Tolerances in use.
    pub fn config(&self) -> &DensityConfig {
        &self.config
    }

    /// The static density profile for a module type.
    pub fn profile_for(&self, module_type: ModuleType) -> DensityProfile {
        DensityProfile::for_module_type(module_type)
    }

    /// Indices (0-based) of scenes that carry an interaction.
    pub fn interactive_indices(scenes: &[Scene]) -> Vec<usize> {
        scenes
            .iter()
            .enumerate()
            .filter(|(_, scene)| scene.is_interactive())
            .map(|(i, _)| i)
            .collect()
    }

    /// Target indices for interactive scenes, keeping every index in `existing`.
    ///
    /// Evenly spaced slots are taken first where they keep `min_spacing` from what
    /// is already placed. Slots are never closer than `min_spacing + 1` apart, even
    /// when the profile's rate would pack them tighter. Any remaining quota goes to
    /// the midpoint of the largest free gap whose midpoint keeps `min_spacing`; when
    /// no gap can, the quota is left short.
    pub fn calculate_optimal_placements(
        &self,
        total_scenes: usize,
        profile: &DensityProfile,
        existing: &[usize],
    ) -> Vec<usize> {
        let mut placed = normalized_indices(existing, total_scenes);
        let target = profile.target_count(total_scenes);
        if placed.len() >= target {
            return placed;
        }

        let min_spacing = profile.min_spacing as usize;
        let ideal_spacing = total_scenes as f64 / target as f64;
        let step = ideal_spacing.max(min_spacing as f64 + 1.0);
        let offset = step / 2.0;

        for k in 0..target {
            if placed.len() >= target {
                break;
            }
            let index = ((offset + k as f64 * step).floor() as usize).min(total_scenes - 1);
            if placed.contains(&index) {
                continue;
            }
            if keeps_spacing(&placed, index, min_spacing) {
                placed.push(index);
                placed.sort_unstable();
            }
        }

        while placed.len() < target {
            let Some(index) = largest_gap_midpoint(&placed, total_scenes, min_spacing) else {
                break;
            };
            placed.push(index);
            placed.sort_unstable();
        }

        tracing::debug!(
            total_scenes,
            target,
            placed = placed.len(),
            "calculated interaction placements"
        );
        placed
    }

    /// Check a placement against the profile's rate, spacing and distribution.
    pub fn validate_density(
        &self,
        interactive: &[usize],
        total_scenes: usize,
        profile: &DensityProfile,
    ) -> DensityValidation {
        let target_rate = profile.target_interaction_rate;
        if total_scenes == 0 {
            return DensityValidation {
                is_valid: true,
                current_rate: 0.0,
                target_rate,
                cluster_score: 0.0,
                issues: Vec::new(),
                recommendations: Vec::new(),
            };
        }

        let indices = normalized_indices(interactive, total_scenes);
        let current_rate = indices.len() as f64 / total_scenes as f64;
        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        let deviation = current_rate - target_rate;
        if deviation.abs() > self.config.rate_tolerance {
            let count = scene_count_for(deviation.abs(), total_scenes);
            issues.push(format!(
                "Interaction rate {:.0}% deviates from the {:.0}% target",
                current_rate * 100.0,
                target_rate * 100.0
            ));
            if deviation < 0.0 {
                recommendations.push(format!("Add approximately {} interactive scenes", count));
            } else {
                recommendations.push(format!(
                    "Remove approximately {} interactive scenes",
                    count
                ));
            }
        }

        let min_spacing = profile.min_spacing as usize;
        let crowded: Vec<_> = indices
            .windows(2)
            .filter(|pair| scenes_between(pair[0], pair[1]) < min_spacing)
            .collect();
        for pair in &crowded {
            issues.push(format!(
                "Scenes {} and {} are closer than the minimum spacing of {}",
                pair[0] + 1,
                pair[1] + 1,
                min_spacing
            ));
        }
        if !crowded.is_empty() {
            recommendations.push(format!(
                "Leave at least {} passive scenes between interactions",
                min_spacing
            ));
        }

        let cluster_score = calculate_cluster_score(&indices, total_scenes);
        if cluster_score > self.config.clustering_threshold {
            issues.push(format!(
                "Interactions are unevenly distributed (cluster score {:.2})",
                cluster_score
            ));
            recommendations.push("Distribute interactions more evenly across the module".to_string());
        }

        DensityValidation {
            is_valid: issues.is_empty(),
            current_rate,
            target_rate,
            cluster_score,
            issues,
            recommendations,
        }
    }

    /// Nudge a profile from learner feedback.
    pub fn adjust_intensity(
        &self,
        profile: &DensityProfile,
        signals: &EngagementSignals,
    ) -> DensityProfile {
        let mut rate = profile.target_interaction_rate;
        let mut spacing = profile.min_spacing;

        if signals.engagement_score.is_some_and(|score| score < 5.0) {
            rate -= 0.1;
            spacing += 1;
        }
        if signals.completion_rate.is_some_and(|completion| completion > 0.8) {
            rate += 0.1;
            spacing = spacing.saturating_sub(1);
        }
        if signals.time_budget_minutes.is_some_and(|minutes| minutes < 15.0) {
            rate -= 0.05;
        }

        let adjusted = DensityProfile {
            target_interaction_rate: rate.clamp(self.config.min_rate, self.config.max_rate),
            min_spacing: spacing,
            ..*profile
        };
        tracing::debug!(
            from = profile.target_interaction_rate,
            to = adjusted.target_interaction_rate,
            spacing = adjusted.min_spacing,
            "adjusted density profile"
        );
        adjusted
    }
}

/// Mean absolute deviation of actual spacing from ideal even spacing, relative to
/// the ideal. 0 is perfectly even; fewer than two interactions score 0.
pub fn calculate_cluster_score(indices: &[usize], total_scenes: usize) -> f64 {
    if indices.len() < 2 || total_scenes == 0 {
        return 0.0;
    }
    let ideal = total_scenes as f64 / indices.len() as f64;
    let spacings: Vec<f64> = indices
        .windows(2)
        .map(|pair| pair[1].abs_diff(pair[0]) as f64)
        .collect();
    let deviation =
        spacings.iter().map(|s| (s - ideal).abs()).sum::<f64>() / spacings.len() as f64;
    deviation / ideal
}

/// Passive scenes strictly between two indices.
fn scenes_between(a: usize, b: usize) -> usize {
    a.abs_diff(b).saturating_sub(1)
}

fn keeps_spacing(placed: &[usize], index: usize, min_spacing: usize) -> bool {
    placed
        .iter()
        .all(|&p| scenes_between(p, index) >= min_spacing)
}

fn normalized_indices(indices: &[usize], total_scenes: usize) -> Vec<usize> {
    let mut out: Vec<_> = indices.iter().copied().filter(|&i| i < total_scenes).collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Scenes needed to close a rate gap, rounded up.
fn scene_count_for(rate_gap: f64, total_scenes: usize) -> usize {
    // The epsilon keeps exact products such as 0.25 * 12 from rounding up.
    (rate_gap * total_scenes as f64 - 1e-9).ceil().max(1.0) as usize
}

/// Midpoint of the widest run of free indices, edges included, skipping runs
/// whose midpoint would crowd a placed neighbour.
fn largest_gap_midpoint(
    placed: &[usize],
    total_scenes: usize,
    min_spacing: usize,
) -> Option<usize> {
    let mut bounds: Vec<i64> = Vec::with_capacity(placed.len() + 2);
    bounds.push(-1);
    bounds.extend(placed.iter().map(|&i| i as i64));
    bounds.push(total_scenes as i64);

    let mut best: Option<(i64, usize)> = None;
    for pair in bounds.windows(2) {
        let free = pair[1] - pair[0] - 1;
        if free <= 0 {
            continue;
        }
        let mid = (pair[0] + pair[1])
            .div_euclid(2)
            .clamp(0, total_scenes as i64 - 1) as usize;
        if !keeps_spacing(placed, mid, min_spacing) {
            continue;
        }
        if best.map_or(true, |(size, _)| free > size) {
            best = Some((free, mid));
        }
    }
    best.map(|(_, mid)| mid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_rules::InteractivityTypeId;

    fn profile(module_type: ModuleType) -> DensityProfile {
        DensityProfile::for_module_type(module_type)
    }

    #[test]
    fn test_even_placements() {
        let manager = DensityManager::default();
        let placements =
            manager.calculate_optimal_placements(12, &profile(ModuleType::Application), &[]);
        assert_eq!(placements, vec![1, 3, 5, 7, 9, 11]);

        let placements =
            manager.calculate_optimal_placements(10, &profile(ModuleType::Awareness), &[]);
        assert_eq!(placements, vec![2, 7]);
    }

    #[test]
    fn test_placements_keep_existing_and_spacing() {
        let manager = DensityManager::default();
        let placements = manager.calculate_optimal_placements(
            12,
            &profile(ModuleType::Application),
            &[0, 1, 2],
        );
        assert_eq!(placements, vec![0, 1, 2, 5, 7, 9]);
    }

    #[test]
    fn test_gap_fill_when_spacing_blocks_slots() {
        let manager = DensityManager::default();
        // Awareness wants 3 of 15 with 3 passive scenes between; slot 2 is blocked
        // by the existing interaction at 4.
        let placements =
            manager.calculate_optimal_placements(15, &profile(ModuleType::Awareness), &[4]);
        assert_eq!(placements.len(), 3);
        assert!(placements.contains(&4));
    }

    #[test]
    fn test_placements_widen_to_min_spacing() {
        let manager = DensityManager::default();
        let skill = profile(ModuleType::SkillBuilding);
        // 35% of 10 wants 4 slots 2.5 apart, tighter than two passive scenes allow.
        let placements = manager.calculate_optimal_placements(10, &skill, &[]);
        assert_eq!(placements, vec![1, 4, 7]);
        assert!(manager.validate_density(&placements, 10, &skill).is_valid);
    }

    #[test]
    fn test_placements_validate_across_module_sizes() {
        let manager = DensityManager::default();
        for module_type in [
            ModuleType::Awareness,
            ModuleType::SkillBuilding,
            ModuleType::Application,
        ] {
            let profile = profile(module_type);
            for total in 4..=40 {
                let placements = manager.calculate_optimal_placements(total, &profile, &[]);
                let validation = manager.validate_density(&placements, total, &profile);
                assert!(
                    validation.is_valid,
                    "{} scenes of {}: {:?} {:?}",
                    total, module_type, placements, validation.issues
                );
            }
        }
    }

    #[test]
    fn test_placements_never_exceed_scene_count() {
        let manager = DensityManager::default();
        let placements =
            manager.calculate_optimal_placements(3, &profile(ModuleType::Immersive), &[]);
        assert!(placements.iter().all(|&i| i < 3));
        assert!(manager
            .calculate_optimal_placements(0, &profile(ModuleType::Immersive), &[])
            .is_empty());
    }

    #[test]
    fn test_clustered_placement_is_flagged() {
        let manager = DensityManager::default();
        let mut application = profile(ModuleType::Application);
        application.target_interaction_rate = 0.5;

        assert!((calculate_cluster_score(&[0, 1, 2], 12) - 0.75).abs() < 1e-9);

        let validation = manager.validate_density(&[0, 1, 2], 12, &application);
        assert!(!validation.is_valid);
        assert_eq!(validation.current_rate, 0.25);
        assert!(validation.cluster_score > 0.3);
        assert!(validation.issues.iter().any(|i| i.contains("unevenly")));
        assert!(validation
            .recommendations
            .contains(&"Add approximately 3 interactive scenes".to_string()));
    }

    #[test]
    fn test_even_placement_is_valid() {
        let manager = DensityManager::default();
        let validation =
            manager.validate_density(&[1, 3, 5, 7, 9, 11], 12, &profile(ModuleType::Application));
        assert!(validation.is_valid, "{:?}", validation.issues);
        assert_eq!(validation.cluster_score, 0.0);
    }

    #[test]
    fn test_too_many_interactions() {
        let manager = DensityManager::default();
        let all: Vec<_> = (0..10).collect();
        let validation = manager.validate_density(&all, 10, &profile(ModuleType::Awareness));
        assert!(!validation.is_valid);
        assert!(validation
            .recommendations
            .iter()
            .any(|r| r == "Remove approximately 8 interactive scenes"));
        assert!(validation.issues.iter().any(|i| i.contains("minimum spacing")));
    }

    #[test]
    fn test_adjust_intensity() {
        let manager = DensityManager::default();
        let skill = profile(ModuleType::SkillBuilding);

        let disengaged = manager.adjust_intensity(
            &skill,
            &EngagementSignals {
                engagement_score: Some(3.0),
                ..Default::default()
            },
        );
        assert!((disengaged.target_interaction_rate - 0.25).abs() < 1e-9);
        assert_eq!(disengaged.min_spacing, 3);

        let finishing = manager.adjust_intensity(
            &profile(ModuleType::Immersive),
            &EngagementSignals {
                completion_rate: Some(0.95),
                ..Default::default()
            },
        );
        assert_eq!(finishing.target_interaction_rate, 0.8);
        assert_eq!(finishing.min_spacing, 0);

        let rushed = manager.adjust_intensity(
            &profile(ModuleType::Awareness),
            &EngagementSignals {
                engagement_score: Some(2.0),
                time_budget_minutes: Some(10.0),
                ..Default::default()
            },
        );
        assert_eq!(rushed.target_interaction_rate, 0.15);
    }

    #[test]
    fn test_interactive_indices() {
        let scenes = vec![
            Scene::new(1, "Intro"),
            Scene::new(2, "Check").with_interaction(InteractivityTypeId::SingleSelectQuiz),
            Scene::new(3, "Explain"),
            Scene::new(4, "Sort").with_interaction(InteractivityTypeId::DragAndDrop),
        ];
        assert_eq!(DensityManager::interactive_indices(&scenes), vec![1, 3]);
    }

    #[test]
    fn test_empty_module_is_valid() {
        let validation =
            DensityManager::default().validate_density(&[], 0, &profile(ModuleType::Awareness));
        assert!(validation.is_valid);
    }
}
