//! Sequence Optimizer - reorders a finished scene list.
//!
//! Opening and closing scenes stay in place. Content scenes are ordered by Bloom
//! progression, then spread so heavy scenes are followed by light ones, then
//! interleaved into a high / medium / high / low engagement rhythm. Scenes are
//! renumbered from 1 at the end.

use std::collections::{HashMap, VecDeque};

use storyboard_rules::{BloomLevel, Scene};

use crate::classifier::{ContentClassifier, KeywordClassifier};
use crate::cognitive_load::SceneLoad;

const OPENING_TITLES: &[&str] = &["welcome", "introduction", "intro", "objectives", "overview"];
const CLOSING_TITLES: &[&str] = &[
    "summary",
    "conclusion",
    "recap",
    "wrap-up",
    "wrap up",
    "next steps",
];

/// Narration longer than this costs a point of engagement.
const LONG_NARRATION_WORDS: usize = 150;

/// Engagement bucket of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engagement {
    High,
    Medium,
    Low,
}

impl Engagement {
    fn from_score(score: i32) -> Self {
        match score {
            s if s >= 4 => Engagement::High,
            s if s >= 2 => Engagement::Medium,
            _ => Engagement::Low,
        }
    }
}

/// Repeating bucket order for the engagement rhythm.
const RHYTHM: [Engagement; 4] = [
    Engagement::High,
    Engagement::Medium,
    Engagement::High,
    Engagement::Low,
];

pub struct SequenceOptimizer {
    classifier: Box<dyn ContentClassifier>,
}

impl SequenceOptimizer {
    /// Create an optimizer using the keyword classifier.
    pub fn new() -> Self {
        Self {
            classifier: Box::new(KeywordClassifier::new()),
        }
    }

    /// Replace the classifier used for Bloom inference.
    pub fn with_classifier(mut self, classifier: Box<dyn ContentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Reorder and renumber `scenes`. `outcomes` maps scene numbers to the learning
    /// outcome text used for Bloom inference; scenes without one are classified
    /// from their own text.
    pub fn optimize(&self, scenes: Vec<Scene>, outcomes: &HashMap<u32, String>) -> Vec<Scene> {
        let total = scenes.len();
        let mut opening = Vec::new();
        let mut closing = Vec::new();
        let mut content = Vec::new();
        for scene in scenes {
            let title = scene.title.to_lowercase();
            if OPENING_TITLES.iter().any(|kw| title.contains(kw)) {
                opening.push(scene);
            } else if CLOSING_TITLES.iter().any(|kw| title.contains(kw)) {
                closing.push(scene);
            } else {
                content.push(scene);
            }
        }

        let content = self.order_by_bloom(content, outcomes);
        let content = balance_load(content);
        let content = apply_engagement_rhythm(content);

        let mut ordered: Vec<Scene> = opening
            .into_iter()
            .chain(content)
            .chain(closing)
            .collect();
        for (i, scene) in ordered.iter_mut().enumerate() {
            scene.scene_number = i as u32 + 1;
        }

        tracing::debug!(scenes = total, "sequence optimized");
        ordered
    }

    /// Bloom level used for ordering; `Understand` when nothing matches.
    pub fn bloom_level_of(&self, scene: &Scene, outcomes: &HashMap<u32, String>) -> BloomLevel {
        outcomes
            .get(&scene.scene_number)
            .and_then(|outcome| self.classifier.infer_bloom_level(outcome))
            .or_else(|| self.classifier.infer_bloom_level(&scene.full_text()))
            .unwrap_or_default()
    }

    /// Stable sort from Remember to Create.
    pub fn order_by_bloom(
        &self,
        scenes: Vec<Scene>,
        outcomes: &HashMap<u32, String>,
    ) -> Vec<Scene> {
        let mut keyed: Vec<_> = scenes
            .into_iter()
            .map(|scene| (self.bloom_level_of(&scene, outcomes), scene))
            .collect();
        keyed.sort_by_key(|(level, _)| *level);
        keyed.into_iter().map(|(_, scene)| scene).collect()
    }
}

impl Default for SequenceOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// After every above-average scene, pull the lightest remaining scene forward.
pub fn balance_load(scenes: Vec<Scene>) -> Vec<Scene> {
    if scenes.len() < 3 {
        return scenes;
    }
    let loads: Vec<f64> = scenes.iter().map(|s| SceneLoad::of(s).total).collect();
    let average = loads.iter().sum::<f64>() / loads.len() as f64;

    let mut remaining: VecDeque<(f64, Scene)> = loads.into_iter().zip(scenes).collect();
    let mut out = Vec::with_capacity(remaining.len());
    let mut previous_heavy = false;

    while !remaining.is_empty() {
        let pick = if previous_heavy {
            lightest(&remaining)
        } else {
            0
        };
        let Some((load, scene)) = remaining.remove(pick) else {
            break;
        };
        previous_heavy = load > average;
        out.push(scene);
    }
    out
}

fn lightest(remaining: &VecDeque<(f64, Scene)>) -> usize {
    remaining
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.0.total_cmp(&b.0))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Heuristic engagement score of a scene.
pub fn engagement_score(scene: &Scene) -> i32 {
    let mut score = 0;
    if scene.is_interactive() {
        score += 3;
    }
    let text = scene.full_text();
    score += text.matches('?').count().min(2) as i32;
    if text.to_lowercase().contains("scenario") {
        score += 2;
    }
    if scene.narration.split_whitespace().count() > LONG_NARRATION_WORDS {
        score -= 1;
    }
    score
}

/// Interleave scenes by engagement bucket following the rhythm pattern. Order
/// within a bucket is preserved; an empty bucket is skipped.
pub fn apply_engagement_rhythm(scenes: Vec<Scene>) -> Vec<Scene> {
    let mut buckets: HashMap<Engagement, VecDeque<Scene>> = HashMap::new();
    let total = scenes.len();
    for scene in scenes {
        let bucket = Engagement::from_score(engagement_score(&scene));
        buckets.entry(bucket).or_default().push_back(scene);
    }

    let mut out = Vec::with_capacity(total);
    for step in RHYTHM.iter().cycle() {
        if out.len() == total {
            break;
        }
        if let Some(scene) = buckets.get_mut(step).and_then(VecDeque::pop_front) {
            out.push(scene);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_rules::InteractivityTypeId;

    fn titles(scenes: &[Scene]) -> Vec<&str> {
        scenes.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_engagement_score() {
        let plain = Scene::new(1, "Background");
        assert_eq!(engagement_score(&plain), 0);

        let quiz = Scene::new(2, "Check")
            .with_narration("Which option is right? Why? Really?")
            .with_interaction(InteractivityTypeId::SingleSelectQuiz);
        assert_eq!(engagement_score(&quiz), 5);

        let scenario = Scene::new(3, "A scenario").with_narration("word ".repeat(200));
        assert_eq!(engagement_score(&scenario), 1);
    }

    #[test]
    fn test_rhythm_interleaves_buckets() {
        let high = |n: u32| {
            Scene::new(n, format!("High {}", n))
                .with_interaction(InteractivityTypeId::ScenarioSimulation)
                .with_narration("Pick one?")
        };
        let medium = |n: u32| Scene::new(n, format!("Medium {}", n)).with_narration("Why? How?");
        let low = |n: u32| Scene::new(n, format!("Low {}", n));

        let scenes = vec![low(1), low(2), medium(3), high(4), high(5), medium(6)];
        let ordered = apply_engagement_rhythm(scenes);
        assert_eq!(
            titles(&ordered),
            vec!["High 4", "Medium 3", "High 5", "Low 1", "Medium 6", "Low 2"]
        );
    }

    #[test]
    fn test_balance_load_breaks_up_heavy_runs() {
        let heavy = |n: u32| {
            Scene::new(n, format!("Heavy {}", n))
                .with_narration("The governance framework and compliance methodology in theory")
                .with_visual_brief("complex layered diagram")
                .with_interaction(InteractivityTypeId::BranchingScenario)
        };
        let light = |n: u32| Scene::new(n, format!("Light {}", n));

        let balanced = balance_load(vec![heavy(1), heavy(2), light(3), light(4)]);
        assert_eq!(titles(&balanced), vec!["Heavy 1", "Light 3", "Heavy 2", "Light 4"]);
    }

    #[test]
    fn test_order_by_bloom_uses_outcomes() {
        let optimizer = SequenceOptimizer::new();
        let scenes = vec![
            Scene::new(1, "Plan"),
            Scene::new(2, "Terms"),
            Scene::new(3, "Practice"),
        ];
        let outcomes = HashMap::from([
            (1, "Design an onboarding plan".to_string()),
            (2, "Define the core terminology".to_string()),
            (3, "Apply the policy to a case".to_string()),
        ]);
        let ordered = optimizer.order_by_bloom(scenes, &outcomes);
        assert_eq!(titles(&ordered), vec!["Terms", "Practice", "Plan"]);
    }

    #[test]
    fn test_optimize_keeps_bookends_and_renumbers() {
        let optimizer = SequenceOptimizer::new();
        let scenes = vec![
            Scene::new(1, "Summary"),
            Scene::new(2, "Core idea"),
            Scene::new(3, "Welcome aboard"),
            Scene::new(4, "Check")
                .with_narration("Ready?")
                .with_interaction(InteractivityTypeId::SingleSelectQuiz),
        ];
        let ordered = optimizer.optimize(scenes, &HashMap::new());

        assert_eq!(ordered.len(), 4);
        assert_eq!(ordered[0].title, "Welcome aboard");
        assert_eq!(ordered[3].title, "Summary");
        let numbers: Vec<_> = ordered.iter().map(|s| s.scene_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_optimize_empty() {
        assert!(SequenceOptimizer::new()
            .optimize(Vec::new(), &HashMap::new())
            .is_empty());
    }
}
