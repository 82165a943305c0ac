//! Per-scene load components.

use serde::{Deserialize, Serialize};
use storyboard_rules::{InteractivityTypeId, Scene};

/// Load every scene carries before content is considered.
pub const BASE_LOAD: f64 = 3.0;

const COMPLEX_VOCABULARY: &[&str] = &[
    "algorithm",
    "architecture",
    "compliance",
    "configuration",
    "framework",
    "governance",
    "implementation",
    "infrastructure",
    "methodology",
    "optimization",
    "paradigm",
    "regulatory",
    "remediation",
    "stakeholder",
    "synthesis",
    "taxonomy",
    "throughput",
    "validation",
];

const ABSTRACT_MARKERS: &[&str] = &[
    "abstract",
    "concept",
    "hypothetical",
    "philosophy",
    "principle",
    "theoretical",
    "theory",
];

const VISUAL_MARKERS: &[&str] = &[
    "animation",
    "chart",
    "complex",
    "detailed",
    "diagram",
    "flowchart",
    "graph",
    "infographic",
    "layered",
    "multiple",
    "table",
    "timeline",
];

const NARRATION_WORD_LIMIT: usize = 150;
const ON_SCREEN_WORD_LIMIT: usize = 50;
const CONCEPT_DENSITY_LIMIT: usize = 3;

/// Breakdown of one scene's load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneLoad {
    pub scene_number: u32,
    /// 0 - 4.
    pub content_complexity: f64,
    /// 0 - 3.
    pub interaction_complexity: f64,
    /// 0 - 2.
    pub information_density: f64,
    /// 0 - 2.
    pub visual_complexity: f64,
    /// Base plus components, clamped to 1 - 10.
    pub total: f64,
}

impl SceneLoad {
    /// Score one scene.
    pub fn of(scene: &Scene) -> Self {
        let content_complexity = content_complexity(&scene.narration, &scene.on_screen_text);
        let interaction_complexity = interaction_complexity(scene.interaction);
        let information_density = information_density(&scene.narration, &scene.on_screen_text);
        let visual_complexity = visual_complexity(&scene.visual_brief);

        let total = (BASE_LOAD
            + content_complexity
            + interaction_complexity
            + information_density
            + visual_complexity)
            .clamp(1.0, 10.0);

        Self {
            scene_number: scene.scene_number,
            content_complexity,
            interaction_complexity,
            information_density,
            visual_complexity,
            total,
        }
    }
}

/// Fixed cost of an interaction type; no interaction costs nothing.
pub fn interaction_complexity(interaction: Option<InteractivityTypeId>) -> f64 {
    use InteractivityTypeId::*;
    match interaction {
        None => 0.0,
        Some(ClickToReveal | Flashcards) => 0.5,
        Some(SingleSelectQuiz | MultiSelectQuiz | Reflection | Hotspot) => 1.0,
        Some(DragAndDrop | Matching | Sequencing | ScenarioSimulation | CaseStudy) => 2.0,
        Some(SoftwareSimulation | BranchingScenario) => 3.0,
    }
}

/// Vocabulary, abstraction and concept density, 0 - 4.
pub fn content_complexity(narration: &str, on_screen_text: &str) -> f64 {
    let text = format!("{} {}", narration, on_screen_text);
    let words = words(&text);

    let vocabulary_hits = words
        .iter()
        .filter(|w| COMPLEX_VOCABULARY.iter().any(|v| w.starts_with(v)))
        .count();
    let mut score = (vocabulary_hits as f64 * 0.5).min(2.0);

    if words
        .iter()
        .any(|w| ABSTRACT_MARKERS.iter().any(|m| w.starts_with(m)))
    {
        score += 1.0;
    }

    if concept_count(on_screen_text) > CONCEPT_DENSITY_LIMIT {
        score += 1.0;
    }

    score.clamp(0.0, 4.0)
}

/// Word counts past fixed limits, 0 - 2.
pub fn information_density(narration: &str, on_screen_text: &str) -> f64 {
    let mut score = 0.0;
    if words(narration).len() > NARRATION_WORD_LIMIT {
        score += 1.0;
    }
    if words(on_screen_text).len() > ON_SCREEN_WORD_LIMIT {
        score += 1.0;
    }
    score
}

/// Visual-brief markers, half a point each, 0 - 2.
pub fn visual_complexity(visual_brief: &str) -> f64 {
    let hits = words(visual_brief)
        .iter()
        .filter(|w| VISUAL_MARKERS.iter().any(|m| w.starts_with(m)))
        .count();
    (hits as f64 * 0.5).min(2.0)
}

/// Distinct items listed on screen: lines, bullets or semicolon-separated entries.
fn concept_count(on_screen_text: &str) -> usize {
    on_screen_text
        .split(['\n', ';', '•'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .count()
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_scene_has_base_load() {
        let load = SceneLoad::of(&Scene::new(1, "Welcome").with_narration("Hello and welcome."));
        assert_eq!(load.total, BASE_LOAD);
    }

    #[test]
    fn test_interaction_table() {
        use InteractivityTypeId::*;
        assert_eq!(interaction_complexity(None), 0.0);
        assert_eq!(interaction_complexity(Some(SingleSelectQuiz)), 1.0);
        assert_eq!(interaction_complexity(Some(Reflection)), 1.0);
        assert_eq!(interaction_complexity(Some(DragAndDrop)), 2.0);
        assert_eq!(interaction_complexity(Some(ScenarioSimulation)), 2.0);
        assert_eq!(interaction_complexity(Some(BranchingScenario)), 3.0);
    }

    #[test]
    fn test_content_complexity_components() {
        let vocab = content_complexity("The governance framework and compliance methodology", "");
        assert_eq!(vocab, 2.0);

        let abstract_only = content_complexity("The principle behind it", "");
        assert_eq!(abstract_only, 1.0);

        let dense = content_complexity("", "Plan\nDo\nCheck\nAct");
        assert_eq!(dense, 1.0);
    }

    #[test]
    fn test_content_complexity_is_capped() {
        let text = "framework governance compliance regulatory taxonomy theory principle";
        let score = content_complexity(text, "a; b; c; d; e");
        assert_eq!(score, 4.0);
    }

    #[test]
    fn test_information_density_thresholds() {
        let long = "word ".repeat(NARRATION_WORD_LIMIT + 1);
        assert_eq!(information_density(&long, ""), 1.0);
        let crowded = "word ".repeat(ON_SCREEN_WORD_LIMIT + 1);
        assert_eq!(information_density(&long, &crowded), 2.0);
        assert_eq!(information_density("short", "short"), 0.0);
    }

    #[test]
    fn test_visual_complexity() {
        assert_eq!(visual_complexity("Photo of an office"), 0.0);
        assert_eq!(visual_complexity("Detailed flowchart with a table"), 1.5);
        assert_eq!(
            visual_complexity("complex layered diagram, chart, graph and animation"),
            2.0
        );
    }

    #[test]
    fn test_scene_load_is_clamped() {
        let scene = Scene::new(3, "Heavy")
            .with_narration(format!(
                "{} framework governance compliance regulatory theory",
                "word ".repeat(200)
            ))
            .with_on_screen_text(format!("{}\na\nb\nc\nd", "term ".repeat(60)))
            .with_visual_brief("complex detailed layered diagram")
            .with_interaction(InteractivityTypeId::BranchingScenario);
        let load = SceneLoad::of(&scene);
        assert_eq!(load.total, 10.0);
        assert_eq!(load.scene_number, 3);
    }
}
