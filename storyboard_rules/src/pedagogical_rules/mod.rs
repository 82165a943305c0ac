//! Declarative trigger -> recommendation rules.
//!
//! The table is data only; evaluating triggers against scene content lives in the
//! engine crate.

use serde::{Deserialize, Serialize};

use crate::catalog::InteractivityTypeId;
use crate::pedagogy::{BloomLevel, InstructionalPurpose};

/// Condition that makes a rule fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum TriggerCondition {
    /// Scenes since the last interactive scene reach the threshold.
    ScenesSinceInteraction,
    /// The scene's Bloom level is one of these.
    BloomLevelIn { levels: Vec<BloomLevel> },
    EmotionalContent,
    ProceduralContent,
    CategorizationContent,
    AttitudinalContent,
    SequentialProcess,
    /// Visual complexity score (0-2) reaches the threshold.
    VisualComplexity,
    /// Position in the module (0.0 - 1.0) reaches the threshold.
    NearModuleEnd,
    /// Estimated module duration in minutes reaches the threshold.
    ModuleDuration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(flatten)]
    pub condition: TriggerCondition,
    #[serde(default)]
    pub threshold: Option<f64>,
}

impl Trigger {
    /// Trigger with the condition's default threshold.
    pub fn when(condition: TriggerCondition) -> Self {
        Self {
            condition,
            threshold: None,
        }
    }

    /// Trigger that fires at or above `threshold`.
    pub fn at_least(condition: TriggerCondition, threshold: f64) -> Self {
        Self {
            condition,
            threshold: Some(threshold),
        }
    }

    /// Trigger on membership in `levels`.
    pub fn bloom(levels: &[BloomLevel]) -> Self {
        Self::when(TriggerCondition::BloomLevelIn {
            levels: levels.to_vec(),
        })
    }
}

/// What a fired rule recommends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAction {
    pub interaction: InteractivityTypeId,
    pub purpose: InstructionalPurpose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedagogicalRule {
    pub id: String,
    pub trigger: Trigger,
    pub action: RuleAction,
    pub rationale: String,
    /// 1 (weakest) to 10 (strongest).
    pub priority: u8,
}

impl PedagogicalRule {
    /// Create a rule.
    pub fn new(
        id: impl Into<String>,
        trigger: Trigger,
        interaction: InteractivityTypeId,
        purpose: InstructionalPurpose,
        priority: u8,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            trigger,
            action: RuleAction {
                interaction,
                purpose,
            },
            rationale: rationale.into(),
            priority: priority.clamp(1, 10),
        }
    }

    /// The built-in rule table, highest priority first.
    pub fn table() -> Vec<PedagogicalRule> {
        use BloomLevel::*;
        use InstructionalPurpose::*;
        use InteractivityTypeId as Id;
        use TriggerCondition as When;

        let mut rules = vec![
            PedagogicalRule::new(
                "branching_for_judgment",
                Trigger::bloom(&[Analyze, Evaluate]),
                Id::BranchingScenario,
                Practice,
                10,
                "Judgment outcomes are best practiced through consequences of choices",
            ),
            PedagogicalRule::new(
                "scenario_for_application",
                Trigger::bloom(&[Apply, Analyze]),
                Id::ScenarioSimulation,
                Practice,
                9,
                "Applying knowledge needs a realistic context to act in",
            ),
            PedagogicalRule::new(
                "engagement_gap",
                Trigger::at_least(When::ScenesSinceInteraction, 3.0),
                Id::SingleSelectQuiz,
                Reinforcement,
                8,
                "Attention drops after several passive scenes in a row",
            ),
            PedagogicalRule::new(
                "knowledge_check_before_close",
                Trigger::at_least(When::NearModuleEnd, 0.8),
                Id::SingleSelectQuiz,
                Assessment,
                8,
                "Learners should verify understanding before the module closes",
            ),
            PedagogicalRule::new(
                "procedure_walkthrough",
                Trigger::when(When::ProceduralContent),
                Id::SoftwareSimulation,
                Practice,
                7,
                "Procedures are retained by performing the steps",
            ),
            PedagogicalRule::new(
                "attitude_scenario",
                Trigger::when(When::AttitudinalContent),
                Id::ScenarioSimulation,
                Reinforcement,
                7,
                "Attitudes shift when learners see their choices play out",
            ),
            PedagogicalRule::new(
                "categorize_by_dragging",
                Trigger::when(When::CategorizationContent),
                Id::DragAndDrop,
                Practice,
                6,
                "Sorting items into groups makes category boundaries explicit",
            ),
            PedagogicalRule::new(
                "order_the_process",
                Trigger::when(When::SequentialProcess),
                Id::Sequencing,
                Practice,
                6,
                "Putting steps in order checks grasp of the process flow",
            ),
            PedagogicalRule::new(
                "reflect_on_feelings",
                Trigger::when(When::EmotionalContent),
                Id::Reflection,
                Reinforcement,
                6,
                "Emotional content lands deeper when learners relate it to themselves",
            ),
            PedagogicalRule::new(
                "explore_complex_visual",
                Trigger::at_least(When::VisualComplexity, 1.5),
                Id::Hotspot,
                Foundation,
                5,
                "Dense visuals are easier to absorb one region at a time",
            ),
            PedagogicalRule::new(
                "long_module_checkpoints",
                Trigger::at_least(When::ModuleDuration, 30.0),
                Id::MultiSelectQuiz,
                Reinforcement,
                4,
                "Long modules need periodic retrieval practice",
            ),
            PedagogicalRule::new(
                "recall_with_flashcards",
                Trigger::bloom(&[Remember]),
                Id::Flashcards,
                Reinforcement,
                4,
                "Pure recall benefits from spaced retrieval",
            ),
            PedagogicalRule::new(
                "synthesize_through_reflection",
                Trigger::bloom(&[Create]),
                Id::Reflection,
                Practice,
                5,
                "Creating something new starts with articulating one's own approach",
            ),
        ];

        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sorted_by_priority() {
        let rules = PedagogicalRule::table();
        assert!(rules.len() >= 12);
        for pair in rules.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
        assert_eq!(rules[0].id, "branching_for_judgment");
        assert_eq!(rules[0].priority, 10);
    }

    #[test]
    fn test_rule_ids_unique() {
        let rules = PedagogicalRule::table();
        let mut ids: Vec<_> = rules.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn test_priority_clamped() {
        let rule = PedagogicalRule::new(
            "loud",
            Trigger::when(TriggerCondition::EmotionalContent),
            InteractivityTypeId::Reflection,
            InstructionalPurpose::Reinforcement,
            42,
            "",
        );
        assert_eq!(rule.priority, 10);
    }

    #[test]
    fn test_trigger_serializes_flat() {
        let trigger = Trigger::at_least(TriggerCondition::NearModuleEnd, 0.8);
        let json = serde_json::to_value(&trigger).unwrap();
        assert_eq!(json["condition"], "near_module_end");
        assert_eq!(json["threshold"], 0.8);
    }
}
