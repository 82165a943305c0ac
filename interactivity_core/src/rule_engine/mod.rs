//! Pedagogical Rule Engine - evaluates the trigger table against a scene.
//!
//! Rules are advisory. They do not feed the scorer; callers use them to
//! cross-check a decision or to fill gaps the catalog scorer does not cover.

use serde::{Deserialize, Serialize};
use storyboard_rules::{
    BloomLevel, InteractivityTypeId, PedagogicalRule, RuleAction, Scene, TriggerCondition,
};

use crate::classifier::{ContentClassifier, ContentTraits};
use crate::cognitive_load::visual_complexity;
use crate::decision_engine::InteractivityDecision;

/// Thresholds used when a rule's trigger does not carry its own.
const DEFAULT_GAP_SCENES: f64 = 3.0;
const DEFAULT_END_RATIO: f64 = 0.8;
const DEFAULT_VISUAL_COMPLEXITY: f64 = 1.5;
const DEFAULT_DURATION_MINUTES: f64 = 30.0;

/// What the rules know about one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleContext {
    pub scene_number: u32,
    pub bloom_level: Option<BloomLevel>,
    /// Passive scenes since the last interactive one (or since the start).
    pub scenes_since_interaction: usize,
    /// Position in the module, 0.0 - 1.0, the last scene being 1.0.
    pub position_ratio: f64,
    pub visual_complexity: f64,
    pub module_duration_minutes: Option<f64>,
    pub traits: ContentTraits,
}

impl RuleContext {
    /// Build the context for `scenes[index]`. `None` if the index is out of range.
    pub fn for_scene(
        scenes: &[Scene],
        index: usize,
        module_duration_minutes: Option<f64>,
        classifier: &dyn ContentClassifier,
    ) -> Option<Self> {
        let scene = scenes.get(index)?;
        let text = scene.full_text();

        let scenes_since_interaction = scenes[..index]
            .iter()
            .rev()
            .take_while(|s| !s.is_interactive())
            .count();

        Some(Self {
            scene_number: scene.scene_number,
            bloom_level: classifier.infer_bloom_level(&text),
            scenes_since_interaction,
            position_ratio: (index + 1) as f64 / scenes.len() as f64,
            visual_complexity: visual_complexity(&scene.visual_brief),
            module_duration_minutes,
            traits: classifier.classify(&text),
        })
    }

    /// Use a known Bloom level instead of the inferred one.
    pub fn with_bloom_level(mut self, level: BloomLevel) -> Self {
        self.bloom_level = Some(level);
        self
    }
}

/// A rule disagreeing with a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAdvice {
    pub scene_number: u32,
    pub rule_id: String,
    pub priority: u8,
    pub recommended: RuleAction,
    /// Type chosen by the engine, `None` for no interaction.
    pub decided: Option<InteractivityTypeId>,
    pub rationale: String,
}

pub struct RuleEngine {
    rules: Vec<PedagogicalRule>,
}

impl RuleEngine {
    /// Engine over a custom table. Rules are kept highest priority first.
    pub fn new(mut rules: Vec<PedagogicalRule>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules }
    }

    /// Create an engine over the built-in rule table.
    pub fn with_defaults() -> Self {
        Self::new(PedagogicalRule::table())
    }

    /// Rules in descending priority order.
    pub fn rules(&self) -> &[PedagogicalRule] {
        &self.rules
    }

    /// Whether a rule's trigger fires in this context.
    pub fn fires(rule: &PedagogicalRule, context: &RuleContext) -> bool {
        let threshold = rule.trigger.threshold;
        match &rule.trigger.condition {
            TriggerCondition::ScenesSinceInteraction => {
                context.scenes_since_interaction as f64 >= threshold.unwrap_or(DEFAULT_GAP_SCENES)
            }
            TriggerCondition::BloomLevelIn { levels } => context
                .bloom_level
                .is_some_and(|level| levels.contains(&level)),
            TriggerCondition::EmotionalContent => context.traits.emotional,
            TriggerCondition::ProceduralContent => context.traits.procedural,
            TriggerCondition::CategorizationContent => context.traits.categorization,
            TriggerCondition::AttitudinalContent => context.traits.attitudinal,
            TriggerCondition::SequentialProcess => context.traits.sequential,
            TriggerCondition::VisualComplexity => {
                context.visual_complexity >= threshold.unwrap_or(DEFAULT_VISUAL_COMPLEXITY)
            }
            TriggerCondition::NearModuleEnd => {
                context.position_ratio >= threshold.unwrap_or(DEFAULT_END_RATIO)
            }
            TriggerCondition::ModuleDuration => context
                .module_duration_minutes
                .is_some_and(|minutes| minutes >= threshold.unwrap_or(DEFAULT_DURATION_MINUTES)),
        }
    }

    /// Every rule that fires, highest priority first.
    pub fn get_applicable_rules(&self, context: &RuleContext) -> Vec<&PedagogicalRule> {
        let applicable: Vec<_> = self
            .rules
            .iter()
            .filter(|rule| Self::fires(rule, context))
            .collect();
        tracing::debug!(
            scene = context.scene_number,
            fired = applicable.len(),
            "evaluated pedagogical rules"
        );
        applicable
    }

    /// Action of the strongest applicable rule.
    pub fn get_recommended_interaction(&self, context: &RuleContext) -> Option<RuleAction> {
        self.get_applicable_rules(context)
            .first()
            .map(|rule| rule.action)
    }

    /// Advice when the strongest applicable rule recommends something other than
    /// what was decided.
    pub fn review(
        &self,
        context: &RuleContext,
        decision: &InteractivityDecision,
    ) -> Option<RuleAdvice> {
        let top = self.get_applicable_rules(context).into_iter().next()?;
        if decision.interactivity_type == Some(top.action.interaction) {
            return None;
        }
        Some(RuleAdvice {
            scene_number: context.scene_number,
            rule_id: top.id.clone(),
            priority: top.priority,
            recommended: top.action,
            decided: decision.interactivity_type,
            rationale: top.rationale.clone(),
        })
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
