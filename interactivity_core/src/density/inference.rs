//! Module tier inference from topic, source material and duration.

use storyboard_rules::ModuleType;

/// Keywords per tier, checked in this order.
const TIER_KEYWORDS: &[(ModuleType, &[&str])] = &[
    (
        ModuleType::Immersive,
        &["simulation", "role-play", "roleplay", "immersive", "virtual lab", "game-based"],
    ),
    (
        ModuleType::Application,
        &["hands-on", "workshop", "case study", "practical", "scenario", "apply"],
    ),
    (
        ModuleType::Awareness,
        &[
            "awareness",
            "overview",
            "orientation",
            "introduction to",
            "policy update",
            "announcement",
        ],
    ),
    (
        ModuleType::SkillBuilding,
        &["skill", "how to", "technique", "procedure", "training"],
    ),
];

/// Guess the module tier. Keywords win; otherwise long modules lean towards
/// application and medium ones towards skill building.
pub fn infer_module_type(
    topic: &str,
    source_material: &str,
    duration_minutes: Option<f64>,
) -> ModuleType {
    let text = format!("{} {}", topic, source_material).to_lowercase();

    if let Some((module_type, keyword)) = TIER_KEYWORDS.iter().find_map(|(module_type, keywords)| {
        keywords
            .iter()
            .find(|kw| text.contains(*kw))
            .map(|kw| (*module_type, *kw))
    }) {
        tracing::debug!(%module_type, keyword, "module type inferred from keywords");
        return module_type;
    }

    match duration_minutes {
        Some(minutes) if minutes >= 30.0 => ModuleType::Application,
        // Medium-length modules (15+ minutes) share the default tier.
        _ => ModuleType::SkillBuilding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_take_precedence() {
        assert_eq!(
            infer_module_type("Security Awareness 2024", "", Some(45.0)),
            ModuleType::Awareness
        );
        assert_eq!(
            infer_module_type("Customer calls", "A role-play of difficult calls", None),
            ModuleType::Immersive
        );
        assert_eq!(
            infer_module_type("Negotiation Workshop", "", Some(5.0)),
            ModuleType::Application
        );
    }

    #[test]
    fn test_duration_thresholds() {
        assert_eq!(infer_module_type("Budgets", "", Some(30.0)), ModuleType::Application);
        assert_eq!(infer_module_type("Budgets", "", Some(15.0)), ModuleType::SkillBuilding);
        assert_eq!(infer_module_type("Budgets", "", Some(5.0)), ModuleType::SkillBuilding);
        assert_eq!(infer_module_type("Budgets", "", None), ModuleType::SkillBuilding);
    }
}
