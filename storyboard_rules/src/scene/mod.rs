//! Scene records: per-scene decision metadata and the scene content it describes.

use serde::{Deserialize, Serialize};

use crate::catalog::InteractivityTypeId;
use crate::pedagogy::{BloomLevel, InstructionalPurpose, LoadLevel, ModuleLevel};

/// Fully-populated input to one interactivity decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneMetadata {
    /// 1-based position within the module.
    pub scene_number: u32,
    pub bloom_level: BloomLevel,
    pub instructional_purpose: InstructionalPurpose,
    pub module_level: ModuleLevel,
    /// Types chosen for earlier scenes of this module, oldest first.
    pub previous_interactivities: Vec<InteractivityTypeId>,
    /// Load the scene itself asks for.
    pub cognitive_load: LoadLevel,
}

impl SceneMetadata {
    /// Metadata for `scene_number` with every other field at its default.
    pub fn new(scene_number: u32) -> Self {
        Self {
            scene_number: scene_number.max(1),
            bloom_level: BloomLevel::default(),
            instructional_purpose: InstructionalPurpose::default(),
            module_level: ModuleLevel::default(),
            previous_interactivities: Vec::new(),
            cognitive_load: LoadLevel::default(),
        }
    }

    pub fn with_bloom_level(mut self, level: BloomLevel) -> Self {
        self.bloom_level = level;
        self
    }

    pub fn with_purpose(mut self, purpose: InstructionalPurpose) -> Self {
        self.instructional_purpose = purpose;
        self
    }

    pub fn with_module_level(mut self, level: ModuleLevel) -> Self {
        self.module_level = level;
        self
    }

    pub fn with_cognitive_load(mut self, load: LoadLevel) -> Self {
        self.cognitive_load = load;
        self
    }

    pub fn with_previous_interactivities(
        mut self,
        previous: impl IntoIterator<Item = InteractivityTypeId>,
    ) -> Self {
        self.previous_interactivities = previous.into_iter().collect();
        self
    }
}

/// Loosely-typed metadata as produced by the scene-generation pipeline.
///
/// Every field is optional; [`RawSceneMetadata::normalize`] fills the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSceneMetadata {
    pub scene_number: Option<u32>,
    pub bloom_level: Option<String>,
    pub instructional_purpose: Option<String>,
    pub module_level: Option<i64>,
    pub previous_interactivities: Vec<String>,
    pub cognitive_load: Option<String>,
}

impl RawSceneMetadata {
    /// Produce a fully-populated [`SceneMetadata`], substituting defaults for
    /// missing or invalid values. Never fails.
    pub fn normalize(&self) -> SceneMetadata {
        let scene_number = match self.scene_number {
            Some(n) if n >= 1 => n,
            other => {
                tracing::warn!(value = ?other, "scene number missing or zero, using 1");
                1
            }
        };

        let bloom_level = parse_or_default(self.bloom_level.as_deref(), "bloom level", scene_number);
        let instructional_purpose = parse_or_default(
            self.instructional_purpose.as_deref(),
            "instructional purpose",
            scene_number,
        );
        let cognitive_load =
            parse_or_default(self.cognitive_load.as_deref(), "cognitive load", scene_number);

        let module_level = match self.module_level {
            Some(raw) => u8::try_from(raw)
                .ok()
                .and_then(ModuleLevel::new)
                .unwrap_or_else(|| {
                    tracing::warn!(scene = scene_number, value = raw, "invalid module level, using 2");
                    ModuleLevel::default()
                }),
            None => ModuleLevel::default(),
        };

        let previous_interactivities = self
            .previous_interactivities
            .iter()
            .filter(|raw| !raw.trim().eq_ignore_ascii_case("none"))
            .filter_map(|raw| match raw.parse::<InteractivityTypeId>() {
                Ok(id) => Some(id),
                Err(err) => {
                    tracing::warn!(scene = scene_number, %err, "dropping unknown history entry");
                    None
                }
            })
            .collect();

        SceneMetadata {
            scene_number,
            bloom_level,
            instructional_purpose,
            module_level,
            previous_interactivities,
            cognitive_load,
        }
    }
}

fn parse_or_default<T>(raw: Option<&str>, what: &str, scene: u32) -> T
where
    T: std::str::FromStr + Default + std::fmt::Display,
{
    match raw {
        Some(text) => text.parse().unwrap_or_else(|_| {
            let fallback = T::default();
            tracing::warn!(scene, value = text, "invalid {}, using {}", what, fallback);
            fallback
        }),
        None => T::default(),
    }
}

/// Content of one storyboard scene, as seen by the sequence-level validators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_number: u32,
    pub title: String,
    #[serde(default)]
    pub narration: String,
    #[serde(default)]
    pub on_screen_text: String,
    #[serde(default)]
    pub visual_brief: String,
    /// Interaction attached to the scene, if any.
    #[serde(default)]
    pub interaction: Option<InteractivityTypeId>,
}

impl Scene {
    /// Create an empty scene with a title.
    pub fn new(scene_number: u32, title: impl Into<String>) -> Self {
        Self {
            scene_number,
            title: title.into(),
            narration: String::new(),
            on_screen_text: String::new(),
            visual_brief: String::new(),
            interaction: None,
        }
    }

    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = narration.into();
        self
    }

    pub fn with_on_screen_text(mut self, text: impl Into<String>) -> Self {
        self.on_screen_text = text.into();
        self
    }

    pub fn with_visual_brief(mut self, brief: impl Into<String>) -> Self {
        self.visual_brief = brief.into();
        self
    }

    pub fn with_interaction(mut self, interaction: InteractivityTypeId) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Whether an interaction is attached.
    pub fn is_interactive(&self) -> bool {
        self.interaction.is_some()
    }

    /// Title, narration and on-screen text joined for keyword classifiers.
    pub fn full_text(&self) -> String {
        format!("{}\n{}\n{}", self.title, self.narration, self.on_screen_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fills_defaults() {
        let meta = RawSceneMetadata::default().normalize();
        assert_eq!(meta.scene_number, 1);
        assert_eq!(meta.bloom_level, BloomLevel::Understand);
        assert_eq!(meta.instructional_purpose, InstructionalPurpose::Foundation);
        assert_eq!(meta.module_level.get(), 2);
        assert_eq!(meta.cognitive_load, LoadLevel::Medium);
        assert!(meta.previous_interactivities.is_empty());
    }

    #[test]
    fn test_normalize_invalid_values() {
        let raw = RawSceneMetadata {
            scene_number: Some(4),
            bloom_level: Some("Synthesize".to_string()),
            instructional_purpose: Some("ASSESSMENT".to_string()),
            module_level: Some(9),
            previous_interactivities: vec![
                "hotspot".to_string(),
                "None".to_string(),
                "mystery_widget".to_string(),
                "Reflection".to_string(),
            ],
            cognitive_load: Some("extreme".to_string()),
        };

        let meta = raw.normalize();
        assert_eq!(meta.scene_number, 4);
        assert_eq!(meta.bloom_level, BloomLevel::Understand);
        assert_eq!(meta.instructional_purpose, InstructionalPurpose::Assessment);
        assert_eq!(meta.module_level.get(), 2);
        assert_eq!(meta.cognitive_load, LoadLevel::Medium);
        assert_eq!(
            meta.previous_interactivities,
            vec![InteractivityTypeId::Hotspot, InteractivityTypeId::Reflection]
        );
    }

    #[test]
    fn test_raw_metadata_from_camel_case_json() {
        let raw: RawSceneMetadata = serde_json::from_str(
            r#"{"sceneNumber": 3, "bloomLevel": "apply", "moduleLevel": 3,
                "previousInteractivities": ["matching"]}"#,
        )
        .unwrap();
        let meta = raw.normalize();
        assert_eq!(meta.bloom_level, BloomLevel::Apply);
        assert_eq!(meta.module_level.get(), 3);
        assert_eq!(meta.previous_interactivities, vec![InteractivityTypeId::Matching]);
    }

    #[test]
    fn test_scene_builder() {
        let scene = Scene::new(2, "Handling complaints")
            .with_narration("Listen first.")
            .with_interaction(InteractivityTypeId::ScenarioSimulation);
        assert!(scene.is_interactive());
        assert!(scene.full_text().contains("Listen first."));
    }
}
