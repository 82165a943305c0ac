//! Catalog entry describing one kind of interactive exercise.

use serde::{Deserialize, Serialize};

use super::InteractivityTypeId;
use crate::pedagogy::{BloomLevel, InstructionalPurpose, LoadLevel, ModuleLevel};

/// Descriptor of an interactivity type.
///
/// List order is meaningful: the first Bloom level and the first purpose are the
/// primary ones, and the first two module levels are the optimal ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractivityType {
    pub id: InteractivityTypeId,
    pub name: String,
    pub bloom_levels: Vec<BloomLevel>,
    pub module_levels: Vec<ModuleLevel>,
    pub cognitive_load: LoadLevel,
    pub instructional_purposes: Vec<InstructionalPurpose>,
    /// Opaque key handed to the template builder.
    pub template_ref: String,
}

impl InteractivityType {
    /// Create an entry with no levels or purposes; fill them in with the builder methods.
    pub fn new(id: InteractivityTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            bloom_levels: Vec::new(),
            module_levels: Vec::new(),
            cognitive_load: LoadLevel::Medium,
            instructional_purposes: Vec::new(),
            template_ref: id.as_str().to_string(),
        }
    }

    pub fn with_bloom_levels(mut self, levels: impl IntoIterator<Item = BloomLevel>) -> Self {
        self.bloom_levels.extend(levels);
        self
    }

    /// Levels outside 1-4 are ignored.
    pub fn with_module_levels(mut self, levels: impl IntoIterator<Item = u8>) -> Self {
        self.module_levels
            .extend(levels.into_iter().filter_map(ModuleLevel::new));
        self
    }

    pub fn with_cognitive_load(mut self, load: LoadLevel) -> Self {
        self.cognitive_load = load;
        self
    }

    pub fn with_purposes(
        mut self,
        purposes: impl IntoIterator<Item = InstructionalPurpose>,
    ) -> Self {
        self.instructional_purposes.extend(purposes);
        self
    }

    pub fn with_template_ref(mut self, template_ref: impl Into<String>) -> Self {
        self.template_ref = template_ref.into();
        self
    }

    /// The first listed Bloom level.
    pub fn primary_bloom_level(&self) -> Option<BloomLevel> {
        self.bloom_levels.first().copied()
    }

    /// The first listed instructional purpose.
    pub fn primary_purpose(&self) -> Option<InstructionalPurpose> {
        self.instructional_purposes.first().copied()
    }

    /// Whether `level` is listed.
    pub fn supports_bloom(&self, level: BloomLevel) -> bool {
        self.bloom_levels.contains(&level)
    }

    /// Whether `level` is among the supported module levels.
    pub fn supports_module_level(&self, level: ModuleLevel) -> bool {
        self.module_levels.contains(&level)
    }

    /// Whether `level` is among the first two declared module levels.
    pub fn is_optimal_module_level(&self, level: ModuleLevel) -> bool {
        self.module_levels.iter().take(2).any(|l| *l == level)
    }

    /// Checks the structural invariants every catalog entry must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if self.bloom_levels.is_empty() {
            return Err(format!("{}: bloom_levels must not be empty", self.id));
        }
        if self.module_levels.is_empty() {
            return Err(format!("{}: module_levels must not be empty", self.id));
        }
        if self.instructional_purposes.is_empty() {
            return Err(format!("{}: instructional_purposes must not be empty", self.id));
        }
        if self.template_ref.trim().is_empty() {
            return Err(format!("{}: template_ref must not be empty", self.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> InteractivityType {
        InteractivityType::new(InteractivityTypeId::SingleSelectQuiz, "Quiz")
            .with_bloom_levels([BloomLevel::Remember, BloomLevel::Understand])
            .with_module_levels([1, 2, 3])
            .with_cognitive_load(LoadLevel::Low)
            .with_purposes([InstructionalPurpose::Assessment])
    }

    #[test]
    fn test_builder_and_primaries() {
        let entry = quiz();
        assert_eq!(entry.primary_bloom_level(), Some(BloomLevel::Remember));
        assert_eq!(entry.primary_purpose(), Some(InstructionalPurpose::Assessment));
        assert_eq!(entry.template_ref, "single_select_quiz");
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_optimal_levels_are_first_two() {
        let entry = quiz();
        assert!(entry.is_optimal_module_level(ModuleLevel::new(1).unwrap()));
        assert!(entry.is_optimal_module_level(ModuleLevel::new(2).unwrap()));
        assert!(!entry.is_optimal_module_level(ModuleLevel::new(3).unwrap()));
        assert!(entry.supports_module_level(ModuleLevel::new(3).unwrap()));
    }

    #[test]
    fn test_invalid_levels_are_dropped() {
        let entry = InteractivityType::new(InteractivityTypeId::Hotspot, "Hotspot")
            .with_module_levels([0, 2, 9]);
        assert_eq!(entry.module_levels, vec![ModuleLevel::new(2).unwrap()]);
    }

    #[test]
    fn test_validate_rejects_empty_sets() {
        let entry = InteractivityType::new(InteractivityTypeId::Reflection, "Reflection");
        assert!(entry.validate().is_err());
    }
}
