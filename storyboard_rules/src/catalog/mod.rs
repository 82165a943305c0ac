//! The interactivity catalog: a read-only, versioned table of exercise types.

mod interactivity;

pub use interactivity::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, RulesError};

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.toml");

/// Every interactivity kind the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractivityTypeId {
    ClickToReveal,
    SingleSelectQuiz,
    MultiSelectQuiz,
    Flashcards,
    Hotspot,
    DragAndDrop,
    Matching,
    Sequencing,
    ScenarioSimulation,
    CaseStudy,
    BranchingScenario,
    SoftwareSimulation,
    Reflection,
}

impl InteractivityTypeId {
    pub const ALL: [InteractivityTypeId; 13] = [
        InteractivityTypeId::ClickToReveal,
        InteractivityTypeId::SingleSelectQuiz,
        InteractivityTypeId::MultiSelectQuiz,
        InteractivityTypeId::Flashcards,
        InteractivityTypeId::Hotspot,
        InteractivityTypeId::DragAndDrop,
        InteractivityTypeId::Matching,
        InteractivityTypeId::Sequencing,
        InteractivityTypeId::ScenarioSimulation,
        InteractivityTypeId::CaseStudy,
        InteractivityTypeId::BranchingScenario,
        InteractivityTypeId::SoftwareSimulation,
        InteractivityTypeId::Reflection,
    ];

    /// Wire name, e.g. `"click_to_reveal"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractivityTypeId::ClickToReveal => "click_to_reveal",
            InteractivityTypeId::SingleSelectQuiz => "single_select_quiz",
            InteractivityTypeId::MultiSelectQuiz => "multi_select_quiz",
            InteractivityTypeId::Flashcards => "flashcards",
            InteractivityTypeId::Hotspot => "hotspot",
            InteractivityTypeId::DragAndDrop => "drag_and_drop",
            InteractivityTypeId::Matching => "matching",
            InteractivityTypeId::Sequencing => "sequencing",
            InteractivityTypeId::ScenarioSimulation => "scenario_simulation",
            InteractivityTypeId::CaseStudy => "case_study",
            InteractivityTypeId::BranchingScenario => "branching_scenario",
            InteractivityTypeId::SoftwareSimulation => "software_simulation",
            InteractivityTypeId::Reflection => "reflection",
        }
    }
}

impl FromStr for InteractivityTypeId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown interactivity type '{}'", s))
    }
}

impl fmt::Display for InteractivityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: String,
    #[serde(default)]
    interactivity: Vec<InteractivityType>,
}

/// Immutable set of interactivity types in declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    version: String,
    entries: Vec<InteractivityType>,
}

impl Catalog {
    /// Build a catalog from entries, validating every entry and id uniqueness.
    pub fn new(version: impl Into<String>, entries: Vec<InteractivityType>) -> Result<Self> {
        if entries.is_empty() {
            return Err(RulesError::InvalidCatalog(
                "catalog has no interactivity types".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            entry.validate().map_err(RulesError::InvalidCatalog)?;
            if !seen.insert(entry.id) {
                return Err(RulesError::InvalidCatalog(format!(
                    "duplicate interactivity type '{}'",
                    entry.id
                )));
            }
        }

        Ok(Self {
            version: version.into(),
            entries,
        })
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Parse a catalog from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let catalog = Self::new(file.version, file.interactivity)?;
        tracing::debug!(
            version = %catalog.version,
            entries = catalog.len(),
            "loaded interactivity catalog"
        );
        Ok(catalog)
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Version string recorded in the catalog file.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up an entry by id.
    pub fn get(&self, id: InteractivityTypeId) -> Option<&InteractivityType> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Whether the catalog has an entry for `id`.
    pub fn contains(&self, id: InteractivityTypeId) -> bool {
        self.get(id).is_some()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &InteractivityType> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[InteractivityType] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pedagogy::{BloomLevel, LoadLevel};

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), InteractivityTypeId::ALL.len());
        assert!(catalog.contains(InteractivityTypeId::ClickToReveal));
        assert!(catalog.contains(InteractivityTypeId::SingleSelectQuiz));

        let scenario = catalog.get(InteractivityTypeId::ScenarioSimulation).unwrap();
        assert_eq!(scenario.primary_bloom_level(), Some(BloomLevel::Apply));
        assert_eq!(scenario.cognitive_load, LoadLevel::Medium);
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.entries()[0].id, InteractivityTypeId::ClickToReveal);
        assert_eq!(catalog.entries()[1].id, InteractivityTypeId::SingleSelectQuiz);
    }

    #[test]
    fn test_id_round_trips_through_text() {
        for id in InteractivityTypeId::ALL {
            assert_eq!(id.as_str().parse::<InteractivityTypeId>(), Ok(id));
        }
        assert!("none".parse::<InteractivityTypeId>().is_err());
    }

    #[test]
    fn test_unknown_id_is_fatal() {
        let toml = r#"
            version = "test"
            [[interactivity]]
            id = "interpretive_dance"
            name = "Dance"
            bloom_levels = ["create"]
            module_levels = [1]
            cognitive_load = "low"
            instructional_purposes = ["practice"]
            template_ref = "dance"
        "#;
        assert!(matches!(
            Catalog::from_toml_str(toml),
            Err(RulesError::Toml(_))
        ));
    }

    #[test]
    fn test_module_level_out_of_range_is_fatal() {
        let toml = r#"
            version = "test"
            [[interactivity]]
            id = "hotspot"
            name = "Hotspot"
            bloom_levels = ["understand"]
            module_levels = [7]
            cognitive_load = "low"
            instructional_purposes = ["foundation"]
            template_ref = "hotspot"
        "#;
        assert!(Catalog::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_duplicate_and_empty_catalogs_rejected() {
        assert!(matches!(
            Catalog::new("empty", Vec::new()),
            Err(RulesError::InvalidCatalog(_))
        ));

        let entry = InteractivityType::new(InteractivityTypeId::Hotspot, "Hotspot")
            .with_bloom_levels([BloomLevel::Understand])
            .with_module_levels([1])
            .with_purposes([crate::pedagogy::InstructionalPurpose::Foundation]);
        let result = Catalog::new("dup", vec![entry.clone(), entry]);
        assert!(matches!(result, Err(RulesError::InvalidCatalog(msg)) if msg.contains("duplicate")));
    }
}
