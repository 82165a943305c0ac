//! Engine settings loaded from TOML. Every section and field is optional.
//!
//! ```toml
//! [decision]
//! novelty_window = 3
//!
//! [load]
//! decay = 0.7
//! overload_threshold = 9.0
//!
//! [density]
//! rate_tolerance = 0.15
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use storyboard_rules::Catalog;

use crate::cognitive_load::{CognitiveLoadAssessor, LoadConfig};
use crate::decision_engine::{DecisionConfig, InteractivityEngine};
use crate::density::{DensityConfig, DensityManager};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub decision: DecisionConfig,
    pub load: LoadConfig,
    pub density: DensityConfig,
}

impl EngineSettings {
    /// Parse and validate.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: EngineSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "loaded engine settings");
        Ok(settings)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.decision.validate()?;
        self.load.validate()?;
        self.density.validate()
    }

    /// Build a decision engine over `catalog`.
    pub fn engine(&self, catalog: Catalog) -> InteractivityEngine {
        InteractivityEngine::new(catalog, self.decision.clone())
    }

    /// Build a load assessor from the load section.
    pub fn load_assessor(&self) -> CognitiveLoadAssessor {
        CognitiveLoadAssessor::new(self.load.clone())
    }

    /// Build a density manager from the density section.
    pub fn density_manager(&self) -> DensityManager {
        DensityManager::new(self.density.clone())
    }
}
