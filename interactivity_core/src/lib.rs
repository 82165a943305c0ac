//! # Interactivity Core
//!
//! Decides which interactive exercise, if any, each storyboard scene gets, and
//! checks the finished scene sequence for cognitive overload and interaction
//! density. Works over the static tables in `storyboard_rules`.
//!
//! ## Core Components
//!
//! - **decision_engine**: candidate filtering, weighted scoring, fallback and
//!   module planning with an explicit novelty history
//! - **cognitive_load**: per-scene and cumulative load assessment
//! - **density**: interaction placement and density validation per module tier
//! - **rule_engine**: advisory trigger -> recommendation rules
//! - **sequence**: Bloom, load and engagement-rhythm reordering
//! - **classifier**: swappable content classifiers used by rules and ordering
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: identical scene metadata and catalog always give the same
//!   decision and checksum
//! - **Explicit state**: the novelty history and cumulative load are values the
//!   caller threads from scene to scene
//! - **Advisory validation**: load and density findings are reported, never raised

pub mod checksum;
pub mod classifier;
pub mod cognitive_load;
pub mod decision_engine;
pub mod density;
pub mod error;
pub mod report;
pub mod rule_engine;
pub mod sequence;
pub mod settings;

pub use classifier::*;
pub use cognitive_load::*;
pub use decision_engine::*;
pub use density::*;
pub use error::{EngineError, Result};
pub use report::*;
pub use rule_engine::*;
pub use sequence::*;
pub use settings::*;
