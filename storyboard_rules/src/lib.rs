//! # Storyboard Rules
//!
//! Static pedagogy tables for storyboard generation. This crate owns the data the
//! interactivity engine reasons over and contains no decision logic:
//!
//! - **catalog**: the versioned table of interactivity types
//! - **scene**: per-scene decision metadata and scene content
//! - **profiles**: interaction density profiles per module tier
//! - **pedagogical_rules**: the trigger -> recommendation rule table

pub mod catalog;
pub mod error;
pub mod pedagogical_rules;
pub mod pedagogy;
pub mod profiles;
pub mod scene;

pub use catalog::*;
pub use error::{Result, RulesError};
pub use pedagogical_rules::*;
pub use pedagogy::*;
pub use profiles::*;
pub use scene::*;
