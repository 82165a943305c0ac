//! Pedagogy vocabulary: Bloom levels, instructional purposes, load levels, module tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six ordered tiers of Bloom's taxonomy, from Remember to Create.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum BloomLevel {
    Remember,
    #[default]
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl BloomLevel {
    /// All levels in ascending cognitive order.
    pub const ALL: [BloomLevel; 6] = [
        BloomLevel::Remember,
        BloomLevel::Understand,
        BloomLevel::Apply,
        BloomLevel::Analyze,
        BloomLevel::Evaluate,
        BloomLevel::Create,
    ];

    /// Position in the taxonomy (Remember = 0).
    pub fn rank(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BloomLevel::Remember => "remember",
            BloomLevel::Understand => "understand",
            BloomLevel::Apply => "apply",
            BloomLevel::Analyze => "analyze",
            BloomLevel::Evaluate => "evaluate",
            BloomLevel::Create => "create",
        }
    }
}

/// Why a scene exists in the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstructionalPurpose {
    #[default]
    Foundation,
    Practice,
    Reinforcement,
    Assessment,
}

impl InstructionalPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionalPurpose::Foundation => "foundation",
            InstructionalPurpose::Practice => "practice",
            InstructionalPurpose::Reinforcement => "reinforcement",
            InstructionalPurpose::Assessment => "assessment",
        }
    }
}

/// Coarse cognitive load of a scene or an interaction type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum LoadLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl LoadLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadLevel::Low => "low",
            LoadLevel::Medium => "medium",
            LoadLevel::High => "high",
        }
    }
}

/// Module difficulty level, 1 (introductory) to 4 (expert).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ModuleLevel(u8);

impl ModuleLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    /// Returns `None` outside 1-4.
    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    /// The level as a number, 1 - 4.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Interaction loads a learner at this level can absorb.
    pub fn allowed_loads(&self) -> &'static [LoadLevel] {
        match self.0 {
            1 => &[LoadLevel::Low],
            2 => &[LoadLevel::Low, LoadLevel::Medium],
            3 => &[LoadLevel::Medium, LoadLevel::High],
            _ => &[LoadLevel::High],
        }
    }
}

impl Default for ModuleLevel {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u8> for ModuleLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ModuleLevel::new(value).ok_or_else(|| format!("module level {} is outside 1-4", value))
    }
}

impl From<ModuleLevel> for u8 {
    fn from(level: ModuleLevel) -> Self {
        level.0
    }
}

impl fmt::Display for ModuleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pedagogical intensity tier of a whole module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ModuleType {
    Awareness,
    #[default]
    SkillBuilding,
    Application,
    Immersive,
}

impl ModuleType {
    pub const ALL: [ModuleType; 4] = [
        ModuleType::Awareness,
        ModuleType::SkillBuilding,
        ModuleType::Application,
        ModuleType::Immersive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Awareness => "awareness",
            ModuleType::SkillBuilding => "skillBuilding",
            ModuleType::Application => "application",
            ModuleType::Immersive => "immersive",
        }
    }
}

macro_rules! impl_text_enum {
    ($ty:ty, $what:literal) => {
        impl FromStr for $ty {
            type Err = String;

            /// Case-insensitive; surrounding whitespace is ignored.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                <$ty>::variants()
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| format!("unknown {} '{}'", $what, s))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl BloomLevel {
    fn variants() -> &'static [BloomLevel] {
        &Self::ALL
    }
}

impl InstructionalPurpose {
    fn variants() -> &'static [InstructionalPurpose] {
        &[
            InstructionalPurpose::Foundation,
            InstructionalPurpose::Practice,
            InstructionalPurpose::Reinforcement,
            InstructionalPurpose::Assessment,
        ]
    }
}

impl LoadLevel {
    fn variants() -> &'static [LoadLevel] {
        &[LoadLevel::Low, LoadLevel::Medium, LoadLevel::High]
    }
}

impl ModuleType {
    fn variants() -> &'static [ModuleType] {
        &Self::ALL
    }
}

impl_text_enum!(BloomLevel, "bloom level");
impl_text_enum!(InstructionalPurpose, "instructional purpose");
impl_text_enum!(LoadLevel, "cognitive load");
impl_text_enum!(ModuleType, "module type");
