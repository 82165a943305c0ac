use storyboard_rules::{InteractivityTypeId, RulesError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("rules error: {0}")]
    Rules(#[from] RulesError),

    #[error("scorer produced a non-finite score for {id}")]
    NonFiniteScore { id: InteractivityTypeId },

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
