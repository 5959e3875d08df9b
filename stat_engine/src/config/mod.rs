//! Configuration loading from TOML files

mod rules;

pub use rules::{default_rules, BonusDef, DamageTypeDef, RaceDef, RoleDef, Ruleset, SkillDef};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}

/// Load a ruleset from a TOML file
pub fn load_ruleset(path: &Path) -> Result<Ruleset, ConfigError> {
    let ruleset: Ruleset = load_toml(path)?;
    ruleset.validated()
}

/// Load a ruleset from a TOML string
pub fn parse_ruleset(content: &str) -> Result<Ruleset, ConfigError> {
    let ruleset: Ruleset = parse_toml(content)?;
    ruleset.validated()
}
