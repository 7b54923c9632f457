//! Dashboard configuration, loaded from JSON.

use crate::store::ParseMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV dataset location.
    pub data_path: PathBuf,
    pub parse_mode: ParseMode,
    /// Rank counted by the two percent-professor displays.
    pub professor_rank: String,
    /// Layers of the rank-distribution stack, bottom first.
    pub ranks: Vec<String>,
    /// One percent-professor display per entry: women first, then men.
    pub percent_genders: [String; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/Salaries.csv"),
            parse_mode: ParseMode::Permissive,
            professor_rank: "Prof".into(),
            ranks: vec!["Prof".into(), "AssocProf".into(), "AsstProf".into()],
            percent_genders: ["Female".into(), "Male".into()],
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ranks.is_empty() {
            return Err(ConfigError::Invalid("ranks must not be empty".into()));
        }
        let labels = self
            .ranks
            .iter()
            .chain(self.percent_genders.iter())
            .chain(std::iter::once(&self.professor_rank));
        for label in labels {
            if label.trim().is_empty() {
                return Err(ConfigError::Invalid("labels must not be blank".into()));
            }
        }
        Ok(())
    }
}
