use crate::application::lifecycle::Topology;
use crate::error::{HallError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Settings read from the optional `--config` TOML file.
///
/// ```toml
/// [topology]
/// rooms = [
///     { code = "A", name = "Quiet room", tables = 20 },
///     { code = "B", tables = 12 },
/// ]
///
/// [seed]
/// sample_students = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HallConfig {
    pub topology: Topology,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub sample_students: bool,
}

impl HallConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| HallError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
