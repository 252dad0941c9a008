use adfs_types::HeaderMode;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InspectConfig {
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    /// Header layout of the target store's write calldata.
    #[serde(default)]
    pub header_mode: HeaderMode,
    #[serde(default)]
    pub output: OutputFormat,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

mod defaults {
    pub fn log_level() -> String {
        "info".into()
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level(),
            header_mode: HeaderMode::default(),
            output: OutputFormat::default(),
        }
    }
}

impl InspectConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}
