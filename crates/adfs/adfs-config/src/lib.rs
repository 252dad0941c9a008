mod config;

pub use config::{ConfigError, InspectConfig, OutputFormat};
