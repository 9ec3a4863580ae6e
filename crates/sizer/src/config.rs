//! Service configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use sizer_lib::{EngineConfig, ModelVersion};
use std::path::PathBuf;

/// Service configuration, read from `SIZER_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port for the estimate, health and metrics endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Overrides the engine config's model version
    #[serde(default)]
    pub model_version: Option<String>,

    /// Origin allowed by CORS
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    /// TOML or JSON file merged over the engine defaults
    #[serde(default)]
    pub engine_config: Option<PathBuf>,
}

fn default_api_port() -> u16 {
    8080
}

fn default_allowed_origin() -> String {
    "http://localhost:5173".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            model_version: None,
            allowed_origin: default_allowed_origin(),
            engine_config: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SIZER").try_parsing(true))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: config::Config) -> Result<Self> {
        config
            .try_deserialize()
            .context("Invalid SIZER_* environment configuration")
    }

    /// Build the engine configuration from the optional file and overrides
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut builder = config::Config::builder();
        if let Some(path) = &self.engine_config {
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        let mut engine: EngineConfig = builder
            .build()
            .and_then(|c| c.try_deserialize::<EngineConfig>())
            .with_context(|| match &self.engine_config {
                Some(path) => format!("Failed to read engine config {}", path.display()),
                None => "Failed to build default engine config".to_string(),
            })?;

        if let Some(version) = &self.model_version {
            engine.model_version = version.parse::<ModelVersion>()?;
        }
        engine.validate()?;
        Ok(engine)
    }
}
