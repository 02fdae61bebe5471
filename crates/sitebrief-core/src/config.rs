//! Gateway configuration. Load from TOML or env.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::bridge::DEFAULT_MODEL;

/// Global application configuration (gateway + storage). Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity shown in health responses.
    pub app_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Base directory for the Sled lead store.
    pub storage_path: String,
    /// Model slug sent to the text-generation provider.
    pub llm_model: String,
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: env `SITEBRIEF_CONFIG`
    /// path > `config/gateway.toml` > defaults, with a `SITEBRIEF`-prefixed
    /// environment overlay on top.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("SITEBRIEF_CONFIG").unwrap_or_else(|_| "config/gateway".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", "SiteBrief Gateway")?
            .set_default("port", 4000_i64)?
            .set_default("storage_path", "./data")?
            .set_default("llm_model", DEFAULT_MODEL)?;

        let path = Path::new(&config_path).with_extension("toml");
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("SITEBRIEF").separator("__"))
            .build()?;

        built.try_deserialize()
    }
}
