use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads client configuration by layering defaults, `config/Config.toml`,
    /// and `APP_` environment variables.
    ///
    /// A missing file is not an error; built-in defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads client configuration from a specific TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading configuration");

        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()?;

        Ok(config)
    }
}
