use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::adapters::rest::RestSettings;
use crate::core::ExclusionSet;
use crate::report::ResultLayout;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/vbr-sensor/config.toml";
pub const ENV_PREFIX: &str = "VBR_SENSOR_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    /// Job name patterns to skip. Empty means the built-in set.
    pub exclusions: Vec<String>,
    /// Add `exclusions` to the built-in set instead of replacing it.
    pub keep_default_exclusions: bool,
    pub port: u16,
    pub tls: bool,
    /// Accept self-signed server certificates.
    pub insecure: bool,
    pub username: String,
    pub password: String,
    pub api_version: String,
    pub layout: ResultLayout,
    pub simulation: bool,
    pub verbose: bool,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            exclusions: Vec::new(),
            keep_default_exclusions: false,
            port: 9419,
            tls: true,
            insecure: false,
            username: String::new(),
            password: String::new(),
            api_version: "1.1-rev2".to_string(),
            layout: ResultLayout::Combined,
            simulation: false,
            verbose: false,
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Layer defaults, the TOML file, `VBR_SENSOR_*` variables and finally
    /// `overrides` (usually the CLI arguments).
    pub fn new<T: Serialize>(
        config_path: Option<PathBuf>,
        overrides: Option<&T>,
    ) -> Result<Self, figment::Error> {
        let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX));

        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), figment::Error> {
        if self.host.trim().is_empty() {
            return Err(figment::Error::from("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(figment::Error::from("port must be between 1 and 65535".to_string()));
        }
        Ok(())
    }

    pub fn exclusion_set(&self) -> ExclusionSet {
        ExclusionSet::from_user(&self.exclusions, self.keep_default_exclusions)
    }

    pub fn rest_settings(&self) -> RestSettings {
        RestSettings {
            port: self.port,
            tls: self.tls,
            accept_invalid_certs: self.insecure,
            username: self.username.clone(),
            password: self.password.clone(),
            api_version: self.api_version.clone(),
        }
    }
}
