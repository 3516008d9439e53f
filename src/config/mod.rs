use ::config::{Environment, File, FileFormat};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{AnyRunError, Result};

pub const DEFAULT_HOST: &str = "api.any.run";
const SYSTEM_CONFIG_PATH: &str = "/etc/anyrun/anyrun.ini";
const USER_CONFIG_DIR_NAME: &str = ".config";
const CONFIG_FILE_NAME: &str = "anyrun.ini";
const ENV_PREFIX: &str = "ANYRUN";

/// API credentials, fixed for the lifetime of the process
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    host: String,
}

impl Credentials {
    /// Build credentials, rejecting a blank key. A blank host falls back to the public API.
    pub fn new(api_key: impl Into<String>, host: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(AnyRunError::NoApiKey);
        }

        let host = host.into().trim().trim_end_matches('/').to_string();
        let host = if host.is_empty() {
            DEFAULT_HOST.to_string()
        } else {
            host
        };

        Ok(Self { api_key, host })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

// Keep the key out of debug logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &mask_value(&self.api_key))
            .field("host", &self.host)
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    /// Verify TLS certificates (the `verify_ssl` key)
    pub verify_ssl: bool,
}

/// `[default]` section as it appears in the INI files
#[derive(Debug, Clone, Default, Deserialize)]
struct DefaultSection {
    host: Option<String>,
    api_key: Option<String>,
    verify_ssl: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    default: DefaultSection,
}

impl Config {
    /// System-wide configuration file
    pub fn system_config_path() -> PathBuf {
        PathBuf::from(SYSTEM_CONFIG_PATH)
    }

    /// Per-user configuration file (`~/.config/anyrun.ini`)
    pub fn user_config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| AnyRunError::Config("Could not determine home directory".to_string()))?;

        Ok(home_dir.join(USER_CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Standard files read in order; later files override keys from earlier ones
    pub fn search_paths() -> Result<Vec<PathBuf>> {
        Ok(vec![Self::system_config_path(), Self::user_config_path()?])
    }

    /// Load configuration from the standard search path plus an optional extra file
    pub fn load(extra: Option<&Path>) -> Result<Self> {
        Self::load_from(&Self::search_paths()?, extra)
    }

    /// Load configuration from the given INI files, then `extra`, then `ANYRUN_DEFAULT__*`
    /// environment variables.
    ///
    /// Missing search-path files are skipped, but `extra` must exist.
    /// A missing or blank `api_key` is an error.
    pub fn load_from(paths: &[PathBuf], extra: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        for path in paths {
            debug!("Reading configuration from {}", path.display());
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Ini)
                    .required(false),
            );
        }
        if let Some(extra) = extra {
            if !extra.is_file() {
                return Err(AnyRunError::Config(format!(
                    "Config file {} does not exist",
                    extra.display()
                )));
            }
            debug!("Reading configuration from {}", extra.display());
            builder = builder.add_source(File::from(extra).format(FileFormat::Ini).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        let settings = builder
            .build()
            .map_err(|e| AnyRunError::Config(format!("Failed to read config file: {}", e)))?;
        let raw: RawConfig = settings
            .try_deserialize()
            .map_err(|e| AnyRunError::Config(format!("Failed to parse config file: {}", e)))?;

        Self::from_section(raw.default)
    }

    fn from_section(section: DefaultSection) -> Result<Self> {
        let api_key = section.api_key.ok_or(AnyRunError::NoApiKey)?;
        let credentials = Credentials::new(api_key, section.host.unwrap_or_default())?;

        debug!("Loaded {:?}", credentials);
        Ok(Self {
            credentials,
            verify_ssl: section.verify_ssl.unwrap_or(true),
        })
    }
}

/// Mask sensitive values for display
pub fn mask_value(value: &str) -> String {
    let len = value.chars().count();
    if len > 10 {
        let prefix: String = value.chars().take(4).collect();
        format!("{}...({} characters)", prefix, len)
    } else {
        "***".to_string()
    }
}
