//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `dupsweep.toml` in the platform config directory, or the file given
//!    with `--config`
//! 3. Environment variables prefixed with `DUPSWEEP_`
//! 4. Command-line flags (applied by the caller)

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::{FinderConfig, DEFAULT_WAIT_RETRIES, DEFAULT_WAIT_TIMEOUT};
use crate::scanner::{DEFAULT_BUFFER_SIZE, PREHASH_SIZE};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "dupsweep.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPSWEEP_";

/// Errors from loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    MissingFile(PathBuf),

    /// A layer could not be parsed or had the wrong shape.
    #[error("Invalid configuration: {0}")]
    Figment(#[from] figment::Error),

    /// Settings could not be rendered as TOML.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker threads for comparison (0 = host parallelism).
    pub threads: usize,
    /// Bytes per comparison chunk.
    pub buffer_size: usize,
    /// Bounded waits for workers before giving up.
    pub wait_retries: u32,
    /// Seconds per bounded wait.
    pub wait_timeout_secs: u64,
    /// Split buckets on a prefix digest before comparing.
    pub prefilter: bool,
    /// Prefix length hashed by the pre-filter.
    pub prefilter_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 0,
            buffer_size: DEFAULT_BUFFER_SIZE,
            wait_retries: DEFAULT_WAIT_RETRIES,
            wait_timeout_secs: DEFAULT_WAIT_TIMEOUT.as_secs(),
            prefilter: false,
            prefilter_bytes: PREHASH_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from defaults, file and environment.
    ///
    /// With `explicit` set, that file must exist. Otherwise the default
    /// platform file is used when present.
    ///
    /// # Errors
    ///
    /// A missing explicit file, or any layer that fails to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile(path.to_path_buf()))
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        let config = Self::figment(file.as_deref()).extract()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// The layered figment, without extracting it.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            log::debug!("Reading config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Platform-specific default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupsweep", "dupsweep")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Render the settings as a TOML document, e.g. as a starting config file.
    ///
    /// # Errors
    ///
    /// Only if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Engine configuration derived from these settings.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_threads(self.threads)
            .with_buffer_size(self.buffer_size)
            .with_wait_policy(
                self.wait_retries,
                Duration::from_secs(self.wait_timeout_secs),
            )
            .with_prefilter(self.prefilter.then_some(self.prefilter_bytes))
    }
}
