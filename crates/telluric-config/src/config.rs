//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the configuration inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Platform config directory for the sampler, e.g. `~/.config/telluric`.
///
/// Falls back to `./telluric` when the platform has no config directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("telluric")
}

/// Top-level sampler configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// The body to generate.
    pub body: BodyConfig,
    /// How densely and on how many threads to sample it.
    pub sampling: SamplingConfig,
    pub debug: DebugConfig,
}

/// Body selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    /// Body seed. Ignored when `name` is set.
    pub seed: u64,
    /// Derive the seed from this name instead.
    pub name: Option<String>,
    /// Body radius in meters.
    pub radius_m: f64,
    /// Generate a satellite (cratered, no continents) instead of a planet.
    pub satellite: bool,
}

/// Cube-sphere sampling grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SamplingConfig {
    /// Vertices along one tile edge; edge vertices are shared with neighbors.
    pub resolution: u32,
    /// Tiles along one cube-face edge.
    pub tiles_per_face: u32,
    /// Worker threads (0 = one per logical CPU).
    pub threads: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            name: None,
            radius_m: 6_371_000.0,
            satellite: false,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            resolution: 17,
            tiles_per_face: 4,
            threads: 0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory as [`CONFIG_FILE`].
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(write_error)
    }

    /// Re-read the file: `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values the sampler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.body.radius_m.is_finite() && self.body.radius_m > 0.0) {
            return Err(ConfigError::Invalid {
                field: "body.radius_m",
                reason: "must be a positive number of meters",
            });
        }
        if self.sampling.resolution < 2 {
            return Err(ConfigError::Invalid {
                field: "sampling.resolution",
                reason: "a tile needs at least 2 vertices per edge",
            });
        }
        if self.sampling.tiles_per_face == 0 {
            return Err(ConfigError::Invalid {
                field: "sampling.tiles_per_face",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
