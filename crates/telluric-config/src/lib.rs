//! Configuration for the telluric sampler.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line via clap. Missing sections and fields fall back to defaults,
//! unknown fields are ignored.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{BodyConfig, CONFIG_FILE, Config, DebugConfig, SamplingConfig, default_config_dir};
pub use error::ConfigError;
