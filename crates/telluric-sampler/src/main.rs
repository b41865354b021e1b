//! Generate a telluric body from a seed and sample its terrain over a cube-sphere.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p telluric-sampler -- --name Kepler-22b --tiles 8`.

mod grid;
mod pool;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use telluric_config::{CliArgs, Config, ConfigError, default_config_dir};
use telluric_noise::seed::seed_from_name;
use telluric_terrain::{BodyKind, TerrainError, TerrainFunction, TerrainSettings};
use tracing::{error, info};

use crate::grid::Grid;
use crate::pool::{Summary, sample_body};

#[derive(Debug, thiserror::Error)]
enum SamplerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to generate body: {0}")]
    Terrain(#[from] TerrainError),
    #[error("sampling failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The body seed: derived from the name when one is configured.
fn body_seed(config: &Config) -> u64 {
    config
        .body
        .name
        .as_deref()
        .map_or(config.body.seed, seed_from_name)
}

fn run(config: &Config) -> Result<Summary, SamplerError> {
    config.validate()?;

    let seed = body_seed(config);
    let kind = if config.body.satellite {
        BodyKind::Satellite
    } else {
        BodyKind::Planet
    };
    let settings = TerrainSettings::from_seed(seed, config.body.radius_m, kind)?;
    info!(
        seed,
        name = config.body.name.as_deref().unwrap_or("-"),
        radius_m = settings.radius(),
        ?kind,
        max_elevation_m = settings.max_elevation(),
        "generated body"
    );

    let grid = Grid::new(config.sampling.resolution, config.sampling.tiles_per_face);
    let function = Arc::new(TerrainFunction::new(&settings, seed));
    Ok(sample_body(function, grid, config.sampling.threads)?)
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    if let Err(e) =
        telluric_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config))
    {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(&config) {
        Ok(summary) => {
            info!(
                samples = summary.samples,
                min_m = summary.min,
                max_m = summary.max,
                mean_m = summary.mean,
                shared_vertices = summary.shared_vertices,
                seam_mismatches = summary.seam_mismatches,
                "sampled body"
            );
            if summary.seam_mismatches == 0 {
                ExitCode::SUCCESS
            } else {
                error!(
                    mismatches = summary.seam_mismatches,
                    "shared tile vertices disagree"
                );
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
