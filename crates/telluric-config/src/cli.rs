//! Command-line argument parsing for the sampler.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Telluric sampler command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "telluric-sampler", about = "Generate a body from a seed and sample its terrain")]
pub struct CliArgs {
    /// Body seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Derive the seed from a name (takes precedence over --seed).
    #[arg(long)]
    pub name: Option<String>,

    /// Body radius in meters.
    #[arg(long)]
    pub radius: Option<f64>,

    /// Generate a satellite instead of a planet.
    #[arg(long)]
    pub satellite: bool,

    /// Vertices per tile edge.
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Tiles per cube-face edge.
    #[arg(long)]
    pub tiles: Option<u32>,

    /// Worker threads (0 = one per logical CPU).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.body.seed = seed;
        }
        if let Some(ref name) = args.name {
            self.body.name = Some(name.clone());
        }
        if let Some(radius) = args.radius {
            self.body.radius_m = radius;
        }
        if args.satellite {
            self.body.satellite = true;
        }
        if let Some(resolution) = args.resolution {
            self.sampling.resolution = resolution;
        }
        if let Some(tiles) = args.tiles {
            self.sampling.tiles_per_face = tiles;
        }
        if let Some(threads) = args.threads {
            self.sampling.threads = threads;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
