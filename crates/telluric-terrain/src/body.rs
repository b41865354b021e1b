//! Seeded generation of a body's terrain settings.
//!
//! Every random draw goes through the counter-based generator at a fixed
//! [`GenerationStep`], so adding a draw to one step never shifts another.

use serde::{Deserialize, Serialize};
use telluric_noise::seed::{centered_rand, derive_seed, normal_random, rand_range_int};
use telluric_noise::{CraterField, CraterModifiers, LayerKind, NoiseSettings};
use tracing::debug;

use crate::error::TerrainError;
use crate::settings::{DEFAULT_RIDGE_THRESHOLD, LayerSettings, TerrainSettings};

/// Mean Earth radius in meters; frequencies scale relative to it.
pub const EARTH_RADIUS: f64 = 6_371e3;

/// Ocean depth in meters for a body with Earth-like water and pressure.
pub const OCEAN_DEPTH: f64 = 7e3;

/// Range of the per-layer sample-space offsets.
const OFFSET_RANGE: f64 = 1e3;

/// Stream positions for each generation decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum GenerationStep {
    Pressure = 1100,
    WaterAmount = 1200,
    Terrain = 1500,
    Craters = 1700,
    LayerOffsets = 1800,
}

impl GenerationStep {
    fn at(self, index: u64) -> u64 {
        self as u64 + index
    }
}

/// Broad class of body, which changes how terrain is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    #[default]
    Planet,
    /// A moon of a telluric planet: no continents, low mountains, craters.
    Satellite,
}

impl TerrainSettings {
    /// Derive a body's terrain from its seed and radius (meters).
    pub fn from_seed(seed: u64, radius: f64, kind: BodyKind) -> Result<Self, TerrainError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(TerrainError::InvalidRadius(radius));
        }
        let relative_radius = radius / EARTH_RADIUS;

        let mut pressure = match kind {
            BodyKind::Planet => normal_random(0.9, 0.2, seed, GenerationStep::Pressure.at(0)),
            BodyKind::Satellite => normal_random(0.01, 0.01, seed, GenerationStep::Pressure.at(0)),
        }
        .max(0.0);
        if radius <= 0.3 * EARTH_RADIUS {
            pressure = 0.0;
        }
        let water_amount =
            normal_random(1.0, 0.3, seed, GenerationStep::WaterAmount.at(0)).max(0.0);
        let ocean_level = OCEAN_DEPTH * water_amount * pressure;

        let (fragmentation, max_mountain_height) = match kind {
            BodyKind::Planet => (
                normal_random(0.65, 0.03, seed, GenerationStep::Terrain.at(0)).clamp(0.0, 0.95),
                10e3,
            ),
            BodyKind::Satellite => (0.0, 2e3),
        };
        let continent_base_height = ocean_level * 1.9;
        let max_ripple_height = 1.5e3;

        let offset = |layer: u64| {
            let step = GenerationStep::LayerOffsets.at(layer * 3);
            [
                centered_rand(seed, step) * OFFSET_RANGE,
                centered_rand(seed, step + 1) * OFFSET_RANGE,
                centered_rand(seed, step + 2) * OFFSET_RANGE,
            ]
        };

        let mut layers = Vec::with_capacity(4);
        // Satellites have no landmasses, so their mountains are not masked.
        if kind == BodyKind::Planet {
            layers.push(LayerSettings::new(
                LayerKind::Continent,
                NoiseSettings::builder()
                    .amplitude(continent_base_height)
                    .frequency(relative_radius)
                    .octaves(6)
                    .decay(1.8)
                    .lacunarity(2.1)
                    .power(0.5)
                    .min_value(1.0 - fragmentation)
                    .river_factor(0.05)
                    .offset(offset(0)),
            )?);
        }
        layers.push(LayerSettings::new(
            LayerKind::Mountain,
            NoiseSettings::builder()
                .amplitude(max_mountain_height)
                .frequency(20.0 * relative_radius)
                .octaves(6)
                .decay(1.9)
                .lacunarity(2.0)
                .power(2.5)
                .min_value(0.5)
                .offset(offset(1)),
        )?);
        layers.push(LayerSettings::new(
            LayerKind::Ripple,
            NoiseSettings::builder()
                .amplitude(max_ripple_height)
                .frequency(30.0 * relative_radius)
                .octaves(3)
                .decay(2.0)
                .lacunarity(2.0)
                .min_value(0.2)
                .offset(offset(2)),
        )?);

        let airless = pressure == 0.0;
        let craters = if kind == BodyKind::Satellite || airless {
            layers.push(LayerSettings::new(
                LayerKind::Crater,
                NoiseSettings::builder().amplitude((radius * 1e-3).min(5e3)),
            )?);
            let count = rand_range_int(50, 200, seed, GenerationStep::Craters.at(0));
            Some(CraterField::generate(
                derive_seed(seed, "craters"),
                count,
                CraterModifiers::default(),
            ))
        } else {
            None
        };

        debug!(
            seed,
            radius,
            ?kind,
            pressure,
            ocean_level,
            fragmentation,
            craters = craters.as_ref().map_or(0, CraterField::len),
            "generated terrain settings"
        );

        let settings = TerrainSettings::new(radius, layers, DEFAULT_RIDGE_THRESHOLD)?;
        Ok(match craters {
            Some(field) => settings.with_craters(field),
            None => settings,
        })
    }
}
