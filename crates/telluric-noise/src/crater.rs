//! Impact crater fields on the unit sphere.
//!
//! A crater is a bowl that bottoms out at `-depth` at its center, meets zero
//! at its radius, and carries a raised rim that fades out at twice the
//! radius. Overlapping craters add. The profile is continuous everywhere so
//! it can be summed with the noise layers.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::seed::{centered_rand, rand_range_int, rng};

/// Rim height as a fraction of the crater depth.
const RIM_HEIGHT: f64 = 0.25;

/// Stream steps consumed per generated crater.
const STEPS_PER_CRATER: u64 = 8;

/// A single crater.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Crater {
    /// Center on the unit sphere.
    pub position: DVec3,
    /// Bowl radius as a chord length on the unit sphere.
    pub radius: f64,
    /// Depth in units of the layer amplitude.
    pub depth: f64,
    /// Exponent of the bowl wall; higher is flatter-floored with steeper walls.
    pub steepness: f64,
}

/// Per-body scaling of generated craters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraterModifiers {
    pub radius_modifier: f64,
    pub steepness_modifier: f64,
    pub depth_modifier: f64,
}

impl Default for CraterModifiers {
    fn default() -> Self {
        Self {
            radius_modifier: 1.0,
            steepness_modifier: 1.0,
            depth_modifier: 1.0,
        }
    }
}

/// The craters of one body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CraterField {
    pub craters: Vec<Crater>,
    #[serde(default)]
    pub modifiers: CraterModifiers,
}

impl CraterField {
    pub fn new(craters: Vec<Crater>, modifiers: CraterModifiers) -> Self {
        Self { craters, modifiers }
    }

    /// Scatter `count` craters over the sphere from `seed`.
    ///
    /// Radii are heavily skewed toward small craters (`u^10`), matching the
    /// size distribution of real impact fields.
    pub fn generate(seed: u64, count: u32, modifiers: CraterModifiers) -> Self {
        let craters = (0..u64::from(count))
            .map(|i| {
                let step = i * STEPS_PER_CRATER;
                let z = centered_rand(seed, step);
                let phi = std::f64::consts::TAU * rng(seed, step + 1);
                let ring = libm::sqrt((1.0 - z * z).max(0.0));
                let position = DVec3::new(ring * libm::cos(phi), ring * libm::sin(phi), z);

                Crater {
                    position,
                    radius: 0.01 + libm::pow(rng(seed, step + 2), 10.0) * 0.2,
                    depth: 0.2 + rng(seed, step + 3) / 10.0,
                    steepness: 1.0 + rng(seed, step + 4) / 10.0,
                }
            })
            .collect();
        Self { craters, modifiers }
    }

    /// Generate with a seeded count in `[min, max]`.
    pub fn generate_range(seed: u64, min: u32, max: u32, modifiers: CraterModifiers) -> Self {
        let count = rand_range_int(min, max, seed, u64::MAX / 2);
        Self::generate(seed, count, modifiers)
    }

    pub fn len(&self) -> usize {
        self.craters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.craters.is_empty()
    }

    /// Summed crater profile at a unit-sphere direction. Zero far from every crater.
    pub fn evaluate(&self, direction: DVec3) -> f64 {
        let m = &self.modifiers;
        self.craters
            .iter()
            .map(|crater| {
                let radius = crater.radius * m.radius_modifier;
                if radius <= 0.0 {
                    return 0.0;
                }
                let x = direction.distance(crater.position) / radius;
                if x >= 2.0 {
                    return 0.0;
                }
                let bowl = if x < 1.0 {
                    libm::pow(x, 2.0 * crater.steepness * m.steepness_modifier) - 1.0
                } else {
                    0.0
                };
                let s = (x - 1.0).abs();
                let rim = RIM_HEIGHT * (1.0 - s * s * (3.0 - 2.0 * s));
                crater.depth * m.depth_modifier * (bowl + rim)
            })
            .sum()
    }
}
