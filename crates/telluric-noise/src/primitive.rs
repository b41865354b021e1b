//! Seeded 3D simplex noise.
//!
//! Wraps the `noise` crate's simplex implementation behind a `u64` body seed.
//! Output is clamped to the nominal range; coordinates are not wrapped, so
//! continuity holds over the whole finite domain.

use glam::DVec3;
use noise::{NoiseFn, Simplex};

/// Fold a 64-bit body seed into the 32-bit seed the permutation table takes.
#[inline]
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// A seeded coherent noise source.
///
/// Building one shuffles a permutation table, so layers keep a
/// `CoherentNoise` around instead of calling [`simplex3`] per sample.
#[derive(Clone, Copy, Debug)]
pub struct CoherentNoise {
    seed: u64,
    simplex: Simplex,
}

impl CoherentNoise {
    /// Create a noise source for the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            simplex: Simplex::new(fold_seed(seed)),
        }
    }

    /// The seed this source was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sample in `[-1, 1]`.
    #[inline]
    pub fn sample(&self, point: DVec3) -> f64 {
        self.simplex
            .get([point.x, point.y, point.z])
            .clamp(-1.0, 1.0)
    }

    /// Sample remapped to `[0, 1]`.
    #[inline]
    pub fn sample_normalized(&self, point: DVec3) -> f64 {
        (self.sample(point) + 1.0) * 0.5
    }
}

/// Simplex noise at `(x, y, z)` for `seed`, in `[-1, 1]`.
pub fn simplex3(seed: u64, x: f64, y: f64, z: f64) -> f64 {
    CoherentNoise::new(seed).sample(DVec3::new(x, y, z))
}

/// Simplex noise at `(x, y, z)` for `seed`, remapped to `[0, 1]`.
pub fn normalized_simplex3(seed: u64, x: f64, y: f64, z: f64) -> f64 {
    CoherentNoise::new(seed).sample_normalized(DVec3::new(x, y, z))
}
