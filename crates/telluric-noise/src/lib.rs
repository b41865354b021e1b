//! Coherent noise, seeded randomness and fractal layer evaluation for celestial-body terrain.

mod crater;
mod error;
mod filter;
mod fractal;
mod primitive;
mod settings;

pub mod seed;

pub use crater::{Crater, CraterField, CraterModifiers};
pub use error::NoiseError;
pub use filter::{Filter, LayerKind};
pub use fractal::{fractal, ridged_fractal, shape};
pub use primitive::{CoherentNoise, normalized_simplex3, simplex3};
pub use settings::{NoiseModifiers, NoiseSettings, NoiseSettingsBuilder, ResolvedNoise};
