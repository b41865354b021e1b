//! Per-body terrain: layer composition, surface displacement and seeded body generation.
//!
//! Elevations are absolute meters. Layers sample noise on the unit direction
//! of a point, so a body's field depends only on direction and is the same at
//! any query radius.

mod body;
mod error;
mod function;
mod settings;

pub use body::{BodyKind, EARTH_RADIUS, GenerationStep, OCEAN_DEPTH};
pub use error::TerrainError;
pub use function::{TerrainFunction, displace, evaluate_elevation};
pub use settings::{DEFAULT_RIDGE_THRESHOLD, LayerSettings, TerrainSettings};

pub use telluric_noise::{CraterField, CraterModifiers, LayerKind, NoiseModifiers, NoiseSettings};
