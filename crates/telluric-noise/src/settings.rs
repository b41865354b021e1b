//! Per-layer noise settings and evaluation-time modifiers.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::NoiseError;
use crate::filter::LayerKind;

/// Upper bound on octaves; beyond this the finest octaves sit below `f64`
/// resolution for any realistic frequency.
pub const MAX_OCTAVES: u32 = 32;

/// Immutable configuration of one noise layer.
///
/// Only constructible through [`NoiseSettings::builder`] (or deserialization,
/// which goes through the same validation), so every instance satisfies
/// `decay > 0`, `octaves >= 1` and `frequency > 0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NoiseSettingsBuilder")]
pub struct NoiseSettings {
    base_amplitude: f64,
    base_frequency: f64,
    min_value: f64,
    offset: [f64; 3],
    octaves: u32,
    decay: f64,
    lacunarity: f64,
    power: f64,
    river_factor: f64,
}

/// Unvalidated field set for [`NoiseSettings`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettingsBuilder {
    /// Layer amplitude, in meters of elevation.
    pub base_amplitude: f64,
    /// Frequency of the first octave, in features per unit of sample space.
    pub base_frequency: f64,
    /// Threshold below which the shaped value collapses to zero.
    pub min_value: f64,
    /// Sample-space offset added before frequency scaling.
    pub offset: [f64; 3],
    /// Number of octaves.
    pub octaves: u32,
    /// Per-octave amplitude divisor.
    pub decay: f64,
    /// Per-octave frequency multiplier.
    pub lacunarity: f64,
    /// Shaping exponent applied to the normalized fractal value.
    pub power: f64,
    /// Width of the band near zero that is flattened toward the baseline.
    pub river_factor: f64,
}

impl Default for NoiseSettingsBuilder {
    fn default() -> Self {
        Self {
            base_amplitude: 1.0,
            base_frequency: 1.0,
            min_value: 0.0,
            offset: [0.0; 3],
            octaves: 1,
            decay: 2.0,
            lacunarity: 2.0,
            power: 1.0,
            river_factor: 0.0,
        }
    }
}

fn finite(value: f64, field: &'static str) -> Result<f64, NoiseError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NoiseError::NonFinite { field })
    }
}

impl NoiseSettingsBuilder {
    pub fn amplitude(mut self, value: f64) -> Self {
        self.base_amplitude = value;
        self
    }

    pub fn frequency(mut self, value: f64) -> Self {
        self.base_frequency = value;
        self
    }

    pub fn min_value(mut self, value: f64) -> Self {
        self.min_value = value;
        self
    }

    pub fn offset(mut self, value: [f64; 3]) -> Self {
        self.offset = value;
        self
    }

    pub fn octaves(mut self, value: u32) -> Self {
        self.octaves = value;
        self
    }

    pub fn decay(mut self, value: f64) -> Self {
        self.decay = value;
        self
    }

    pub fn lacunarity(mut self, value: f64) -> Self {
        self.lacunarity = value;
        self
    }

    pub fn power(mut self, value: f64) -> Self {
        self.power = value;
        self
    }

    pub fn river_factor(mut self, value: f64) -> Self {
        self.river_factor = value;
        self
    }

    /// Validate and freeze the settings.
    pub fn build(self) -> Result<NoiseSettings, NoiseError> {
        if !(1..=MAX_OCTAVES).contains(&self.octaves) {
            return Err(NoiseError::InvalidOctaves {
                octaves: self.octaves,
                max: MAX_OCTAVES,
            });
        }
        if !(self.decay.is_finite() && self.decay > 0.0) {
            return Err(NoiseError::InvalidDecay(self.decay));
        }
        if !(self.base_frequency.is_finite() && self.base_frequency > 0.0) {
            return Err(NoiseError::InvalidFrequency(self.base_frequency));
        }
        if !(self.lacunarity.is_finite() && self.lacunarity > 0.0) {
            return Err(NoiseError::InvalidLacunarity(self.lacunarity));
        }
        if !(self.power.is_finite() && self.power > 0.0) {
            return Err(NoiseError::InvalidPower(self.power));
        }
        if !(0.0..1.0).contains(&self.river_factor) {
            return Err(NoiseError::InvalidRiverFactor(self.river_factor));
        }
        finite(self.base_amplitude, "base_amplitude")?;
        finite(self.min_value, "min_value")?;
        for component in self.offset {
            finite(component, "offset")?;
        }

        Ok(NoiseSettings {
            base_amplitude: self.base_amplitude,
            base_frequency: self.base_frequency,
            min_value: self.min_value,
            offset: self.offset,
            octaves: self.octaves,
            decay: self.decay,
            lacunarity: self.lacunarity,
            power: self.power,
            river_factor: self.river_factor,
        })
    }
}

impl TryFrom<NoiseSettingsBuilder> for NoiseSettings {
    type Error = NoiseError;

    fn try_from(builder: NoiseSettingsBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

impl NoiseSettings {
    /// Start from the defaults: amplitude 1, frequency 1, one octave,
    /// decay 2, lacunarity 2, no shaping.
    pub fn builder() -> NoiseSettingsBuilder {
        NoiseSettingsBuilder::default()
    }

    /// Positional constructor mirroring the data model record.
    pub fn new(
        base_amplitude: f64,
        base_frequency: f64,
        min_value: f64,
        offset: [f64; 3],
        octaves: u32,
        decay: f64,
    ) -> Result<Self, NoiseError> {
        Self::builder()
            .amplitude(base_amplitude)
            .frequency(base_frequency)
            .min_value(min_value)
            .offset(offset)
            .octaves(octaves)
            .decay(decay)
            .build()
    }

    /// Copy the fields back into a builder, e.g. to derive a variant.
    pub fn to_builder(&self) -> NoiseSettingsBuilder {
        NoiseSettingsBuilder {
            base_amplitude: self.base_amplitude,
            base_frequency: self.base_frequency,
            min_value: self.min_value,
            offset: self.offset,
            octaves: self.octaves,
            decay: self.decay,
            lacunarity: self.lacunarity,
            power: self.power,
            river_factor: self.river_factor,
        }
    }

    pub fn base_amplitude(&self) -> f64 {
        self.base_amplitude
    }

    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    pub fn offset(&self) -> [f64; 3] {
        self.offset
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    pub fn lacunarity(&self) -> f64 {
        self.lacunarity
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn river_factor(&self) -> f64 {
        self.river_factor
    }

    /// Combine with evaluation-time modifiers into the parameters the
    /// evaluator actually reads.
    ///
    /// The archipelago factor only reshapes the threshold of continent
    /// layers: `min_value^(2^(1 - 2a))`, the identity at `a = 0.5`, a lower
    /// threshold (larger, blockier landmasses) toward 0 and a higher one
    /// (sparser islands) toward 1.
    pub fn resolve(&self, kind: LayerKind, modifiers: &NoiseModifiers) -> ResolvedNoise {
        let mut min_value = self.min_value * modifiers.min_value_modifier;
        if kind == LayerKind::Continent && min_value > 0.0 && min_value < 1.0 {
            let a = modifiers.archipelago_factor.clamp(0.0, 1.0);
            min_value = libm::pow(min_value, libm::exp2(1.0 - 2.0 * a));
        }

        ResolvedNoise {
            amplitude: self.base_amplitude * modifiers.amplitude_modifier,
            frequency: self.base_frequency * modifiers.frequency_modifier,
            min_value,
            offset: DVec3::from_array(self.offset) + DVec3::from_array(modifiers.offset_modifier),
            octaves: self.octaves,
            decay: self.decay,
            lacunarity: self.lacunarity,
            power: self.power,
            river_factor: self.river_factor,
        }
    }
}

/// Transient shaping applied at evaluation time without touching settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseModifiers {
    pub frequency_modifier: f64,
    pub amplitude_modifier: f64,
    pub min_value_modifier: f64,
    pub offset_modifier: [f64; 3],
    /// Landmass dispersion in `[0, 1]`; 0.5 leaves continent thresholds as set.
    pub archipelago_factor: f64,
}

impl Default for NoiseModifiers {
    fn default() -> Self {
        Self {
            frequency_modifier: 1.0,
            amplitude_modifier: 1.0,
            min_value_modifier: 1.0,
            offset_modifier: [0.0; 3],
            archipelago_factor: 0.5,
        }
    }
}

/// Settings with modifiers folded in; what the fractal evaluator consumes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedNoise {
    pub amplitude: f64,
    pub frequency: f64,
    pub min_value: f64,
    pub offset: DVec3,
    pub octaves: u32,
    pub decay: f64,
    pub lacunarity: f64,
    pub power: f64,
    pub river_factor: f64,
}

impl From<&NoiseSettings> for ResolvedNoise {
    fn from(settings: &NoiseSettings) -> Self {
        settings.resolve(LayerKind::Ripple, &NoiseModifiers::default())
    }
}
