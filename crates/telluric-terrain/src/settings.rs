//! Per-body terrain settings.

use serde::{Deserialize, Serialize};
use telluric_noise::{CraterField, LayerKind, NoiseSettings, NoiseSettingsBuilder};

use crate::error::TerrainError;

/// Continent value above which mountains start to rise.
pub const DEFAULT_RIDGE_THRESHOLD: f64 = 0.1;

/// One layer of a body's terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSettings {
    pub kind: LayerKind,
    pub noise: NoiseSettings,
}

impl LayerSettings {
    /// Validate `builder` into a layer of the given kind.
    pub fn new(kind: LayerKind, builder: NoiseSettingsBuilder) -> Result<Self, TerrainError> {
        let noise = builder
            .build()
            .map_err(|source| TerrainError::Layer { kind, source })?;
        Ok(Self { kind, noise })
    }
}

/// Serialized shape of [`TerrainSettings`], validated on the way in.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct TerrainSettingsDef {
    radius: f64,
    layers: Vec<LayerSettings>,
    #[serde(default = "default_ridge_threshold")]
    ridge_threshold: f64,
    #[serde(default)]
    craters: Option<CraterField>,
}

fn default_ridge_threshold() -> f64 {
    DEFAULT_RIDGE_THRESHOLD
}

/// Immutable description of a body's terrain.
///
/// Holds at most one layer per [`LayerKind`]. Created once when the body is
/// generated and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TerrainSettingsDef", into = "TerrainSettingsDef")]
pub struct TerrainSettings {
    radius: f64,
    layers: Vec<LayerSettings>,
    ridge_threshold: f64,
    craters: Option<CraterField>,
}

impl TryFrom<TerrainSettingsDef> for TerrainSettings {
    type Error = TerrainError;

    fn try_from(def: TerrainSettingsDef) -> Result<Self, Self::Error> {
        let settings = TerrainSettings::new(def.radius, def.layers, def.ridge_threshold)?;
        Ok(match def.craters {
            Some(field) => settings.with_craters(field),
            None => settings,
        })
    }
}

impl From<TerrainSettings> for TerrainSettingsDef {
    fn from(settings: TerrainSettings) -> Self {
        Self {
            radius: settings.radius,
            layers: settings.layers,
            ridge_threshold: settings.ridge_threshold,
            craters: settings.craters,
        }
    }
}

impl TerrainSettings {
    /// Validate and assemble a body's layers.
    pub fn new(
        radius: f64,
        layers: Vec<LayerSettings>,
        ridge_threshold: f64,
    ) -> Result<Self, TerrainError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(TerrainError::InvalidRadius(radius));
        }
        if !(0.0..1.0).contains(&ridge_threshold) {
            return Err(TerrainError::InvalidRidgeThreshold(ridge_threshold));
        }
        for (i, layer) in layers.iter().enumerate() {
            if layers[..i].iter().any(|other| other.kind == layer.kind) {
                return Err(TerrainError::DuplicateLayer(layer.kind));
            }
        }

        Ok(Self {
            radius,
            layers,
            ridge_threshold,
            craters: None,
        })
    }

    /// A body with no relief at all.
    pub fn flat(radius: f64) -> Result<Self, TerrainError> {
        Self::new(radius, Vec::new(), DEFAULT_RIDGE_THRESHOLD)
    }

    /// Attach the crater field read by the [`LayerKind::Crater`] layer.
    pub fn with_craters(mut self, craters: CraterField) -> Self {
        self.craters = Some(craters);
        self
    }

    /// Reference radius in meters.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn ridge_threshold(&self) -> f64 {
        self.ridge_threshold
    }

    pub fn layers(&self) -> &[LayerSettings] {
        &self.layers
    }

    pub fn craters(&self) -> Option<&CraterField> {
        self.craters.as_ref()
    }

    /// Noise settings of the layer of the given kind, if present.
    pub fn layer(&self, kind: LayerKind) -> Option<&NoiseSettings> {
        self.layers
            .iter()
            .find(|layer| layer.kind == kind)
            .map(|layer| &layer.noise)
    }

    /// Upper bound on the absolute elevation any point can reach, in meters.
    pub fn max_elevation(&self) -> f64 {
        let amplitude = |kind| self.layer(kind).map_or(0.0, |n| n.base_amplitude().abs());
        let crater_depth = self.craters.as_ref().map_or(0.0, |field| {
            field
                .craters
                .iter()
                .map(|c| c.depth * field.modifiers.depth_modifier.abs())
                .sum::<f64>()
        });
        amplitude(LayerKind::Continent)
            + amplitude(LayerKind::Mountain)
            + amplitude(LayerKind::Ripple)
            + amplitude(LayerKind::Crater) * crater_depth
    }
}
