//! Layer filters: a layer kind plus its immutable settings, evaluated by `match`.
//!
//! A [`Filter`] can be evaluated with explicit modifiers ([`Filter::evaluate`])
//! or against its published modifier snapshot ([`Filter::sample`]). Publishing
//! a new snapshot builds it completely before swapping the `Arc`, so
//! concurrent readers see either the old or the new parameters in full.

use std::sync::Arc;

use glam::DVec3;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::crater::CraterField;
use crate::fractal::{fractal, ridged_fractal};
use crate::primitive::CoherentNoise;
use crate::settings::{NoiseModifiers, NoiseSettings, ResolvedNoise};

/// The role a layer plays in a body's terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayerKind {
    /// Large landmasses; also the mask that gates mountains.
    Continent,
    /// Ridged high-frequency relief.
    Mountain,
    /// Small-amplitude surface detail.
    Ripple,
    /// Impact crater field.
    Crater,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Continent,
        LayerKind::Mountain,
        LayerKind::Ripple,
        LayerKind::Crater,
    ];

    /// Stable label used to derive the layer's noise seed.
    pub fn label(self) -> &'static str {
        match self {
            LayerKind::Continent => "continent",
            LayerKind::Mountain => "mountain",
            LayerKind::Ripple => "ripple",
            LayerKind::Crater => "crater",
        }
    }
}

/// What a filter samples.
#[derive(Clone, Debug)]
enum Source {
    Simplex(CoherentNoise),
    Ridged(CoherentNoise),
    Craters(Arc<CraterField>),
}

#[derive(Debug)]
struct Snapshot {
    modifiers: NoiseModifiers,
    resolved: ResolvedNoise,
}

/// Replace a non-finite layer value by zero.
///
/// A NaN here means an upstream configuration bug: debug builds fail loudly,
/// release builds drop the contribution so one bad sample cannot poison a
/// whole chunk.
#[inline]
pub(crate) fn finite_or_zero(value: f64, kind: LayerKind) -> f64 {
    debug_assert!(value.is_finite(), "{kind:?} layer produced {value}");
    if value.is_finite() {
        value
    } else {
        warn!(layer = ?kind, value, "non-finite layer value replaced by zero");
        0.0
    }
}

/// One evaluable terrain layer.
#[derive(Debug)]
pub struct Filter {
    kind: LayerKind,
    settings: NoiseSettings,
    source: Source,
    current: RwLock<Arc<Snapshot>>,
}

impl Filter {
    /// Build a noise layer seeded with `seed`. Crater layers built this way
    /// start with an empty field; see [`Filter::craters`].
    pub fn new(kind: LayerKind, settings: NoiseSettings, seed: u64) -> Self {
        let source = match kind {
            LayerKind::Continent | LayerKind::Ripple => Source::Simplex(CoherentNoise::new(seed)),
            LayerKind::Mountain => Source::Ridged(CoherentNoise::new(seed)),
            LayerKind::Crater => Source::Craters(Arc::new(CraterField::default())),
        };
        Self::with_source(kind, settings, source)
    }

    /// Build a crater layer over `field`. Only the amplitude of `settings`
    /// (and the amplitude modifier) applies to craters.
    pub fn craters(settings: NoiseSettings, field: CraterField) -> Self {
        Self::with_source(LayerKind::Crater, settings, Source::Craters(Arc::new(field)))
    }

    fn with_source(kind: LayerKind, settings: NoiseSettings, source: Source) -> Self {
        let modifiers = NoiseModifiers::default();
        let resolved = settings.resolve(kind, &modifiers);
        Self {
            kind,
            settings,
            source,
            current: RwLock::new(Arc::new(Snapshot {
                modifiers,
                resolved,
            })),
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    /// Modifiers of the currently published snapshot.
    pub fn modifiers(&self) -> NoiseModifiers {
        self.current.read().modifiers
    }

    /// Publish new modifiers for [`Filter::sample`].
    pub fn set_modifiers(&self, modifiers: NoiseModifiers) {
        let next = Arc::new(Snapshot {
            modifiers,
            resolved: self.settings.resolve(self.kind, &modifiers),
        });
        *self.current.write() = next;
        debug!(layer = ?self.kind, ?modifiers, "published layer modifiers");
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Shaped layer value before amplitude, for explicit modifiers.
    ///
    /// In `[0, 1]` for noise layers; crater layers return the signed crater
    /// profile.
    pub fn unit_value(&self, point: DVec3, modifiers: &NoiseModifiers) -> f64 {
        let resolved = self.settings.resolve(self.kind, modifiers);
        finite_or_zero(self.unit_resolved(point, &resolved), self.kind)
    }

    /// Layer amplitude (meters) under `modifiers`.
    pub fn amplitude(&self, modifiers: &NoiseModifiers) -> f64 {
        self.settings.base_amplitude() * modifiers.amplitude_modifier
    }

    /// Scale a value obtained from [`Filter::unit_value`] into this layer's
    /// contribution (meters), through the same finite-value guard as
    /// [`Filter::evaluate`].
    pub fn contribution_from_unit(&self, unit: f64, modifiers: &NoiseModifiers) -> f64 {
        let amplitude = self.amplitude(modifiers);
        if amplitude == 0.0 {
            return 0.0;
        }
        finite_or_zero(amplitude * unit, self.kind)
    }

    /// Layer contribution (meters) at `point` for explicit modifiers.
    pub fn evaluate(&self, point: DVec3, modifiers: &NoiseModifiers) -> f64 {
        let resolved = self.settings.resolve(self.kind, modifiers);
        self.evaluate_resolved(point, &resolved)
    }

    /// Layer contribution (meters) at `point` for the published modifiers.
    pub fn sample(&self, point: DVec3) -> f64 {
        let snapshot = self.snapshot();
        self.evaluate_resolved(point, &snapshot.resolved)
    }

    /// Shaped layer value before amplitude, for the published modifiers.
    pub fn sample_unit(&self, point: DVec3) -> f64 {
        let snapshot = self.snapshot();
        finite_or_zero(self.unit_resolved(point, &snapshot.resolved), self.kind)
    }

    /// Sum of several filters' contributions at one point.
    pub fn sum<'a>(
        filters: impl IntoIterator<Item = &'a Filter>,
        point: DVec3,
        modifiers: &NoiseModifiers,
    ) -> f64 {
        filters.into_iter().map(|f| f.evaluate(point, modifiers)).sum()
    }

    fn evaluate_resolved(&self, point: DVec3, resolved: &ResolvedNoise) -> f64 {
        if resolved.amplitude == 0.0 {
            return 0.0;
        }
        finite_or_zero(resolved.amplitude * self.unit_resolved(point, resolved), self.kind)
    }

    fn unit_resolved(&self, point: DVec3, resolved: &ResolvedNoise) -> f64 {
        match &self.source {
            Source::Simplex(noise) => fractal(noise, point, resolved),
            Source::Ridged(noise) => ridged_fractal(noise, point, resolved),
            Source::Craters(field) => field.evaluate(point.normalize_or_zero()),
        }
    }
}
