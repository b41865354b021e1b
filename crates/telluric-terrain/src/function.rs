//! Terrain composition: layers summed into an elevation, and the surface it displaces.
//!
//! The elevation at a point is
//!
//! ```text
//! e = continent
//!   + mountain * gate(c)         gate(c) = (c - t) / (1 - t) for c > t, else 0
//!   + ripple
//!   + crater
//! ```
//!
//! where `c` is the continent layer's shaped value in `[0, 1]` and `t` the
//! body's ridge threshold, so mountains only rise inland. A body without a
//! continent layer has no land mask and its mountains are not gated.
//!
//! Modifiers are published for the whole function at once: one call to
//! [`TerrainFunction::elevation`] reads a single snapshot for every layer.

use std::sync::Arc;

use glam::DVec3;
use parking_lot::RwLock;
use telluric_noise::seed::derive_seed;
use telluric_noise::{Filter, LayerKind, NoiseModifiers};
use tracing::debug;

use crate::settings::TerrainSettings;

/// Angular step for the finite-difference surface normal.
const NORMAL_STEP: f64 = 1e-5;

/// A body's evaluable terrain: one filter per configured layer.
///
/// Evaluation is pure and `Sync`; workers share one instance by reference.
#[derive(Debug)]
pub struct TerrainFunction {
    radius: f64,
    ridge_threshold: f64,
    continent: Option<Filter>,
    mountain: Option<Filter>,
    ripple: Option<Filter>,
    crater: Option<Filter>,
    modifiers: RwLock<Arc<NoiseModifiers>>,
}

impl TerrainFunction {
    /// Build the layer filters of `settings`, each seeded from `seed` and its kind.
    pub fn new(settings: &TerrainSettings, seed: u64) -> Self {
        let mut function = Self {
            radius: settings.radius(),
            ridge_threshold: settings.ridge_threshold(),
            continent: None,
            mountain: None,
            ripple: None,
            crater: None,
            modifiers: RwLock::new(Arc::new(NoiseModifiers::default())),
        };

        for layer in settings.layers() {
            let noise = layer.noise.clone();
            let filter = match layer.kind {
                LayerKind::Crater => Filter::craters(
                    noise,
                    settings.craters().cloned().unwrap_or_default(),
                ),
                kind => Filter::new(kind, noise, derive_seed(seed, kind.label())),
            };
            *function.slot(layer.kind) = Some(filter);
        }

        debug!(
            seed,
            radius = function.radius,
            layers = settings.layers().len(),
            "built terrain function"
        );
        function
    }

    fn slot(&mut self, kind: LayerKind) -> &mut Option<Filter> {
        match kind {
            LayerKind::Continent => &mut self.continent,
            LayerKind::Mountain => &mut self.mountain,
            LayerKind::Ripple => &mut self.ripple,
            LayerKind::Crater => &mut self.crater,
        }
    }

    /// Reference radius in meters.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// The filter of the given layer, if the body has one.
    pub fn filter(&self, kind: LayerKind) -> Option<&Filter> {
        match kind {
            LayerKind::Continent => self.continent.as_ref(),
            LayerKind::Mountain => self.mountain.as_ref(),
            LayerKind::Ripple => self.ripple.as_ref(),
            LayerKind::Crater => self.crater.as_ref(),
        }
    }

    fn filters(&self) -> impl Iterator<Item = &Filter> {
        [&self.continent, &self.mountain, &self.ripple, &self.crater]
            .into_iter()
            .flatten()
    }

    /// Currently published modifiers.
    pub fn modifiers(&self) -> NoiseModifiers {
        **self.modifiers.read()
    }

    /// Publish modifiers for every layer at once; later
    /// [`TerrainFunction::elevation`] calls read them.
    ///
    /// The per-layer filters receive the same modifiers, for callers that
    /// sample a single [`Filter`] directly.
    pub fn set_modifiers(&self, modifiers: NoiseModifiers) {
        *self.modifiers.write() = Arc::new(modifiers);
        for filter in self.filters() {
            filter.set_modifiers(modifiers);
        }
    }

    /// Elevation in meters at `point` under the published modifiers.
    pub fn elevation(&self, point: DVec3) -> f64 {
        let snapshot = Arc::clone(&self.modifiers.read());
        self.elevation_with(point, Some(snapshot.as_ref()))
    }

    /// Elevation in meters at `point`.
    ///
    /// Only the direction of `point` matters. `modifiers` overrides the
    /// published ones for this call. The origin has no direction and yields 0.
    pub fn elevation_with(&self, point: DVec3, modifiers: Option<&NoiseModifiers>) -> f64 {
        let Some(m) = modifiers else {
            return self.elevation(point);
        };
        let dir = point.normalize_or_zero();
        if dir == DVec3::ZERO {
            return 0.0;
        }
        let contribution =
            |filter: &Option<Filter>| filter.as_ref().map_or(0.0, |f| f.evaluate(dir, m));

        let mut elevation = 0.0;
        let gate = match &self.continent {
            Some(continent) => {
                let c = continent.unit_value(dir, m);
                elevation += continent.contribution_from_unit(c, m);
                let t = self.ridge_threshold;
                if c > t { (c - t) / (1.0 - t) } else { 0.0 }
            }
            None => 1.0,
        };
        if gate > 0.0 {
            elevation += contribution(&self.mountain) * gate;
        }

        elevation + contribution(&self.ripple) + contribution(&self.crater)
    }

    /// Move `point` along its direction by the elevation there.
    pub fn displace(&self, point: DVec3) -> DVec3 {
        let dir = point.normalize_or_zero();
        point + dir * self.elevation(point)
    }

    /// Outward unit normal of the displaced surface at the direction of `point`.
    pub fn surface_normal(&self, point: DVec3) -> DVec3 {
        let dir = point.normalize_or_zero();
        if dir == DVec3::ZERO {
            return DVec3::ZERO;
        }
        let (tangent, bitangent) = dir.any_orthonormal_pair();
        let surface = |d: DVec3| self.displace(d.normalize() * self.radius);

        let du = surface(dir + tangent * NORMAL_STEP) - surface(dir - tangent * NORMAL_STEP);
        let dv = surface(dir + bitangent * NORMAL_STEP) - surface(dir - bitangent * NORMAL_STEP);
        let normal = du.cross(dv).normalize_or_zero();
        if normal.dot(dir) < 0.0 { -normal } else { normal }
    }
}

/// One-shot elevation of a body at `point`.
///
/// Builds the layer filters on every call; hold a [`TerrainFunction`] when
/// sampling more than a handful of points.
pub fn evaluate_elevation(
    settings: &TerrainSettings,
    seed: u64,
    point: DVec3,
    modifiers: Option<&NoiseModifiers>,
) -> f64 {
    TerrainFunction::new(settings, seed).elevation_with(point, modifiers)
}

/// One-shot displacement of `point` onto a body's surface.
pub fn displace(settings: &TerrainSettings, seed: u64, point: DVec3) -> DVec3 {
    TerrainFunction::new(settings, seed).displace(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyKind, EARTH_RADIUS};
    use crate::settings::LayerSettings;
    use telluric_noise::NoiseSettings;

    fn layer(kind: LayerKind, builder: telluric_noise::NoiseSettingsBuilder) -> LayerSettings {
        LayerSettings::new(kind, builder).unwrap()
    }

    fn rolling(radius: f64, amplitude: f64) -> TerrainSettings {
        TerrainSettings::new(
            radius,
            vec![
                layer(
                    LayerKind::Continent,
                    NoiseSettings::builder().amplitude(amplitude).frequency(1.5).octaves(4),
                ),
                layer(
                    LayerKind::Ripple,
                    NoiseSettings::builder()
                        .amplitude(amplitude / 10.0)
                        .frequency(8.0)
                        .octaves(3),
                ),
            ],
            0.1,
        )
        .unwrap()
    }

    fn fibonacci_sphere(n: usize) -> impl Iterator<Item = DVec3> {
        let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
        (0..n).map(move |i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let ring = (1.0 - y * y).sqrt();
            let phi = golden * i as f64;
            DVec3::new(ring * phi.cos(), y, ring * phi.sin())
        })
    }

    fn pearson(a: &[f64], b: &[f64]) -> f64 {
        let n = a.len() as f64;
        let mean_a = a.iter().sum::<f64>() / n;
        let mean_b = b.iter().sum::<f64>() / n;
        let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
        for (x, y) in a.iter().zip(b) {
            cov += (x - mean_a) * (y - mean_b);
            var_a += (x - mean_a).powi(2);
            var_b += (y - mean_b).powi(2);
        }
        cov / (var_a.sqrt() * var_b.sqrt())
    }

    #[test]
    fn test_elevation_is_deterministic() {
        let settings = TerrainSettings::from_seed(5, EARTH_RADIUS, BodyKind::Planet).unwrap();
        let a = TerrainFunction::new(&settings, 5);
        let b = TerrainFunction::new(&settings, 5);
        for p in fibonacci_sphere(64) {
            let point = p * EARTH_RADIUS;
            assert_eq!(a.elevation(point).to_bits(), b.elevation(point).to_bits());
        }
        let p = DVec3::new(0.3, -0.4, 0.5);
        assert_eq!(
            evaluate_elevation(&settings, 5, p, None).to_bits(),
            a.elevation(p).to_bits()
        );
    }

    #[test]
    fn test_elevation_depends_only_on_direction() {
        let function = TerrainFunction::new(&rolling(1000.0, 50.0), 2);
        let dir = DVec3::new(1.0, 2.0, -0.5).normalize();
        assert_eq!(
            function.elevation(dir).to_bits(),
            function.elevation(dir * 1234.5).to_bits()
        );
    }

    #[test]
    fn test_elevation_is_continuous() {
        let radius = 1000.0;
        let function = TerrainFunction::new(&rolling(radius, 100.0), 17);
        let offset = DVec3::new(0.3, -0.7, 0.2).normalize();

        for p in fibonacci_sphere(16) {
            let point = p * radius;
            let base = function.elevation(point);
            let deltas: Vec<f64> = [1e-2, 1e-4, 1e-6]
                .iter()
                .map(|eps| (function.elevation(point + offset * *eps) - base).abs())
                .collect();
            assert!(
                deltas[1] <= deltas[0] + 1e-9 && deltas[2] <= deltas[1] + 1e-9,
                "differences must shrink with the step: {deltas:?}"
            );
            assert!(deltas[2] < 1e-3, "tiny step moved elevation by {}", deltas[2]);
        }
    }

    #[test]
    fn test_zero_amplitude_is_flat() {
        let settings = rolling(500.0, 0.0);
        let function = TerrainFunction::new(&settings, 3);
        for p in fibonacci_sphere(100) {
            assert_eq!(function.elevation(p), 0.0);
        }
        let flat = TerrainFunction::new(&TerrainSettings::flat(500.0).unwrap(), 3);
        assert_eq!(flat.elevation(DVec3::X), 0.0);
    }

    #[test]
    fn test_origin_has_zero_elevation() {
        let function = TerrainFunction::new(&rolling(500.0, 40.0), 3);
        assert_eq!(function.elevation(DVec3::ZERO), 0.0);
        assert_eq!(function.displace(DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn test_displacement_is_radial() {
        let radius = 2000.0;
        let settings = rolling(radius, 80.0);
        let function = TerrainFunction::new(&settings, 8);
        let point = DVec3::new(0.0, 0.0, radius);
        let displaced = displace(&settings, 8, point);
        assert_eq!(displaced.x, 0.0);
        assert_eq!(displaced.y, 0.0);
        assert!((displaced.z - (radius + function.elevation(point))).abs() < 1e-9);
    }

    #[test]
    fn test_shared_points_match_across_threads() {
        let settings = TerrainSettings::from_seed(21, EARTH_RADIUS, BodyKind::Planet).unwrap();
        let function = TerrainFunction::new(&settings, 21);
        let points: Vec<DVec3> = fibonacci_sphere(256).map(|p| p * EARTH_RADIUS).collect();
        let expected: Vec<u64> = points.iter().map(|p| function.elevation(*p).to_bits()).collect();

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let (function, points, expected) = (&function, &points, &expected);
                scope.spawn(move || {
                    // Each worker walks the points in a different order.
                    let n = points.len();
                    for k in 0..n {
                        let i = (k * (2 * worker + 1) + worker * 61) % n;
                        assert_eq!(function.elevation(points[i]).to_bits(), expected[i]);
                    }
                });
            }
        });
    }

    #[test]
    fn test_different_seeds_are_uncorrelated() {
        let settings = TerrainSettings::new(
            1.0,
            vec![layer(
                LayerKind::Ripple,
                NoiseSettings::builder().amplitude(1.0).frequency(64.0),
            )],
            0.1,
        )
        .unwrap();
        let a = TerrainFunction::new(&settings, 1);
        let b = TerrainFunction::new(&settings, 2);
        let points: Vec<DVec3> = fibonacci_sphere(2000).collect();
        let ea: Vec<f64> = points.iter().map(|p| a.elevation(*p)).collect();
        let eb: Vec<f64> = points.iter().map(|p| b.elevation(*p)).collect();
        let r = pearson(&ea, &eb);
        assert!(r.abs() < 0.1, "seeds 1 and 2 correlate with r = {r}");
    }

    #[test]
    fn test_mountains_need_land() {
        let settings = TerrainSettings::new(
            1.0,
            vec![
                layer(
                    LayerKind::Continent,
                    NoiseSettings::builder().amplitude(100.0).min_value(1.0),
                ),
                layer(
                    LayerKind::Mountain,
                    NoiseSettings::builder().amplitude(5000.0).frequency(4.0),
                ),
            ],
            0.1,
        )
        .unwrap();
        let function = TerrainFunction::new(&settings, 4);
        for p in fibonacci_sphere(200) {
            assert_eq!(function.elevation(p), 0.0, "mountain rose without land at {p}");
        }
    }

    #[test]
    fn test_mountains_rise_on_land() {
        let settings = TerrainSettings::new(
            1.0,
            vec![
                layer(LayerKind::Continent, NoiseSettings::builder().amplitude(0.0)),
                layer(
                    LayerKind::Mountain,
                    NoiseSettings::builder().amplitude(5000.0).frequency(4.0),
                ),
            ],
            0.0,
        )
        .unwrap();
        let function = TerrainFunction::new(&settings, 4);
        let highest = fibonacci_sphere(200)
            .map(|p| function.elevation(p))
            .fold(0.0, f64::max);
        assert!(highest > 0.0, "mountains must appear where continents are positive");
    }

    #[test]
    fn test_published_modifiers_apply() {
        let function = TerrainFunction::new(&rolling(1.0, 100.0), 6);
        let p = DVec3::new(0.1, 0.9, -0.3);
        let before = function.elevation(p);

        let doubled = NoiseModifiers {
            amplitude_modifier: 2.0,
            ..NoiseModifiers::default()
        };
        function.set_modifiers(doubled);
        let after = function.elevation(p);
        assert!((after - 2.0 * before).abs() < 1e-9);
        assert_eq!(after.to_bits(), function.elevation_with(p, Some(&doubled)).to_bits());
    }

    #[test]
    fn test_flat_surface_normal_is_radial() {
        let function = TerrainFunction::new(&TerrainSettings::flat(1000.0).unwrap(), 0);
        for p in fibonacci_sphere(32) {
            let normal = function.surface_normal(p * 3.0);
            assert!(
                (normal - p).length() < 1e-6,
                "normal {normal} should equal direction {p}"
            );
        }
    }

    #[test]
    fn test_satellite_craters_dent_the_surface() {
        let radius = 1_737_400.0;
        let settings = TerrainSettings::from_seed(12, radius, BodyKind::Satellite).unwrap();
        let function = TerrainFunction::new(&settings, 12);
        let field = settings.craters().unwrap();
        let filter = function.filter(LayerKind::Crater).unwrap();
        assert!(
            field.craters.iter().any(|c| filter.sample(c.position) < 0.0),
            "crater centers should sit below the datum"
        );
    }

    #[test]
    fn test_published_modifiers_switch_all_layers_together() {
        let settings = TerrainSettings::from_seed(31, EARTH_RADIUS, BodyKind::Planet).unwrap();
        let function = TerrainFunction::new(&settings, 31);
        let a = NoiseModifiers::default();
        let b = NoiseModifiers {
            amplitude_modifier: 3.0,
            frequency_modifier: 1.5,
            ..NoiseModifiers::default()
        };
        let points: Vec<DVec3> = fibonacci_sphere(8).collect();
        let expected: Vec<(u64, u64)> = points
            .iter()
            .map(|p| {
                (
                    function.elevation_with(*p, Some(&a)).to_bits(),
                    function.elevation_with(*p, Some(&b)).to_bits(),
                )
            })
            .collect();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let (function, points, expected) = (&function, &points, &expected);
                scope.spawn(move || {
                    for _ in 0..500 {
                        for (p, (ea, eb)) in points.iter().zip(expected) {
                            let v = function.elevation(*p).to_bits();
                            assert!(
                                v == *ea || v == *eb,
                                "elevation at {p} mixed layers from two publishes"
                            );
                        }
                    }
                });
            }
            for i in 0..2000 {
                function.set_modifiers(if i % 2 == 0 { b } else { a });
            }
        });
        assert_eq!(function.modifiers(), a);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "Continent layer produced"))]
    fn test_non_finite_continent_amplitude_is_dropped() {
        let settings = TerrainSettings::new(
            1.0,
            vec![layer(
                LayerKind::Continent,
                NoiseSettings::builder().amplitude(100.0).min_value(1.0),
            )],
            0.1,
        )
        .unwrap();
        let function = TerrainFunction::new(&settings, 1);
        let m = NoiseModifiers {
            amplitude_modifier: f64::INFINITY,
            ..NoiseModifiers::default()
        };
        assert_eq!(function.elevation_with(DVec3::X, Some(&m)), 0.0);
    }

    #[test]
    fn test_satellite_mountains_raise_terrain() {
        let settings = TerrainSettings::from_seed(12, 1_737_400.0, BodyKind::Satellite).unwrap();
        let function = TerrainFunction::new(&settings, 12);
        let mountain = function.filter(LayerKind::Mountain).unwrap();
        let others = [LayerKind::Ripple, LayerKind::Crater].map(|kind| function.filter(kind).unwrap());

        let mut highest = 0.0_f64;
        for p in fibonacci_sphere(2000) {
            let relief = function.elevation(p) - others.iter().map(|f| f.sample(p)).sum::<f64>();
            assert!((relief - mountain.sample(p)).abs() < 1e-6);
            highest = highest.max(relief);
        }
        assert!(highest > 100.0, "satellite mountains peak at only {highest} m");
    }

    #[test]
    fn test_same_layers_same_meters_at_any_radius() {
        let small = TerrainFunction::new(&rolling(1e3, 250.0), 9);
        let large = TerrainFunction::new(&rolling(6.371e6, 250.0), 9);
        for p in fibonacci_sphere(200) {
            assert_eq!(small.elevation(p).to_bits(), large.elevation(p).to_bits());
            let on_small = small.elevation(p * small.radius());
            let on_large = large.elevation(p * large.radius());
            assert!(
                (on_small - on_large).abs() < 1e-6,
                "{on_small} m vs {on_large} m at {p}: elevation must not scale with radius"
            );
        }
    }

    #[test]
    fn test_elevation_within_max_elevation() {
        for (seed, radius, kind) in [
            (4, EARTH_RADIUS, BodyKind::Planet),
            (5, 0.5 * EARTH_RADIUS, BodyKind::Planet),
            (6, 1_737_400.0, BodyKind::Satellite),
        ] {
            let settings = TerrainSettings::from_seed(seed, radius, kind).unwrap();
            let function = TerrainFunction::new(&settings, seed);
            let bound = settings.max_elevation();
            for p in fibonacci_sphere(2000) {
                let e = function.elevation(p * radius);
                assert!(
                    e.abs() <= bound + 1e-9,
                    "{kind:?} seed {seed}: elevation {e} exceeds bound {bound}"
                );
            }
        }
    }
}
