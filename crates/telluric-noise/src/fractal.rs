//! Multi-octave fractal evaluation over [`CoherentNoise`].
//!
//! Octave `i` samples at `(p + offset) * frequency * lacunarity^i` with weight
//! `1 / decay^i`; the weighted sum is divided by the sum of weights so the
//! result stays in `[0, 1]` for any octave count or decay. The normalized
//! value is then shaped (power curve, threshold, river flattening).

use glam::DVec3;

use crate::primitive::CoherentNoise;
use crate::settings::ResolvedNoise;

/// Weighted octave average of `octave_fn`, in `[0, 1]` when `octave_fn` is.
#[inline]
fn accumulate(point: DVec3, params: &ResolvedNoise, octave_fn: impl Fn(DVec3) -> f64) -> f64 {
    let base = point + params.offset;
    let mut total = 0.0;
    let mut weight = 1.0;
    let mut weight_sum = 0.0;
    let mut frequency = params.frequency;

    for _ in 0..params.octaves {
        total += octave_fn(base * frequency) * weight;
        weight_sum += weight;
        frequency *= params.lacunarity;
        weight /= params.decay;
    }

    (total / weight_sum).clamp(0.0, 1.0)
}

/// Apply the shaping stages to a normalized fractal value.
///
/// 1. power curve `v^power`;
/// 2. threshold: `v <= min_value` maps to 0 and the rest is rescaled to
///    `[0, 1]`; `min_value >= 1` collapses everything to exactly 0;
/// 3. river flattening: values inside `[0, river_factor)` are eased toward
///    zero with a smoothstep weight, leaving larger values untouched.
pub fn shape(value: f64, params: &ResolvedNoise) -> f64 {
    let mut v = if params.power == 1.0 {
        value
    } else {
        libm::pow(value, params.power)
    };

    if params.min_value >= 1.0 {
        return 0.0;
    }
    if params.min_value > 0.0 {
        v = (v - params.min_value).max(0.0) / (1.0 - params.min_value);
    }

    if params.river_factor > 0.0 && v < params.river_factor {
        let t = v / params.river_factor;
        v *= t * t * (3.0 - 2.0 * t);
    }

    v
}

/// Shaped simplex fractal in `[0, 1]`.
pub fn fractal(noise: &CoherentNoise, point: DVec3, params: &ResolvedNoise) -> f64 {
    if params.min_value >= 1.0 {
        return 0.0;
    }
    let raw = accumulate(point, params, |p| noise.sample_normalized(p));
    shape(raw, params)
}

/// Shaped ridged fractal in `[0, 1]`: each octave contributes `1 - |n|`,
/// giving sharp crests where the underlying noise crosses zero.
pub fn ridged_fractal(noise: &CoherentNoise, point: DVec3, params: &ResolvedNoise) -> f64 {
    if params.min_value >= 1.0 {
        return 0.0;
    }
    let raw = accumulate(point, params, |p| 1.0 - noise.sample(p).abs());
    shape(raw, params)
}
