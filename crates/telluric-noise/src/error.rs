//! Noise configuration error types.

/// Errors raised when a [`NoiseSettings`](crate::NoiseSettings) record is built
/// from invalid parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NoiseError {
    /// Octave count outside `1..=MAX_OCTAVES`.
    #[error("octave count must be in 1..={max}, got {octaves}")]
    InvalidOctaves { octaves: u32, max: u32 },

    /// Per-octave amplitude divisor must be strictly positive.
    #[error("decay must be positive, got {0}")]
    InvalidDecay(f64),

    /// Base frequency must be strictly positive.
    #[error("frequency must be positive, got {0}")]
    InvalidFrequency(f64),

    /// Per-octave frequency multiplier must be strictly positive.
    #[error("lacunarity must be positive, got {0}")]
    InvalidLacunarity(f64),

    /// Shaping exponent must be strictly positive.
    #[error("power must be positive, got {0}")]
    InvalidPower(f64),

    /// River flattening band must lie in `[0, 1)`.
    #[error("river factor must be in [0, 1), got {0}")]
    InvalidRiverFactor(f64),

    /// A field that must be finite was NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
}
