//! Terrain configuration error types.

use telluric_noise::{LayerKind, NoiseError};

/// Errors raised while building [`TerrainSettings`](crate::TerrainSettings).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// A layer's noise settings failed validation.
    #[error("invalid {kind:?} layer: {source}")]
    Layer {
        kind: LayerKind,
        #[source]
        source: NoiseError,
    },

    /// Planet radius must be finite and positive.
    #[error("planet radius must be positive, got {0}")]
    InvalidRadius(f64),

    /// The mountain gate must lie in `[0, 1)`.
    #[error("ridge threshold must be in [0, 1), got {0}")]
    InvalidRidgeThreshold(f64),

    /// Each layer kind may appear once per body.
    #[error("layer {0:?} appears more than once")]
    DuplicateLayer(LayerKind),
}
