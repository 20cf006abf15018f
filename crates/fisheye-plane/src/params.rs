use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Squared round-trip error (px²) above which a texel is invalid. Same
/// tolerance the overlays use to reject clicks.
pub const DEFAULT_MASK_THRESHOLD: f64 = fisheye_core::MAX_ROUND_TRIP_SQR_ERROR;

/// Squared round-trip error (px²) above which a valid texel is left out of
/// the bounds reduction.
pub const DEFAULT_BOUNDS_THRESHOLD: f64 = 1e-8;

/// Configuration for [`CalibratedPlaneBuilder`](crate::CalibratedPlaneBuilder).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneBuilderParams {
    /// Bounds are divided by this factor; `> 1` crops into the image.
    pub zoom: f64,
    /// See [`DEFAULT_MASK_THRESHOLD`].
    pub mask_threshold: f64,
    /// See [`DEFAULT_BOUNDS_THRESHOLD`]. Must not exceed `mask_threshold`.
    pub bounds_threshold: f64,
    /// Worker threads; `None` uses the host core count.
    pub workers: Option<NonZeroUsize>,
}

impl Default for PlaneBuilderParams {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            mask_threshold: DEFAULT_MASK_THRESHOLD,
            bounds_threshold: DEFAULT_BOUNDS_THRESHOLD,
            workers: None,
        }
    }
}

impl PlaneBuilderParams {
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = NonZeroUsize::new(workers);
        self
    }
}
