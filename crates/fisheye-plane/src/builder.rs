//! Calibrated-plane bounds and validity mask.
//!
//! Two passes over the output raster, each on its own [`RowPool`]:
//!
//! 1. Every texel center is mapped into image pixels, unprojected and
//!    re-projected. The squared round-trip error classifies the texel and
//!    decides whether its calibrated point enters the global min/max.
//! 2. Once the (zoomed) bounds are known, valid texels whose calibrated
//!    point falls outside them are demoted to dead-zone.
//!
//! The passes are separated by the first pool's shutdown, which is the
//! barrier that makes the global bounds available to pass 2.

use std::sync::{Mutex, PoisonError};

use log::debug;
use nalgebra::Point2;

use fisheye_core::{scale_canvas_to_image, CalibratedPoint, Intrinsics, PixelPoint, RasterSize};

use crate::bounds::{BoundsAccumulator, CalibratedPlaneBounds};
use crate::error::PlaneError;
use crate::mask::{MaskTexel, ValidPixelMask};
use crate::params::PlaneBuilderParams;
use crate::pool::{default_worker_count, RowPool};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Result of [`CalibratedPlaneBuilder::build`].
///
/// Tied to one `(Intrinsics, output size, zoom)` triple; rebuild on any
/// change instead of patching.
#[derive(Clone, Debug, PartialEq)]
pub struct CalibratedPlane {
    pub bounds: CalibratedPlaneBounds,
    pub mask: ValidPixelMask,
    /// Resolution of the calibrated image.
    pub image_size: RasterSize,
}

impl CalibratedPlane {
    /// Output raster the mask was built for.
    #[inline]
    pub fn output_size(&self) -> RasterSize {
        self.mask.size()
    }

    /// `true` when the output-raster point lies on a valid texel.
    ///
    /// Used to reject clicks outside the usable field of view.
    pub fn contains_pixel(&self, px: PixelPoint) -> bool {
        self.mask.at_point(px.x, px.y) == Some(MaskTexel::Valid)
    }
}

/// Per-texel outcome of pass 1.
#[derive(Clone, Copy, Debug, PartialEq)]
enum TexelSample {
    Invalid,
    /// Valid, but too far from an exact round trip to shape the bounds.
    Loose(CalibratedPoint),
    Exact(CalibratedPoint),
}

/// Shared, read-only inputs of both passes.
struct ScanContext<'a> {
    intrinsics: &'a Intrinsics,
    output: RasterSize,
    mask_threshold: f64,
    bounds_threshold: f64,
}

impl ScanContext<'_> {
    /// Calibrated point of the center of output texel `(col, row)`.
    #[inline]
    fn unproject_texel(&self, col: usize, row: usize) -> (PixelPoint, CalibratedPoint) {
        let texel_center = Point2::new(col as f64 + 0.5, row as f64 + 0.5);
        let px = scale_canvas_to_image(texel_center, self.intrinsics.resolution(), self.output);
        (px, self.intrinsics.unproject(px))
    }

    fn sample(&self, col: usize, row: usize) -> TexelSample {
        let (px, cal) = self.unproject_texel(col, row);
        if !(cal.x.is_finite() && cal.y.is_finite()) {
            return TexelSample::Invalid;
        }
        let sqr_err = (self.intrinsics.project(cal) - px).norm_squared();
        if sqr_err.is_nan() || sqr_err > self.mask_threshold {
            TexelSample::Invalid
        } else if sqr_err > self.bounds_threshold {
            TexelSample::Loose(cal)
        } else {
            TexelSample::Exact(cal)
        }
    }
}

/// Builds [`CalibratedPlane`]s for a fixed parameter set.
#[derive(Clone, Debug, Default)]
pub struct CalibratedPlaneBuilder {
    params: PlaneBuilderParams,
}

impl CalibratedPlaneBuilder {
    pub fn new(params: PlaneBuilderParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PlaneBuilderParams {
        &self.params
    }

    fn validate(&self, output: RasterSize) -> Result<(), PlaneError> {
        if output.is_empty() {
            return Err(PlaneError::EmptyRaster {
                width: output.width,
                height: output.height,
            });
        }
        let zoom = self.params.zoom;
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(PlaneError::InvalidZoom(zoom));
        }
        let (bounds, mask) = (self.params.bounds_threshold, self.params.mask_threshold);
        if !(bounds.is_finite() && mask.is_finite() && 0.0 <= bounds && bounds <= mask) {
            return Err(PlaneError::InvalidThresholds { bounds, mask });
        }
        Ok(())
    }

    /// Scan every texel of `output` and derive bounds and mask.
    ///
    /// Blocking: both worker pools are joined before this returns.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, intrinsics),
            fields(width = output.width, height = output.height, zoom = self.params.zoom)
        )
    )]
    pub fn build(
        &self,
        intrinsics: &Intrinsics,
        output: RasterSize,
    ) -> Result<CalibratedPlane, PlaneError> {
        self.validate(output)?;

        let pool = RowPool::new(self.params.workers.unwrap_or_else(default_worker_count));
        let ctx = ScanContext {
            intrinsics,
            output,
            mask_threshold: self.params.mask_threshold,
            bounds_threshold: self.params.bounds_threshold,
        };
        let width = output.width as usize;
        let mut texels = vec![MaskTexel::INVALID; output.area()];

        // Pass 1: classify texels, reduce bounds.
        let shared = Mutex::new(BoundsAccumulator::empty());
        pool.run(&mut texels, width, |row, line| {
            let mut local = BoundsAccumulator::empty();
            for (col, texel) in line.iter_mut().enumerate() {
                *texel = match ctx.sample(col, row) {
                    TexelSample::Invalid => MaskTexel::INVALID,
                    TexelSample::Loose(_) => MaskTexel::VALID,
                    TexelSample::Exact(cal) => {
                        local.add(cal);
                        MaskTexel::VALID
                    }
                };
            }
            if !local.is_empty() {
                shared
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .merge(&local);
            }
        });

        let raw = shared
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .finish()
            .ok_or(PlaneError::NoValidPixels)?;
        let bounds = raw.zoomed(self.params.zoom);

        // Pass 2: demote valid texels outside the final rectangle.
        pool.run(&mut texels, width, |row, line| {
            for (col, texel) in line.iter_mut().enumerate() {
                if *texel != MaskTexel::VALID {
                    continue;
                }
                let (_, cal) = ctx.unproject_texel(col, row);
                if !bounds.contains(cal) {
                    *texel = MaskTexel::DEAD_ZONE;
                }
            }
        });

        let mask = ValidPixelMask::from_raw(output, texels);
        debug!(
            "calibrated plane {}x{} on {} workers: bounds ({:.4}, {:.4})..({:.4}, {:.4})",
            output.width,
            output.height,
            pool.workers(),
            bounds.top_left.x,
            bounds.top_left.y,
            bounds.bottom_right.x,
            bounds.bottom_right.y,
        );
        debug!(
            "texels: {} valid, {} dead-zone, {} invalid",
            mask.count(MaskTexel::Valid),
            mask.count(MaskTexel::DeadZone),
            mask.count(MaskTexel::Invalid),
        );

        Ok(CalibratedPlane {
            bounds,
            mask,
            image_size: intrinsics.resolution(),
        })
    }
}

/// Build bounds and mask with default thresholds and the given zoom.
///
/// Expensive: call on calibration or output-size changes, not per frame.
pub fn build_calibrated_plane(
    intrinsics: &Intrinsics,
    output: RasterSize,
    zoom: f64,
) -> Result<CalibratedPlane, PlaneError> {
    CalibratedPlaneBuilder::new(PlaneBuilderParams::default().with_zoom(zoom))
        .build(intrinsics, output)
}
