use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Raw or scaled raster coordinate. Only meaningful together with the
/// [`RasterSize`] of the raster it lives in.
pub type PixelPoint = Point2<f64>;

/// Undistorted ray direction on the `z = 1` plane.
pub type CalibratedPoint = Point2<f64>;

/// Metric point in camera-centered coordinates (`x` right, `y` down, `z` forward).
pub type CameraSpacePoint = Point3<f64>;

/// Width and height of a raster in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RasterSize {
    pub width: u32,
    pub height: u32,
}

impl RasterSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when either side is zero.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels, `width * height`.
    #[inline]
    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bottom-right corner of the `[0, w] x [0, h]` rectangle.
    #[inline]
    pub fn extent(self) -> Point2<f64> {
        Point2::new(self.width as f64, self.height as f64)
    }
}
