//! Affine remapping between pixel rectangles.
//!
//! An image of size `w x h` covers the rectangle `[0, w] x [0, h]`; remapping
//! to a canvas of a different size is a per-axis linear map between the two
//! rectangles.

use nalgebra::Point2;

use crate::point::RasterSize;

/// Map `value` from `[src_min, src_max]` onto `[dst_min, dst_max]`.
///
/// A degenerate source range (`src_max == src_min`, e.g. a one-pixel axis
/// during an incremental resize) returns `dst_min`.
#[inline]
pub fn scale_range(value: f64, src_min: f64, src_max: f64, dst_min: f64, dst_max: f64) -> f64 {
    let span = src_max - src_min;
    if span == 0.0 {
        return dst_min;
    }
    (value - src_min) / span * (dst_max - dst_min) + dst_min
}

/// Per-axis [`scale_range`] on points.
#[inline]
pub fn scale_point_range(
    p: Point2<f64>,
    src_min: Point2<f64>,
    src_max: Point2<f64>,
    dst_min: Point2<f64>,
    dst_max: Point2<f64>,
) -> Point2<f64> {
    Point2::new(
        scale_range(p.x, src_min.x, src_max.x, dst_min.x, dst_max.x),
        scale_range(p.y, src_min.y, src_max.y, dst_min.y, dst_max.y),
    )
}

/// Image pixel -> canvas pixel.
#[inline]
pub fn scale_image_to_canvas(p: Point2<f64>, image: RasterSize, canvas: RasterSize) -> Point2<f64> {
    scale_point_range(p, Point2::origin(), image.extent(), Point2::origin(), canvas.extent())
}

/// Canvas pixel -> image pixel.
#[inline]
pub fn scale_canvas_to_image(p: Point2<f64>, image: RasterSize, canvas: RasterSize) -> Point2<f64> {
    scale_point_range(p, Point2::origin(), canvas.extent(), Point2::origin(), image.extent())
}

/// Position of `value` inside `[min, max]` expressed in percent.
///
/// Returns `0.0` for a degenerate range.
#[inline]
pub fn percentage_from_range(value: f64, min: f64, max: f64) -> f64 {
    scale_range(value, min, max, 0.0, 100.0)
}

/// Inverse of [`percentage_from_range`].
///
/// Useful for sizes given as a fraction of a sensor dimension, e.g. a ring
/// radius of `2%` of the sensor width is `value_from_percentage(2.0, 0.0, w)`.
#[inline]
pub fn value_from_percentage(percent: f64, min: f64, max: f64) -> f64 {
    scale_range(percent, 0.0, 100.0, min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn degenerate_range_returns_dst_min() {
        assert_eq!(scale_range(5.0, 3.0, 3.0, 10.0, 20.0), 10.0);
        assert_eq!(scale_range(f64::NAN, 1.0, 1.0, -2.0, 2.0), -2.0);
        assert_eq!(percentage_from_range(7.0, 7.0, 7.0), 0.0);
    }

    #[test]
    fn maps_endpoints_and_midpoint() {
        assert_relative_eq!(scale_range(0.0, 0.0, 10.0, 100.0, 200.0), 100.0);
        assert_relative_eq!(scale_range(10.0, 0.0, 10.0, 100.0, 200.0), 200.0);
        assert_relative_eq!(scale_range(5.0, 0.0, 10.0, 100.0, 200.0), 150.0);
        // reversed destination
        assert_relative_eq!(scale_range(2.5, 0.0, 10.0, 1.0, 0.0), 0.75);
    }

    #[test]
    fn image_canvas_round_trip_is_identity() {
        let image = RasterSize::new(1280, 800);
        let canvas = RasterSize::new(913, 571);
        for &(x, y) in &[(0.0, 0.0), (1280.0, 800.0), (321.7, 644.25), (-15.0, 900.0)] {
            let p = Point2::new(x, y);
            let c = scale_image_to_canvas(p, image, canvas);
            let back = scale_canvas_to_image(c, image, canvas);
            assert_relative_eq!(back.x, p.x, epsilon = 1e-9);
            assert_relative_eq!(back.y, p.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn same_size_scaling_is_identity() {
        let size = RasterSize::new(640, 480);
        let p = Point2::new(123.5, 456.25);
        let q = scale_image_to_canvas(p, size, size);
        assert_relative_eq!(q.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(q.y, p.y, epsilon = 1e-12);
    }

    #[test]
    fn image_to_canvas_scales_per_axis() {
        let q = scale_image_to_canvas(
            Point2::new(640.0, 400.0),
            RasterSize::new(1280, 800),
            RasterSize::new(64, 48),
        );
        assert_relative_eq!(q.x, 32.0);
        assert_relative_eq!(q.y, 24.0);
    }

    #[test]
    fn percentages() {
        assert_relative_eq!(percentage_from_range(25.0, 0.0, 200.0), 12.5);
        assert_relative_eq!(value_from_percentage(12.5, 0.0, 200.0), 25.0);
    }
}
