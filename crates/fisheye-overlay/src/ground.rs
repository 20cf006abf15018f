//! Flat-ground model.
//!
//! The camera looks along `+z` with `y` pointing down, mounted
//! `camera_height` above a flat ground plane, so the ground is `y = h`.
//! A calibrated point with `y > 0` is a ray that hits the ground; anything
//! else is on or above the horizon.

use nalgebra::{Point2, Point3};

use fisheye_core::{
    scale_canvas_to_image, scale_image_to_canvas, CalibratedPoint, CameraSpacePoint, Intrinsics,
    PixelPoint, RasterSize,
};

/// Intersect the ray through `cal` with the ground plane `y = camera_height`.
///
/// Returns `None` for rays on or above the horizon (`cal.y <= 0`), for a
/// non-positive height and for non-finite input.
pub fn calibrated_point_to_camera_point(
    cal: CalibratedPoint,
    camera_height: f64,
) -> Option<CameraSpacePoint> {
    if !(cal.y > 0.0 && cal.x.is_finite() && cal.y.is_finite() && camera_height > 0.0) {
        return None;
    }
    let z = camera_height / cal.y;
    Some(Point3::new(cal.x * z, camera_height, z))
}

/// Perspective division onto the `z = 1` plane. `None` behind the camera.
pub fn camera_point_to_calibrated(p: &CameraSpacePoint) -> Option<CalibratedPoint> {
    if !(p.z > 0.0) {
        return None;
    }
    let cal = Point2::new(p.x / p.z, p.y / p.z);
    (cal.x.is_finite() && cal.y.is_finite()).then_some(cal)
}

/// Ground point under a pixel of the output raster.
///
/// `None` when the pixel lies outside the lens's trusted field of view (see
/// [`Intrinsics::unproject_checked`]) or its ray misses the ground.
pub fn pixel_to_ground(
    pixel: PixelPoint,
    intrinsics: &Intrinsics,
    output: RasterSize,
    camera_height: f64,
) -> Option<CameraSpacePoint> {
    let px = scale_canvas_to_image(pixel, intrinsics.resolution(), output);
    calibrated_point_to_camera_point(intrinsics.unproject_checked(px)?, camera_height)
}

/// Calibrated point -> output-raster pixel; `None` if anything goes non-finite.
pub(crate) fn calibrated_to_output(
    cal: CalibratedPoint,
    intrinsics: &Intrinsics,
    output: RasterSize,
) -> Option<PixelPoint> {
    let px = scale_image_to_canvas(intrinsics.project(cal), intrinsics.resolution(), output);
    (px.x.is_finite() && px.y.is_finite()).then_some(px)
}
