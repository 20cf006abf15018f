//! Point-and-go footprint.
//!
//! The target pose is drawn as a `width x length` rectangle on the ground,
//! plus a triangle past its front edge showing the heading. Both are built
//! in a local frame (`+z` forward), rotated by the heading and moved onto
//! the clicked ground point before projection.

use log::trace;
use nalgebra::{Point2, Point3, Vector2};
use serde::{Deserialize, Serialize};

use fisheye_core::{Intrinsics, PixelPoint, RasterSize};

use crate::ground::{calibrated_to_output, camera_point_to_calibrated, pixel_to_ground};
use crate::params::FootprintParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Footprint outline and heading triangle as closed polylines.
///
/// Points are ground `(x, z)` for [`footprint_ground_polygon`] and output
/// pixels for [`generate_footprint`]. The last point connects back to the
/// first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub outline: Vec<Point2<f64>>,
    pub heading: Vec<Point2<f64>>,
}

impl Footprint {
    pub fn is_empty(&self) -> bool {
        self.outline.is_empty() && self.heading.is_empty()
    }

    /// Outline followed by the heading triangle.
    pub fn points(&self) -> impl Iterator<Item = &Point2<f64>> {
        self.outline.iter().chain(&self.heading)
    }
}

/// `samples` points from `a` toward `b`, `b` excluded.
fn sample_edge(a: Vector2<f64>, b: Vector2<f64>, samples: usize, out: &mut Vec<Vector2<f64>>) {
    out.extend((0..samples).map(|i| a.lerp(&b, i as f64 / samples as f64)));
}

fn sample_polygon(corners: &[Vector2<f64>], samples: usize) -> Vec<Vector2<f64>> {
    let mut out = Vec::with_capacity(corners.len() * samples);
    for (i, &a) in corners.iter().enumerate() {
        let b = corners[(i + 1) % corners.len()];
        sample_edge(a, b, samples, &mut out);
    }
    out
}

/// Footprint on the ground around `center = (x, z)`, rotated by `theta`.
///
/// At `theta = 0` the rectangle's edges are parallel to the camera axes and
/// the heading points along `+z`. The corner order (front-left, front-right,
/// rear-right, rear-left) does not depend on `theta`.
pub fn footprint_ground_polygon(
    center: Point2<f64>,
    theta: f64,
    params: &FootprintParams,
) -> Footprint {
    let samples = params.samples_per_edge.max(1);
    let (hw, hl) = (0.5 * params.width, 0.5 * params.length);

    let outline = sample_polygon(
        &[
            Vector2::new(-hw, hl),
            Vector2::new(hw, hl),
            Vector2::new(hw, -hl),
            Vector2::new(-hw, -hl),
        ],
        samples,
    );
    let heading = sample_polygon(
        &[
            Vector2::new(-0.5 * hw, hl),
            Vector2::new(0.0, hl + params.heading_length),
            Vector2::new(0.5 * hw, hl),
        ],
        samples,
    );

    let (sin, cos) = theta.sin_cos();
    let place = |l: Vector2<f64>| {
        Point2::new(
            center.x + l.x * cos - l.y * sin,
            center.y + l.x * sin + l.y * cos,
        )
    };
    Footprint {
        outline: outline.into_iter().map(place).collect(),
        heading: heading.into_iter().map(place).collect(),
    }
}

/// Point-and-go preview for a click at `pixel` with heading `theta` (radians).
///
/// Empty when the click misses the ground or the target lies outside the
/// `world_x_max` / `z_max` window. Ground points behind the camera are
/// dropped from the polylines.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip(intrinsics, params), fields(px = pixel.x, py = pixel.y))
)]
pub fn generate_footprint(
    pixel: PixelPoint,
    theta: f64,
    intrinsics: &Intrinsics,
    output: RasterSize,
    params: &FootprintParams,
) -> Footprint {
    let h = params.camera_height;
    let Some(ground) = pixel_to_ground(pixel, intrinsics, output, h) else {
        trace!("footprint click ({:.1}, {:.1}) does not hit the ground", pixel.x, pixel.y);
        return Footprint::default();
    };
    if ground.x.abs() > params.world_x_max || ground.z > params.z_max {
        trace!(
            "footprint target ({:.2}, {:.2}) outside the drawable window",
            ground.x,
            ground.z
        );
        return Footprint::default();
    }

    let polygon = footprint_ground_polygon(Point2::new(ground.x, ground.z), theta, params);
    let to_output = |g: &Point2<f64>| {
        let cal = camera_point_to_calibrated(&Point3::new(g.x, h, g.y))?;
        calibrated_to_output(cal, intrinsics, output)
    };
    Footprint {
        outline: polygon.outline.iter().filter_map(&to_output).collect(),
        heading: polygon.heading.iter().filter_map(&to_output).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn polygon_sizes_follow_samples() {
        let params = FootprintParams {
            samples_per_edge: 4,
            ..FootprintParams::default()
        };
        let fp = footprint_ground_polygon(Point2::new(0.0, 3.0), 0.0, &params);
        assert_eq!(fp.outline.len(), 16);
        assert_eq!(fp.heading.len(), 12);

        // zero samples still yields the corners
        let corners = footprint_ground_polygon(
            Point2::new(0.0, 3.0),
            0.0,
            &FootprintParams {
                samples_per_edge: 0,
                ..FootprintParams::default()
            },
        );
        assert_eq!(corners.outline.len(), 4);
    }

    #[test]
    fn heading_apex_points_forward() {
        let params = FootprintParams::default();
        let fp = footprint_ground_polygon(Point2::new(1.0, 3.0), 0.0, &params);
        let apex = fp
            .heading
            .iter()
            .fold(f64::NEG_INFINITY, |m, p| m.max(p.y));
        assert_relative_eq!(
            apex,
            3.0 + 0.5 * params.length + params.heading_length,
            epsilon = 1e-12
        );
    }
}
