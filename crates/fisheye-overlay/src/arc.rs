//! Arc-mode and straight trajectory rails.
//!
//! A vehicle at the camera origin driving at constant curvature toward a
//! clicked ground point `(x, z)` follows the circle through the origin that
//! is tangent to `+z` there. Its center sits at `(r, 0)` with
//! `r = (x² + z²) / (2x)`; positive `r` turns right.
//!
//! Each rail is that circle shifted by a lateral offset `o`, parameterized
//! by the swept angle `θ`:
//!
//! ```text
//! x(θ) = r − (r + o)·cos θ
//! z(θ) = sign(r)·(r + o)·sin θ
//! ```
//!
//! and re-projected as the calibrated point `(x / z, h / z)`.

use std::f64::consts::PI;

use log::trace;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use fisheye_core::{CalibratedPoint, Intrinsics, PixelPoint, RasterSize};

use crate::ground::{calibrated_to_output, pixel_to_ground};
use crate::params::ArcParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Center, left and right rails of a trajectory.
///
/// The same container holds calibrated points or output-raster pixels,
/// depending on which function produced it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRails {
    pub center: Vec<Point2<f64>>,
    pub left: Vec<Point2<f64>>,
    pub right: Vec<Point2<f64>>,
}

impl TrajectoryRails {
    pub fn is_empty(&self) -> bool {
        self.center.is_empty() && self.left.is_empty() && self.right.is_empty()
    }

    /// Total number of points over all rails.
    pub fn len(&self) -> usize {
        self.center.len() + self.left.len() + self.right.len()
    }

    /// Center rail, then left, then right.
    pub fn points(&self) -> impl Iterator<Item = &Point2<f64>> {
        self.center.iter().chain(&self.left).chain(&self.right)
    }

    fn filter_map_points<F>(&self, f: F) -> Self
    where
        F: Fn(Point2<f64>) -> Option<Point2<f64>>,
    {
        let map = |rail: &[Point2<f64>]| -> Vec<Point2<f64>> {
            rail.iter().copied().filter_map(&f).collect()
        };
        Self {
            center: map(self.center.as_slice()),
            left: map(self.left.as_slice()),
            right: map(self.right.as_slice()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Left,
    Right,
}

/// Turning radius of the arc from the origin (heading `+z`) to `(x, z)`.
///
/// `None` when `x == 0`: the target is straight ahead and has no curvature.
pub fn turning_radius(x: f64, z: f64) -> Option<f64> {
    if x == 0.0 || !x.is_finite() || !z.is_finite() {
        return None;
    }
    Some((x * x + z * z) / (2.0 * x))
}

/// Constant-curvature path to a ground target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArcPath {
    /// Ground target `(x, z)`.
    pub target: Point2<f64>,
    /// Signed turning radius, positive to the right.
    pub radius: f64,
    /// Swept angle at which the center rail reaches the target.
    pub theta_max: f64,
}

impl ArcPath {
    /// Path to the ground point `(x, z)`. `None` for straight-ahead or
    /// non-forward targets.
    pub fn new(x: f64, z: f64) -> Option<Self> {
        if !(z > 0.0) {
            return None;
        }
        let radius = turning_radius(x, z)?;
        // |r| >= z always holds; clamp only guards rounding.
        let s = (z / radius.abs()).clamp(-1.0, 1.0).asin();
        // Far targets (left or right) are reached before the quarter turn,
        // near ones after it. The sign of r does not change the sweep.
        let theta_max = if z > x.abs() { s } else { PI - s };
        Some(Self {
            target: Point2::new(x, z),
            radius,
            theta_max,
        })
    }

    pub fn direction(&self) -> TurnDirection {
        if self.radius > 0.0 {
            TurnDirection::Right
        } else {
            TurnDirection::Left
        }
    }

    /// Target lies farther ahead than to the side; the sweep stays below 90°.
    pub fn is_far(&self) -> bool {
        self.target.y > self.target.x.abs()
    }

    /// Calibrated point of the rail at lateral `offset` after sweeping `theta`.
    fn rail_point(&self, theta: f64, offset: f64, camera_height: f64) -> Option<CalibratedPoint> {
        let r = self.radius;
        let zp = r.signum() * (r + offset) * theta.sin();
        let cal = Point2::new((r - (r + offset) * theta.cos()) / zp, camera_height / zp);
        (cal.x.is_finite() && cal.y.is_finite() && cal.y > 0.0).then_some(cal)
    }

    /// Rails in calibrated space.
    ///
    /// Samples that fall on or behind the horizon are dropped, so the
    /// `θ = 0` sample at the camera itself never appears and tight turns
    /// can lose their inner rail entirely.
    pub fn rails_calibrated(&self, params: &ArcParams) -> TrajectoryRails {
        let rail = |offset: f64| -> Vec<CalibratedPoint> {
            sweep(params.samples)
                .filter_map(|t| self.rail_point(t * self.theta_max, offset, params.camera_height))
                .collect()
        };
        TrajectoryRails {
            center: rail(0.0),
            left: rail(params.half_width),
            right: rail(-params.half_width),
        }
    }
}

/// Evenly spaced fractions of `[0, 1]`, endpoints included.
fn sweep(samples: usize) -> impl Iterator<Item = f64> {
    let last = samples.saturating_sub(1);
    (0..samples).map(move |i| if last == 0 { 1.0 } else { i as f64 / last as f64 })
}

/// Straight rails toward a target `depth` meters ahead.
pub fn straight_rails_calibrated(depth: f64, params: &ArcParams) -> TrajectoryRails {
    let rail = |x: f64| -> Vec<CalibratedPoint> {
        sweep(params.samples)
            .filter_map(|t| {
                let z = t * depth;
                let cal = Point2::new(x / z, params.camera_height / z);
                (cal.x.is_finite() && cal.y.is_finite() && cal.y > 0.0).then_some(cal)
            })
            .collect()
    };
    TrajectoryRails {
        center: rail(0.0),
        left: rail(-params.half_width),
        right: rail(params.half_width),
    }
}

/// Arc-mode preview for a click at `pixel` of the output raster.
///
/// Returns rails in output-raster pixels. A click on or above the horizon
/// yields empty rails; a click exactly straight ahead falls back to
/// [`generate_straight_samples`].
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip(intrinsics, params), fields(px = pixel.x, py = pixel.y))
)]
pub fn generate_arc_samples(
    pixel: PixelPoint,
    intrinsics: &Intrinsics,
    output: RasterSize,
    params: &ArcParams,
) -> TrajectoryRails {
    let Some(ground) = pixel_to_ground(pixel, intrinsics, output, params.camera_height) else {
        trace!("arc click ({:.1}, {:.1}) does not hit the ground", pixel.x, pixel.y);
        return TrajectoryRails::default();
    };
    let calibrated = match ArcPath::new(ground.x, ground.z) {
        Some(path) => path.rails_calibrated(params),
        None => straight_rails_calibrated(ground.z, params),
    };
    calibrated.filter_map_points(|cal| calibrated_to_output(cal, intrinsics, output))
}

/// Straight-ahead preview to the depth under `pixel`, ignoring its lateral
/// offset.
pub fn generate_straight_samples(
    pixel: PixelPoint,
    intrinsics: &Intrinsics,
    output: RasterSize,
    params: &ArcParams,
) -> TrajectoryRails {
    let Some(ground) = pixel_to_ground(pixel, intrinsics, output, params.camera_height) else {
        trace!("straight click ({:.1}, {:.1}) does not hit the ground", pixel.x, pixel.y);
        return TrajectoryRails::default();
    };
    straight_rails_calibrated(ground.z, params)
        .filter_map_points(|cal| calibrated_to_output(cal, intrinsics, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn radius_sign_follows_turn_side() {
        assert_relative_eq!(turning_radius(1.0, 1.0).expect("curved"), 1.0);
        assert_relative_eq!(turning_radius(-2.0, 0.0).expect("curved"), -1.0);
        assert!(turning_radius(0.0, 3.0).is_none());
    }

    #[test]
    fn quadrants_pick_the_right_sweep() {
        let far_right = ArcPath::new(1.0, 3.0).expect("path");
        assert_eq!(far_right.direction(), TurnDirection::Right);
        assert!(far_right.is_far());
        assert!(far_right.theta_max < PI / 2.0);

        let near_left = ArcPath::new(-3.0, 1.0).expect("path");
        assert_eq!(near_left.direction(), TurnDirection::Left);
        assert!(!near_left.is_far());
        assert!(near_left.theta_max > PI / 2.0);

        // Mirrored targets sweep the same angle.
        let far_left = ArcPath::new(-1.0, 3.0).expect("path");
        assert_relative_eq!(far_left.theta_max, far_right.theta_max);
    }

    #[test]
    fn center_rail_ends_on_target() {
        let params = ArcParams::default();
        for (x, z) in [(1.3, 2.1), (-1.3, 2.1), (2.5, 0.8), (-2.5, 0.8)] {
            let path = ArcPath::new(x, z).expect("path");
            let rails = path.rails_calibrated(&params);
            let last = rails.center.last().expect("non-empty rail");
            assert_relative_eq!(last.x, x / z, epsilon = 1e-9);
            assert_relative_eq!(last.y, params.camera_height / z, epsilon = 1e-9);
            // θ = 0 sits at the camera and is dropped.
            assert_eq!(rails.center.len(), params.samples - 1);
        }
    }

    #[test]
    fn offset_rails_start_on_their_side() {
        let rails = ArcPath::new(1.0, 4.0)
            .expect("path")
            .rails_calibrated(&ArcParams::default());
        // Near the camera the rails are still parallel to +z.
        assert!(rails.left[0].x < 0.0);
        assert!(rails.right[0].x > 0.0);
        assert!(rails.points().all(|p| p.y > 0.0));
    }

    #[test]
    fn tight_turn_loses_inner_rail() {
        let params = ArcParams {
            half_width: 1.0,
            ..ArcParams::default()
        };
        // r = 0.5 < half width: the right rail would run behind the camera.
        let rails = ArcPath::new(0.5, 0.5).expect("path").rails_calibrated(&params);
        assert!(rails.right.is_empty());
        assert!(!rails.center.is_empty());
    }

    #[test]
    fn straight_rails_are_parallel() {
        let params = ArcParams::default();
        let rails = straight_rails_calibrated(5.0, &params);
        assert_eq!(rails.center.len(), params.samples - 1);
        for p in &rails.center {
            assert_eq!(p.x, 0.0);
        }
        let end = rails.left.last().expect("non-empty");
        assert_relative_eq!(end.x, -params.half_width / 5.0);
        assert_relative_eq!(end.y, params.camera_height / 5.0);
    }

    #[test]
    fn sweep_includes_endpoints() {
        let s: Vec<f64> = sweep(3).collect();
        assert_eq!(s, vec![0.0, 0.5, 1.0]);
        assert_eq!(sweep(1).collect::<Vec<_>>(), vec![1.0]);
        assert_eq!(sweep(0).count(), 0);
    }
}
