//! Kannala-Brandt 4-coefficient fisheye projection.
//!
//! The forward model maps the incidence angle `θ` of a ray to a distorted
//! image radius
//!
//! ```text
//! r(θ) = θ + k0·θ³ + k1·θ⁵ + k2·θ⁷ + k3·θ⁹
//! ```
//!
//! which has no closed-form inverse, so [`unproject`] solves for `θ` with a
//! fixed number of curvature-corrected Newton steps.

use nalgebra::Point2;

use crate::intrinsics::Intrinsics;
use crate::point::{CalibratedPoint, PixelPoint};

/// Number of solver steps in [`unproject`]. There is no convergence check.
pub const NEWTON_ITERATIONS: usize = 5;

/// Distorted radius `r(θ)` (in focal-length units) for incidence angle `theta`.
#[inline]
pub fn distorted_radius(theta: f64, k: [f64; 4]) -> f64 {
    let t2 = theta * theta;
    theta * (1.0 + t2 * (k[0] + t2 * (k[1] + t2 * (k[2] + t2 * k[3]))))
}

/// `r'(θ)`.
#[inline]
fn radius_derivative(t2: f64, k: [f64; 4]) -> f64 {
    1.0 + t2 * (3.0 * k[0] + t2 * (5.0 * k[1] + t2 * (7.0 * k[2] + t2 * 9.0 * k[3])))
}

/// `r''(θ) / (2θ)`.
#[inline]
fn half_curvature_over_theta(t2: f64, k: [f64; 4]) -> f64 {
    3.0 * k[0] + t2 * (10.0 * k[1] + t2 * (21.0 * k[2] + t2 * 36.0 * k[3]))
}

/// One Newton step on `g(θ) = f(θ)²` with `f(θ) = r(θ) − target`.
///
/// `g' = 2·f·f'` and `g'' = 2·f'² + 2·f·f''`, with `f'' = 2θ·h(θ)`.
#[inline]
fn newton_step(theta: f64, target: f64, k: [f64; 4]) -> f64 {
    let t2 = theta * theta;
    let f = distorted_radius(theta, k) - target;
    let df = radius_derivative(t2, k);
    let h = half_curvature_over_theta(t2, k);
    theta - 2.0 * f * df / (4.0 * theta * f * h + 2.0 * df * df)
}

/// Forward mapping: calibrated point -> distorted pixel.
///
/// The azimuth is taken as `0` at the optical axis, so
/// `project((0, 0)) == camera_center` exactly. Non-finite input propagates
/// to the output.
pub fn project(cal: CalibratedPoint, intrinsics: &Intrinsics) -> PixelPoint {
    let [fx, fy] = intrinsics.focal_length();
    let [cx, cy] = intrinsics.camera_center();

    let norm = cal.x.hypot(cal.y);
    let theta = norm.atan2(1.0);
    let psi = if norm == 0.0 { 0.0 } else { cal.y.atan2(cal.x) };
    let r = distorted_radius(theta, intrinsics.k_vals());

    Point2::new(fx * r * psi.cos() + cx, fy * r * psi.sin() + cy)
}

/// Inverse mapping: distorted pixel -> calibrated point.
///
/// Rays at or beyond 90° from the optical axis have `cos θ <= 0`; the
/// result is then infinite, NaN, or mirrored behind the camera. Callers are
/// expected to check [`Intrinsics::round_trip_sqr_error`] or the
/// calibrated-plane bounds before trusting the output.
pub fn unproject(px: PixelPoint, intrinsics: &Intrinsics) -> CalibratedPoint {
    let [fx, fy] = intrinsics.focal_length();
    let [cx, cy] = intrinsics.camera_center();
    let k = intrinsics.k_vals();

    let un = px.x - cx;
    let vn = px.y - cy;
    let psi = (fx * vn).atan2(fy * un);
    // Equal to un / (fx·cos ψ), without the 0/0 on the vertical axis.
    let rth = (un / fx).hypot(vn / fy);

    let mut theta = rth;
    for _ in 0..NEWTON_ITERATIONS {
        theta = newton_step(theta, rth, k);
    }

    let z = theta.cos();
    let s = theta.sin();
    Point2::new(s * psi.cos() / z, s * psi.sin() / z)
}
