use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use fisheye_core::CalibratedPoint;

/// Axis-aligned rectangle in calibrated space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibratedPlaneBounds {
    pub top_left: CalibratedPoint,
    pub bottom_right: CalibratedPoint,
}

impl CalibratedPlaneBounds {
    #[inline]
    pub fn width(&self) -> f64 {
        self.bottom_right.x - self.top_left.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom_right.y - self.top_left.y
    }

    #[inline]
    pub fn center(&self) -> CalibratedPoint {
        Point2::new(
            0.5 * (self.top_left.x + self.bottom_right.x),
            0.5 * (self.top_left.y + self.bottom_right.y),
        )
    }

    /// Inclusive containment test. NaN coordinates are never contained.
    #[inline]
    pub fn contains(&self, p: CalibratedPoint) -> bool {
        p.x >= self.top_left.x
            && p.x <= self.bottom_right.x
            && p.y >= self.top_left.y
            && p.y <= self.bottom_right.y
    }

    /// Both corners divided by `zoom`.
    #[inline]
    pub fn zoomed(&self, zoom: f64) -> Self {
        Self {
            top_left: self.top_left / zoom,
            bottom_right: self.bottom_right / zoom,
        }
    }

    /// Point at normalized position `(u, v) ∈ [0, 1]²` inside the rectangle.
    #[inline]
    pub fn lerp(&self, u: f64, v: f64) -> CalibratedPoint {
        Point2::new(
            self.top_left.x + u * self.width(),
            self.top_left.y + v * self.height(),
        )
    }
}

/// Running min/max over calibrated points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BoundsAccumulator {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BoundsAccumulator {
    pub(crate) fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    #[inline]
    pub(crate) fn add(&mut self, p: CalibratedPoint) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub(crate) fn merge(&mut self, other: &BoundsAccumulator) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub(crate) fn finish(&self) -> Option<CalibratedPlaneBounds> {
        if self.is_empty() {
            return None;
        }
        Some(CalibratedPlaneBounds {
            top_left: Point2::new(self.min_x, self.min_y),
            bottom_right: Point2::new(self.max_x, self.max_y),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_order_independent() {
        let pts = [
            Point2::new(0.5, -1.0),
            Point2::new(-2.0, 0.25),
            Point2::new(1.5, 3.0),
        ];
        let mut a = BoundsAccumulator::empty();
        let mut b = BoundsAccumulator::empty();
        a.add(pts[0]);
        b.add(pts[1]);
        b.add(pts[2]);

        let mut ab = a;
        ab.merge(&b);
        let mut ba = b;
        ba.merge(&a);
        assert_eq!(ab, ba);

        let bounds = ab.finish().expect("non-empty");
        assert_eq!(bounds.top_left, Point2::new(-2.0, -1.0));
        assert_eq!(bounds.bottom_right, Point2::new(1.5, 3.0));
    }

    #[test]
    fn empty_accumulator_has_no_bounds() {
        assert!(BoundsAccumulator::empty().finish().is_none());
    }

    #[test]
    fn zoom_and_containment() {
        let b = CalibratedPlaneBounds {
            top_left: Point2::new(-2.0, -1.0),
            bottom_right: Point2::new(2.0, 1.0),
        };
        let z = b.zoomed(2.0);
        assert_eq!(z.top_left, Point2::new(-1.0, -0.5));
        assert!(b.contains(Point2::new(1.5, 0.0)));
        assert!(!z.contains(Point2::new(1.5, 0.0)));
        assert!(!b.contains(Point2::new(f64::NAN, 0.0)));
        assert_eq!(b.lerp(0.5, 0.5), b.center());
    }
}
