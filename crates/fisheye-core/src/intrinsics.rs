//! Validated KB4 calibration record.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::kb4;
use crate::point::{CalibratedPoint, PixelPoint, RasterSize};

/// Squared round-trip error (px²) up to which an unprojected pixel is
/// trusted.
pub const MAX_ROUND_TRIP_SQR_ERROR: f64 = 0.5;

/// Calibration validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("calibration is missing field `{0}`")]
    MissingField(&'static str),
    #[error("resolution must be > 0 (got {width}x{height})")]
    InvalidResolution { width: i64, height: i64 },
    #[error("focal length must be finite and > 0 (got fx={fx}, fy={fy})")]
    InvalidFocalLength { fx: f64, fy: f64 },
    #[error("camera center must be finite (got cx={cx}, cy={cy})")]
    InvalidCameraCenter { cx: f64, cy: f64 },
    #[error("distortion coefficient k{index} is not finite")]
    InvalidDistortion { index: usize },
    #[error("skew must be 0 for the KB4 model (got {0})")]
    NonZeroSkew(f64),
}

/// Calibration as it appears on the wire.
///
/// Every field is optional so that a missing entry is reported as
/// [`CalibrationError::MissingField`] instead of a generic parse error.
/// Both `snake_case` and the `camelCase` names used by camera manifests
/// are accepted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    #[serde(default)]
    pub resolution: Option<[i64; 2]>,
    #[serde(default, alias = "focalLength")]
    pub focal_length: Option<[f64; 2]>,
    #[serde(default, alias = "cameraCenter")]
    pub camera_center: Option<[f64; 2]>,
    #[serde(default, alias = "kVals")]
    pub k_vals: Option<[f64; 4]>,
    #[serde(default)]
    pub skew: Option<f64>,
}

/// Immutable KB4 intrinsics.
///
/// Construction validates every field; an `Intrinsics` value is therefore
/// always usable by [`kb4::project`] / [`kb4::unproject`]. On camera switch
/// or resize, build a new value instead of mutating this one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CalibrationRecord", into = "CalibrationRecord")]
pub struct Intrinsics {
    resolution: RasterSize,
    focal_length: [f64; 2],
    camera_center: [f64; 2],
    k_vals: [f64; 4],
}

impl Intrinsics {
    /// Validate and create intrinsics.
    pub fn new(
        resolution: RasterSize,
        focal_length: [f64; 2],
        camera_center: [f64; 2],
        k_vals: [f64; 4],
        skew: f64,
    ) -> Result<Self, CalibrationError> {
        if resolution.is_empty() {
            return Err(CalibrationError::InvalidResolution {
                width: resolution.width as i64,
                height: resolution.height as i64,
            });
        }
        let [fx, fy] = focal_length;
        if !(fx.is_finite() && fy.is_finite() && fx > 0.0 && fy > 0.0) {
            return Err(CalibrationError::InvalidFocalLength { fx, fy });
        }
        let [cx, cy] = camera_center;
        if !(cx.is_finite() && cy.is_finite()) {
            return Err(CalibrationError::InvalidCameraCenter { cx, cy });
        }
        if let Some(index) = k_vals.iter().position(|k| !k.is_finite()) {
            return Err(CalibrationError::InvalidDistortion { index });
        }
        if skew != 0.0 {
            return Err(CalibrationError::NonZeroSkew(skew));
        }

        Ok(Self {
            resolution,
            focal_length,
            camera_center,
            k_vals,
        })
    }

    #[inline]
    pub fn resolution(&self) -> RasterSize {
        self.resolution
    }

    #[inline]
    pub fn focal_length(&self) -> [f64; 2] {
        self.focal_length
    }

    #[inline]
    pub fn camera_center(&self) -> [f64; 2] {
        self.camera_center
    }

    #[inline]
    pub fn k_vals(&self) -> [f64; 4] {
        self.k_vals
    }

    /// Always `0.0`; kept for symmetry with the calibration record.
    #[inline]
    pub fn skew(&self) -> f64 {
        0.0
    }

    /// Optical center as a pixel point.
    #[inline]
    pub fn center(&self) -> PixelPoint {
        Point2::new(self.camera_center[0], self.camera_center[1])
    }

    /// Forward KB4 mapping, see [`kb4::project`].
    #[inline]
    pub fn project(&self, cal: CalibratedPoint) -> PixelPoint {
        kb4::project(cal, self)
    }

    /// Inverse KB4 mapping, see [`kb4::unproject`].
    #[inline]
    pub fn unproject(&self, px: PixelPoint) -> CalibratedPoint {
        kb4::unproject(px, self)
    }

    /// Squared pixel distance between `px` and `project(unproject(px))`.
    ///
    /// This is the validity test used for both mask generation and click
    /// rejection. Non-finite intermediates yield a non-finite error.
    pub fn round_trip_sqr_error(&self, px: PixelPoint) -> f64 {
        let back = self.project(self.unproject(px));
        (back - px).norm_squared()
    }

    /// [`unproject`](Self::unproject), or `None` when the pixel does not
    /// survive the round trip within [`MAX_ROUND_TRIP_SQR_ERROR`].
    ///
    /// Past 90° from the optical axis the raw result is mirrored through
    /// the camera and can look like a plausible forward ray.
    pub fn unproject_checked(&self, px: PixelPoint) -> Option<CalibratedPoint> {
        let cal = self.unproject(px);
        if !(cal.x.is_finite() && cal.y.is_finite()) {
            return None;
        }
        let sqr_err = (self.project(cal) - px).norm_squared();
        (sqr_err <= MAX_ROUND_TRIP_SQR_ERROR).then_some(cal)
    }

    /// Intrinsics for the same lens imaged at a different resolution.
    ///
    /// Focal length and optical center scale per axis; distortion
    /// coefficients act on angles and stay unchanged.
    pub fn scaled_to(&self, size: RasterSize) -> Result<Self, CalibrationError> {
        let sx = size.width as f64 / self.resolution.width as f64;
        let sy = size.height as f64 / self.resolution.height as f64;
        Self::new(
            size,
            [self.focal_length[0] * sx, self.focal_length[1] * sy],
            [self.camera_center[0] * sx, self.camera_center[1] * sy],
            self.k_vals,
            0.0,
        )
    }
}

impl TryFrom<CalibrationRecord> for Intrinsics {
    type Error = CalibrationError;

    fn try_from(record: CalibrationRecord) -> Result<Self, Self::Error> {
        let [width, height] = record
            .resolution
            .ok_or(CalibrationError::MissingField("resolution"))?;
        let focal_length = record
            .focal_length
            .ok_or(CalibrationError::MissingField("focal_length"))?;
        let camera_center = record
            .camera_center
            .ok_or(CalibrationError::MissingField("camera_center"))?;
        let k_vals = record
            .k_vals
            .ok_or(CalibrationError::MissingField("k_vals"))?;
        let skew = record.skew.ok_or(CalibrationError::MissingField("skew"))?;

        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(CalibrationError::InvalidResolution { width, height });
        };

        Self::new(
            RasterSize::new(w, h),
            focal_length,
            camera_center,
            k_vals,
            skew,
        )
    }
}

impl From<Intrinsics> for CalibrationRecord {
    fn from(intrinsics: Intrinsics) -> Self {
        Self {
            resolution: Some([
                intrinsics.resolution.width as i64,
                intrinsics.resolution.height as i64,
            ]),
            focal_length: Some(intrinsics.focal_length),
            camera_center: Some(intrinsics.camera_center),
            k_vals: Some(intrinsics.k_vals),
            skew: Some(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CalibrationRecord {
        CalibrationRecord {
            resolution: Some([1280, 800]),
            focal_length: Some([500.0, 500.0]),
            camera_center: Some([640.0, 400.0]),
            k_vals: Some([0.0; 4]),
            skew: Some(0.0),
        }
    }

    #[test]
    fn valid_record_converts() {
        let intrinsics = Intrinsics::try_from(record()).expect("valid");
        assert_eq!(intrinsics.resolution(), RasterSize::new(1280, 800));
        assert_eq!(intrinsics.camera_center(), [640.0, 400.0]);
    }

    #[test]
    fn missing_fields_are_named() {
        let mut r = record();
        r.k_vals = None;
        assert_eq!(
            Intrinsics::try_from(r),
            Err(CalibrationError::MissingField("k_vals"))
        );

        let mut r = record();
        r.skew = None;
        assert_eq!(
            Intrinsics::try_from(r),
            Err(CalibrationError::MissingField("skew"))
        );
    }

    #[test]
    fn non_zero_skew_is_rejected() {
        let mut r = record();
        r.skew = Some(0.25);
        assert_eq!(
            Intrinsics::try_from(r),
            Err(CalibrationError::NonZeroSkew(0.25))
        );
    }

    #[test]
    fn non_positive_resolution_and_focal_length_are_rejected() {
        let mut r = record();
        r.resolution = Some([-1, 800]);
        assert!(matches!(
            Intrinsics::try_from(r),
            Err(CalibrationError::InvalidResolution { .. })
        ));

        let mut r = record();
        r.resolution = Some([0, 800]);
        assert!(matches!(
            Intrinsics::try_from(r),
            Err(CalibrationError::InvalidResolution { .. })
        ));

        let mut r = record();
        r.focal_length = Some([500.0, 0.0]);
        assert!(matches!(
            Intrinsics::try_from(r),
            Err(CalibrationError::InvalidFocalLength { .. })
        ));
    }

    #[test]
    fn non_finite_distortion_is_rejected() {
        let mut r = record();
        r.k_vals = Some([0.0, f64::NAN, 0.0, 0.0]);
        assert_eq!(
            Intrinsics::try_from(r),
            Err(CalibrationError::InvalidDistortion { index: 1 })
        );
    }

    #[test]
    fn scaled_to_halves_focal_and_center() {
        let intrinsics = Intrinsics::try_from(record()).expect("valid");
        let half = intrinsics
            .scaled_to(RasterSize::new(640, 400))
            .expect("valid");
        assert_eq!(half.focal_length(), [250.0, 250.0]);
        assert_eq!(half.camera_center(), [320.0, 200.0]);
        assert_eq!(half.k_vals(), intrinsics.k_vals());
    }

    #[test]
    fn checked_unproject_rejects_pixels_past_ninety_degrees() {
        // 220° lens: the top of the frame is ~94° off axis.
        let intrinsics = Intrinsics::new(
            RasterSize::new(800, 600),
            [180.0, 180.0],
            [400.0, 300.0],
            [0.0; 4],
            0.0,
        )
        .expect("valid");

        let sky = Point2::new(400.0, 5.0);
        assert!(intrinsics.unproject(sky).y > 0.0);
        assert!(intrinsics.unproject_checked(sky).is_none());

        let ground = Point2::new(400.0, 450.0);
        let cal = intrinsics.unproject_checked(ground).expect("inside field of view");
        assert_eq!(cal, intrinsics.unproject(ground));
        assert!(intrinsics.unproject_checked(Point2::new(f64::NAN, 0.0)).is_none());
    }

    #[test]
    fn camel_case_manifest_is_accepted() {
        let json = r#"{
            "resolution": [1280, 800],
            "focalLength": [500.0, 500.0],
            "cameraCenter": [640.0, 400.0],
            "kVals": [0.1, 0.0, 0.0, 0.0],
            "skew": 0.0
        }"#;
        let intrinsics: Intrinsics = serde_json::from_str(json).expect("parse");
        assert_eq!(intrinsics.k_vals(), [0.1, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn serde_reports_validation_failure() {
        let json = r#"{
            "resolution": [1280, 800],
            "focal_length": [500.0, 500.0],
            "camera_center": [640.0, 400.0],
            "k_vals": [0.0, 0.0, 0.0, 0.0],
            "skew": 1.0
        }"#;
        let err = serde_json::from_str::<Intrinsics>(json).expect_err("skew");
        assert!(err.to_string().contains("skew"));
    }
}
