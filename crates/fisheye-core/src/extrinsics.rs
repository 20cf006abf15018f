//! Rigid transforms between named coordinate frames.

use nalgebra::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExtrinsicsError {
    #[error("rotation must be finite with a non-zero quaternion norm")]
    InvalidRotation,
    #[error("translation must be finite")]
    InvalidTranslation,
    #[error("cannot chain `{first_from}->{first_to}` with `{second_from}->{second_to}`")]
    FrameMismatch {
        first_from: String,
        first_to: String,
        second_from: String,
        second_to: String,
    },
}

/// Rotation as stored in calibration files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// `[w, x, y, z]`, normalized on load.
    Quaternion([f64; 4]),
    /// Axis-angle vector; direction is the axis, norm the angle in radians.
    Rodrigues([f64; 3]),
}

impl Rotation {
    fn to_unit(self) -> Result<UnitQuaternion<f64>, ExtrinsicsError> {
        match self {
            Rotation::Quaternion([w, x, y, z]) => {
                let q = Quaternion::new(w, x, y, z);
                let norm = q.norm();
                if !norm.is_finite() || norm < 1e-12 {
                    return Err(ExtrinsicsError::InvalidRotation);
                }
                Ok(UnitQuaternion::from_quaternion(q))
            }
            Rotation::Rodrigues(v) => {
                let v = Vector3::from(v);
                if !v.iter().all(|c| c.is_finite()) {
                    return Err(ExtrinsicsError::InvalidRotation);
                }
                Ok(UnitQuaternion::from_scaled_axis(v))
            }
        }
    }
}

/// Wire form of [`Extrinsics`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtrinsicsRecord {
    pub from: String,
    pub to: String,
    pub rotation: Rotation,
    pub translation: [f64; 3],
}

/// Pose of frame `from` expressed in frame `to`: `p_to = R * p_from + t`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExtrinsicsRecord", into = "ExtrinsicsRecord")]
pub struct Extrinsics {
    from: String,
    to: String,
    pose: Isometry3<f64>,
}

impl Extrinsics {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        rotation: Rotation,
        translation: [f64; 3],
    ) -> Result<Self, ExtrinsicsError> {
        let rotation = rotation.to_unit()?;
        if !translation.iter().all(|c| c.is_finite()) {
            return Err(ExtrinsicsError::InvalidTranslation);
        }
        Ok(Self::from_isometry(
            from,
            to,
            Isometry3::from_parts(Translation3::from(Vector3::from(translation)), rotation),
        ))
    }

    pub fn from_isometry(
        from: impl Into<String>,
        to: impl Into<String>,
        pose: Isometry3<f64>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            pose,
        }
    }

    pub fn identity(frame: impl Into<String>) -> Self {
        let frame = frame.into();
        Self::from_isometry(frame.clone(), frame, Isometry3::identity())
    }

    #[inline]
    pub fn from_frame(&self) -> &str {
        &self.from
    }

    #[inline]
    pub fn to_frame(&self) -> &str {
        &self.to
    }

    #[inline]
    pub fn isometry(&self) -> &Isometry3<f64> {
        &self.pose
    }

    #[inline]
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.pose.rotation
    }

    #[inline]
    pub fn translation(&self) -> Vector3<f64> {
        self.pose.translation.vector
    }

    /// Map a point from `from` coordinates into `to` coordinates.
    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.pose.transform_point(p)
    }

    /// The reverse transform, `to -> from`.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            pose: self.pose.inverse(),
        }
    }

    /// Compose `self: a -> b` with `next: b -> c` into `a -> c`.
    pub fn then(&self, next: &Extrinsics) -> Result<Extrinsics, ExtrinsicsError> {
        if self.to != next.from {
            return Err(ExtrinsicsError::FrameMismatch {
                first_from: self.from.clone(),
                first_to: self.to.clone(),
                second_from: next.from.clone(),
                second_to: next.to.clone(),
            });
        }
        Ok(Self {
            from: self.from.clone(),
            to: next.to.clone(),
            pose: next.pose * self.pose,
        })
    }
}

impl TryFrom<ExtrinsicsRecord> for Extrinsics {
    type Error = ExtrinsicsError;

    fn try_from(record: ExtrinsicsRecord) -> Result<Self, Self::Error> {
        Self::new(record.from, record.to, record.rotation, record.translation)
    }
}

impl From<Extrinsics> for ExtrinsicsRecord {
    fn from(e: Extrinsics) -> Self {
        let q = e.pose.rotation.into_inner();
        let t = e.pose.translation.vector;
        Self {
            from: e.from,
            to: e.to,
            rotation: Rotation::Quaternion([q.w, q.i, q.j, q.k]),
            translation: [t.x, t.y, t.z],
        }
    }
}
