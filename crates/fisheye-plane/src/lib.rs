//! Calibrated-plane bounds, validity mask and render mesh.
//!
//! The expensive part of fisheye display: every output texel is pushed
//! through an unproject/project round trip on a fixed worker pool to find
//! where the lens model can be trusted. The result is rebuilt on calibration
//! or output-size changes only.
//!
//! - [`CalibratedPlaneBuilder`] / [`build_calibrated_plane`] produce a
//!   [`CalibratedPlane`]: the bounding rectangle in calibrated space plus a
//!   [`ValidPixelMask`].
//! - [`DistortionMesh`] turns a plane into a clipped triangle mesh for
//!   drawing an undistorted render through the lens.

mod bounds;
mod builder;
mod error;
mod mask;
mod mesh;
mod params;
mod pool;

pub use bounds::CalibratedPlaneBounds;
pub use builder::{build_calibrated_plane, CalibratedPlane, CalibratedPlaneBuilder};
pub use error::PlaneError;
pub use mask::{MaskTexel, ValidPixelMask};
pub use mesh::{DistortionMesh, MeshVertex};
pub use params::{PlaneBuilderParams, DEFAULT_BOUNDS_THRESHOLD, DEFAULT_MASK_THRESHOLD};
pub use pool::default_worker_count;
