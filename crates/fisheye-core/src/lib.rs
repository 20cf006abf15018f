//! Core types and transforms for a Kannala-Brandt (KB4) fisheye camera.
//!
//! Purely geometric helpers converting between three coordinate spaces:
//!
//! - raw **pixel** space of the calibrated image,
//! - the undistorted **calibrated** plane (camera rays with `z` normalized out),
//! - metric **camera space** (handled by `fisheye-overlay` on top of this crate).
//!
//! Everything here is a pure function of its inputs; there is no global state
//! apart from the optional stderr logger installed by binaries.
//!
//! ```
//! use fisheye_core::{Intrinsics, RasterSize};
//! use nalgebra::Point2;
//!
//! let intrinsics = Intrinsics::new(
//!     RasterSize::new(1280, 800),
//!     [500.0, 500.0],
//!     [640.0, 400.0],
//!     [0.0; 4],
//!     0.0,
//! )
//! .unwrap();
//!
//! let px = intrinsics.project(Point2::new(0.0, 0.0));
//! assert_eq!((px.x, px.y), (640.0, 400.0));
//! ```

mod extrinsics;
mod intrinsics;
mod io;
mod kb4;
mod logger;
mod point;
mod scaling;

pub use extrinsics::{Extrinsics, ExtrinsicsError, ExtrinsicsRecord, Rotation};
pub use intrinsics::{
    CalibrationError, CalibrationRecord, Intrinsics, MAX_ROUND_TRIP_SQR_ERROR,
};
pub use io::{load_intrinsics_json, CalibrationIoError};
pub use kb4::{distorted_radius, project, unproject, NEWTON_ITERATIONS};
pub use point::{CalibratedPoint, CameraSpacePoint, PixelPoint, RasterSize};
pub use scaling::{
    percentage_from_range, scale_canvas_to_image, scale_image_to_canvas, scale_point_range,
    scale_range, value_from_percentage,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
