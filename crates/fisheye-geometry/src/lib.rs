//! High-level facade for the `fisheye-*` workspace.
//!
//! This crate provides:
//! - re-exports of the underlying crates under short module names,
//! - (feature `image`) conversion of validity masks into grayscale images,
//! - (feature `cli`) the `fisheye-geometry` command line tool.
//!
//! ## Quickstart
//!
//! ```no_run
//! use fisheye_geometry::{build_calibrated_plane, load_intrinsics_json, RasterSize};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let intrinsics = load_intrinsics_json("front_camera.json")?;
//! let plane = build_calibrated_plane(&intrinsics, RasterSize::new(640, 400), 1.0)?;
//! println!("bounds: {:?}", plane.bounds);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `fisheye_geometry::core`: intrinsics, extrinsics, KB4 projection, scaling.
//! - `fisheye_geometry::plane`: calibrated-plane bounds, validity mask, render mesh.
//! - `fisheye_geometry::overlay`: arc-mode rails and point-and-go footprints.
//! - `fisheye_geometry::mask_image` (feature `image`): mask to `image::GrayImage`.

pub use fisheye_core as core;
pub use fisheye_overlay as overlay;
pub use fisheye_plane as plane;

pub use fisheye_core::{
    load_intrinsics_json, project, scale_canvas_to_image, scale_image_to_canvas, unproject,
    CalibratedPoint, CalibrationError, CameraSpacePoint, Extrinsics, Intrinsics, PixelPoint,
    RasterSize,
};
pub use fisheye_overlay::{
    generate_arc_samples, generate_footprint, ArcParams, Footprint, FootprintParams,
    TrajectoryRails,
};
pub use fisheye_plane::{
    build_calibrated_plane, CalibratedPlane, CalibratedPlaneBounds, CalibratedPlaneBuilder,
    DistortionMesh, PlaneBuilderParams, PlaneError, ValidPixelMask,
};

#[cfg(feature = "image")]
pub mod mask_image;
