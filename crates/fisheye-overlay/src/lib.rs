//! Ground-plane overlays for a fisheye camera.
//!
//! Given a click on the (possibly resized) video raster, these functions
//! produce what an operator UI draws on top of the feed:
//!
//! - arc mode ([`generate_arc_samples`]): center and side rails of the
//!   constant-curvature path to the clicked ground point;
//! - point-and-go ([`generate_footprint`]): the vehicle footprint and a
//!   heading marker at the clicked point.
//!
//! Everything is pure and single-threaded; degenerate clicks (sky, horizon,
//! out of range) return empty results instead of errors.

mod arc;
mod footprint;
mod ground;
mod params;

pub use arc::{
    generate_arc_samples, generate_straight_samples, straight_rails_calibrated, turning_radius,
    ArcPath, TrajectoryRails, TurnDirection,
};
pub use footprint::{footprint_ground_polygon, generate_footprint, Footprint};
pub use ground::{calibrated_point_to_camera_point, camera_point_to_calibrated, pixel_to_ground};
pub use params::{ArcParams, FootprintParams};
