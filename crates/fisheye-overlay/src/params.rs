use serde::{Deserialize, Serialize};

/// Configuration for arc-mode and straight trajectory rails.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcParams {
    /// Camera height above the ground plane, meters.
    pub camera_height: f64,
    /// Half the vehicle width; offset of the side rails from the center rail.
    pub half_width: f64,
    /// Samples per rail, endpoints included.
    pub samples: usize,
}

impl Default for ArcParams {
    fn default() -> Self {
        Self {
            camera_height: 1.0,
            half_width: 0.3,
            samples: 100,
        }
    }
}

/// Configuration for point-and-go footprints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintParams {
    pub camera_height: f64,
    /// Footprint extent across the heading, meters.
    pub width: f64,
    /// Footprint extent along the heading, meters.
    pub length: f64,
    /// How far the heading triangle reaches past the front edge.
    pub heading_length: f64,
    pub samples_per_edge: usize,
    /// Targets with `|x|` beyond this are not drawn.
    pub world_x_max: f64,
    /// Targets farther than this are not drawn.
    pub z_max: f64,
}

impl Default for FootprintParams {
    fn default() -> Self {
        Self {
            camera_height: 1.0,
            width: 0.6,
            length: 1.0,
            heading_length: 0.3,
            samples_per_edge: 10,
            world_x_max: 5.0,
            z_max: 10.0,
        }
    }
}
