//! Build a mask for a calibration file and print the arc and footprint
//! previews for one click.
//!
//! ```text
//! cargo run -p fisheye-geometry --example overlay_preview -- calib.json 900 600
//! ```

use std::env;

use fisheye_geometry::mask_image::write_mask_image;
use fisheye_geometry::{
    build_calibrated_plane, generate_arc_samples, generate_footprint, load_intrinsics_json,
    ArcParams, FootprintParams, RasterSize,
};
use nalgebra::Point2;

#[cfg(not(feature = "tracing"))]
use log::{info, LevelFilter};
#[cfg(feature = "tracing")]
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "tracing"))]
    fisheye_geometry::core::init_with_level(LevelFilter::Debug)?;
    #[cfg(feature = "tracing")]
    fisheye_geometry::core::init_tracing(false);

    let args: Vec<String> = env::args().skip(1).collect();
    let [path, x, y] = args.as_slice() else {
        return Err("usage: overlay_preview <calibration.json> <x> <y>".into());
    };
    let click = Point2::new(x.parse::<f64>()?, y.parse::<f64>()?);

    let intrinsics = load_intrinsics_json(path)?;
    let output = RasterSize::new(
        intrinsics.resolution().width / 2,
        intrinsics.resolution().height / 2,
    );
    let plane = build_calibrated_plane(&intrinsics, output, 1.0)?;
    write_mask_image(&plane.mask, "mask.png")?;
    info!("mask.png written, bounds {:?}", plane.bounds);

    let canvas_click = Point2::new(click.x / 2.0, click.y / 2.0);
    if !plane.contains_pixel(canvas_click) {
        info!("click is outside the usable field of view");
        return Ok(());
    }

    let rails = generate_arc_samples(canvas_click, &intrinsics, output, &ArcParams::default());
    info!("arc: {} points", rails.len());
    let footprint = generate_footprint(
        canvas_click,
        0.0,
        &intrinsics,
        output,
        &FootprintParams::default(),
    );
    println!("{}", serde_json::to_string_pretty(&footprint)?);
    Ok(())
}
