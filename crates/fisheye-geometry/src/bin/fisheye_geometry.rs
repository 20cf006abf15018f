use std::{error::Error, fs, path::Path, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use nalgebra::Point2;
use serde::Serialize;

use fisheye_geometry::mask_image::write_mask_image;
use fisheye_geometry::overlay::generate_straight_samples;
use fisheye_geometry::plane::MaskTexel;
use fisheye_geometry::{
    generate_arc_samples, generate_footprint, load_intrinsics_json, ArcParams,
    CalibratedPlaneBounds, CalibratedPlaneBuilder, DistortionMesh, FootprintParams, Intrinsics,
    PlaneBuilderParams, RasterSize,
};

#[cfg(not(feature = "tracing"))]
use log::LevelFilter;
use log::info;

/// Geometry tools for KB4 fisheye cameras.
#[derive(Debug, Parser)]
#[command(author, version, about = "KB4 fisheye projection, masks and ground overlays")]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON log lines (with the `tracing` feature).
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calibrated point -> image pixel.
    Project {
        #[command(flatten)]
        camera: CameraArgs,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Image pixel -> calibrated point.
    Unproject {
        #[command(flatten)]
        camera: CameraArgs,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Calibrated-plane bounds and validity mask for an output raster.
    Plane {
        #[command(flatten)]
        camera: CameraArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// JSON `PlaneBuilderParams`; flags below override it.
        #[arg(long)]
        params: Option<PathBuf>,
        #[arg(long)]
        zoom: Option<f64>,
        #[arg(long)]
        workers: Option<usize>,
        /// Write the mask as an image (format from extension).
        #[arg(long)]
        mask: Option<PathBuf>,
        /// Also build a render mesh of `COLSxROWS` cells.
        #[arg(long, value_parser = parse_size)]
        mesh: Option<RasterSize>,
    },
    /// Arc-mode rails for a click on the output raster.
    Arc {
        #[command(flatten)]
        camera: CameraArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// JSON `ArcParams`.
        #[arg(long)]
        params: Option<PathBuf>,
        /// Draw straight rails regardless of the click's lateral offset.
        #[arg(long)]
        straight: bool,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Point-and-go footprint for a click on the output raster.
    Footprint {
        #[command(flatten)]
        camera: CameraArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// JSON `FootprintParams`.
        #[arg(long)]
        params: Option<PathBuf>,
        /// Heading in radians.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        theta: f64,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
}

#[derive(Debug, Args)]
struct CameraArgs {
    /// Calibration JSON file.
    #[arg(short, long)]
    calibration: PathBuf,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Output raster as `WIDTHxHEIGHT`; defaults to the calibrated resolution.
    #[arg(long, value_parser = parse_size)]
    size: Option<RasterSize>,
}

impl OutputArgs {
    fn resolve(&self, intrinsics: &Intrinsics) -> RasterSize {
        self.size.unwrap_or_else(|| intrinsics.resolution())
    }
}

fn parse_size(s: &str) -> Result<RasterSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid dimension `{v}`: {e}"))
    };
    Ok(RasterSize::new(parse(w)?, parse(h)?))
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn load_params<T: serde::de::DeserializeOwned + Default>(
    path: Option<&Path>,
) -> Result<T, Box<dyn Error>> {
    match path {
        Some(p) => load_json_file(p),
        None => Ok(T::default()),
    }
}

#[derive(Debug, Serialize)]
struct MaskCounts {
    valid: usize,
    dead_zone: usize,
    invalid: usize,
}

#[derive(Debug, Serialize)]
struct MeshSummary {
    cols: usize,
    rows: usize,
    valid_cells: usize,
}

#[derive(Debug, Serialize)]
struct PlaneReport {
    output: RasterSize,
    zoom: f64,
    bounds: CalibratedPlaneBounds,
    texels: MaskCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    mesh: Option<MeshSummary>,
}

#[derive(Debug, Serialize)]
struct PointReport {
    input: [f64; 2],
    output: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    round_trip_sqr_error: Option<f64>,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, Box<dyn Error>> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
fn run(command: Command) -> Result<String, Box<dyn Error>> {
    match command {
        Command::Project { camera, x, y } => {
            let intrinsics = load_intrinsics_json(&camera.calibration)?;
            let px = intrinsics.project(Point2::new(x, y));
            to_json(&PointReport {
                input: [x, y],
                output: [px.x, px.y],
                round_trip_sqr_error: None,
            })
        }
        Command::Unproject { camera, x, y } => {
            let intrinsics = load_intrinsics_json(&camera.calibration)?;
            let px = Point2::new(x, y);
            let cal = intrinsics.unproject(px);
            to_json(&PointReport {
                input: [x, y],
                output: [cal.x, cal.y],
                round_trip_sqr_error: Some(intrinsics.round_trip_sqr_error(px)),
            })
        }
        Command::Plane {
            camera,
            output,
            params,
            zoom,
            workers,
            mask,
            mesh,
        } => {
            let intrinsics = load_intrinsics_json(&camera.calibration)?;
            let output = output.resolve(&intrinsics);
            let mut params: PlaneBuilderParams = load_params(params.as_deref())?;
            if let Some(zoom) = zoom {
                params.zoom = zoom;
            }
            if let Some(workers) = workers {
                params = params.with_workers(workers);
            }

            let plane = CalibratedPlaneBuilder::new(params.clone()).build(&intrinsics, output)?;
            info!(
                "built {}x{} calibrated plane (zoom {})",
                output.width, output.height, params.zoom
            );
            if let Some(path) = &mask {
                write_mask_image(&plane.mask, path)?;
                info!("mask written to {}", path.display());
            }
            let mesh = match mesh {
                Some(grid) => {
                    let m = DistortionMesh::build(
                        &plane,
                        &intrinsics,
                        grid.width as usize,
                        grid.height as usize,
                    )?;
                    Some(MeshSummary {
                        cols: m.cols,
                        rows: m.rows,
                        valid_cells: m.valid_cells,
                    })
                }
                None => None,
            };

            to_json(&PlaneReport {
                output,
                zoom: params.zoom,
                bounds: plane.bounds,
                texels: MaskCounts {
                    valid: plane.mask.count(MaskTexel::Valid),
                    dead_zone: plane.mask.count(MaskTexel::DeadZone),
                    invalid: plane.mask.count(MaskTexel::Invalid),
                },
                mesh,
            })
        }
        Command::Arc {
            camera,
            output,
            params,
            straight,
            x,
            y,
        } => {
            let intrinsics = load_intrinsics_json(&camera.calibration)?;
            let output = output.resolve(&intrinsics);
            let params: ArcParams = load_params(params.as_deref())?;
            let pixel = Point2::new(x, y);
            let rails = if straight {
                generate_straight_samples(pixel, &intrinsics, output, &params)
            } else {
                generate_arc_samples(pixel, &intrinsics, output, &params)
            };
            to_json(&rails)
        }
        Command::Footprint {
            camera,
            output,
            params,
            theta,
            x,
            y,
        } => {
            let intrinsics = load_intrinsics_json(&camera.calibration)?;
            let output = output.resolve(&intrinsics);
            let params: FootprintParams = load_params(params.as_deref())?;
            let footprint =
                generate_footprint(Point2::new(x, y), theta, &intrinsics, output, &params);
            to_json(&footprint)
        }
    }
}

fn init_logging(verbose: bool, json: bool) -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "tracing")]
    {
        let _ = verbose;
        // The subscriber installs the log bridge itself when it can; the
        // explicit call covers builds where it does not.
        fisheye_geometry::core::init_tracing(json);
        let _ = tracing_log::LogTracer::init();
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = json;
        let level = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        };
        fisheye_geometry::core::init_with_level(level)?;
    }
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_log)?;
    let json = run(cli.command)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("640x400"), Ok(RasterSize::new(640, 400)));
        assert_eq!(parse_size("64X48"), Ok(RasterSize::new(64, 48)));
        assert!(parse_size("640").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
