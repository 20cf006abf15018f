use approx::assert_relative_eq;
use fisheye_core::{
    load_intrinsics_json, scale_canvas_to_image, scale_image_to_canvas, CalibrationError,
    CalibrationIoError, Intrinsics, RasterSize,
};
use nalgebra::Point2;

const FISHEYE_JSON: &str = r#"{
    "resolution": [848, 800],
    "focalLength": [285.7, 286.1],
    "cameraCenter": [419.6, 403.2],
    "kVals": [-0.0084, 0.0433, -0.0406, 0.0083],
    "skew": 0.0
}"#;

fn pinhole() -> Intrinsics {
    Intrinsics::new(
        RasterSize::new(1280, 800),
        [500.0, 500.0],
        [640.0, 400.0],
        [0.0; 4],
        0.0,
    )
    .expect("valid calibration")
}

#[test]
fn optical_center_round_trips_through_both_directions() {
    let intrinsics = pinhole();
    let px = intrinsics.project(Point2::new(0.0, 0.0));
    assert_eq!(px, Point2::new(640.0, 400.0));

    let cal = intrinsics.unproject(Point2::new(640.0, 400.0));
    assert_eq!(cal, Point2::new(0.0, 0.0));
}

#[test]
fn loads_camel_case_calibration_and_round_trips_pixels() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("front.json");
    std::fs::write(&path, FISHEYE_JSON).expect("write calibration");

    let intrinsics = load_intrinsics_json(&path).expect("load calibration");
    assert_eq!(intrinsics.resolution(), RasterSize::new(848, 800));

    for px in [
        Point2::new(419.6, 403.2),
        Point2::new(300.0, 500.0),
        Point2::new(600.0, 250.0),
        Point2::new(200.0, 200.0),
    ] {
        let back = intrinsics.project(intrinsics.unproject(px));
        assert_relative_eq!(back.x, px.x, epsilon = 1e-4);
        assert_relative_eq!(back.y, px.y, epsilon = 1e-4);
    }
}

#[test]
fn rejects_skewed_calibration_on_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("skewed.json");
    std::fs::write(&path, FISHEYE_JSON.replace("\"skew\": 0.0", "\"skew\": 0.25"))
        .expect("write calibration");

    match load_intrinsics_json(&path) {
        Err(CalibrationIoError::Calibration(CalibrationError::NonZeroSkew(s))) => {
            assert_eq!(s, 0.25)
        }
        other => panic!("expected skew rejection, got {other:?}"),
    }
}

#[test]
fn canvas_scaling_is_invertible_and_maps_corners() {
    let image = RasterSize::new(1280, 800);
    let canvas = RasterSize::new(64, 48);

    let corner = scale_image_to_canvas(Point2::new(1280.0, 800.0), image, canvas);
    assert_eq!(corner, Point2::new(64.0, 48.0));

    let p = Point2::new(913.25, 77.5);
    let back = scale_canvas_to_image(scale_image_to_canvas(p, image, canvas), image, canvas);
    assert_relative_eq!(back.x, p.x, epsilon = 1e-9);
    assert_relative_eq!(back.y, p.y, epsilon = 1e-9);
}

#[test]
fn resized_intrinsics_agree_with_canvas_scaling() {
    let intrinsics = pinhole();
    let half = intrinsics
        .scaled_to(RasterSize::new(640, 400))
        .expect("valid resize");

    let cal = Point2::new(0.3, -0.2);
    let full_px = intrinsics.project(cal);
    let half_px = half.project(cal);
    let expected = scale_image_to_canvas(full_px, intrinsics.resolution(), half.resolution());
    assert_relative_eq!(half_px.x, expected.x, epsilon = 1e-9);
    assert_relative_eq!(half_px.y, expected.y, epsilon = 1e-9);
}
