use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const PINHOLE_JSON: &str = r#"{
    "resolution": [1280, 800],
    "focal_length": [500.0, 500.0],
    "camera_center": [640.0, 400.0],
    "k_vals": [0.0, 0.0, 0.0, 0.0],
    "skew": 0.0
}"#;

fn write_calibration(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("calibration.json");
    fs::write(&path, json).expect("write calibration");
    path
}

fn cli() -> Command {
    Command::cargo_bin("fisheye-geometry").expect("binary built")
}

fn stdout_json(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).expect("stdout is JSON")
}

#[test]
fn project_and_unproject_optical_center() {
    let dir = tempfile::tempdir().expect("tempdir");
    let calib = write_calibration(dir.path(), PINHOLE_JSON);

    let projected = stdout_json(cli().arg("project").arg("-c").arg(&calib).args(["0", "0"]));
    assert_eq!(projected["output"], serde_json::json!([640.0, 400.0]));

    let unprojected =
        stdout_json(cli().arg("unproject").arg("-c").arg(&calib).args(["640", "400"]));
    assert_eq!(unprojected["output"], serde_json::json!([0.0, 0.0]));
    assert_eq!(unprojected["round_trip_sqr_error"], serde_json::json!(0.0));
}

#[test]
fn plane_writes_mask_and_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let calib = write_calibration(dir.path(), PINHOLE_JSON);
    let mask = dir.path().join("mask.png");

    let report = stdout_json(
        cli()
            .arg("plane")
            .arg("-c")
            .arg(&calib)
            .args(["--size", "64x48", "--workers", "2", "--mesh", "8x6"])
            .arg("--mask")
            .arg(&mask),
    );

    assert_eq!(report["texels"]["invalid"], 0);
    assert_eq!(report["texels"]["valid"], 64 * 48);
    assert_eq!(report["mesh"]["valid_cells"], 48);
    assert!(mask.exists());
}

#[test]
fn arc_above_horizon_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let calib = write_calibration(dir.path(), PINHOLE_JSON);

    let rails = stdout_json(cli().arg("arc").arg("-c").arg(&calib).args(["640", "100"]));
    assert_eq!(rails["center"], serde_json::json!([]));

    let rails = stdout_json(cli().arg("arc").arg("-c").arg(&calib).args(["900", "600"]));
    assert_eq!(rails["center"].as_array().map(Vec::len), Some(99));
}

#[test]
fn footprint_accepts_negative_heading() {
    let dir = tempfile::tempdir().expect("tempdir");
    let calib = write_calibration(dir.path(), PINHOLE_JSON);

    let fp = stdout_json(
        cli()
            .arg("footprint")
            .arg("-c")
            .arg(&calib)
            .args(["--theta", "-0.5", "640", "600"]),
    );
    assert_eq!(fp["outline"].as_array().map(Vec::len), Some(40));
}

#[test]
fn invalid_calibration_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let skewed = PINHOLE_JSON.replace("\"skew\": 0.0", "\"skew\": 1.0");
    let calib = write_calibration(dir.path(), &skewed);

    cli()
        .arg("project")
        .arg("-c")
        .arg(&calib)
        .args(["0", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("skew"));
}
