#![cfg(feature = "cli")]

use assert_cmd::Command;
use dna_fibers::io::{FiberDetectConfig, FiberDetectReport};
use dna_fibers::Segment;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn dna_fibers_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dna-fibers"))
}

/// 128x128 skeleton with one vertical fiber at x = 30, y 10..=110.
fn write_skeleton(dir: &Path) -> std::path::PathBuf {
    let mut img = image::GrayImage::new(128, 128);
    for y in 10..=110 {
        img.put_pixel(30, y, image::Luma([255]));
    }
    let path = dir.join("skeleton.png");
    img.save(&path).expect("save png");
    path
}

#[test]
fn help_lists_subcommands() {
    dna_fibers_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("detect"))
        .stdout(predicate::str::contains("default-config"));
}

#[test]
fn default_config_is_valid_json() {
    let out = dna_fibers_cmd()
        .args(["default-config", "--image", "x.png"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let cfg: FiberDetectConfig = serde_json::from_slice(&out).expect("config json");
    assert_eq!(cfg, FiberDetectConfig::new("x.png"));
}

#[test]
fn run_writes_report() {
    let dir = TempDir::new().expect("tempdir");
    let image_path = write_skeleton(dir.path());
    let report_path = dir.path().join("report.json");

    let mut cfg = FiberDetectConfig::new(image_path.to_string_lossy());
    cfg.output_path = Some(report_path.to_string_lossy().into_owned());
    cfg.params.hough.num_samples = 300;
    let cfg_path = dir.path().join("config.json");
    cfg.write_json(&cfg_path).expect("write config");

    dna_fibers_cmd()
        .args(["--log-level", "warn", "run"])
        .arg(&cfg_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("segments: 1"));

    let report = FiberDetectReport::load_json(&report_path).expect("report");
    assert!(report.error.is_none());
    assert_eq!((report.width, report.height), (128, 128));
    assert_eq!(report.num_foreground, 101);
    assert_eq!(report.peaks.len(), 1);
    assert_eq!(
        report.segments,
        vec![Segment::new(
            dna_fibers::ImagePoint::new(30, 10),
            dna_fibers::ImagePoint::new(30, 110)
        )]
    );
}

#[test]
fn detect_with_invalid_parameter_reports_error() {
    let dir = TempDir::new().expect("tempdir");
    let image_path = write_skeleton(dir.path());
    let report_path = dir.path().join("bad.json");

    dna_fibers_cmd()
        .arg("detect")
        .arg("--image")
        .arg(&image_path)
        .arg("--out")
        .arg(&report_path)
        .args(["--selection", "1.5"])
        .assert()
        .failure();

    let report = FiberDetectReport::load_json(&report_path).expect("report");
    let error = report.error.expect("error recorded");
    assert!(error.contains("selection.selection_sensitivity"), "{error}");
}

#[test]
fn malformed_roi_is_rejected_by_the_parser() {
    dna_fibers_cmd()
        .args(["detect", "--image", "a.png", "--out", "b.json", "--roi", "1,2,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ROI"));
}
