//! JSON configuration and report helpers for fiber detection.

use std::fs;
use std::path::{Path, PathBuf};

use dna_fibers_core::{Roi, Segment};
use serde::{Deserialize, Serialize};

use crate::{FiberDetectError, FiberDetection, FiberDetector, FiberDetectorParams, PeakCandidate};

#[derive(thiserror::Error, Debug)]
pub enum FiberIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration of one detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberDetectConfig {
    /// Binary skeleton image; any non-zero pixel is foreground.
    pub image_path: String,
    #[serde(default)]
    pub roi: Option<Roi>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub params: FiberDetectorParams,
}

impl FiberDetectConfig {
    pub fn new(image_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            roi: None,
            output_path: None,
            params: FiberDetectorParams::default(),
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, FiberIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), FiberIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("dna_fibers_report.json"))
    }

    /// Build a detector from the config parameters.
    pub fn build_detector(&self) -> Result<FiberDetector, FiberDetectError> {
        FiberDetector::new(self.params.clone())
    }
}

/// Detection report written next to (or instead of) an image overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberDetectReport {
    pub image_path: String,
    pub config_path: String,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub roi: Option<Roi>,
    #[serde(default)]
    pub num_foreground: usize,
    #[serde(default)]
    pub num_hough_points: usize,
    #[serde(default)]
    pub num_replicated: usize,
    #[serde(default)]
    pub num_modes: usize,
    #[serde(default)]
    pub peaks: Vec<PeakCandidate>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FiberDetectReport {
    /// Build a base report for `cfg` and an image of the given size.
    pub fn new(cfg: &FiberDetectConfig, config_path: &Path, width: usize, height: usize) -> Self {
        Self {
            image_path: cfg.image_path.clone(),
            config_path: config_path.to_string_lossy().into_owned(),
            width,
            height,
            roi: cfg.roi,
            num_foreground: 0,
            num_hough_points: 0,
            num_replicated: 0,
            num_modes: 0,
            peaks: Vec::new(),
            segments: Vec::new(),
            error: None,
        }
    }

    /// Populate report fields from a successful detection.
    pub fn set_detection(&mut self, res: FiberDetection) {
        self.roi = Some(res.roi);
        self.num_foreground = res.num_foreground;
        self.num_hough_points = res.num_hough_points;
        self.num_replicated = res.num_replicated;
        self.num_modes = res.num_modes;
        self.peaks = res.peaks;
        self.segments = res.segments;
        self.error = None;
    }

    /// Record a detection error.
    pub fn set_error(&mut self, err: &FiberDetectError) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, FiberIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), FiberIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let cfg: FiberDetectConfig =
            serde_json::from_str(r#"{"image_path": "fibers.png"}"#).expect("parse");
        assert_eq!(cfg, FiberDetectConfig::new("fibers.png"));
        assert_eq!(cfg.output_path(), PathBuf::from("dna_fibers_report.json"));
    }

    #[test]
    fn partial_params_override_only_named_fields() {
        let cfg: FiberDetectConfig = serde_json::from_str(
            r#"{
                "image_path": "a.png",
                "roi": {"x": 1, "y": 2, "width": 30, "height": 40},
                "params": {
                    "hough": {"num_samples": 200},
                    "segments": {"min_length": 12.5},
                    "threads": 2
                }
            }"#,
        )
        .expect("parse");
        assert_eq!(cfg.roi, Some(Roi::new(1, 2, 30, 40)));
        assert_eq!(cfg.params.hough.num_samples, 200);
        assert_eq!(cfg.params.hough.window_size, 25);
        assert_eq!(cfg.params.segments.min_length, 12.5);
        assert_eq!(cfg.params.segments.max_gap, 30.0);
        assert_eq!(cfg.params.threads, Some(2));
        assert_eq!(cfg.params.selection.selection_sensitivity, 0.33);
    }

    #[test]
    fn config_and_report_survive_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("cfg.json");
        let mut cfg = FiberDetectConfig::new("img.png");
        cfg.output_path = Some("out.json".to_string());
        cfg.write_json(&cfg_path).expect("write config");
        assert_eq!(FiberDetectConfig::load_json(&cfg_path).expect("load config"), cfg);

        let mut report = FiberDetectReport::new(&cfg, &cfg_path, 64, 32);
        report.set_error(&FiberDetectError::InvalidParameter {
            name: "threads",
            reason: "zero".to_string(),
        });
        let report_path = dir.path().join(cfg.output_path());
        report.write_json(&report_path).expect("write report");
        let back = FiberDetectReport::load_json(&report_path).expect("load report");
        assert_eq!(back, report);
        assert!(back.error.as_deref().is_some_and(|e| e.contains("threads")));
    }

    #[test]
    fn report_keeps_every_stage_count() {
        let cfg = FiberDetectConfig::new("img.png");
        let mut report = FiberDetectReport::new(&cfg, Path::new("cfg.json"), 64, 64);
        report.set_detection(FiberDetection {
            roi: Roi::new(0, 0, 64, 64),
            origin: dna_fibers_core::ImagePoint::new(32, 32),
            num_foreground: 90,
            num_hough_points: 40,
            num_replicated: 52,
            num_modes: 3,
            peaks: Vec::new(),
            segments: Vec::new(),
        });
        assert_eq!(report.num_foreground, 90);
        assert_eq!(report.num_hough_points, 40);
        assert_eq!(report.num_replicated, 52);
        assert_eq!(report.num_modes, 3);

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["num_replicated"], 52);
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = serde_json::from_str::<FiberDetectConfig>("{").map_err(FiberIoError::from);
        assert!(matches!(err, Err(FiberIoError::Json(_))));
    }
}
