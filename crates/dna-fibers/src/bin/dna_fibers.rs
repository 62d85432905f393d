//! dna-fibers CLI: detect straight fiber segments in binary skeleton images.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use dna_fibers::detect::{detect_fibers_image, load_gray_image};
use dna_fibers::io::{FiberDetectConfig, FiberDetectReport};
use dna_fibers::{FiberDetectorParams, Roi};
use log::{error, info, LevelFilter};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "dna-fibers")]
#[command(about = "Detect straight DNA fiber segments in binary skeleton images")]
#[command(version)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,

    /// Emit tracing spans instead of plain log lines.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    trace_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run detection as described by a JSON config file.
    Run {
        /// Path to the JSON config.
        config: PathBuf,

        /// Report path, overriding `output_path` from the config.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run detection on an image with parameters given on the command line.
    Detect(DetectArgs),

    /// Print the default config as JSON.
    DefaultConfig {
        /// Image path to put in the printed config.
        #[arg(long, default_value = "skeleton.png")]
        image: String,
    },
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Path to the binary skeleton image.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the JSON report.
    #[arg(long)]
    out: PathBuf,

    /// Region of interest as `x,y,width,height`.
    #[arg(long, value_parser = parse_roi)]
    roi: Option<Roi>,

    /// Number of random anchors.
    #[arg(long, default_value = "1000")]
    samples: usize,

    /// Local window half-size in pixels.
    #[arg(long, default_value = "25")]
    window: u32,

    /// Angular sensitivity in degrees.
    #[arg(long, default_value = "2.5")]
    angular_deg: f64,

    /// Shift sensitivity in pixels.
    #[arg(long, default_value = "5.0")]
    shift_px: f64,

    /// Relative population a line needs to be kept, in (0, 1).
    #[arg(long, default_value = "0.33")]
    selection: f64,

    /// Largest gap bridged within one segment, in pixels.
    #[arg(long, default_value = "30.0")]
    max_gap: f64,

    /// Shortest segment kept, in pixels.
    #[arg(long, default_value = "50.0")]
    min_length: f64,

    /// Distance tolerance between a pixel and its line, in pixels.
    #[arg(long, default_value = "1.0")]
    width_tolerance: f64,

    /// Seed of the anchor sampler.
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Worker threads (default: all cores).
    #[arg(long)]
    threads: Option<usize>,
}

impl DetectArgs {
    fn to_config(&self) -> FiberDetectConfig {
        let mut params = FiberDetectorParams::default();
        params.hough.num_samples = self.samples;
        params.hough.window_size = self.window;
        params.hough.seed = self.seed;
        params.selection.angular_sensitivity_deg = self.angular_deg;
        params.selection.shift_sensitivity = self.shift_px;
        params.selection.selection_sensitivity = self.selection;
        params.segments.max_gap = self.max_gap;
        params.segments.min_length = self.min_length;
        params.segments.width_tolerance = self.width_tolerance;
        params.threads = self.threads;
        FiberDetectConfig {
            image_path: self.image.to_string_lossy().into_owned(),
            roi: self.roi,
            output_path: Some(self.out.to_string_lossy().into_owned()),
            params,
        }
    }
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level `{s}`"))
}

fn parse_roi(s: &str) -> Result<Roi, String> {
    let parts: Vec<usize> = s
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid ROI `{s}`: {e}"))?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(Roi::new(*x, *y, *w, *h)),
        _ => Err(format!("ROI needs 4 values x,y,width,height, got `{s}`")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let outcome = match cli.command {
        Commands::Run { config, out } => run_config(&config, out),
        Commands::Detect(args) => {
            let cfg = args.to_config();
            run_detection(&cfg, Path::new("<command line>"), cfg.output_path())
        }
        Commands::DefaultConfig { image } => print_default_config(image),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) {
    if cli.trace_json {
        dna_fibers::core::init_tracing(true);
        return;
    }
    let _ = dna_fibers::core::init_with_level(cli.log_level);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) {
    let _ = dna_fibers::core::init_with_level(cli.log_level);
}

fn run_config(config_path: &Path, out: Option<PathBuf>) -> CliResult<bool> {
    let cfg = FiberDetectConfig::load_json(config_path)?;
    let out = out.unwrap_or_else(|| cfg.output_path());
    run_detection(&cfg, config_path, out)
}

/// Runs detection and writes the report. Returns `false` when detection failed
/// (the report then carries the error).
fn run_detection(cfg: &FiberDetectConfig, config_path: &Path, out: PathBuf) -> CliResult<bool> {
    let img = load_gray_image(&cfg.image_path)?;
    let mut report = FiberDetectReport::new(
        cfg,
        config_path,
        img.width() as usize,
        img.height() as usize,
    );

    let ok = match cfg
        .build_detector()
        .and_then(|detector| detect_fibers_image(&img, cfg.roi, &detector))
    {
        Ok(detection) => {
            info!(
                "{}: {} segments on {} lines",
                cfg.image_path,
                detection.segments.len(),
                detection.peaks.len()
            );
            println!("segments: {}", detection.segments.len());
            report.set_detection(detection);
            true
        }
        Err(err) => {
            error!("detection failed: {err}");
            report.set_error(&err);
            false
        }
    };

    report.write_json(&out)?;
    info!("report written to {}", out.display());
    Ok(ok)
}

fn print_default_config(image: String) -> CliResult<bool> {
    let cfg = FiberDetectConfig::new(image);
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(true)
}
