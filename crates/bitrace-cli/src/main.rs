//! bitrace: trace a black-and-white image into a filled SVG document.
//!
//! Reads an image file, runs the tracing pipeline, writes the SVG (and
//! optionally a contour/polygon overlay), and prints per-stage
//! diagnostics.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin bitrace -- [OPTIONS] <IMAGE>
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`), e.g.
//! `RUST_LOG=bitrace_pipeline=debug` prints every traced contour.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bitrace_pipeline::{CurveParams, PipelineConfig, Viewport};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Trace a black-and-white image into a filled SVG document.
///
/// Black pixels are foreground unless `--invert` is given. Any pixel
/// that is neither pure black nor pure white is rejected.
#[derive(Parser)]
#[command(name = "bitrace", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image: PathBuf,

    /// Output SVG path. Defaults to the input path with an `.svg`
    /// extension.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also write a pixel-space overlay of contours and polygons.
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Control-point factor for smooth corners.
    #[arg(long, default_value_t = CurveParams::DEFAULT_FACTOR)]
    factor: f64,

    /// Lower clamp for every corner's angle.
    #[arg(long, default_value_t = CurveParams::DEFAULT_MINIMUM_ANGLE)]
    minimum_angle: f64,

    /// Corners above this angle become straight segments.
    #[arg(long, default_value_t = CurveParams::DEFAULT_MAXIMUM_ANGLE)]
    maximum_angle: f64,

    /// Output viewport width.
    #[arg(long, default_value_t = Viewport::DEFAULT_EXTENT)]
    viewport_width: f64,

    /// Output viewport height.
    #[arg(long, default_value_t = Viewport::DEFAULT_EXTENT)]
    viewport_height: f64,

    /// Treat white pixels as foreground.
    #[arg(long)]
    invert: bool,

    /// Print diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PipelineConfig {
        invert: cli.invert,
        curve: CurveParams {
            factor: cli.factor,
            minimum_angle: cli.minimum_angle,
            maximum_angle: cli.maximum_angle,
        },
        viewport: Viewport {
            width: cli.viewport_width,
            height: cli.viewport_height,
        },
    })
}

/// Write `contents` to `path`, reporting failures on stderr.
fn write_output(path: &Path, contents: &str, what: &str) -> bool {
    match std::fs::write(path, contents) {
        Ok(()) => {
            info!(path = %path.display(), bytes = contents.len(), "wrote {what}");
            true
        }
        Err(e) => {
            eprintln!("Error writing {what} to {}: {e}", path.display());
            false
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image.display());
            return ExitCode::FAILURE;
        }
    };
    info!(path = %cli.image.display(), bytes = image_bytes.len(), "loaded image");

    let (result, diagnostics) =
        match bitrace_pipeline::process_with_diagnostics(&image_bytes, &config) {
            Ok(output) => output,
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        };

    for failure in &result.failures {
        warn!(kind = %failure.kind, id = %failure.id, reason = %failure.reason, "shape omitted");
    }

    if cli.json {
        match serde_json::to_string_pretty(&diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing diagnostics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", diagnostics.report());
    }

    let config_json = match serde_json::to_string(&config) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing config: {e}");
            return ExitCode::FAILURE;
        }
    };
    let title = cli
        .image
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("bitrace");
    let description = format!(
        "Traced from {}x{} pixels: {} shapes",
        result.dimensions.width,
        result.dimensions.height,
        result.shapes.len(),
    );
    let metadata = bitrace_export::SvgMetadata {
        title: Some(title),
        description: Some(&description),
        config_json: Some(&config_json),
    };

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.image.with_extension("svg"));
    if !write_output(&output, &bitrace_export::to_svg(&result, &metadata), "SVG") {
        return ExitCode::FAILURE;
    }

    if let Some(ref overlay) = cli.overlay {
        let svg = bitrace_export::to_overlay_svg(&result, &metadata);
        if !write_output(overlay, &svg, "overlay") {
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
