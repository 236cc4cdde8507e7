//! bitrace-pipeline: bitmap-to-vector tracing core (sans-IO).
//!
//! Converts a two-valued raster into filled vector outlines through:
//! decode -> bitmap validation -> contour tracing -> polygon
//! optimization -> curve fitting.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! byte slices and bitmaps and returns owned, structured data. File
//! handling and SVG serialization live in other crates.

pub mod bitmap;
pub mod contour;
pub mod curve;
pub mod decode;
pub mod diagnostics;
pub mod geom;
pub mod pipeline;
pub mod polygon;
pub mod types;

use tracing::info;
use web_time::Instant;

pub use bitmap::Bitmap;
pub use contour::{ContourTracer, TracedContours, trace};
pub use curve::fit_curves;
pub use diagnostics::PipelineDiagnostics;
pub use pipeline::{Fitted, Pipeline, ShapeSet};
pub use polygon::{PolygonOptimizer, optimize};
pub use types::{
    Contour, ContourId, ContourKind, CurveParams, Dimensions, Fill, PathCommand, PipelineConfig,
    PipelineError, PixelPoint, Point, Polygon, Scale, Shape, ShapeFailure, VectorResult, Viewport,
};

use diagnostics::{StageDiagnostics, StageMetrics};

fn log_summary(fitted: &Fitted, dimensions: Dimensions) {
    info!(
        width = dimensions.width,
        height = dimensions.height,
        shapes = fitted.shapes().len(),
        failures = fitted.failures().len(),
        "vectorized bitmap"
    );
}

/// Run the full pipeline on encoded image bytes.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] or [`PipelineError::ImageDecode`]
/// for unreadable input, [`PipelineError::InvalidBitmap`] if the image is
/// not pure black and white, and [`PipelineError::InvalidConfig`] if the
/// curve parameters or the viewport are out of range. Shapes that fail to fit are
/// reported in [`VectorResult::failures`] instead.
pub fn process(image_bytes: &[u8], config: &PipelineConfig) -> Result<VectorResult, PipelineError> {
    config.validate()?;
    let decoded = Pipeline::new(image_bytes.to_vec(), config.clone()).decode()?;
    let dimensions = decoded.bitmap().dimensions();
    let fitted = decoded.trace()?.optimize().into_fitted()?;
    log_summary(&fitted, dimensions);
    Ok(fitted.into_result())
}

/// Run tracing, optimization, and fitting on an in-memory bitmap.
///
/// `config.invert` is ignored; the bitmap already encodes which pixels
/// are foreground.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the curve parameters or
/// the viewport are out of range and [`PipelineError::TraceDiverged`] if a boundary walk
/// does not close.
pub fn vectorize(bitmap: &Bitmap, config: &PipelineConfig) -> Result<VectorResult, PipelineError> {
    config.validate()?;
    let dimensions = bitmap.dimensions();
    let fitted = Pipeline::from_bitmap(bitmap.clone(), config.clone())
        .trace()?
        .optimize()
        .into_fitted()?;
    log_summary(&fitted, dimensions);
    Ok(fitted.into_result())
}

/// Run the full pipeline and collect per-stage timing and metrics.
///
/// # Errors
///
/// Same as [`process`].
pub fn process_with_diagnostics(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<(VectorResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let total_start = Instant::now();

    let start = Instant::now();
    let decoded = Pipeline::new(image_bytes.to_vec(), config.clone()).decode()?;
    let dimensions = decoded.bitmap().dimensions();
    let decode = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: dimensions.width,
            height: dimensions.height,
            foreground_pixels: decoded.bitmap().foreground_count(),
        },
    };

    let start = Instant::now();
    let traced = decoded.trace()?;
    let stats = diagnostics::contour_stats(traced.outer().iter().chain(traced.inner()));
    let trace = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Trace {
            outer_count: traced.outer().len(),
            inner_count: traced.inner().len(),
            total_point_count: stats.total,
            min_contour_points: stats.min,
            max_contour_points: stats.max,
            mean_contour_points: stats.mean,
        },
    };

    let start = Instant::now();
    let optimized = traced.optimize();
    let optimize_duration = start.elapsed();
    let polygons = optimized
        .outer_polygons()
        .iter()
        .chain(optimized.inner_polygons());
    let polygon_count = polygons.clone().count();
    let points_after: usize = polygons.map(Polygon::len).sum();
    #[allow(clippy::cast_precision_loss)]
    let reduction_ratio = if stats.total == 0 {
        0.0
    } else {
        1.0 - points_after as f64 / stats.total as f64
    };
    let max_deviation = diagnostics::max_deviation(
        optimized
            .outer_contours()
            .iter()
            .zip(optimized.outer_polygons())
            .chain(
                optimized
                    .inner_contours()
                    .iter()
                    .zip(optimized.inner_polygons()),
            ),
    );
    let optimize = StageDiagnostics {
        duration: optimize_duration,
        metrics: StageMetrics::Optimize {
            polygon_count,
            points_before: stats.total,
            points_after,
            reduction_ratio,
            max_deviation,
        },
    };

    let start = Instant::now();
    let fitted = optimized.into_fitted()?;
    let (curve_count, line_count) = diagnostics::command_counts(fitted.shapes());
    let params = *fitted.params();
    let fit = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Fit {
            factor: params.factor,
            minimum_angle: params.minimum_angle,
            maximum_angle: params.maximum_angle,
            shape_count: fitted.shapes().len(),
            curve_count,
            line_count,
            failure_count: fitted.failures().len(),
        },
    };

    log_summary(&fitted, dimensions);
    let result = fitted.into_result();
    let summary = diagnostics::PipelineSummary {
        image_width: dimensions.width,
        image_height: dimensions.height,
        outer_count: result.outer_contours.len(),
        inner_count: result.inner_contours.len(),
        shape_count: result.shapes.len(),
        failure_count: result.failures.len(),
    };
    let report = PipelineDiagnostics {
        decode,
        trace,
        optimize,
        fit,
        total_duration: total_start.elapsed(),
        summary,
    };
    Ok((result, report))
}
