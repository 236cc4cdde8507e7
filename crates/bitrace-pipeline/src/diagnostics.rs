//! Pipeline diagnostics: timing, counts, and fidelity metrics for each
//! stage.
//!
//! Collected by [`process_with_diagnostics`](crate::process_with_diagnostics).
//! Timestamps come from the `web-time` crate, which uses
//! `performance.now()` on WASM and `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geom::point_segment_distance;
use crate::types::{Contour, PathCommand, Polygon, Shape};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Image decoding and bitmap validation.
    pub decode: StageDiagnostics,
    /// Contour tracing.
    pub trace: StageDiagnostics,
    /// Polygon optimization.
    pub optimize: StageDiagnostics,
    /// Curve fitting.
    pub fit: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Bitmap width in pixels.
        width: u32,
        /// Bitmap height in pixels.
        height: u32,
        /// Number of foreground pixels.
        foreground_pixels: usize,
    },
    /// Contour tracing metrics.
    Trace {
        /// Number of outer contours.
        outer_count: usize,
        /// Number of inner contours.
        inner_count: usize,
        /// Total number of points across all contours.
        total_point_count: usize,
        /// Minimum points in any single contour.
        min_contour_points: usize,
        /// Maximum points in any single contour.
        max_contour_points: usize,
        /// Mean points per contour.
        mean_contour_points: f64,
    },
    /// Polygon optimization metrics.
    Optimize {
        /// Number of polygons produced.
        polygon_count: usize,
        /// Total contour points.
        points_before: usize,
        /// Total polygon points.
        points_after: usize,
        /// Reduction ratio: `1.0 - (after / before)`.
        reduction_ratio: f64,
        /// Largest max-norm distance from a contour point to its polygon.
        max_deviation: f64,
    },
    /// Curve fitting metrics.
    Fit {
        /// Control-point factor used.
        factor: f64,
        /// Minimum angle used.
        minimum_angle: f64,
        /// Maximum angle used.
        maximum_angle: f64,
        /// Number of fitted shapes.
        shape_count: usize,
        /// Number of Bezier corners.
        curve_count: usize,
        /// Number of straight segments.
        line_count: usize,
        /// Number of polygons that failed to fit.
        failure_count: usize,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Number of outer contours.
    pub outer_count: usize,
    /// Number of inner contours.
    pub inner_count: usize,
    /// Number of fitted shapes.
    pub shape_count: usize,
    /// Number of polygons that failed to fit.
    pub failure_count: usize,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{}",
            self.summary.image_width, self.summary.image_height,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Trace", &self.trace),
            ("Optimize", &self.optimize),
            ("Fit", &self.fit),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Outer: {}  |  Inner: {}  |  Shapes: {}  |  Failures: {}",
            self.summary.outer_count,
            self.summary.inner_count,
            self.summary.shape_count,
            self.summary.failure_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            foreground_pixels,
        } => format!("{input_bytes} bytes -> {width}x{height}, {foreground_pixels} fg"),
        StageMetrics::Trace {
            outer_count,
            inner_count,
            total_point_count,
            min_contour_points,
            max_contour_points,
            mean_contour_points,
        } => format!(
            "{outer_count} outer + {inner_count} inner, {total_point_count} pts (min={min_contour_points} max={max_contour_points} mean={mean_contour_points:.1})",
        ),
        StageMetrics::Optimize {
            polygon_count,
            points_before,
            points_after,
            reduction_ratio,
            max_deviation,
        } => format!(
            "{polygon_count} polys, {points_before}->{points_after} pts ({:.1}% reduction) dev={max_deviation:.2}",
            reduction_ratio * 100.0,
        ),
        StageMetrics::Fit {
            factor,
            minimum_angle,
            maximum_angle,
            curve_count,
            line_count,
            failure_count,
            ..
        } => format!(
            "f={factor:.3} min={minimum_angle:.2} max={maximum_angle:.2} {curve_count} curves, {line_count} lines, {failure_count} failed",
        ),
    }
}

/// Statistics for a set of contours.
pub(crate) struct ContourStats {
    /// Total number of points across all contours.
    pub total: usize,
    /// Minimum number of points in any single contour.
    pub min: usize,
    /// Maximum number of points in any single contour.
    pub max: usize,
    /// Mean number of points per contour.
    pub mean: f64,
}

/// Compute point-count statistics over `contours`.
pub(crate) fn contour_stats<'a>(contours: impl Iterator<Item = &'a Contour> + Clone) -> ContourStats {
    let total: usize = contours.clone().map(Contour::len).sum();
    let count = contours.clone().count();
    let min = contours.clone().map(Contour::len).min().unwrap_or(0);
    let max = contours.map(Contour::len).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let mean = if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    };
    ContourStats {
        total,
        min,
        max,
        mean,
    }
}

/// Largest max-norm distance from any contour point to the nearest edge
/// of the polygon optimized from it.
pub(crate) fn max_deviation<'a>(
    pairs: impl Iterator<Item = (&'a Contour, &'a Polygon)>,
) -> f64 {
    let mut worst = 0.0_f64;
    for (contour, polygon) in pairs {
        let vertices: Vec<_> = polygon.vertices().iter().map(|v| v.to_point()).collect();
        let k = vertices.len();
        if k == 0 {
            continue;
        }
        for p in contour.ring() {
            let p = p.to_point();
            let nearest = (0..k)
                .map(|i| point_segment_distance(vertices[i], vertices[(i + 1) % k], p))
                .fold(f64::INFINITY, f64::min);
            worst = worst.max(nearest);
        }
    }
    worst
}

/// Count Bezier corners and straight segments across `shapes`.
pub(crate) fn command_counts(shapes: &[Shape]) -> (usize, usize) {
    shapes
        .iter()
        .flat_map(|s| &s.commands)
        .fold((0, 0), |(curves, lines), cmd| match cmd {
            PathCommand::CurveTo(..) => (curves + 1, lines),
            PathCommand::LineTo(..) => (curves, lines + 1),
            PathCommand::MoveTo(_) => (curves, lines),
        })
}
