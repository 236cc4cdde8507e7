//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! ```rust
//! # use bitrace_pipeline::{Pipeline, PipelineConfig, PipelineError};
//! # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
//! let optimized = Pipeline::new(png, PipelineConfig::default())
//!     .decode()?
//!     .trace()?
//!     .optimize();
//!
//! // Curve fitting is cheap and can be repeated without re-tracing.
//! let soft = optimized.fit(&bitrace_pipeline::CurveParams {
//!     maximum_angle: 1.3,
//!     ..Default::default()
//! })?;
//! let result = optimized.into_fitted()?.into_result();
//! # let _ = (soft, result);
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages), carrying all previously computed
//! intermediates. Skipping a stage or running them out of order is a
//! compile-time error.

use tracing::warn;

use crate::bitmap::Bitmap;
use crate::contour::TracedContours;
use crate::types::{
    Contour, CurveParams, Dimensions, PipelineConfig, PipelineError, Polygon, Shape,
    ShapeFailure, VectorResult,
};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
#[must_use = "pipeline stages are consumed by advancing; call .decode() to continue"]
pub struct Pending {
    config: PipelineConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Decode the source image into a [`Bitmap`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] for empty bytes,
    /// [`PipelineError::ImageDecode`] for unreadable data, and
    /// [`PipelineError::InvalidBitmap`] if the image is not pure black
    /// and white.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        let gray = crate::decode::decode_gray(&self.source)?;
        let bitmap = Bitmap::from_gray(&gray, self.config.invert)?;
        Ok(Decoded {
            config: self.config,
            bitmap,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state holding a validated bitmap.
#[must_use = "pipeline stages are consumed by advancing; call .trace() to continue"]
pub struct Decoded {
    config: PipelineConfig,
    bitmap: Bitmap,
}

impl Decoded {
    /// The bitmap that will be traced.
    #[must_use]
    pub const fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Trace every outer and inner boundary.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::TraceDiverged`] if a boundary walk does
    /// not close.
    pub fn trace(self) -> Result<Traced, PipelineError> {
        let contours = crate::contour::trace(&self.bitmap)?;
        Ok(Traced {
            config: self.config,
            dimensions: self.bitmap.dimensions(),
            contours,
        })
    }
}

// ───────────────────────── Stage 2: Traced ───────────────────────────

/// Pipeline state after contour tracing.
#[must_use = "pipeline stages are consumed by advancing; call .optimize() to continue"]
pub struct Traced {
    config: PipelineConfig,
    dimensions: Dimensions,
    contours: TracedContours,
}

impl Traced {
    /// Outer contours, indexed by id.
    #[must_use]
    pub fn outer(&self) -> &[Contour] {
        &self.contours.outer
    }

    /// Inner contours, indexed by id.
    #[must_use]
    pub fn inner(&self) -> &[Contour] {
        &self.contours.inner
    }

    /// Source dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Reduce every contour to its minimal polygon.
    pub fn optimize(self) -> Optimized {
        let outer_polygons = crate::polygon::optimize_all(&self.contours.outer);
        let inner_polygons = crate::polygon::optimize_all(&self.contours.inner);
        Optimized {
            config: self.config,
            dimensions: self.dimensions,
            contours: self.contours,
            outer_polygons,
            inner_polygons,
        }
    }
}

// ───────────────────────── Stage 3: Optimized ────────────────────────

/// Shapes fitted with one set of [`CurveParams`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSet {
    /// Fitted shapes in discovery order.
    pub shapes: Vec<Shape>,
    /// Polygons that could not be fitted.
    pub failures: Vec<ShapeFailure>,
}

/// Pipeline state after polygon optimization.
///
/// [`fit`](Self::fit) borrows the stage, so several parameter sets can
/// be tried against the same polygons.
#[must_use = "pipeline stages are consumed by advancing; call .into_fitted() to continue"]
pub struct Optimized {
    config: PipelineConfig,
    dimensions: Dimensions,
    contours: TracedContours,
    outer_polygons: Vec<Polygon>,
    inner_polygons: Vec<Polygon>,
}

impl Optimized {
    /// Outer polygons, indexed by id.
    #[must_use]
    pub fn outer_polygons(&self) -> &[Polygon] {
        &self.outer_polygons
    }

    /// Inner polygons, indexed by id.
    #[must_use]
    pub fn inner_polygons(&self) -> &[Polygon] {
        &self.inner_polygons
    }

    /// Outer contours, indexed by id.
    #[must_use]
    pub fn outer_contours(&self) -> &[Contour] {
        &self.contours.outer
    }

    /// Inner contours, indexed by id.
    #[must_use]
    pub fn inner_contours(&self) -> &[Contour] {
        &self.contours.inner
    }

    /// Fit every polygon with `params` without consuming the stage.
    ///
    /// Degenerate polygons are reported in [`ShapeSet::failures`]; the
    /// remaining shapes are still fitted.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `params` or the
    /// configured viewport are out of range.
    pub fn fit(&self, params: &CurveParams) -> Result<ShapeSet, PipelineError> {
        params.validate()?;
        self.config.viewport.validate()?;
        let scale = self.config.viewport.scale_for(self.dimensions);
        let mut pairs: Vec<(&Polygon, &Contour)> = self
            .outer_polygons
            .iter()
            .zip(&self.contours.outer)
            .chain(self.inner_polygons.iter().zip(&self.contours.inner))
            .collect();
        pairs.sort_by_key(|(polygon, _)| polygon.order);

        let mut shapes = Vec::with_capacity(pairs.len());
        let mut failures = Vec::new();
        for (polygon, contour) in pairs {
            match crate::curve::fit_curves(polygon, contour, params, scale) {
                Ok(commands) => shapes.push(Shape {
                    kind: polygon.kind,
                    id: polygon.id,
                    order: polygon.order,
                    fill: polygon.kind.fill(),
                    commands,
                }),
                Err(err) => {
                    warn!(kind = %polygon.kind, id = %polygon.id, %err, "skipping shape");
                    failures.push(ShapeFailure {
                        kind: polygon.kind,
                        id: polygon.id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(ShapeSet { shapes, failures })
    }

    /// Fit with the configured parameters and advance to [`Fitted`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the configured curve
    /// parameters are out of range.
    pub fn into_fitted(self) -> Result<Fitted, PipelineError> {
        let set = self.fit(&self.config.curve)?;
        Ok(Fitted {
            optimized: self,
            set,
        })
    }
}

// ───────────────────────── Stage 4: Fitted ───────────────────────────

/// Final pipeline state: polygons plus their fitted shapes.
#[must_use = "call .into_result() to extract the VectorResult"]
pub struct Fitted {
    optimized: Optimized,
    set: ShapeSet,
}

impl Fitted {
    /// Fitted shapes in discovery order.
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.set.shapes
    }

    /// Polygons that could not be fitted.
    #[must_use]
    pub fn failures(&self) -> &[ShapeFailure] {
        &self.set.failures
    }

    /// Curve parameters the current shapes were fitted with.
    #[must_use]
    pub const fn params(&self) -> &CurveParams {
        &self.optimized.config.curve
    }

    /// Re-run only curve fitting with new parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `params` are out of
    /// range.
    pub fn refit(mut self, params: CurveParams) -> Result<Self, PipelineError> {
        self.set = self.optimized.fit(&params)?;
        self.optimized.config.curve = params;
        Ok(self)
    }

    /// Consume the pipeline and return the owned [`VectorResult`].
    #[must_use]
    pub fn into_result(self) -> VectorResult {
        let Optimized {
            config,
            dimensions,
            contours,
            outer_polygons,
            inner_polygons,
        } = self.optimized;
        VectorResult {
            dimensions,
            viewport: config.viewport,
            outer_contours: contours.outer,
            inner_contours: contours.inner,
            outer_polygons,
            inner_polygons,
            shapes: self.set.shapes,
            failures: self.set.failures,
        }
    }
}

/// Entry point for the staged pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from source image bytes and config.
    ///
    /// No processing is performed until [`.decode()`](Pending::decode).
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(image_bytes: Vec<u8>, config: PipelineConfig) -> Pending {
        Pending {
            config,
            source: image_bytes,
        }
    }

    /// Start from an already-validated bitmap, skipping decoding.
    pub const fn from_bitmap(bitmap: Bitmap, config: PipelineConfig) -> Decoded {
        Decoded { config, bitmap }
    }
}
