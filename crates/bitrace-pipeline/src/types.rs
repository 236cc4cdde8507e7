//! Shared types for the bitrace tracing pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can hand decoded rasters
/// to [`Bitmap::from_gray`](crate::Bitmap::from_gray) without depending
/// on `image` directly.
pub use image::GrayImage;

/// An integer vertex on the pixel-corner grid.
///
/// Vertex `(x, y)` is the top-left corner of pixel `(x, y)`, so a
/// `w × h` bitmap has vertices in `0..=w × 0..=h`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Column of the corner.
    pub x: i32,
    /// Row of the corner.
    pub y: i32,
}

impl PixelPoint {
    /// Create a new pixel-grid point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub const fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Convert to a floating-point [`Point`].
    #[must_use]
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

/// A 2D point (or vector) in floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position (grows downward, like image rows).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Linear interpolation: `t = 0` yields `self`, `t = 1` yields `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            (1.0 - t).mul_add(self.x, t * other.x),
            (1.0 - t).mul_add(self.y, t * other.y),
        )
    }
}

/// Whether a boundary encloses a foreground region or a hole in one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContourKind {
    /// Boundary of a foreground region.
    Outer,
    /// Boundary of a hole inside a foreground region.
    Inner,
}

impl ContourKind {
    /// The fill a shape of this kind is painted with.
    #[must_use]
    pub const fn fill(self) -> Fill {
        match self {
            Self::Outer => Fill::Foreground,
            Self::Inner => Fill::Background,
        }
    }
}

impl fmt::Display for ContourKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outer => write!(f, "outer"),
            Self::Inner => write!(f, "inner"),
        }
    }
}

/// Fill colour role of an output shape.
///
/// Holes are painted with the background colour on top of their outer
/// shape, so shapes must be layered in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fill {
    /// Painted with the foreground (ink) colour.
    Foreground,
    /// Painted with the background (paper) colour.
    Background,
}

/// Dense, zero-based identifier of a contour within its kind.
///
/// Outer id 0 and inner id 0 are unrelated entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContourId(pub usize);

impl fmt::Display for ContourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Drop the closing duplicate from a closed point sequence.
fn open_ring(points: &[PixelPoint]) -> &[PixelPoint] {
    match points {
        [first, .., last] if first == last => &points[..points.len() - 1],
        _ => points,
    }
}

/// A closed pixel boundary produced by contour tracing.
///
/// The first and last points coincide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    /// Identifier, dense within [`kind`](Self::kind).
    pub id: ContourId,
    /// Outer boundary or hole.
    pub kind: ContourKind,
    /// Discovery index shared by outer and inner contours of one trace.
    pub order: usize,
    points: Vec<PixelPoint>,
}

impl Contour {
    /// Create a contour from its point sequence.
    #[must_use]
    pub const fn new(
        id: ContourId,
        kind: ContourKind,
        order: usize,
        points: Vec<PixelPoint>,
    ) -> Self {
        Self {
            id,
            kind,
            order,
            points,
        }
    }

    /// All points, including the closing duplicate.
    #[must_use]
    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    /// Number of points, including the closing duplicate.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The distinct cyclic point sequence (closing duplicate removed).
    #[must_use]
    pub fn ring(&self) -> &[PixelPoint] {
        open_ring(&self.points)
    }
}

/// A simplified boundary whose points are a cyclic subsequence of its
/// source [`Contour`].
///
/// Optimized polygons are closed like contours; the first point is
/// repeated at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    /// Identifier of the source contour.
    pub id: ContourId,
    /// Kind of the source contour.
    pub kind: ContourKind,
    /// Discovery index of the source contour.
    pub order: usize,
    points: Vec<PixelPoint>,
}

impl Polygon {
    /// Create a polygon from its point sequence.
    #[must_use]
    pub const fn new(
        id: ContourId,
        kind: ContourKind,
        order: usize,
        points: Vec<PixelPoint>,
    ) -> Self {
        Self {
            id,
            kind,
            order,
            points,
        }
    }

    /// All points, including the closing duplicate when present.
    #[must_use]
    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    /// Number of points, including the closing duplicate when present.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the polygon has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The distinct corner vertices in cyclic order.
    #[must_use]
    pub fn vertices(&self) -> &[PixelPoint] {
        open_ring(&self.points)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Size of the output coordinate space that traced paths are mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Output width in user units.
    pub width: f64,
    /// Output height in user units.
    pub height: f64,
}

impl Viewport {
    /// Default output extent on both axes.
    pub const DEFAULT_EXTENT: f64 = 100.0;

    /// Check that both sides are finite and positive.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the bad side.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "viewport {name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Per-axis scale mapping `dimensions` onto this viewport.
    #[must_use]
    pub fn scale_for(self, dimensions: Dimensions) -> Scale {
        Scale {
            x: self.width / f64::from(dimensions.width.max(1)),
            y: self.height / f64::from(dimensions.height.max(1)),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_EXTENT,
            height: Self::DEFAULT_EXTENT,
        }
    }
}

/// Independent X/Y scale factors from pixel space to output space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    /// Horizontal factor.
    pub x: f64,
    /// Vertical factor.
    pub y: f64,
}

impl Scale {
    /// Leaves coordinates in pixel space.
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    /// Map a pixel-space point into output space.
    #[must_use]
    pub fn apply(self, p: Point) -> Point {
        Point::new(p.x * self.x, p.y * self.y)
    }
}

/// Tunable parameters of the corner-sharpness heuristic.
///
/// # Invariants
///
/// `factor > 0` and `0 < minimum_angle <= maximum_angle <=`
/// [`MAX_ANGLE_LIMIT`](Self::MAX_ANGLE_LIMIT). Checked by
/// [`validate`](Self::validate) before any curve fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParams {
    /// Control-point scale; 4/3 is the circular-arc Bezier constant.
    pub factor: f64,
    /// Lower clamp applied to every corner's angle.
    pub minimum_angle: f64,
    /// Corners whose angle exceeds this become two straight segments.
    pub maximum_angle: f64,
}

impl CurveParams {
    /// Default `factor`.
    pub const DEFAULT_FACTOR: f64 = 4.0 / 3.0;
    /// Default `minimum_angle`.
    pub const DEFAULT_MINIMUM_ANGLE: f64 = 0.55;
    /// Default `maximum_angle`.
    pub const DEFAULT_MAXIMUM_ANGLE: f64 = 1.0;
    /// Practical upper bound for `maximum_angle`.
    pub const MAX_ANGLE_LIMIT: f64 = 2.0;

    /// Check the parameter invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the first violated
    /// constraint.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "factor must be positive, got {}",
                self.factor
            )));
        }
        if !self.minimum_angle.is_finite() || self.minimum_angle <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "minimum_angle must be positive, got {}",
                self.minimum_angle
            )));
        }
        if !self.maximum_angle.is_finite() || self.maximum_angle < self.minimum_angle {
            return Err(PipelineError::InvalidConfig(format!(
                "maximum_angle ({}) must not be below minimum_angle ({})",
                self.maximum_angle, self.minimum_angle
            )));
        }
        if self.maximum_angle > Self::MAX_ANGLE_LIMIT {
            return Err(PipelineError::InvalidConfig(format!(
                "maximum_angle must be at most {}, got {}",
                Self::MAX_ANGLE_LIMIT,
                self.maximum_angle
            )));
        }
        Ok(())
    }
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            factor: Self::DEFAULT_FACTOR,
            minimum_angle: Self::DEFAULT_MINIMUM_ANGLE,
            maximum_angle: Self::DEFAULT_MAXIMUM_ANGLE,
        }
    }
}

/// Configuration for a full pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Treat white pixels as foreground instead of black ones.
    pub invert: bool,
    /// Curve fitting parameters.
    pub curve: CurveParams,
    /// Output coordinate space.
    pub viewport: Viewport,
}

impl PipelineConfig {
    /// Check the curve parameters and the viewport.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for the first violated
    /// constraint.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.curve.validate()?;
        self.viewport.validate()
    }
}

/// One element of an output path, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    /// Start the path at a point.
    MoveTo(Point),
    /// Two consecutive absolute line segments: to the first point, then
    /// to the second.
    LineTo(Point, Point),
    /// Cubic Bezier: first control, second control, end point.
    CurveTo(Point, Point, Point),
}

/// The fitted outline of one polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Kind of the source contour.
    pub kind: ContourKind,
    /// Identifier of the source contour.
    pub id: ContourId,
    /// Discovery index; shapes are layered in this order.
    pub order: usize,
    /// Fill role derived from `kind`.
    pub fill: Fill,
    /// Closed path, starting with a [`PathCommand::MoveTo`].
    pub commands: Vec<PathCommand>,
}

/// A polygon that could not be fitted; the rest of the image still is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeFailure {
    /// Kind of the failed contour.
    pub kind: ContourKind,
    /// Identifier of the failed contour.
    pub id: ContourId,
    /// Human-readable cause.
    pub reason: String,
}

/// Everything a pipeline run produces, owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorResult {
    /// Source bitmap dimensions in pixels.
    pub dimensions: Dimensions,
    /// Output coordinate space of [`shapes`](Self::shapes).
    pub viewport: Viewport,
    /// Outer contours, indexed by id.
    pub outer_contours: Vec<Contour>,
    /// Inner contours, indexed by id.
    pub inner_contours: Vec<Contour>,
    /// Outer polygons, indexed by id.
    pub outer_polygons: Vec<Polygon>,
    /// Inner polygons, indexed by id.
    pub inner_polygons: Vec<Polygon>,
    /// Fitted shapes in discovery order.
    pub shapes: Vec<Shape>,
    /// Polygons that could not be fitted.
    pub failures: Vec<ShapeFailure>,
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The bitmap is empty or not strictly two-valued.
    #[error("invalid bitmap: {0}")]
    InvalidBitmap(String),

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// A polygon has too few vertices to fit a path against.
    #[error("{kind} polygon {id} is degenerate: {vertices} distinct vertices")]
    DegenerateGeometry {
        /// Kind of the polygon.
        kind: ContourKind,
        /// Identifier of the polygon.
        id: ContourId,
        /// Number of distinct vertices found.
        vertices: usize,
    },

    /// A polygon was paired with a contour it was not derived from.
    #[error("{polygon_kind} polygon {polygon_id} does not belong to {contour_kind} contour {contour_id}")]
    MismatchedContour {
        /// Kind of the polygon.
        polygon_kind: ContourKind,
        /// Identifier of the polygon.
        polygon_id: ContourId,
        /// Kind of the contour.
        contour_kind: ContourKind,
        /// Identifier of the contour.
        contour_id: ContourId,
    },

    /// A boundary walk failed to return to its start vertex.
    #[error("boundary walk from ({x}, {y}) did not close")]
    TraceDiverged {
        /// Start vertex column.
        x: i32,
        /// Start vertex row.
        y: i32,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_midpoint() {
        let m = Point::new(1.0, 2.0).midpoint(Point::new(4.0, 3.0));
        assert_eq!(m, Point::new(2.5, 2.5));
    }

    #[test]
    fn point_lerp_endpoints_and_middle() {
        let a = Point::new(0.0, 10.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.25), Point::new(2.5, 7.5));
    }

    #[test]
    fn pixel_point_sub_and_convert() {
        let d = PixelPoint::new(5, 2).sub(PixelPoint::new(1, 4));
        assert_eq!(d, PixelPoint::new(4, -2));
        assert_eq!(d.to_point(), Point::new(4.0, -2.0));
    }

    // --- Contour / Polygon tests ---

    fn square_points() -> Vec<PixelPoint> {
        vec![
            PixelPoint::new(0, 0),
            PixelPoint::new(0, 1),
            PixelPoint::new(1, 1),
            PixelPoint::new(1, 0),
            PixelPoint::new(0, 0),
        ]
    }

    #[test]
    fn contour_ring_drops_closing_point() {
        let c = Contour::new(ContourId(0), ContourKind::Outer, 0, square_points());
        assert_eq!(c.len(), 5);
        assert_eq!(c.ring().len(), 4);
        assert_eq!(c.ring()[0], PixelPoint::new(0, 0));
    }

    #[test]
    fn open_sequence_ring_is_unchanged() {
        let points = vec![PixelPoint::new(0, 0), PixelPoint::new(3, 0)];
        let p = Polygon::new(ContourId(2), ContourKind::Inner, 7, points.clone());
        assert_eq!(p.vertices(), points.as_slice());
    }

    #[test]
    fn kind_fill_and_display() {
        assert_eq!(ContourKind::Outer.fill(), Fill::Foreground);
        assert_eq!(ContourKind::Inner.fill(), Fill::Background);
        assert_eq!(ContourKind::Inner.to_string(), "inner");
        assert_eq!(ContourId(3).to_string(), "#3");
    }

    // --- Viewport tests ---

    #[test]
    fn viewport_scale_is_per_axis() {
        let scale = Viewport::default().scale_for(Dimensions {
            width: 200,
            height: 50,
        });
        assert!((scale.x - 0.5).abs() < f64::EPSILON);
        assert!((scale.y - 2.0).abs() < f64::EPSILON);
        assert_eq!(scale.apply(Point::new(10.0, 10.0)), Point::new(5.0, 20.0));
    }

    #[test]
    fn viewport_rejects_bad_sides() {
        let bad = [
            Viewport {
                width: 0.0,
                height: 100.0,
            },
            Viewport {
                width: 100.0,
                height: -50.0,
            },
            Viewport {
                width: f64::NAN,
                height: 100.0,
            },
            Viewport {
                width: 100.0,
                height: f64::INFINITY,
            },
        ];
        for viewport in bad {
            assert!(
                matches!(viewport.validate(), Err(PipelineError::InvalidConfig(_))),
                "expected {viewport:?} to be rejected",
            );
        }
        assert!(Viewport::default().validate().is_ok());
    }

    #[test]
    fn pipeline_config_validates_viewport() {
        let config = PipelineConfig {
            viewport: Viewport {
                width: f64::NAN,
                height: -50.0,
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(PipelineConfig::default().validate().is_ok());
    }

    // --- CurveParams tests ---

    #[test]
    fn curve_params_defaults() {
        let params = CurveParams::default();
        assert!((params.factor - 4.0 / 3.0).abs() < f64::EPSILON);
        assert!((params.minimum_angle - 0.55).abs() < f64::EPSILON);
        assert!((params.maximum_angle - 1.0).abs() < f64::EPSILON);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn curve_params_rejects_bad_values() {
        let bad = [
            CurveParams {
                factor: 0.0,
                ..CurveParams::default()
            },
            CurveParams {
                minimum_angle: 0.0,
                ..CurveParams::default()
            },
            CurveParams {
                minimum_angle: 1.2,
                maximum_angle: 1.0,
                ..CurveParams::default()
            },
            CurveParams {
                maximum_angle: 2.5,
                ..CurveParams::default()
            },
            CurveParams {
                factor: f64::NAN,
                ..CurveParams::default()
            },
        ];
        for params in bad {
            assert!(
                matches!(params.validate(), Err(PipelineError::InvalidConfig(_))),
                "expected {params:?} to be rejected",
            );
        }
    }

    #[test]
    fn curve_params_accepts_equal_bounds() {
        let params = CurveParams {
            minimum_angle: 0.8,
            maximum_angle: 0.8,
            ..CurveParams::default()
        };
        assert!(params.validate().is_ok());
    }

    // --- Error display tests ---

    #[test]
    fn error_display() {
        assert_eq!(
            PipelineError::EmptyInput.to_string(),
            "input image data is empty"
        );
        let err = PipelineError::DegenerateGeometry {
            kind: ContourKind::Outer,
            id: ContourId(4),
            vertices: 1,
        };
        assert_eq!(
            err.to_string(),
            "outer polygon #4 is degenerate: 1 distinct vertices"
        );
    }

    // --- Serde tests ---

    #[test]
    fn pipeline_config_serde_round_trip() {
        let config = PipelineConfig {
            invert: true,
            curve: CurveParams {
                factor: 1.1,
                minimum_angle: 0.6,
                maximum_angle: 1.4,
            },
            viewport: Viewport {
                width: 210.0,
                height: 297.0,
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn path_command_serializes_tagged() {
        let cmd = PathCommand::MoveTo(Point::new(1.0, 2.0));
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"MoveTo":{"x":1.0,"y":2.0}}"#);
    }
}
