//! Curve fitting: turn an optimized polygon into a closed path of
//! straight corners and cubic Bezier arcs.
//!
//! The path runs through the midpoints of consecutive polygon edges.
//! At each vertex the distance from the vertex to the line joining the
//! two neighbouring midpoints decides how sharp the corner is: flat
//! corners become curves whose control points sit a fraction `angle`
//! of the way towards the vertex, sharp ones become two line segments
//! meeting at the vertex.

use crate::geom::{lerp, point_line_distance};
use crate::types::{
    Contour, CurveParams, PathCommand, PipelineError, PixelPoint, Point, Polygon, Scale,
};

/// How one polygon vertex is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Corner {
    /// Two straight segments meeting at the vertex.
    Sharp,
    /// A cubic Bezier with control points at fraction `angle` towards
    /// the vertex.
    Smooth(f64),
}

/// Midpoints of each consecutive vertex pair, cyclically.
#[must_use]
pub fn center_points(vertices: &[PixelPoint]) -> Vec<Point> {
    let k = vertices.len();
    (0..k)
        .map(|i| vertices[i].to_point().midpoint(vertices[(i + 1) % k].to_point()))
        .collect()
}

/// Clamped corner parameter for `vertex` between midpoints `start` and `end`.
///
/// Grows with the vertex's distance from the chord: a vertex half a
/// pixel off the chord has angle 0, larger offsets approach `factor`.
#[must_use]
pub fn corner_angle(start: Point, end: Point, vertex: Point, params: &CurveParams) -> f64 {
    let distance = point_line_distance(start, end, vertex);
    let angle = if distance > 0.0 {
        params.factor * (distance - 0.5) / distance
    } else {
        f64::NEG_INFINITY
    };
    angle.max(params.minimum_angle)
}

/// Classify a corner from its clamped angle.
#[must_use]
pub fn classify_corner(start: Point, end: Point, vertex: Point, params: &CurveParams) -> Corner {
    let angle = corner_angle(start, end, vertex, params);
    if angle > params.maximum_angle {
        Corner::Sharp
    } else {
        Corner::Smooth(angle)
    }
}

/// Fit a closed path to `polygon`, scaled into output space.
///
/// `contour` must be the contour `polygon` was optimized from. The
/// result starts with a [`PathCommand::MoveTo`] at the first edge
/// midpoint and ends back on it. Every vertex contributes either one
/// [`PathCommand::CurveTo`] or a pair of [`PathCommand::LineTo`]s, from
/// the incoming midpoint to the vertex and from the vertex to the
/// outgoing midpoint.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `params` fail
/// validation, [`PipelineError::MismatchedContour`] if `polygon` and
/// `contour` disagree on id or kind, and
/// [`PipelineError::DegenerateGeometry`] if the polygon has fewer than
/// two distinct vertices.
pub fn fit_curves(
    polygon: &Polygon,
    contour: &Contour,
    params: &CurveParams,
    scale: Scale,
) -> Result<Vec<PathCommand>, PipelineError> {
    params.validate()?;
    if polygon.id != contour.id || polygon.kind != contour.kind {
        return Err(PipelineError::MismatchedContour {
            polygon_kind: polygon.kind,
            polygon_id: polygon.id,
            contour_kind: contour.kind,
            contour_id: contour.id,
        });
    }
    let vertices = polygon.vertices();
    let k = vertices.len();
    if k < 2 {
        return Err(PipelineError::DegenerateGeometry {
            kind: polygon.kind,
            id: polygon.id,
            vertices: k,
        });
    }

    let centers = center_points(vertices);
    let mut commands = Vec::with_capacity(2 * k + 1);
    commands.push(PathCommand::MoveTo(scale.apply(centers[0])));
    for j in 0..k {
        let start = centers[j];
        let end = centers[(j + 1) % k];
        let vertex = vertices[(j + 1) % k].to_point();
        match classify_corner(start, end, vertex, params) {
            Corner::Sharp => {
                commands.push(PathCommand::LineTo(scale.apply(start), scale.apply(vertex)));
                commands.push(PathCommand::LineTo(scale.apply(vertex), scale.apply(end)));
            }
            Corner::Smooth(angle) => commands.push(PathCommand::CurveTo(
                scale.apply(lerp(start, vertex, angle)),
                scale.apply(lerp(end, vertex, angle)),
                scale.apply(end),
            )),
        }
    }
    Ok(commands)
}
