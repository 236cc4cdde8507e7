//! Polygon optimization: reduce a traced contour to the fewest corners
//! that still follow it within half a pixel.
//!
//! Works in two passes over the contour's ring of distinct vertices:
//!
//! 1. **Pivots.** For every vertex `i`, find the first vertex that can no
//!    longer be reached by a straight line from `i`. The line must pass
//!    within half a pixel of every vertex in between, tracked by two
//!    constraint vectors, and a straight run may not turn in all four
//!    directions.
//! 2. **Segments.** For every start vertex, greedily chain the longest
//!    straight segments the pivots allow until the ring closes, and keep
//!    the candidate with the fewest vertices.
//!
//! Both passes are quadratic in the ring length.

use tracing::debug;

use crate::geom::cross_grid;
use crate::types::{Contour, PixelPoint, Polygon};

/// Cyclic forward distance from `start` to `end` on a ring of size `n`.
const fn cyclic_distance(start: usize, end: usize, n: usize) -> usize {
    (end + n - start) % n
}

/// One-step-back index on a ring of size `n`.
const fn prev(i: usize, n: usize) -> usize {
    (i + n - 1) % n
}

/// Unit step direction between adjacent ring vertices: right, up, left, down.
const fn step_index(from: PixelPoint, to: PixelPoint) -> Option<usize> {
    if to.x > from.x {
        Some(0)
    } else if to.y < from.y {
        Some(1)
    } else if to.x < from.x {
        Some(2)
    } else if to.y > from.y {
        Some(3)
    } else {
        None
    }
}

/// Whether the ring's unit steps cover all four directions.
fn turns_all_ways(ring: &[PixelPoint]) -> bool {
    let n = ring.len();
    let mut seen = [false; 4];
    for (i, &point) in ring.iter().enumerate() {
        if let Some(dir) = step_index(point, ring[(i + 1) % n]) {
            seen[dir] = true;
        }
    }
    seen.iter().all(|&s| s)
}

/// A polygon optimization session.
///
/// Holds the pivot table and the two straightness constraint vectors as
/// scratch state, reused across contours.
#[derive(Debug, Default)]
pub struct PolygonOptimizer {
    pivots: Vec<usize>,
    constraints: [PixelPoint; 2],
}

impl PolygonOptimizer {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the minimal-vertex polygon for `contour`.
    ///
    /// Contours with fewer than four points, or whose unit steps never
    /// head in all four directions (zero-area back-and-forth rings), pass
    /// through unchanged.
    #[must_use]
    pub fn optimize(&mut self, contour: &Contour) -> Polygon {
        if contour.len() < 4 || !turns_all_ways(contour.ring()) {
            return Polygon::new(
                contour.id,
                contour.kind,
                contour.order,
                contour.points().to_vec(),
            );
        }
        let ring = contour.ring();
        self.compute_pivots(ring);
        let indices = self.best_polygon(ring.len());
        let points: Vec<PixelPoint> = indices.iter().map(|&i| ring[i]).collect();
        debug!(
            kind = %contour.kind,
            id = %contour.id,
            contour_points = contour.len(),
            vertices = points.len() - 1,
            "optimized polygon"
        );
        Polygon::new(contour.id, contour.kind, contour.order, points)
    }

    /// Pivot table of the most recently optimized ring.
    #[must_use]
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    fn compute_pivots(&mut self, ring: &[PixelPoint]) {
        let n = ring.len();
        self.pivots.clear();
        self.pivots.reserve(n);
        for i in 0..n {
            let pivot = self.pivot_from(ring, i);
            self.pivots.push(pivot);
        }
    }

    /// First vertex after `i` that breaks straightness.
    fn pivot_from(&mut self, ring: &[PixelPoint], i: usize) -> usize {
        let n = ring.len();
        self.constraints = [PixelPoint::new(0, 0); 2];
        let mut seen = [false; 4];
        let mut e = (i + 1) % n;
        for _ in 0..n {
            let d = ring[e].sub(ring[i]);
            let [c0, c1] = self.constraints;
            let mut done = cross_grid(c0, d) < 0 || cross_grid(c1, d) > 0;
            if d.x.abs() > 1 || d.y.abs() > 1 {
                self.tighten(d);
            }
            if let Some(dir) = step_index(ring[prev(e, n)], ring[e]) {
                seen[dir] = true;
            }
            done |= seen.iter().all(|&s| s);
            if done {
                return e;
            }
            e = (e + 1) % n;
        }
        // Unreachable: `optimize` only gets here for rings that turn all
        // four ways.
        i
    }

    /// Narrow the constraint cone so lines from the origin stay within
    /// half a pixel of `d`.
    fn tighten(&mut self, d: PixelPoint) {
        let [c0, c1] = &mut self.constraints;
        let lower = PixelPoint::new(
            if d.y >= 0 && (d.y > 0 || d.x < 0) {
                d.x + 1
            } else {
                d.x - 1
            },
            if d.x <= 0 && (d.x < 0 || d.y < 0) {
                d.y + 1
            } else {
                d.y - 1
            },
        );
        if cross_grid(*c0, lower) >= 0 {
            *c0 = lower;
        }
        let upper = PixelPoint::new(
            if d.y <= 0 && (d.y < 0 || d.x < 0) {
                d.x + 1
            } else {
                d.x - 1
            },
            if d.x >= 0 && (d.x > 0 || d.y < 0) {
                d.y + 1
            } else {
                d.y - 1
            },
        );
        if cross_grid(*c1, upper) <= 0 {
            *c1 = upper;
        }
    }

    /// Fewest-vertex closed index chain; ties keep the earliest start.
    fn best_polygon(&self, n: usize) -> Vec<usize> {
        let mut best: Option<Vec<usize>> = None;
        for start in 0..n {
            let candidate = self.chain_from(start, n);
            if best.as_ref().is_none_or(|b| candidate.len() < b.len()) {
                best = Some(candidate);
            }
        }
        best.unwrap_or_default()
    }

    /// Greedily chain maximal straight segments from `start` back to
    /// `start`. The result is closed: its last index equals `start`.
    ///
    /// Each segment ends at its last valid end, not the first invalid one.
    fn chain_from(&self, start: usize, n: usize) -> Vec<usize> {
        let mut chain = vec![start];
        let mut seg_start = start;
        loop {
            let mut seg_end = (seg_start + 1) % n;
            while seg_end != start {
                let next = (seg_end + 1) % n;
                if cyclic_distance(seg_start, next, n) > n - 3 {
                    break;
                }
                let before = prev(seg_start, n);
                let after = (next + 1) % n;
                let reach = prev(self.pivots[before], n);
                if cyclic_distance(before, after, n) > cyclic_distance(before, reach, n) {
                    break;
                }
                seg_end = next;
            }
            chain.push(seg_end);
            if seg_end == start {
                return chain;
            }
            seg_start = seg_end;
        }
    }
}

/// Compute the minimal-vertex polygon for one contour.
#[must_use]
pub fn optimize(contour: &Contour) -> Polygon {
    PolygonOptimizer::new().optimize(contour)
}

/// Optimize every contour with one shared session, preserving order.
#[must_use]
pub fn optimize_all(contours: &[Contour]) -> Vec<Polygon> {
    let mut optimizer = PolygonOptimizer::new();
    contours.iter().map(|c| optimizer.optimize(c)).collect()
}
