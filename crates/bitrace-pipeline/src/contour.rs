//! Contour tracing: walk the foreground/background boundaries of a
//! [`Bitmap`].
//!
//! Boundaries run along the pixel-corner grid. Each walk keeps
//! foreground on its left-hand side when viewed with y pointing down, so
//! outer contours and holes come out with opposite winding.
//!
//! After a boundary closes, every row segment to the right of each of
//! its vertical edges is inverted in a working copy of the bitmap. This
//! clears the traced region and exposes any holes inside it as
//! foreground, so the row-major scan picks each boundary up exactly once.

use tracing::debug;

use crate::bitmap::Bitmap;
use crate::types::{Contour, ContourId, ContourKind, PipelineError, PixelPoint};

/// Heading of the boundary walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Right,
    Up,
    Left,
    Down,
}

impl Direction {
    const fn turn_right(self) -> Self {
        match self {
            Self::Right => Self::Down,
            Self::Up => Self::Right,
            Self::Left => Self::Up,
            Self::Down => Self::Left,
        }
    }

    const fn turn_left(self) -> Self {
        match self {
            Self::Right => Self::Up,
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
        }
    }

    const fn reverse(self) -> Self {
        self.turn_left().turn_left()
    }

    /// Candidate order: right turn, straight, left turn, back.
    const fn candidates(self) -> [Self; 4] {
        [self.turn_right(), self, self.turn_left(), self.reverse()]
    }

    const fn step(self, p: PixelPoint) -> PixelPoint {
        match self {
            Self::Right => PixelPoint::new(p.x + 1, p.y),
            Self::Up => PixelPoint::new(p.x, p.y - 1),
            Self::Left => PixelPoint::new(p.x - 1, p.y),
            Self::Down => PixelPoint::new(p.x, p.y + 1),
        }
    }

    /// Whether the edge leaving `v` in this direction separates
    /// background (right-hand side) from foreground (left-hand side).
    fn is_open(self, bitmap: &Bitmap, v: PixelPoint) -> bool {
        let up_left = bitmap.is_foreground(v.x - 1, v.y - 1);
        let up = bitmap.is_foreground(v.x, v.y - 1);
        let left = bitmap.is_foreground(v.x - 1, v.y);
        let down = bitmap.is_foreground(v.x, v.y);
        match self {
            Self::Right => !down && up,
            Self::Up => !up && up_left,
            Self::Left => !up_left && left,
            Self::Down => !left && down,
        }
    }
}

/// Outer and inner contours of one trace, each indexed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracedContours {
    /// Boundaries of foreground regions.
    pub outer: Vec<Contour>,
    /// Boundaries of holes.
    pub inner: Vec<Contour>,
}

impl TracedContours {
    /// Total number of contours of both kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outer.len() + self.inner.len()
    }

    /// Returns `true` if no boundary was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outer.is_empty() && self.inner.is_empty()
    }
}

/// A single tracing session over one bitmap.
///
/// Owns the mutable working copy and the walk orientation, which carries
/// over from one contour to the next. Sessions are independent; run one
/// per bitmap.
#[derive(Debug)]
pub struct ContourTracer<'a> {
    source: &'a Bitmap,
    working: Bitmap,
    orientation: Direction,
    max_steps: usize,
    traced: TracedContours,
}

impl<'a> ContourTracer<'a> {
    /// Start a session over `source`.
    #[must_use]
    pub fn new(source: &'a Bitmap) -> Self {
        let w = source.width() as usize;
        let h = source.height() as usize;
        // Every grid edge is walked at most once per contour.
        let max_steps = w * (h + 1) + (w + 1) * h;
        Self {
            source,
            working: source.clone(),
            orientation: Direction::Right,
            max_steps,
            traced: TracedContours::default(),
        }
    }

    /// Scan the bitmap and trace every boundary.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::TraceDiverged`] if a walk fails to return
    /// to its start vertex within the grid's edge count.
    pub fn run(mut self) -> Result<TracedContours, PipelineError> {
        let width = self.working.width().cast_signed();
        let height = self.working.height().cast_signed();
        for y in 0..height {
            for x in 0..width {
                if self.working.is_foreground(x, y) && !self.working.is_foreground(x - 1, y) {
                    let kind =
                        if self.source.is_foreground(x, y) && !self.source.is_foreground(x - 1, y) {
                            ContourKind::Outer
                        } else {
                            ContourKind::Inner
                        };
                    let points = self.follow(PixelPoint::new(x, y))?;
                    self.invert_interior(&points);
                    self.push(kind, points);
                }
            }
        }
        Ok(self.traced)
    }

    fn follow(&mut self, start: PixelPoint) -> Result<Vec<PixelPoint>, PipelineError> {
        let diverged = PipelineError::TraceDiverged {
            x: start.x,
            y: start.y,
        };
        let mut points = vec![start];
        let mut current = start;
        for _ in 0..self.max_steps {
            let Some(direction) = self
                .orientation
                .candidates()
                .into_iter()
                .find(|d| d.is_open(&self.working, current))
            else {
                return Err(diverged);
            };
            self.orientation = direction;
            current = direction.step(current);
            points.push(current);
            if current == start {
                return Ok(points);
            }
        }
        Err(diverged)
    }

    fn invert_interior(&mut self, points: &[PixelPoint]) {
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.y != b.y {
                self.working.invert_row_from(a.x, a.y.min(b.y));
            }
        }
    }

    fn push(&mut self, kind: ContourKind, points: Vec<PixelPoint>) {
        let order = self.traced.len();
        let list = match kind {
            ContourKind::Outer => &mut self.traced.outer,
            ContourKind::Inner => &mut self.traced.inner,
        };
        let id = ContourId(list.len());
        debug!(%kind, %id, order, points = points.len(), "traced contour");
        list.push(Contour::new(id, kind, order, points));
    }
}

/// Trace all outer and inner contours of `bitmap`.
///
/// A [`Bitmap`] is non-empty and two-valued by construction, so invalid
/// rasters are rejected earlier by [`Bitmap::new`] and
/// [`Bitmap::from_gray`].
///
/// # Errors
///
/// Returns [`PipelineError::TraceDiverged`] if a boundary walk does not
/// close.
pub fn trace(bitmap: &Bitmap) -> Result<TracedContours, PipelineError> {
    ContourTracer::new(bitmap).run()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn pts(coords: &[(i32, i32)]) -> Vec<PixelPoint> {
        coords.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect()
    }

    /// Deterministic xorshift bitmap generator for property tests.
    pub(crate) fn random_bitmaps(count: usize) -> Vec<Bitmap> {
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        (0..count)
            .map(|_| {
                let w = (next() % 7 + 1) as u32;
                let h = (next() % 7 + 1) as u32;
                let density = next() % 4 + 1;
                let pixels = (0..w * h).map(|_| next() % 5 < density).collect();
                Bitmap::new(w, h, pixels).unwrap()
            })
            .collect()
    }

    #[test]
    fn square_traces_to_one_outer_contour() {
        let bitmap = Bitmap::from_art(&[".....", ".###.", ".###.", ".###.", "....."]);
        let traced = trace(&bitmap).unwrap();
        assert_eq!(traced.outer.len(), 1);
        assert!(traced.inner.is_empty());
        let contour = &traced.outer[0];
        assert_eq!(contour.id, ContourId(0));
        assert_eq!(contour.kind, ContourKind::Outer);
        assert_eq!(
            contour.points(),
            pts(&[
                (1, 1),
                (1, 2),
                (1, 3),
                (1, 4),
                (2, 4),
                (3, 4),
                (4, 4),
                (4, 3),
                (4, 2),
                (4, 1),
                (3, 1),
                (2, 1),
                (1, 1),
            ])
        );
        assert_eq!(contour.ring().len(), 12);
    }

    #[test]
    fn square_with_hole_yields_outer_and_inner() {
        let bitmap = Bitmap::from_art(&[".....", ".###.", ".#.#.", ".###.", "....."]);
        let traced = trace(&bitmap).unwrap();
        assert_eq!(traced.outer.len(), 1);
        assert_eq!(traced.inner.len(), 1);
        assert_eq!(traced.outer[0].id, ContourId(0));
        assert_eq!(traced.inner[0].id, ContourId(0));
        assert_eq!(traced.outer[0].len(), 13);
        assert_eq!(
            traced.inner[0].points(),
            pts(&[(2, 2), (2, 3), (3, 3), (3, 2), (2, 2)])
        );
        assert_eq!(traced.outer[0].order, 0);
        assert_eq!(traced.inner[0].order, 1);
    }

    #[test]
    fn single_pixel() {
        let traced = trace(&Bitmap::from_art(&["#"])).unwrap();
        assert_eq!(
            traced.outer[0].points(),
            pts(&[(0, 0), (0, 1), (1, 1), (1, 0), (0, 0)])
        );
    }

    #[test]
    fn diagonal_pixels_share_one_contour() {
        let traced = trace(&Bitmap::from_art(&["#.", ".#"])).unwrap();
        assert_eq!(traced.outer.len(), 1);
        assert!(traced.inner.is_empty());
        assert_eq!(
            traced.outer[0].points(),
            pts(&[
                (0, 0),
                (0, 1),
                (1, 1),
                (1, 2),
                (2, 2),
                (2, 1),
                (1, 1),
                (1, 0),
                (0, 0),
            ])
        );
    }

    #[test]
    fn row_start_ignores_previous_row_end() {
        // Pixel (0, 1) follows foreground (2, 0) in row-major order but has
        // no left neighbour, so it starts an outer boundary.
        let traced = trace(&Bitmap::from_art(&["..#", "#.."])).unwrap();
        assert!(traced.inner.is_empty());
        assert_eq!(traced.outer.len(), 2);
        assert_eq!(traced.outer[1].id, ContourId(1));
        assert_eq!(traced.outer[1].kind, ContourKind::Outer);
        assert_eq!(
            traced.outer[1].points(),
            pts(&[(0, 1), (0, 2), (1, 2), (1, 1), (0, 1)])
        );
    }

    #[test]
    fn separate_regions_get_dense_ids() {
        let traced = trace(&Bitmap::from_art(&["#..#"])).unwrap();
        assert_eq!(traced.outer.len(), 2);
        assert_eq!(traced.outer[0].id, ContourId(0));
        assert_eq!(traced.outer[1].id, ContourId(1));
        assert_eq!(traced.outer[0].len(), 5);
        assert_eq!(traced.outer[1].len(), 5);
        assert_eq!(traced.outer[1].points()[0], PixelPoint::new(3, 0));
    }

    #[test]
    fn nested_rings_in_discovery_order() {
        let bitmap = Bitmap::from_art(&[
            "#######",
            "#.....#",
            "#.###.#",
            "#.#.#.#",
            "#.###.#",
            "#.....#",
            "#######",
        ]);
        let traced = trace(&bitmap).unwrap();
        let outer: Vec<(usize, usize)> = traced.outer.iter().map(|c| (c.len(), c.order)).collect();
        let inner: Vec<(usize, usize)> = traced.inner.iter().map(|c| (c.len(), c.order)).collect();
        assert_eq!(outer, vec![(29, 0), (13, 2)]);
        assert_eq!(inner, vec![(21, 1), (5, 3)]);
    }

    #[test]
    fn empty_bitmap_has_no_contours() {
        let traced = trace(&Bitmap::from_art(&["...", "..."])).unwrap();
        assert!(traced.is_empty());
    }

    #[test]
    fn source_bitmap_is_untouched() {
        let bitmap = Bitmap::from_art(&["##.", "#.#"]);
        let before = bitmap.clone();
        trace(&bitmap).unwrap();
        assert_eq!(bitmap, before);
    }

    #[test]
    fn random_contours_are_closed_unit_walks() {
        for bitmap in random_bitmaps(500) {
            let traced = trace(&bitmap).unwrap();
            for contour in traced.outer.iter().chain(&traced.inner) {
                let points = contour.points();
                assert!(points.len() >= 5, "contour too short: {points:?}");
                assert_eq!(points.first(), points.last());
                for pair in points.windows(2) {
                    let d = pair[1].sub(pair[0]);
                    assert_eq!(d.x.abs() + d.y.abs(), 1, "non-unit step in {points:?}");
                }
                for p in points {
                    assert!(p.x >= 0 && p.x <= bitmap.width().cast_signed());
                    assert!(p.y >= 0 && p.y <= bitmap.height().cast_signed());
                }
            }
            if bitmap.foreground_count() > 0 {
                assert!(!traced.outer.is_empty());
            }
        }
    }

    #[test]
    fn candidate_order_prefers_right_turn() {
        assert_eq!(
            Direction::Right.candidates(),
            [
                Direction::Down,
                Direction::Right,
                Direction::Up,
                Direction::Left
            ]
        );
        assert_eq!(Direction::Up.reverse(), Direction::Down);
    }
}
