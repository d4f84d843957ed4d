//! The flattened path data structure.

use crate::math::{Box2D, Point};

use std::mem;
use std::ops::Range;

#[derive(Clone, Debug)]
struct ContourInfo {
    range: Range<usize>,
}

/// A flattened path: an immutable, ordered collection of closed contours.
///
/// Each contour is an ordered sequence of 2D points. Contours are always
/// treated as closed (the edge from the last point back to the first is
/// implicit). Each point carries a flag marking whether it begins a new
/// tessellated edge of the source geometry, which some consumers use to
/// localize auxiliary structures.
#[derive(Clone, Debug, Default)]
pub struct Path {
    points: Vec<Point>,
    edge_starts: Vec<bool>,
    contours: Vec<ContourInfo>,
}

impl Path {
    pub fn new() -> Self {
        Path::default()
    }

    pub fn builder() -> PathBuilder {
        PathBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_contours(&self) -> usize {
        self.contours.len()
    }

    pub fn contour(&self, index: usize) -> Contour {
        let range = self.contours[index].range.clone();
        Contour {
            points: &self.points[range.clone()],
            edge_starts: &self.edge_starts[range],
        }
    }

    pub fn contours(&self) -> Contours {
        Contours { path: self, idx: 0 }
    }

    /// The axis-aligned bounding box of all points, or `None` for an empty path.
    pub fn bounding_box(&self) -> Option<Box2D> {
        if self.points.is_empty() {
            return None;
        }

        let mut min = self.points[0];
        let mut max = self.points[0];
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Some(Box2D { min, max })
    }
}

/// A view over one closed contour of a [Path](struct.Path.html).
#[derive(Copy, Clone, Debug)]
pub struct Contour<'l> {
    points: &'l [Point],
    edge_starts: &'l [bool],
}

impl<'l> Contour<'l> {
    pub fn points(&self) -> &'l [Point] {
        self.points
    }

    /// Whether the point at `index` begins a tessellated edge.
    pub fn is_edge_start(&self, index: usize) -> bool {
        self.edge_starts[index]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// An iterator over the contours of a path.
pub struct Contours<'l> {
    path: &'l Path,
    idx: usize,
}

impl<'l> Iterator for Contours<'l> {
    type Item = Contour<'l>;
    fn next(&mut self) -> Option<Contour<'l>> {
        if self.idx >= self.path.num_contours() {
            return None;
        }
        let c = self.path.contour(self.idx);
        self.idx += 1;
        Some(c)
    }
}

/// Builds a [Path](struct.Path.html) contour by contour.
#[derive(Default)]
pub struct PathBuilder {
    points: Vec<Point>,
    edge_starts: Vec<bool>,
    contours: Vec<ContourInfo>,
    contour_start: usize,
}

impl PathBuilder {
    pub fn new() -> Self {
        PathBuilder::default()
    }

    /// Starts a new contour at `to`.
    ///
    /// If a contour was in progress it is closed first.
    pub fn begin(&mut self, to: Point) {
        nan_check(to);
        self.end_contour();
        self.points.push(to);
        self.edge_starts.push(true);
    }

    /// Adds a line segment to the current contour.
    pub fn line_to(&mut self, to: Point) {
        nan_check(to);
        debug_assert!(
            self.points.len() > self.contour_start,
            "line_to before begin"
        );
        self.points.push(to);
        self.edge_starts.push(false);
    }

    /// Like `line_to`, additionally marking the start of a new tessellated
    /// edge of the source geometry.
    pub fn edge_to(&mut self, to: Point) {
        nan_check(to);
        debug_assert!(
            self.points.len() > self.contour_start,
            "edge_to before begin"
        );
        self.points.push(to);
        self.edge_starts.push(true);
    }

    /// Closes the current contour.
    pub fn close(&mut self) {
        self.end_contour();
    }

    /// Adds a whole closed contour at once.
    pub fn polygon(&mut self, points: &[Point]) {
        if points.is_empty() {
            return;
        }
        self.begin(points[0]);
        for p in &points[1..] {
            self.line_to(*p);
        }
        self.close();
    }

    pub fn build(mut self) -> Path {
        self.end_contour();
        Path {
            points: self.points,
            edge_starts: self.edge_starts,
            contours: self.contours,
        }
    }

    pub fn build_and_reset(&mut self) -> Path {
        self.end_contour();
        self.contour_start = 0;
        Path {
            points: mem::take(&mut self.points),
            edge_starts: mem::take(&mut self.edge_starts),
            contours: mem::take(&mut self.contours),
        }
    }

    fn end_contour(&mut self) {
        let end = self.points.len();
        if self.contour_start != end {
            self.contours.push(ContourInfo {
                range: self.contour_start..end,
            });
        }
        self.contour_start = end;
    }
}

#[inline]
fn nan_check(p: Point) {
    debug_assert!(p.x.is_finite());
    debug_assert!(p.y.is_finite());
}
