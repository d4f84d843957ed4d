//! The polygon triangulator seam.
//!
//! The fill passes talk to the triangulator exclusively through the
//! [Triangulator](trait.Triangulator.html) and
//! [TriangulatorSink](trait.TriangulatorSink.html) traits: contours of
//! client-identified vertices go in, triangles of client ids come out,
//! grouped by the winding number of the region they cover. This keeps the
//! classification and packing logic independent of the triangulation
//! algorithm and lets tests drive the passes with a scripted triangulator.
//!
//! [TrapezoidTriangulator](struct.TrapezoidTriangulator.html) is the default
//! implementation: a vertical slab decomposition that handles arbitrary
//! self-intersecting input.

use crate::error::{TriangulateError, TriangulateResult};

use std::cmp::Ordering;
use std::collections::HashMap;

/// The reserved id marking a vertex the triangulator could not resolve.
///
/// Triangles containing it are junked by the consumer.
pub const INVALID_VERTEX_ID: u32 = u32::MAX;

/// A triangulator input vertex: an f64 position and the client id under
/// which the output refers back to it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangulatorVertex {
    pub x: f64,
    pub y: f64,
    pub id: u32,
}

/// One closed input contour.
#[derive(Clone, Debug, Default)]
pub struct TriangulatorContour {
    pub vertices: Vec<TriangulatorVertex>,
    /// When false the contour's edges subdivide the output without
    /// contributing to winding numbers.
    pub affects_winding: bool,
}

/// Receives the triangulator's output.
pub trait TriangulatorSink {
    /// Starts a run of triangles covering a region of winding number
    /// `winding`. Only called for windings accepted by the fill test.
    fn begin_region(&mut self, winding: i32);

    /// Emits one triangle corner; corners arrive in groups of three.
    fn push_vertex(&mut self, id: u32);

    fn end_region(&mut self);

    /// Asks for an id for a vertex the triangulator had to create, as a
    /// weighted combination of up to four source vertices. Unused source
    /// slots hold [INVALID_VERTEX_ID](constant.INVALID_VERTEX_ID.html).
    ///
    /// Returning `INVALID_VERTEX_ID` junks the triangles using the vertex
    /// without aborting the triangulation.
    fn combine(&mut self, position: [f64; 2], sources: [u32; 4], weights: [f64; 4]) -> u32;
}

/// A winding-classifying polygon triangulator.
pub trait Triangulator {
    /// Triangulates the regions of `contours` whose winding number passes
    /// `fill_test`, reporting triangles to `sink`.
    fn triangulate(
        &mut self,
        contours: &[TriangulatorContour],
        fill_test: &dyn Fn(i32) -> bool,
        sink: &mut dyn TriangulatorSink,
    ) -> TriangulateResult;
}

/// Triangulation by vertical slab decomposition.
///
/// The x axis is cut at every edge endpoint and every edge crossing, so that
/// within one slab the active edges span it fully and do not cross. Sorting
/// them by height splits the slab into trapezoids of constant winding
/// number; accepted trapezoids are emitted as two triangles each. Vertices
/// created on edge interiors are cached per edge and x, which keeps
/// neighboring trapezoids watertight.
#[derive(Clone, Debug, Default)]
pub struct TrapezoidTriangulator {}

impl TrapezoidTriangulator {
    pub fn new() -> Self {
        TrapezoidTriangulator {}
    }
}

struct Edge {
    x0: f64,
    y0: f64,
    id0: u32,
    x1: f64,
    y1: f64,
    id1: u32,
    /// Contribution to the winding number of the region above the edge:
    /// +1 when the source edge points towards +x, -1 towards -x, 0 for
    /// non-winding contours.
    winding: i32,
}

impl Edge {
    fn y_at(&self, x: f64) -> f64 {
        let t = (x - self.x0) / (self.x1 - self.x0);
        self.y0 + t * (self.y1 - self.y0)
    }

    fn slope(&self) -> f64 {
        (self.y1 - self.y0) / (self.x1 - self.x0)
    }
}

/// The x of the sign change of the vertical distance between two edges on
/// their common x interval, if there is one in its interior.
fn crossing_x(a: &Edge, b: &Edge) -> Option<f64> {
    let lo = a.x0.max(b.x0);
    let hi = a.x1.min(b.x1);
    if !(hi > lo) {
        return None;
    }

    let d_lo = b.y_at(lo) - a.y_at(lo);
    let d_hi = b.y_at(hi) - a.y_at(hi);
    if d_lo == 0.0 || d_hi == 0.0 || (d_lo < 0.0) == (d_hi < 0.0) {
        return None;
    }

    let t = d_lo / (d_lo - d_hi);
    Some(lo + t * (hi - lo))
}

/// The id of the point of `edge` at `x`: an endpoint id where `x` matches an
/// endpoint, otherwise a combined vertex interned in `cache` so that every
/// trapezoid touching this point sees the same id.
fn resolve_corner(
    edge: &Edge,
    edge_index: usize,
    x: f64,
    cache: &mut HashMap<(usize, u64), u32>,
    sink: &mut dyn TriangulatorSink,
) -> u32 {
    if x == edge.x0 {
        return edge.id0;
    }
    if x == edge.x1 {
        return edge.id1;
    }

    let key = (edge_index, x.to_bits());
    if let Some(id) = cache.get(&key) {
        return *id;
    }

    let t = (x - edge.x0) / (edge.x1 - edge.x0);
    let id = sink.combine(
        [x, edge.y_at(x)],
        [edge.id0, edge.id1, INVALID_VERTEX_ID, INVALID_VERTEX_ID],
        [1.0 - t, t, 0.0, 0.0],
    );
    cache.insert(key, id);
    id
}

impl Triangulator for TrapezoidTriangulator {
    fn triangulate(
        &mut self,
        contours: &[TriangulatorContour],
        fill_test: &dyn Fn(i32) -> bool,
        sink: &mut dyn TriangulatorSink,
    ) -> TriangulateResult {
        let mut total_vertices = 0usize;
        for contour in contours {
            for v in &contour.vertices {
                if !v.x.is_finite() || !v.y.is_finite() {
                    return Err(TriangulateError::NonFinitePosition);
                }
            }
            total_vertices += contour.vertices.len();
        }
        if total_vertices >= INVALID_VERTEX_ID as usize {
            return Err(TriangulateError::TooManyVertices);
        }

        // Vertical edges lie on slab boundaries and bound no trapezoid; a
        // downward ray never crosses them either, so they are dropped up
        // front (their endpoints still produce events through the
        // neighboring edges).
        let mut edges = Vec::new();
        for contour in contours {
            let n = contour.vertices.len();
            if n < 2 {
                continue;
            }
            for i in 0..n {
                let a = &contour.vertices[i];
                let b = &contour.vertices[(i + 1) % n];
                if a.x == b.x {
                    continue;
                }
                let winding = if !contour.affects_winding {
                    0
                } else if b.x > a.x {
                    1
                } else {
                    -1
                };
                let (l, r) = if a.x < b.x { (a, b) } else { (b, a) };
                edges.push(Edge {
                    x0: l.x,
                    y0: l.y,
                    id0: l.id,
                    x1: r.x,
                    y1: r.y,
                    id1: r.id,
                    winding,
                });
            }
        }

        let mut events = Vec::with_capacity(edges.len() * 2);
        for e in &edges {
            events.push(e.x0);
            events.push(e.x1);
        }
        for i in 0..edges.len() {
            for j in i + 1..edges.len() {
                if let Some(x) = crossing_x(&edges[i], &edges[j]) {
                    events.push(x);
                }
            }
        }
        // All finite, checked above.
        events.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        events.dedup();

        let mut corner_cache: HashMap<(usize, u64), u32> = HashMap::new();
        let mut active: Vec<usize> = Vec::new();

        for pair in events.windows(2) {
            let (x0, x1) = (pair[0], pair[1]);
            let xm = 0.5 * (x0 + x1);

            active.clear();
            active.extend(
                edges
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.x0 <= x0 && e.x1 >= x1)
                    .map(|(i, _)| i),
            );
            active.sort_by(|&i, &j| {
                let yi = edges[i].y_at(xm);
                let yj = edges[j].y_at(xm);
                yi.partial_cmp(&yj)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| {
                        edges[i]
                            .slope()
                            .partial_cmp(&edges[j].slope())
                            .unwrap_or(Ordering::Equal)
                    })
            });

            // The region below the lowest active edge is unbounded and has
            // winding zero; each edge goes from the winding below it to the
            // winding above it.
            let mut winding = 0;
            for k in 0..active.len().saturating_sub(1) {
                let lower = &edges[active[k]];
                winding += lower.winding;
                if !fill_test(winding) {
                    continue;
                }
                let upper_index = active[k + 1];
                let upper = &edges[upper_index];

                let c00 = resolve_corner(lower, active[k], x0, &mut corner_cache, sink);
                let c10 = resolve_corner(lower, active[k], x1, &mut corner_cache, sink);
                let c01 = resolve_corner(upper, upper_index, x0, &mut corner_cache, sink);
                let c11 = resolve_corner(upper, upper_index, x1, &mut corner_cache, sink);

                sink.begin_region(winding);
                for id in &[c00, c10, c11, c00, c11, c01] {
                    sink.push_vertex(*id);
                }
                sink.end_region();
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records triangles with the winding of their region, giving combined
    /// vertices fresh ids past the input ids.
    struct RecordingSink {
        positions: Vec<[f64; 2]>,
        current_winding: i32,
        pending: Vec<u32>,
        triangles: Vec<([u32; 3], i32)>,
    }

    impl RecordingSink {
        fn new(positions: Vec<[f64; 2]>) -> Self {
            RecordingSink {
                positions,
                current_winding: 0,
                pending: Vec::new(),
                triangles: Vec::new(),
            }
        }

        fn area(&self) -> f64 {
            let mut area = 0.0;
            for (tri, _) in &self.triangles {
                let p0 = self.positions[tri[0] as usize];
                let p1 = self.positions[tri[1] as usize];
                let p2 = self.positions[tri[2] as usize];
                let v = [p1[0] - p0[0], p1[1] - p0[1]];
                let w = [p2[0] - p0[0], p2[1] - p0[1]];
                area += (v[0] * w[1] - v[1] * w[0]).abs() * 0.5;
            }
            area
        }
    }

    impl TriangulatorSink for RecordingSink {
        fn begin_region(&mut self, winding: i32) {
            self.current_winding = winding;
        }

        fn push_vertex(&mut self, id: u32) {
            self.pending.push(id);
            if self.pending.len() == 3 {
                self.triangles.push((
                    [self.pending[0], self.pending[1], self.pending[2]],
                    self.current_winding,
                ));
                self.pending.clear();
            }
        }

        fn end_region(&mut self) {
            assert!(self.pending.is_empty());
        }

        fn combine(&mut self, position: [f64; 2], sources: [u32; 4], weights: [f64; 4]) -> u32 {
            // Spot check the weighted combination against the position.
            let mut x = 0.0;
            let mut y = 0.0;
            for i in 0..4 {
                if sources[i] != INVALID_VERTEX_ID {
                    x += weights[i] * self.positions[sources[i] as usize][0];
                    y += weights[i] * self.positions[sources[i] as usize][1];
                }
            }
            assert!((x - position[0]).abs() < 1e-9);
            assert!((y - position[1]).abs() < 1e-9);

            let id = self.positions.len() as u32;
            self.positions.push(position);
            id
        }
    }

    fn contour(points: &[[f64; 2]], first_id: u32) -> TriangulatorContour {
        TriangulatorContour {
            vertices: points
                .iter()
                .enumerate()
                .map(|(i, p)| TriangulatorVertex {
                    x: p[0],
                    y: p[1],
                    id: first_id + i as u32,
                })
                .collect(),
            affects_winding: true,
        }
    }

    fn square(min: f64, max: f64, first_id: u32) -> TriangulatorContour {
        contour(
            &[[min, min], [max, min], [max, max], [min, max]],
            first_id,
        )
    }

    fn positions(contours: &[TriangulatorContour]) -> Vec<[f64; 2]> {
        let mut out = Vec::new();
        for c in contours {
            for v in &c.vertices {
                assert_eq!(v.id as usize, out.len());
                out.push([v.x, v.y]);
            }
        }
        out
    }

    #[test]
    fn ccw_square() {
        let contours = vec![square(0.0, 1.0, 0)];
        let mut sink = RecordingSink::new(positions(&contours));
        TrapezoidTriangulator::new()
            .triangulate(&contours, &|w| w != 0, &mut sink)
            .unwrap();

        assert_eq!(sink.triangles.len(), 2);
        assert_eq!(sink.area(), 1.0);
        for (_, w) in &sink.triangles {
            assert_eq!(*w, 1);
        }
    }

    #[test]
    fn cw_square_has_negative_winding() {
        let mut contours = vec![square(0.0, 1.0, 0)];
        // Grab positions while ids are still in insertion order.
        let pts = positions(&contours);
        contours[0].vertices.reverse();
        let mut sink = RecordingSink::new(pts);
        TrapezoidTriangulator::new()
            .triangulate(&contours, &|w| w == -1, &mut sink)
            .unwrap();

        assert_eq!(sink.area(), 1.0);
        for (_, w) in &sink.triangles {
            assert_eq!(*w, -1);
        }
    }

    #[test]
    fn overlapping_squares() {
        let mut contours = vec![square(0.0, 2.0, 0)];
        contours.push(square(1.0, 3.0, 4));
        // Shift the second square down so that its edges cross the first
        // square's interior rather than only touching corners.
        for v in &mut contours[1].vertices {
            v.y -= 1.0;
        }

        let mut sink = RecordingSink::new(positions(&contours));
        TrapezoidTriangulator::new()
            .triangulate(&contours, &|w| w == 2, &mut sink)
            .unwrap();
        // The overlap is [1,2] x [0,2].
        assert_eq!(sink.area(), 2.0);

        let mut sink = RecordingSink::new(positions(&contours));
        TrapezoidTriangulator::new()
            .triangulate(&contours, &|w| w != 0, &mut sink)
            .unwrap();
        // Union of two 2x2 squares overlapping in a 1x2 band.
        assert_eq!(sink.area(), 6.0);
    }

    #[test]
    fn non_winding_contour_subdivides_without_winding() {
        let mut contours = vec![square(0.0, 2.0, 0), square(0.5, 1.5, 4)];
        contours[1].affects_winding = false;

        let mut sink = RecordingSink::new(positions(&contours));
        TrapezoidTriangulator::new()
            .triangulate(&contours, &|w| w != 0, &mut sink)
            .unwrap();

        // The inner box splits the area into more trapezoids but every
        // region still has winding 1.
        assert_eq!(sink.area(), 4.0);
        for (_, w) in &sink.triangles {
            assert_eq!(*w, 1);
        }
        assert!(sink.triangles.len() > 2);
    }

    #[test]
    fn self_intersecting_bowtie() {
        // Figure-eight: two triangles of opposite winding.
        let contours = vec![contour(
            &[[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 2.0]],
            0,
        )];

        let mut sink = RecordingSink::new(positions(&contours));
        TrapezoidTriangulator::new()
            .triangulate(&contours, &|w| w != 0, &mut sink)
            .unwrap();
        // Two unit-area lobes meeting at the center crossing.
        assert_eq!(sink.area(), 2.0);

        let windings: std::collections::BTreeSet<i32> =
            sink.triangles.iter().map(|(_, w)| *w).collect();
        assert_eq!(windings.into_iter().collect::<Vec<_>>(), vec![-1, 1]);
    }

    #[test]
    fn rejects_non_finite_input() {
        let contours = vec![contour(&[[0.0, 0.0], [f64::NAN, 1.0], [1.0, 0.0]], 0)];
        let mut sink = RecordingSink::new(vec![[0.0, 0.0]; 3]);
        let result = TrapezoidTriangulator::new().triangulate(&contours, &|w| w != 0, &mut sink);
        assert_eq!(result, Err(TriangulateError::NonFinitePosition));
    }

    #[test]
    fn empty_input() {
        let mut sink = RecordingSink::new(Vec::new());
        TrapezoidTriangulator::new()
            .triangulate(&[], &|w| w != 0, &mut sink)
            .unwrap();
        assert!(sink.triangles.is_empty());
    }
}
