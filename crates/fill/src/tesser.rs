//! The two triangulation passes over a sub-path.
//!
//! The non-zero pass triangulates every region with a non-zero local winding
//! number, bucketing triangles by their true winding (local winding plus the
//! sub-path's winding offset). The zero pass adds a clockwise contour around
//! the sub-path bounds, so that regions not covered by any contour get
//! winding -1, and collects exactly those; their true winding is the
//! sub-path's winding offset. Together the passes cover the whole bounds, so
//! every winding number, including zero, has its triangles.
//!
//! Accepted triangles are subdivided into six (edge midpoints plus
//! centroid) before being recorded. The interior vertices belong only to
//! this winding number's triangles, which later gives the anti-alias
//! coverage computation vertices that are unambiguously inside the region.

use crate::coordinates::BOX_DIM;
use crate::hoard::{IdContours, PointHoard};
use crate::math::Point;
use crate::subpath::{SubPath, MAX_X_FLAG, MAX_Y_FLAG};
use crate::triangulate::{
    Triangulator, TriangulatorContour, TriangulatorSink, TriangulatorVertex, INVALID_VERTEX_ID,
};

use std::collections::BTreeMap;

/// Triangle indices accumulated per true winding number.
pub(crate) type WindingIndexHoard = BTreeMap<i32, Vec<u32>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PassKind {
    NonZero,
    Zero,
}

/// Walk order of box corners: min_x_min_y, min_x_max_y, max_x_max_y,
/// max_x_min_y. Clockwise, so a lap contributes -1 to the winding of its
/// interior.
const CORNER_WALK: [u8; 4] = [0, MAX_Y_FLAG, MAX_X_FLAG | MAX_Y_FLAG, MAX_X_FLAG];

/// Runs one pass, appending triangle indices to `hoard` and winding numbers
/// to the points' winding sets. Returns true if triangulation failed in a
/// way that junked triangles.
pub(crate) fn run_pass(
    kind: PassKind,
    triangulator: &mut dyn Triangulator,
    points: &mut PointHoard,
    sub_path: &SubPath,
    input: &IdContours,
    hoard: &mut WindingIndexHoard,
) -> bool {
    let winding_start = sub_path.winding_start();
    let mut point_count: u32 = 0;
    let mut contours = Vec::with_capacity(input.contours.len() + input.guiding_boxes.len() + 1);

    for ids in &input.contours {
        let mut vertices = Vec::with_capacity(ids.len());
        for id in ids {
            let p = points.converter().apply(points.position(*id), point_count);
            point_count += 1;
            vertices.push(TriangulatorVertex {
                x: p[0],
                y: p[1],
                id: *id,
            });
        }
        contours.push(TriangulatorContour {
            vertices,
            affects_winding: true,
        });
    }

    for corners in &input.guiding_boxes {
        let slack = f64::from(point_count) * points.converter().fudge_delta();
        point_count += 1;

        let mut vertices = Vec::with_capacity(4);
        for k in &CORNER_WALK {
            let id = corners[*k as usize];
            let mut p = points.converter().apply(points.position(id), 0);
            p[0] += if k & MAX_X_FLAG != 0 { slack } else { -slack };
            p[1] += if k & MAX_Y_FLAG != 0 { slack } else { -slack };
            vertices.push(TriangulatorVertex {
                x: p[0],
                y: p[1],
                id,
            });
        }
        contours.push(TriangulatorContour {
            vertices,
            affects_winding: false,
        });
    }

    if kind == PassKind::Zero {
        // The bucket exists even when the pass produces nothing, so that
        // downstream code can always locate the zero-coverage winding.
        hoard.entry(winding_start).or_default();

        let bounds = *sub_path.bounds();
        let slack = f64::from(point_count) * points.converter().fudge_delta();
        let mut vertices = Vec::with_capacity(4);
        for k in &CORNER_WALK {
            let x = if k & MAX_X_FLAG != 0 {
                BOX_DIM + slack
            } else {
                -slack
            };
            let y = if k & MAX_Y_FLAG != 0 {
                BOX_DIM + slack
            } else {
                -slack
            };
            let p = Point::new(
                if k & MAX_X_FLAG != 0 { bounds.max.x } else { bounds.min.x },
                if k & MAX_Y_FLAG != 0 { bounds.max.y } else { bounds.min.y },
            );
            let id = points.fetch(p);
            vertices.push(TriangulatorVertex { x, y, id });
        }
        contours.push(TriangulatorContour {
            vertices,
            affects_winding: true,
        });
    }

    let mut sink = FillSink {
        points,
        hoard,
        kind,
        winding_start,
        current_winding: 0,
        temp: [INVALID_VERTEX_ID; 3],
        temp_count: 0,
        failed: false,
    };

    let result = match kind {
        PassKind::NonZero => triangulator.triangulate(&contours, &|w| w != 0, &mut sink),
        PassKind::Zero => triangulator.triangulate(&contours, &|w| w == -1, &mut sink),
    };

    let mut failed = sink.failed;
    if let Err(e) = result {
        log::warn!("triangulation aborted: {}", e);
        failed = true;
    }
    failed
}

struct FillSink<'l> {
    points: &'l mut PointHoard,
    hoard: &'l mut WindingIndexHoard,
    kind: PassKind,
    winding_start: i32,
    current_winding: i32,
    temp: [u32; 3],
    temp_count: usize,
    failed: bool,
}

impl<'l> FillSink<'l> {
    /// Only a triangle with zero area in f32 arithmetic is rejected;
    /// anything wider survives.
    fn non_degenerate(&self) -> bool {
        let [a, b, c] = self.temp;
        if a == b || a == c || b == c {
            return false;
        }

        let p0 = self.points.position(a);
        let p1 = self.points.position(b);
        let p2 = self.points.position(c);
        if p0 == p1 || p0 == p2 || p1 == p2 {
            return false;
        }

        let v = p1 - p0;
        let w = p2 - p0;
        (v.x * w.y - v.y * w.x).abs() > 0.0
    }

    fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        let w = self.current_winding;
        self.points.add_winding(a, w);
        self.points.add_winding(b, w);
        self.points.add_winding(c, w);
        self.hoard
            .entry(w)
            .or_default()
            .extend_from_slice(&[a, b, c]);
    }

    fn flush_triangle(&mut self) {
        let [v0, v1, v2] = self.temp;
        if v0 == INVALID_VERTEX_ID || v1 == INVALID_VERTEX_ID || v2 == INVALID_VERTEX_ID {
            return;
        }
        if !self.non_degenerate() {
            return;
        }

        let p0 = self.points.position(v0);
        let p1 = self.points.position(v1);
        let p2 = self.points.position(v2);
        let m01 = (p0 + p1.to_vector()) * 0.5;
        let m02 = (p0 + p2.to_vector()) * 0.5;
        let m12 = (p1 + p2.to_vector()) * 0.5;
        let centroid = (p0 + p1.to_vector() + p2.to_vector()) / 3.0;

        let i01 = self.points.fetch(m01);
        let i02 = self.points.fetch(m02);
        let i12 = self.points.fetch(m12);
        let ic = self.points.fetch(centroid);

        self.add_triangle(v0, i01, ic);
        self.add_triangle(v0, ic, i02);
        self.add_triangle(ic, v1, i12);
        self.add_triangle(i01, v1, ic);
        self.add_triangle(i02, ic, v2);
        self.add_triangle(ic, i12, v2);
    }
}

impl<'l> TriangulatorSink for FillSink<'l> {
    fn begin_region(&mut self, winding: i32) {
        self.current_winding = match self.kind {
            PassKind::NonZero => winding + self.winding_start,
            PassKind::Zero => {
                debug_assert_eq!(winding, -1);
                self.winding_start
            }
        };
        self.temp_count = 0;
    }

    fn push_vertex(&mut self, id: u32) {
        if id == INVALID_VERTEX_ID {
            self.failed = true;
        }
        self.temp[self.temp_count] = id;
        self.temp_count += 1;
        if self.temp_count == 3 {
            self.temp_count = 0;
            self.flush_triangle();
        }
    }

    fn end_region(&mut self) {}

    fn combine(&mut self, _position: [f64; 2], sources: [u32; 4], weights: [f64; 4]) -> u32 {
        let mut pt = Point::zero();
        for i in 0..4 {
            if sources[i] != INVALID_VERTEX_ID {
                pt += self.points.position(sources[i]).to_vector() * weights[i] as f32;
            }
        }
        self.points.fetch(pt)
    }
}
