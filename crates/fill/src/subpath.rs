//! Recursive splitting of a path into axis-aligned halves.
//!
//! A `SubPath` is the raw geometry of one region of the subset hierarchy:
//! the contours of the input path clipped to the region's bounding box.
//! Splitting inserts points on the split line; points landing on a box
//! boundary are tagged so that a contour reduced to a lap around the box
//! perimeter can be dropped and replaced by a constant winding offset
//! carried by the region instead.

use crate::math::{Box2D, Point};
use crate::path::Path;
use crate::FillOptions;

pub(crate) const MAX_X_FLAG: u8 = 1;
pub(crate) const MAX_Y_FLAG: u8 = 2;

/// The corner following `v` when walking the box perimeter in the order
/// min_x_min_y, min_x_max_y, max_x_max_y, max_x_min_y.
fn next_corner(v: u8) -> u8 {
    debug_assert!(v <= 3);
    [
        MAX_Y_FLAG,
        0,
        MAX_X_FLAG | MAX_Y_FLAG,
        MAX_X_FLAG,
    ][v as usize]
}

#[inline]
fn axis_value(p: Point, axis: usize) -> f32 {
    if axis == 0 {
        p.x
    } else {
        p.y
    }
}

#[inline]
fn set_axis_value(p: &mut Point, axis: usize, value: f32) {
    if axis == 0 {
        p.x = value;
    } else {
        p.y = value;
    }
}

/// Which boundary of the enclosing box a point lies on, per axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Boundary {
    No,
    Min,
    Max,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct SubContourPoint {
    pub position: Point,
    pub start_edge: bool,
    boundary: [Boundary; 2],
}

impl SubContourPoint {
    fn new(position: Point, start_edge: bool) -> Self {
        SubContourPoint {
            position,
            start_edge,
            boundary: [Boundary::No, Boundary::No],
        }
    }

    /// A point inserted on the split line between `a` and `b`. The flag on
    /// the unsplit axis survives only if both neighbors agree on it.
    fn at_split(
        a: &SubContourPoint,
        b: &SubContourPoint,
        position: Point,
        split_axis: usize,
        side: Boundary,
    ) -> Self {
        let unsplit = 1 - split_axis;
        let mut boundary = [Boundary::No, Boundary::No];
        if a.boundary[unsplit] == b.boundary[unsplit] {
            boundary[unsplit] = a.boundary[unsplit];
        }
        boundary[split_axis] = side;

        SubContourPoint {
            position,
            start_edge: true,
            boundary,
        }
    }

    fn is_corner(&self) -> bool {
        self.boundary[0] != Boundary::No && self.boundary[1] != Boundary::No
    }

    fn corner_type(&self) -> u8 {
        debug_assert!(self.is_corner());
        let mut t = 0;
        if self.boundary[0] == Boundary::Max {
            t |= MAX_X_FLAG;
        }
        if self.boundary[1] == Boundary::Max {
            t |= MAX_Y_FLAG;
        }
        t
    }
}

pub(crate) type SubContour = Vec<SubContourPoint>;

/// The geometry of one region of the hierarchy: the input contours clipped
/// to `bounds`, plus the winding offset accumulated from contours that were
/// collapsed away during splitting.
pub(crate) struct SubPath {
    bounds: Box2D,
    contours: Vec<SubContour>,
    winding_start: i32,
    total_points: usize,
}

impl SubPath {
    pub fn from_path(path: &Path) -> Self {
        let bounds = path
            .bounding_box()
            .unwrap_or_else(|| Box2D::new(Point::zero(), Point::zero()));

        let mut contours = Vec::with_capacity(path.num_contours());
        let mut total_points = 0;
        for src in path.contours() {
            let mut contour = Vec::with_capacity(src.len());
            for (i, p) in src.points().iter().enumerate() {
                contour.push(SubContourPoint::new(*p, src.is_edge_start(i)));
            }
            total_points += contour.len();
            contours.push(contour);
        }

        SubPath {
            bounds,
            contours,
            winding_start: 0,
            total_points,
        }
    }

    fn assemble(bounds: Box2D, contours: Vec<SubContour>, winding_start: i32) -> Self {
        let total_points = contours.iter().map(|c| c.len()).sum();
        SubPath {
            bounds,
            contours,
            winding_start,
            total_points,
        }
    }

    pub fn bounds(&self) -> &Box2D {
        &self.bounds
    }

    pub fn contours(&self) -> &[SubContour] {
        &self.contours
    }

    pub fn winding_start(&self) -> i32 {
        self.winding_start
    }

    pub fn total_points(&self) -> usize {
        self.total_points
    }

    /// Splits in two along the middle of the bounding box.
    pub fn split(&self, options: &FillOptions) -> (SubPath, SubPath) {
        let mid = (self.bounds.min + self.bounds.max.to_vector()) * 0.5;
        let axis = self.choose_split_axis(mid, options.max_aspect_ratio);
        let value = axis_value(mid, axis);

        let mut max0 = self.bounds.max;
        set_axis_value(&mut max0, axis, value);
        let mut min1 = self.bounds.min;
        set_axis_value(&mut min1, axis, value);

        let mut contours0 = Vec::with_capacity(self.contours.len());
        let mut contours1 = Vec::with_capacity(self.contours.len());
        let mut winding0 = self.winding_start;
        let mut winding1 = self.winding_start;

        for contour in &self.contours {
            let (mut c0, mut c1) = split_contour(contour, axis, value);
            winding0 += post_process_sub_contour(&mut c0);
            winding1 += post_process_sub_contour(&mut c1);
            if !c0.is_empty() {
                contours0.push(c0);
            }
            if !c1.is_empty() {
                contours1.push(c1);
            }
        }

        (
            SubPath::assemble(Box2D::new(self.bounds.min, max0), contours0, winding0),
            SubPath::assemble(Box2D::new(min1, self.bounds.max), contours1, winding1),
        )
    }

    /// Picks the axis perpendicular to the split line: the long axis when the
    /// box is elongated past `max_aspect_ratio`, otherwise the axis
    /// minimizing the total number of points in the two children (counting
    /// the points that splitting would insert on crossing edges).
    fn choose_split_axis(&self, mid: Point, max_aspect_ratio: f32) -> usize {
        if max_aspect_ratio > 0.0 {
            let wh = self.bounds.max - self.bounds.min;
            if wh.x >= max_aspect_ratio * wh.y {
                return 0;
            }
            if wh.y >= max_aspect_ratio * wh.x {
                return 1;
            }
        }

        let mut before = [0u32; 2];
        let mut after = [0u32; 2];

        for contour in &self.contours {
            if contour.is_empty() {
                continue;
            }
            let mut prev = contour[contour.len() - 1].position;
            for pt in contour {
                let p = pt.position;
                for i in 0..2 {
                    let m = axis_value(mid, i);
                    let prev_b = axis_value(prev, i) < m;
                    let b = axis_value(p, i) < m;

                    if b || axis_value(p, i) == m {
                        before[i] += 1;
                    }
                    if !b || axis_value(p, i) == m {
                        after[i] += 1;
                    }
                    if axis_value(prev, i) != m && prev_b != b {
                        before[i] += 1;
                        after[i] += 1;
                    }
                }
                prev = p;
            }
        }

        if before[0] + after[0] < before[1] + after[1] {
            0
        } else {
            1
        }
    }
}

fn compute_split_point(a: Point, b: Point, axis: usize, value: f32) -> Point {
    let n = value - axis_value(a, axis);
    let d = axis_value(b, axis) - axis_value(a, axis);
    let t = n / d;

    let aa = axis_value(a, 1 - axis);
    let bb = axis_value(b, 1 - axis);

    let mut result = Point::zero();
    set_axis_value(&mut result, axis, value);
    set_axis_value(&mut result, 1 - axis, (1.0 - t) * aa + t * bb);
    result
}

/// Distributes the points of `src` into the two sides of the split line.
///
/// Membership uses `<=` for the min side and `>=` for the max side, so points
/// exactly on the line belong to both children. Crossing edges get a point
/// inserted on the line, tagged as lying on the max boundary of the min-side
/// child and the min boundary of the max-side child.
fn split_contour(src: &SubContour, axis: usize, value: f32) -> (SubContour, SubContour) {
    let mut c0 = SubContour::new();
    let mut c1 = SubContour::new();

    if src.is_empty() {
        return (c0, c1);
    }

    let mut prev = src[src.len() - 1];
    for pt in src {
        let prev_b0 = axis_value(prev.position, axis) <= value;
        let b0 = axis_value(pt.position, axis) <= value;
        let prev_b1 = axis_value(prev.position, axis) >= value;
        let b1 = axis_value(pt.position, axis) >= value;

        let split_pt = if prev_b0 != b0 || prev_b1 != b1 {
            compute_split_point(prev.position, pt.position, axis, value)
        } else {
            Point::zero()
        };

        if prev_b0 != b0 {
            c0.push(SubContourPoint::at_split(
                &prev,
                pt,
                split_pt,
                axis,
                Boundary::Max,
            ));
        }
        if b0 {
            c0.push(*pt);
        }

        if prev_b1 != b1 {
            c1.push(SubContourPoint::at_split(
                &prev,
                pt,
                split_pt,
                axis,
                Boundary::Min,
            ));
        }
        if b1 {
            c1.push(*pt);
        }

        prev = *pt;
    }

    (c0, c1)
}

/// Collapses a contour made entirely of box corner points.
///
/// Such a contour only laps the region's perimeter; its effect on every
/// winding number inside the region is the constant number of laps, which is
/// returned so the caller can fold it into the region's winding offset.
/// Walking to the next perimeter corner counts forwards, to the previous one
/// backwards; anything else means the contour is not a pure perimeter lap.
fn post_process_sub_contour(contour: &mut SubContour) -> i32 {
    let last = match contour.last() {
        Some(p) if p.is_corner() => *p,
        _ => return 0,
    };

    let mut forwards = 0;
    let mut backwards = 0;
    let mut prev_corner = last.corner_type();
    for pt in contour.iter() {
        if !pt.is_corner() {
            return 0;
        }
        let corner = pt.corner_type();
        if corner == next_corner(prev_corner) {
            forwards += 1;
        } else if prev_corner == next_corner(corner) {
            backwards += 1;
        } else {
            return 0;
        }
        prev_corner = corner;
    }

    let counter: i32 = backwards - forwards;
    if counter % 4 == 0 {
        contour.clear();
        return counter / 4;
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    fn square(min: f32, max: f32) -> Path {
        let mut builder = Path::builder();
        builder.polygon(&[
            point(min, min),
            point(max, min),
            point(max, max),
            point(min, max),
        ]);
        builder.build()
    }

    #[test]
    fn from_path_counts() {
        let sub = SubPath::from_path(&square(0.0, 1.0));
        assert_eq!(sub.contours().len(), 1);
        assert_eq!(sub.total_points(), 4);
        assert_eq!(sub.winding_start(), 0);
        assert_eq!(*sub.bounds(), Box2D::new(point(0.0, 0.0), point(1.0, 1.0)));
    }

    #[test]
    fn split_square() {
        let sub = SubPath::from_path(&square(0.0, 1.0));
        let (a, b) = sub.split(&FillOptions::default());

        // The point balance is symmetric; ties go to the y axis.
        assert_eq!(a.bounds().min, point(0.0, 0.0));
        assert_eq!(a.bounds().max, point(1.0, 0.5));
        assert_eq!(b.bounds().min, point(0.0, 0.5));
        assert_eq!(b.bounds().max, point(1.0, 1.0));

        // Each half keeps its two original corners plus the two points
        // inserted on the split line.
        assert_eq!(a.total_points(), 4);
        assert_eq!(b.total_points(), 4);
        assert_eq!(a.winding_start(), 0);
        assert_eq!(b.winding_start(), 0);
    }

    #[test]
    fn aspect_forces_long_axis() {
        let mut builder = Path::builder();
        // All points on the left: point balance would pick the y axis, but
        // the box is 10x1 so the aspect constraint forces a split in x.
        builder.polygon(&[
            point(0.0, 0.0),
            point(10.0, 0.4),
            point(0.0, 1.0),
        ]);
        let sub = SubPath::from_path(&builder.build());
        let (a, _) = sub.split(&FillOptions::default());
        assert_eq!(a.bounds().max.x, 5.0);
        assert_eq!(a.bounds().max.y, 1.0);

        let (a, _) = sub.split(&FillOptions::default().with_max_aspect_ratio(0.0));
        assert_eq!(a.bounds().max.x, 10.0);
        assert_eq!(a.bounds().max.y, 0.5);
    }

    #[test]
    fn perimeter_contour_becomes_winding_offset() {
        // A clockwise lap around the box perimeter, built from split-tagged
        // corner points, collapses to a winding offset of -1.
        let anchor = SubContourPoint {
            position: point(0.0, 0.0),
            start_edge: true,
            boundary: [Boundary::Min, Boundary::Min],
        };
        let corner = |x: Boundary, y: Boundary, px: f32, py: f32| SubContourPoint {
            position: point(px, py),
            start_edge: true,
            boundary: [x, y],
        };

        let mut contour = vec![
            anchor,
            corner(Boundary::Min, Boundary::Max, 0.0, 1.0),
            corner(Boundary::Max, Boundary::Max, 1.0, 1.0),
            corner(Boundary::Max, Boundary::Min, 1.0, 0.0),
        ];
        assert_eq!(post_process_sub_contour(&mut contour), -1);
        assert!(contour.is_empty());

        // The same lap counterclockwise gives +1.
        let mut contour = vec![
            anchor,
            corner(Boundary::Max, Boundary::Min, 1.0, 0.0),
            corner(Boundary::Max, Boundary::Max, 1.0, 1.0),
            corner(Boundary::Min, Boundary::Max, 0.0, 1.0),
        ];
        assert_eq!(post_process_sub_contour(&mut contour), 1);

        // A contour with any interior point is left alone.
        let mut contour = vec![anchor, SubContourPoint::new(point(0.5, 0.5), false)];
        assert_eq!(post_process_sub_contour(&mut contour), 0);
        assert_eq!(contour.len(), 2);
    }

    #[test]
    fn split_isolates_contours() {
        // Two squares on either side of the split line: each child sees one.
        let mut builder = Path::builder();
        builder.polygon(&[
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(1.0, 1.0),
            point(0.0, 1.0),
        ]);
        builder.polygon(&[
            point(9.0, 0.0),
            point(10.0, 0.0),
            point(10.0, 1.0),
            point(9.0, 1.0),
        ]);
        let sub = SubPath::from_path(&builder.build());
        let (a, b) = sub.split(&FillOptions::default());

        assert_eq!(a.contours().len(), 1);
        assert_eq!(b.contours().len(), 1);
        assert_eq!(a.total_points(), 4);
        assert_eq!(b.total_points(), 4);
    }
}
