//! Half-plane clipping of subset bounding boxes.

use crate::math::{Point, Transform};

/// The half-plane `a*x + b*y + c >= 0`.
///
/// Subset selection culls against a convex region described as a set of
/// these, typically the four edges of a viewport.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct HalfPlane {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl HalfPlane {
    pub fn new(a: f32, b: f32, c: f32) -> Self {
        HalfPlane { a, b, c }
    }

    #[inline]
    pub fn signed_distance(&self, p: Point) -> f32 {
        self.a * p.x + self.b * p.y + self.c
    }

    /// The same half-plane expressed in the source space of `transform`:
    /// a point passes the result exactly when its image passes `self`.
    pub(crate) fn transformed_by(&self, transform: &Transform) -> HalfPlane {
        HalfPlane {
            a: self.a * transform.m11 + self.b * transform.m12,
            b: self.a * transform.m21 + self.b * transform.m22,
            c: self.a * transform.m31 + self.b * transform.m32 + self.c,
        }
    }
}

/// Clips `polygon` against every plane in order, leaving the result in
/// `polygon`. Returns true when no vertex was cut away (the polygon was
/// entirely on the kept side of every plane).
pub(crate) fn clip_polygon_against_planes(
    planes: &[HalfPlane],
    polygon: &mut Vec<Point>,
    scratch: &mut Vec<Point>,
) -> bool {
    let mut unclipped = true;

    for plane in planes {
        if polygon.is_empty() {
            return false;
        }

        let all_inside = polygon.iter().all(|p| plane.signed_distance(*p) >= 0.0);
        if all_inside {
            continue;
        }
        unclipped = false;

        scratch.clear();
        let mut prev = polygon[polygon.len() - 1];
        let mut prev_d = plane.signed_distance(prev);
        for p in polygon.iter() {
            let d = plane.signed_distance(*p);
            if (prev_d >= 0.0) != (d >= 0.0) {
                let t = prev_d / (prev_d - d);
                scratch.push(prev + (*p - prev) * t);
            }
            if d >= 0.0 {
                scratch.push(*p);
            }
            prev = *p;
            prev_d = d;
        }
        std::mem::swap(polygon, scratch);
    }

    unclipped
}
