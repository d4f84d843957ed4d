//! Mapping of a path's bounding box into the triangulator's coordinate space.
//!
//! The triangulator works in f64 but the input points are f32. The bounding
//! box is remapped onto `[0, 2^22] x [0, 2^22]` so that integers in the
//! working range are exactly representable, and every inserted point receives
//! a monotonically increasing "fudge" offset of `fudge_count * 2^-20`: visible
//! to an f64 but below f32 resolution at this scale. This keeps nominally
//! coincident or overlapping input edges numerically distinguishable for the
//! triangulator without perturbing the f32 output.

use crate::math::Point;

/// log2 of the dimension of the remapped coordinate box.
pub(crate) const LOG2_BOX_DIM: i32 = 22;

/// Dimension of the remapped coordinate box.
pub(crate) const BOX_DIM: f64 = (1u32 << LOG2_BOX_DIM) as f64;

/// The fudge offset is `2^-NEGATIVE_LOG2_FUDGE`, leaving headroom between
/// f32 resolution and the intersections the triangulator computes.
const NEGATIVE_LOG2_FUDGE: i32 = 20;

pub(crate) struct CoordinateConverter {
    delta_fudge: f64,
    scale: [f64; 2],
    translate: [f64; 2],
    scale_f: [f32; 2],
    translate_f: [f32; 2],
}

impl CoordinateConverter {
    pub fn new(min: Point, max: Point) -> Self {
        let mut delta = [
            f64::from(max.x) - f64::from(min.x),
            f64::from(max.y) - f64::from(min.y),
        ];
        for d in &mut delta {
            // Zero-size boxes (single point paths) would produce an infinite
            // scale; any positive value works since all points then map to
            // the same place.
            if !(*d > 0.0) {
                *d = 1.0;
            }
        }

        let scale = [BOX_DIM / delta[0], BOX_DIM / delta[1]];
        let translate = [f64::from(min.x), f64::from(min.y)];

        CoordinateConverter {
            delta_fudge: (-NEGATIVE_LOG2_FUDGE as f64).exp2(),
            scale,
            translate,
            scale_f: [scale[0] as f32, scale[1] as f32],
            translate_f: [translate[0] as f32, translate[1] as f32],
        }
    }

    /// Remaps `pt` into the triangulator's space with the fudge offset for
    /// the `fudge_count`-th inserted point.
    pub fn apply(&self, pt: Point, fudge_count: u32) -> [f64; 2] {
        let fudge = f64::from(fudge_count) * self.delta_fudge;
        [
            self.scale[0] * (f64::from(pt.x) - self.translate[0]) + fudge,
            self.scale[1] * (f64::from(pt.y) - self.translate[1]) + fudge,
        ]
    }

    /// Truncating integer quantization of `pt`, used only for vertex
    /// deduplication (distinct from the fudge scheme).
    pub fn iapply(&self, pt: Point) -> (i32, i32) {
        let x = self.scale_f[0] * (pt.x - self.translate_f[0]);
        let y = self.scale_f[1] * (pt.y - self.translate_f[1]);
        (x as i32, y as i32)
    }

    pub fn fudge_delta(&self) -> f64 {
        self.delta_fudge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    #[test]
    fn remap_corners() {
        let c = CoordinateConverter::new(point(-1.0, 2.0), point(3.0, 10.0));
        assert_eq!(c.apply(point(-1.0, 2.0), 0), [0.0, 0.0]);
        assert_eq!(c.apply(point(3.0, 10.0), 0), [BOX_DIM, BOX_DIM]);
    }

    #[test]
    fn fudge_monotonic_below_f32() {
        let c = CoordinateConverter::new(point(0.0, 0.0), point(1.0, 1.0));
        let a = c.apply(point(0.5, 0.5), 0);
        let b = c.apply(point(0.5, 0.5), 1);
        let z = c.apply(point(0.5, 0.5), 2);

        // Distinguishable in f64.
        assert!(b[0] > a[0] && z[0] > b[0]);
        assert!(b[1] > a[1] && z[1] > b[1]);

        // Invisible in f32 at this scale.
        assert_eq!(a[0] as f32, b[0] as f32);
        assert_eq!(b[0] as f32, z[0] as f32);
    }

    #[test]
    fn quantization_collapses_near_duplicates() {
        let c = CoordinateConverter::new(point(0.0, 0.0), point(1.0, 1.0));
        let a = c.iapply(point(0.25, 0.75));
        let b = c.iapply(point(0.25 + 1e-9, 0.75 - 1e-9));
        assert_eq!(a, b);

        let far = c.iapply(point(0.26, 0.75));
        assert_ne!(a, far);
    }

    #[test]
    fn degenerate_box() {
        let c = CoordinateConverter::new(point(2.0, 2.0), point(2.0, 2.0));
        let p = c.apply(point(2.0, 2.0), 0);
        assert!(p[0].is_finite() && p[1].is_finite());
    }
}
