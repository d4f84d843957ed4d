//! Triangulates one sub-path and packs its indices for chunked extraction.

use crate::hoard::PointHoard;
use crate::subpath::SubPath;
use crate::tesser::{run_pass, PassKind, WindingIndexHoard};
use crate::triangulate::Triangulator;
use crate::FillOptions;

use std::collections::BTreeMap;
use std::ops::Range;

/// The packed index buffer of one sub-path.
///
/// Indices are grouped by the parity class of their winding number, in the
/// order odd, even non-zero, zero. The four standard fill rules then each
/// select a contiguous range: odd windings for even-odd, everything before
/// `zero_start` for non-zero, everything from `even_non_zero_start` for
/// complement even-odd, and everything from `zero_start` for complement
/// non-zero.
pub(crate) struct FillIndices {
    pub indices: Vec<u32>,
    /// Range of `indices` per winding number; only windings with at least
    /// one triangle appear.
    pub winding_map: BTreeMap<i32, Range<usize>>,
    pub even_non_zero_start: usize,
    pub zero_start: usize,
}

/// Runs both triangulation passes over a sub-path.
pub(crate) struct Builder {
    pub points: PointHoard,
    hoard: WindingIndexHoard,
    pub failed: bool,
}

impl Builder {
    pub fn new(
        sub_path: &SubPath,
        options: &FillOptions,
        triangulator: &mut dyn Triangulator,
    ) -> Self {
        let mut points = PointHoard::new(sub_path.bounds().min, sub_path.bounds().max);
        let input = points.generate_path(sub_path, options);
        let mut hoard = WindingIndexHoard::new();

        let failed_non_zero = run_pass(
            PassKind::NonZero,
            triangulator,
            &mut points,
            sub_path,
            &input,
            &mut hoard,
        );
        let failed_zero = run_pass(
            PassKind::Zero,
            triangulator,
            &mut points,
            sub_path,
            &input,
            &mut hoard,
        );

        Builder {
            points,
            hoard,
            failed: failed_non_zero || failed_zero,
        }
    }

    pub fn fill_indices(&self) -> FillIndices {
        let total: usize = self.hoard.values().map(|v| v.len()).sum();
        let mut indices = Vec::with_capacity(total);
        let mut winding_map = BTreeMap::new();

        let append = |indices: &mut Vec<u32>,
                          winding_map: &mut BTreeMap<i32, Range<usize>>,
                          class: fn(i32) -> bool| {
            for (winding, tri_indices) in &self.hoard {
                if tri_indices.is_empty() || !class(*winding) {
                    continue;
                }
                let begin = indices.len();
                indices.extend_from_slice(tri_indices);
                winding_map.insert(*winding, begin..indices.len());
            }
        };

        append(&mut indices, &mut winding_map, |w| w % 2 != 0);
        let even_non_zero_start = indices.len();
        append(&mut indices, &mut winding_map, |w| w != 0 && w % 2 == 0);
        let zero_start = indices.len();
        append(&mut indices, &mut winding_map, |w| w == 0);

        debug_assert_eq!(indices.len(), total);
        FillIndices {
            indices,
            winding_map,
            even_non_zero_start,
            zero_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;
    use crate::path::Path;
    use crate::triangulate::TrapezoidTriangulator;

    fn build(path: &Path) -> Builder {
        let sub = SubPath::from_path(path);
        Builder::new(
            &sub,
            &FillOptions::default(),
            &mut TrapezoidTriangulator::new(),
        )
    }

    fn add_square(builder: &mut crate::path::PathBuilder, min: f32, max: f32) {
        builder.polygon(&[
            point(min, min),
            point(max, min),
            point(max, max),
            point(min, max),
        ]);
    }

    #[test]
    fn square_packs_odd_only() {
        let mut builder = Path::builder();
        add_square(&mut builder, 0.0, 1.0);
        let b = build(&builder.build());
        assert!(!b.failed);

        let f = b.fill_indices();
        assert_eq!(f.indices.len(), 36);
        assert_eq!(f.even_non_zero_start, 36);
        assert_eq!(f.zero_start, 36);
        assert_eq!(f.winding_map.len(), 1);
        assert_eq!(f.winding_map[&1], 0..36);
    }

    #[test]
    fn nested_squares_pack_by_parity() {
        // Two nested counterclockwise squares: winding 2 inside, 1 in the
        // ring, 0 between the outer square and the bounds corners.
        let mut builder = Path::builder();
        add_square(&mut builder, 0.0, 4.0);
        add_square(&mut builder, 1.0, 3.0);
        // A third contour poking past the outer square so that the bounds
        // are strictly larger and the zero region is not degenerate.
        builder.polygon(&[
            point(5.0, 0.0),
            point(6.0, 0.0),
            point(6.0, 1.0),
            point(5.0, 1.0),
        ]);
        let b = build(&builder.build());
        assert!(!b.failed);

        let f = b.fill_indices();
        let one = f.winding_map[&1].clone();
        let two = f.winding_map[&2].clone();
        let zero = f.winding_map[&0].clone();

        assert_eq!(one.start, 0);
        assert_eq!(two.start, f.even_non_zero_start);
        assert_eq!(zero.start, f.zero_start);
        assert_eq!(zero.end, f.indices.len());
        assert!(one.end <= f.even_non_zero_start);

        // All three classes are non-empty here.
        assert!(!one.is_empty() && !two.is_empty() && !zero.is_empty());
    }
}
