//! Chunked attribute and index storage for one subset.

use crate::builder::FillIndices;
use crate::hoard::PointHoard;
use crate::math::Point;
use crate::path::FillRule;
use crate::FILL_RULE_CHUNK_COUNT;

use std::ops::Range;

/// The index chunk holding the triangles of `winding_number`.
///
/// Winding zero shares the complement-non-zero rule chunk; the other
/// windings get their own chunks past the fixed rule chunks, in the order
/// 1, -1, 2, -2 and so on.
pub(crate) fn chunk_from_winding_number(winding_number: i32) -> usize {
    if winding_number == 0 {
        return chunk_from_fill_rule(FillRule::ComplementNonZero);
    }

    let sign = if winding_number < 0 { 1 } else { 0 };
    FILL_RULE_CHUNK_COUNT + sign + 2 * (winding_number.abs() as usize - 1)
}

/// The index chunk holding all triangles selected by `fill_rule`.
pub(crate) fn chunk_from_fill_rule(fill_rule: FillRule) -> usize {
    fill_rule as usize
}

/// One mesh vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FillAttribute {
    pub position: Point,
    /// Anti-alias coverage, rewritten per query by the
    /// [DataWriter](struct.DataWriter.html).
    pub coverage: f32,
}

/// The triangle mesh of one subset: a single attribute array and an index
/// buffer sliced into chunks, one per fill rule and one per winding number.
#[derive(Clone, Debug, Default)]
pub struct AttributeData {
    attributes: Vec<FillAttribute>,
    indices: Vec<u32>,
    index_chunks: Vec<Range<usize>>,
}

impl AttributeData {
    pub fn attributes(&self) -> &[FillAttribute] {
        &self.attributes
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn num_index_chunks(&self) -> usize {
        self.index_chunks.len()
    }

    /// The indices of one chunk; chunks past the populated range are empty.
    pub fn index_chunk(&self, chunk: usize) -> &[u32] {
        match self.index_chunks.get(chunk) {
            Some(range) => &self.indices[range.clone()],
            None => &[],
        }
    }

    /// Builds the leaf data from a triangulation.
    ///
    /// The four rule chunks are materialized copies of the ranges of the
    /// packed buffer, so that each of them is contiguous on its own.
    pub(crate) fn from_triangulation(points: &PointHoard, fill: &FillIndices) -> AttributeData {
        if fill.winding_map.is_empty() {
            return AttributeData::default();
        }

        let attributes = points
            .points()
            .iter()
            .map(|p| FillAttribute {
                position: p.position,
                coverage: 1.0,
            })
            .collect();

        let min_winding = *fill.winding_map.keys().next().unwrap();
        let max_winding = *fill.winding_map.keys().next_back().unwrap();
        let num_chunks = FILL_RULE_CHUNK_COUNT.max(
            1 + chunk_from_winding_number(min_winding).max(chunk_from_winding_number(max_winding)),
        );

        let mut data = AttributeData {
            attributes,
            indices: Vec::new(),
            index_chunks: vec![0..0; num_chunks],
        };

        let packed = &fill.indices[..];
        data.push_chunk(
            chunk_from_fill_rule(FillRule::EvenOdd),
            &packed[..fill.even_non_zero_start],
        );
        data.push_chunk(
            chunk_from_fill_rule(FillRule::NonZero),
            &packed[..fill.zero_start],
        );
        data.push_chunk(
            chunk_from_fill_rule(FillRule::ComplementEvenOdd),
            &packed[fill.even_non_zero_start..],
        );
        data.push_chunk(
            chunk_from_fill_rule(FillRule::ComplementNonZero),
            &packed[fill.zero_start..],
        );

        for (winding, range) in &fill.winding_map {
            if *winding != 0 {
                data.push_chunk(chunk_from_winding_number(*winding), &packed[range.clone()]);
            }
        }

        data
    }

    /// Concatenates two subsets: `a`'s attributes first, then `b`'s, with
    /// `b`'s indices shifted accordingly, chunk by chunk.
    pub(crate) fn merge(a: &AttributeData, b: &AttributeData) -> AttributeData {
        let offset = a.attributes.len() as u32;
        let mut attributes = Vec::with_capacity(a.attributes.len() + b.attributes.len());
        attributes.extend_from_slice(&a.attributes);
        attributes.extend_from_slice(&b.attributes);

        let num_chunks = a.index_chunks.len().max(b.index_chunks.len());
        let mut merged = AttributeData {
            attributes,
            indices: Vec::with_capacity(a.indices.len() + b.indices.len()),
            index_chunks: Vec::with_capacity(num_chunks),
        };

        for chunk in 0..num_chunks {
            let begin = merged.indices.len();
            merged.indices.extend_from_slice(a.index_chunk(chunk));
            merged
                .indices
                .extend(b.index_chunk(chunk).iter().map(|i| i + offset));
            merged.index_chunks.push(begin..merged.indices.len());
        }

        merged
    }

    fn push_chunk(&mut self, chunk: usize, src: &[u32]) {
        let begin = self.indices.len();
        self.indices.extend_from_slice(src);
        self.index_chunks[chunk] = begin..self.indices.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;
    use crate::path::Path;
    use crate::subpath::SubPath;
    use crate::triangulate::TrapezoidTriangulator;
    use crate::{builder::Builder, FillOptions};

    #[test]
    fn winding_chunk_slots() {
        assert_eq!(
            chunk_from_winding_number(0),
            chunk_from_fill_rule(FillRule::ComplementNonZero)
        );
        assert_eq!(chunk_from_winding_number(1), FILL_RULE_CHUNK_COUNT);
        assert_eq!(chunk_from_winding_number(-1), FILL_RULE_CHUNK_COUNT + 1);
        assert_eq!(chunk_from_winding_number(2), FILL_RULE_CHUNK_COUNT + 2);
        assert_eq!(chunk_from_winding_number(-2), FILL_RULE_CHUNK_COUNT + 3);
    }

    #[test]
    fn leaf_chunks_for_a_square() {
        let mut builder = Path::builder();
        builder.polygon(&[
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(1.0, 1.0),
            point(0.0, 1.0),
        ]);
        let sub = SubPath::from_path(&builder.build());
        let b = Builder::new(
            &sub,
            &FillOptions::default(),
            &mut TrapezoidTriangulator::new(),
        );
        let data = AttributeData::from_triangulation(&b.points, &b.fill_indices());

        assert_eq!(data.num_attributes(), b.points.points().len());
        // One winding number (1): four rule chunks plus its own chunk.
        assert_eq!(data.num_index_chunks(), FILL_RULE_CHUNK_COUNT + 1);

        let odd = data.index_chunk(chunk_from_fill_rule(FillRule::EvenOdd));
        let nonzero = data.index_chunk(chunk_from_fill_rule(FillRule::NonZero));
        let even = data.index_chunk(chunk_from_fill_rule(FillRule::ComplementEvenOdd));
        let zero = data.index_chunk(chunk_from_fill_rule(FillRule::ComplementNonZero));
        let one = data.index_chunk(chunk_from_winding_number(1));

        assert_eq!(odd.len(), 36);
        assert_eq!(nonzero, odd);
        assert_eq!(one, odd);
        assert!(even.is_empty());
        assert!(zero.is_empty());

        for i in one {
            assert!((*i as usize) < data.num_attributes());
        }
    }

    #[test]
    fn empty_triangulation() {
        let data = AttributeData::from_triangulation(
            &PointHoard::new(point(0.0, 0.0), point(1.0, 1.0)),
            &FillIndices {
                indices: Vec::new(),
                winding_map: Default::default(),
                even_non_zero_start: 0,
                zero_start: 0,
            },
        );
        assert_eq!(data.num_attributes(), 0);
        assert_eq!(data.num_index_chunks(), 0);
        assert!(data.index_chunk(0).is_empty());
    }

    #[test]
    fn merge_offsets_second_subset() {
        let a = AttributeData {
            attributes: vec![
                FillAttribute {
                    position: point(0.0, 0.0),
                    coverage: 1.0,
                };
                3
            ],
            indices: vec![0, 1, 2],
            index_chunks: vec![0..3],
        };
        let b = AttributeData {
            attributes: vec![
                FillAttribute {
                    position: point(1.0, 1.0),
                    coverage: 1.0,
                };
                3
            ],
            indices: vec![0, 1, 2, 0, 2, 1],
            index_chunks: vec![0..3, 3..6],
        };

        let merged = AttributeData::merge(&a, &b);
        assert_eq!(merged.num_attributes(), 6);
        assert_eq!(merged.num_index_chunks(), 2);
        assert_eq!(merged.index_chunk(0), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(merged.index_chunk(1), &[3, 5, 4]);
    }
}
