//! Draw-call assembly: one query's worth of attribute and index chunks.

use crate::attribute::{chunk_from_winding_number, FillAttribute};
use crate::clip::HalfPlane;
use crate::math::Transform;
use crate::path::WindingRule;
use crate::subset::{FilledPath, ScratchSpace};
use crate::winding::WindingSet;

struct AttributeChunk<'l> {
    attributes: &'l [FillAttribute],
    windings: &'l [WindingSet],
}

struct IndexChunk<'l> {
    indices: &'l [u32],
    attribute_chunk: usize,
}

/// The outcome of one fill query: a list of attribute chunks (one per
/// selected subset that contributes) and index chunks (one per contributing
/// winding number of each such subset) to copy into GPU buffers.
///
/// The writer borrows the path's cached data; nothing is copied until
/// [write_attributes](#method.write_attributes) and
/// [write_indices](#method.write_indices).
pub struct DataWriter<'l> {
    attribute_chunks: Vec<AttributeChunk<'l>>,
    index_chunks: Vec<IndexChunk<'l>>,
    complement_rule: WindingSet,
}

impl<'l> DataWriter<'l> {
    pub fn number_attribute_chunks(&self) -> usize {
        self.attribute_chunks.len()
    }

    pub fn number_attributes(&self, attribute_chunk: usize) -> usize {
        self.attribute_chunks[attribute_chunk].attributes.len()
    }

    pub fn number_index_chunks(&self) -> usize {
        self.index_chunks.len()
    }

    pub fn number_indices(&self, index_chunk: usize) -> usize {
        self.index_chunks[index_chunk].indices.len()
    }

    /// The attribute chunk the indices of `index_chunk` refer into.
    pub fn attribute_chunk_selection(&self, index_chunk: usize) -> usize {
        self.index_chunks[index_chunk].attribute_chunk
    }

    /// Copies one index chunk into `dst`, offsetting each index by
    /// `index_offset` (the location its attribute chunk was written at).
    pub fn write_indices(&self, dst: &mut [u32], index_offset: u32, index_chunk: usize) {
        let src = self.index_chunks[index_chunk].indices;
        debug_assert_eq!(dst.len(), src.len());
        for (dst, src) in dst.iter_mut().zip(src.iter()) {
            *dst = src + index_offset;
        }
    }

    /// Copies one attribute chunk into `dst`, filling in anti-alias
    /// coverage for the queried rule.
    ///
    /// A vertex gets coverage 0.0 when any triangle touching it lies in a
    /// region the rule does not fill; such vertices sit on the boundary of
    /// the filled area. Interior vertices, including all the subdivision
    /// vertices of interior triangles, get 1.0.
    pub fn write_attributes(&self, dst: &mut [FillAttribute], attribute_chunk: usize) {
        let chunk = &self.attribute_chunks[attribute_chunk];
        debug_assert_eq!(dst.len(), chunk.attributes.len());
        for i in 0..dst.len() {
            let outside = self.complement_rule.intersects(&chunk.windings[i]);
            dst[i] = FillAttribute {
                position: chunk.attributes[i].position,
                coverage: if outside { 0.0 } else { 1.0 },
            };
        }
    }
}

impl FilledPath {
    /// Selects the subsets for a view and assembles the chunks satisfying
    /// `fill_rule`, triangulating whatever the selection needs.
    ///
    /// See [select_subsets](#method.select_subsets) for the meaning of the
    /// clipping and budget parameters.
    pub fn compute_writer<'l>(
        &'l mut self,
        scratch: &mut ScratchSpace,
        fill_rule: &dyn WindingRule,
        clip_planes: &[HalfPlane],
        transform: &Transform,
        max_attribute_count: usize,
        max_index_count: usize,
    ) -> DataWriter<'l> {
        let selected = self.select_subsets(
            scratch,
            clip_planes,
            transform,
            max_attribute_count,
            max_index_count,
        );
        for id in &selected {
            self.make_ready(id.to_usize());
        }

        let mut writer = DataWriter {
            attribute_chunks: Vec::new(),
            index_chunks: Vec::new(),
            complement_rule: WindingSet::new(),
        };

        // The winding range over all selected subsets bounds both rule
        // sets; subsets with no triangles at all contribute nothing.
        let mut range: Option<(i32, i32)> = None;
        for id in &selected {
            let data = self.node(id.to_usize()).data.as_ref().unwrap();
            if let (Some(first), Some(last)) =
                (data.winding_numbers.first(), data.winding_numbers.last())
            {
                range = Some(match range {
                    Some((min, max)) => (min.min(*first), max.max(*last)),
                    None => (*first, *last),
                });
            }
        }
        let (min_winding, max_winding) = match range {
            Some(r) => r,
            None => return writer,
        };

        let mut rule_set = WindingSet::new();
        rule_set.extract_from_fill_rule(min_winding, max_winding, fill_rule, false);
        writer
            .complement_rule
            .extract_from_fill_rule(min_winding, max_winding, fill_rule, true);

        for id in &selected {
            let data = self.node(id.to_usize()).data.as_ref().unwrap();
            let mut attribute_chunk = None;

            for winding in &data.winding_numbers {
                if !rule_set.has(*winding) {
                    continue;
                }

                // The subset's attribute chunk is listed once, on first
                // use; subsets with nothing to fill are left out entirely.
                let chunk = *attribute_chunk.get_or_insert_with(|| {
                    writer.attribute_chunks.push(AttributeChunk {
                        attributes: data.attribute_data.attributes(),
                        windings: &data.windings_per_point,
                    });
                    writer.attribute_chunks.len() - 1
                });

                writer.index_chunks.push(IndexChunk {
                    indices: data
                        .attribute_data
                        .index_chunk(chunk_from_winding_number(*winding)),
                    attribute_chunk: chunk,
                });
            }
        }

        writer
    }
}
