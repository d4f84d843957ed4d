//! The subset hierarchy of a filled path.

use crate::attribute::{self, AttributeData};
use crate::builder::Builder;
use crate::clip::{clip_polygon_against_planes, HalfPlane};
use crate::math::{Box2D, Point, Transform};
use crate::path::{FillRule, Path};
use crate::subpath::SubPath;
use crate::triangulate::{TrapezoidTriangulator, Triangulator};
use crate::winding::WindingSet;
use crate::FillOptions;

use std::collections::BTreeSet;

/// Identifies one subset of a [FilledPath](struct.FilledPath.html).
///
/// Ids are stable for the lifetime of the path and index the hierarchy in
/// pre-order: the root is 0 and a node's subtree is a contiguous id range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SubsetId(u32);

impl SubsetId {
    #[inline]
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_usize(id: usize) -> Self {
        SubsetId(id as u32)
    }
}

/// Reusable allocations for subset selection queries.
#[derive(Default)]
pub struct ScratchSpace {
    clip_planes: Vec<HalfPlane>,
    polygon: Vec<Point>,
    polygon_scratch: Vec<Point>,
}

impl ScratchSpace {
    pub fn new() -> Self {
        ScratchSpace::default()
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Sizes {
    pub num_attributes: usize,
    /// The largest index chunk a single draw of this subset can request:
    /// for a leaf the largest fill-rule chunk, for an inner node the sum
    /// over its children.
    pub largest_index_block: usize,
}

/// The triangulated payload of one subset, produced lazily.
pub(crate) struct SubsetData {
    pub attribute_data: AttributeData,
    pub windings_per_point: Vec<WindingSet>,
    /// Sorted winding numbers with at least one triangle in this subset.
    pub winding_numbers: Vec<i32>,
    pub failed: bool,
}

pub(crate) struct SubsetNode {
    pub bounds: Box2D,
    sub_path: Option<SubPath>,
    pub data: Option<SubsetData>,
    pub children: Option<(usize, usize)>,
    pub sizes: Option<Sizes>,
}

/// A path prepared for filling: an immutable hierarchy of subsets, each
/// covering an axis-aligned region, triangulated lazily and cached.
///
/// Building the hierarchy splits the path's geometry but triangulates
/// nothing; triangulation happens per subset the first time a query needs
/// its data.
pub struct FilledPath {
    nodes: Vec<SubsetNode>,
    options: FillOptions,
    triangulator: Box<dyn Triangulator>,
}

impl FilledPath {
    pub fn new(path: &Path, options: &FillOptions) -> Self {
        FilledPath::with_triangulator(path, options, Box::new(TrapezoidTriangulator::new()))
    }

    /// Like `new` with a caller-provided triangulator.
    pub fn with_triangulator(
        path: &Path,
        options: &FillOptions,
        triangulator: Box<dyn Triangulator>,
    ) -> Self {
        let mut nodes = Vec::new();
        build_node(
            &mut nodes,
            SubPath::from_path(path),
            options.max_recursion,
            options,
        );

        FilledPath {
            nodes,
            options: *options,
            triangulator,
        }
    }

    pub fn number_subsets(&self) -> usize {
        self.nodes.len()
    }

    pub fn bounds(&self) -> Box2D {
        self.nodes[0].bounds
    }

    pub(crate) fn node(&self, id: usize) -> &SubsetNode {
        &self.nodes[id]
    }

    /// The subsets to draw for a view: those intersecting the region kept
    /// by `clip_planes` (expressed in the target space of `transform`),
    /// each fitting within `max_attribute_count` attributes and
    /// `max_index_count` indices per fill-rule chunk.
    ///
    /// Descends as long as a subset is partially clipped or over budget.
    /// Panics if a leaf exceeds the budgets, so callers must keep them
    /// above the worst-case size of a single leaf; both limits are
    /// typically the GPU buffer sizes, far above any leaf.
    pub fn select_subsets(
        &mut self,
        scratch: &mut ScratchSpace,
        clip_planes: &[HalfPlane],
        transform: &Transform,
        max_attribute_count: usize,
        max_index_count: usize,
    ) -> Vec<SubsetId> {
        let mut dst = Vec::new();
        if self.nodes.is_empty() {
            return dst;
        }

        scratch.clip_planes.clear();
        scratch
            .clip_planes
            .extend(clip_planes.iter().map(|p| p.transformed_by(transform)));

        self.select_implement(0, scratch, max_attribute_count, max_index_count, &mut dst);
        dst
    }

    fn select_implement(
        &mut self,
        id: usize,
        scratch: &mut ScratchSpace,
        max_attribute_count: usize,
        max_index_count: usize,
        dst: &mut Vec<SubsetId>,
    ) {
        let b = self.nodes[id].bounds;
        scratch.polygon.clear();
        scratch.polygon.extend_from_slice(&[
            b.min,
            Point::new(b.max.x, b.min.y),
            b.max,
            Point::new(b.min.x, b.max.y),
        ]);
        let unclipped = clip_polygon_against_planes(
            &scratch.clip_planes,
            &mut scratch.polygon,
            &mut scratch.polygon_scratch,
        );

        if scratch.polygon.is_empty() {
            return;
        }

        if unclipped || self.nodes[id].children.is_none() {
            self.select_all_unculled(id, max_attribute_count, max_index_count, dst);
            return;
        }

        let (c0, c1) = self.nodes[id].children.unwrap();
        self.select_implement(c0, scratch, max_attribute_count, max_index_count, dst);
        self.select_implement(c1, scratch, max_attribute_count, max_index_count, dst);
    }

    fn select_all_unculled(
        &mut self,
        id: usize,
        max_attribute_count: usize,
        max_index_count: usize,
        dst: &mut Vec<SubsetId>,
    ) {
        // A leaf's sizes are only known once it is triangulated; an inner
        // node's can be summed from its children without touching its own
        // merged data.
        if self.nodes[id].sizes.is_none() && self.nodes[id].children.is_none() {
            self.make_ready(id);
        }

        if let Some(sizes) = self.nodes[id].sizes {
            if sizes.num_attributes <= max_attribute_count
                && sizes.largest_index_block <= max_index_count
            {
                dst.push(SubsetId::from_usize(id));
                return;
            }
        }

        match self.nodes[id].children {
            Some((c0, c1)) => {
                self.select_all_unculled(c0, max_attribute_count, max_index_count, dst);
                self.select_all_unculled(c1, max_attribute_count, max_index_count, dst);
                if self.nodes[id].sizes.is_none() {
                    let s0 = self.nodes[c0].sizes.unwrap();
                    let s1 = self.nodes[c1].sizes.unwrap();
                    self.nodes[id].sizes = Some(Sizes {
                        num_attributes: s0.num_attributes + s1.num_attributes,
                        largest_index_block: s0.largest_index_block + s1.largest_index_block,
                    });
                }
            }
            None => panic!(
                "childless subset {} exceeds the attribute or index budget",
                id
            ),
        }
    }

    /// Accesses one subset, triangulating it first if needed.
    pub fn subset(&mut self, id: SubsetId) -> Subset<'_> {
        self.make_ready(id.to_usize());
        let node = &self.nodes[id.to_usize()];
        Subset {
            id,
            bounds: node.bounds,
            data: node.data.as_ref().unwrap(),
        }
    }

    pub(crate) fn make_ready(&mut self, id: usize) {
        if self.nodes[id].data.is_some() {
            return;
        }
        match self.nodes[id].children {
            Some((c0, c1)) => {
                self.make_ready(c0);
                self.make_ready(c1);
                self.merge_children(id, c0, c1);
            }
            None => self.make_ready_leaf(id),
        }
    }

    fn make_ready_leaf(&mut self, id: usize) {
        let sub_path = self.nodes[id].sub_path.take().unwrap();
        let builder = Builder::new(&sub_path, &self.options, &mut *self.triangulator);
        if builder.failed {
            log::warn!("incomplete triangulation for subset {}", id);
        }

        let fill = builder.fill_indices();
        let attribute_data = AttributeData::from_triangulation(&builder.points, &fill);
        let windings_per_point = builder
            .points
            .points()
            .iter()
            .map(|p| {
                let mut set = WindingSet::new();
                set.extract_from_set(&p.windings);
                set
            })
            .collect();
        let winding_numbers: Vec<i32> = fill.winding_map.keys().cloned().collect();

        let num_nonzero = fill.zero_start;
        let num_zero = fill.indices.len() - fill.zero_start;
        let num_odd = fill.even_non_zero_start;
        let num_even = fill.indices.len() - fill.even_non_zero_start;
        let largest_index_block = num_nonzero.max(num_zero).max(num_odd.max(num_even));

        self.nodes[id].sizes = Some(Sizes {
            num_attributes: attribute_data.num_attributes(),
            largest_index_block,
        });
        self.nodes[id].data = Some(SubsetData {
            attribute_data,
            windings_per_point,
            winding_numbers,
            failed: builder.failed,
        });
    }

    fn merge_children(&mut self, id: usize, c0: usize, c1: usize) {
        let (data, sizes) = {
            let d0 = self.nodes[c0].data.as_ref().unwrap();
            let d1 = self.nodes[c1].data.as_ref().unwrap();

            let attribute_data = AttributeData::merge(&d0.attribute_data, &d1.attribute_data);
            let mut windings_per_point =
                Vec::with_capacity(d0.windings_per_point.len() + d1.windings_per_point.len());
            windings_per_point.extend_from_slice(&d0.windings_per_point);
            windings_per_point.extend_from_slice(&d1.windings_per_point);

            let windings: BTreeSet<i32> = d0
                .winding_numbers
                .iter()
                .chain(d1.winding_numbers.iter())
                .cloned()
                .collect();

            let s0 = self.nodes[c0].sizes.unwrap();
            let s1 = self.nodes[c1].sizes.unwrap();

            (
                SubsetData {
                    attribute_data,
                    windings_per_point,
                    winding_numbers: windings.into_iter().collect(),
                    failed: d0.failed || d1.failed,
                },
                Sizes {
                    num_attributes: s0.num_attributes + s1.num_attributes,
                    largest_index_block: s0.largest_index_block + s1.largest_index_block,
                },
            )
        };

        let node = &mut self.nodes[id];
        node.data = Some(data);
        if node.sizes.is_none() {
            node.sizes = Some(sizes);
        }
    }
}

/// One node of the hierarchy, ready to draw.
#[derive(Copy, Clone)]
pub struct Subset<'l> {
    id: SubsetId,
    bounds: Box2D,
    data: &'l SubsetData,
}

impl<'l> Subset<'l> {
    pub fn id(&self) -> SubsetId {
        self.id
    }

    pub fn bounds(&self) -> Box2D {
        self.bounds
    }

    pub fn attribute_data(&self) -> &'l AttributeData {
        &self.data.attribute_data
    }

    /// The winding numbers with triangles in this subset, sorted.
    pub fn winding_numbers(&self) -> &'l [i32] {
        &self.data.winding_numbers
    }

    /// Whether triangulation junked triangles for this subset; its mesh
    /// may have holes.
    pub fn failed(&self) -> bool {
        self.data.failed
    }

    /// The index chunk of one winding number, see
    /// [AttributeData::index_chunk](struct.AttributeData.html#method.index_chunk).
    pub fn chunk_from_winding_number(winding_number: i32) -> usize {
        attribute::chunk_from_winding_number(winding_number)
    }

    /// The index chunk selecting everything one standard fill rule fills.
    pub fn chunk_from_fill_rule(fill_rule: FillRule) -> usize {
        attribute::chunk_from_fill_rule(fill_rule)
    }
}

fn build_node(
    nodes: &mut Vec<SubsetNode>,
    sub_path: SubPath,
    depth: u32,
    options: &FillOptions,
) -> usize {
    let id = nodes.len();
    nodes.push(SubsetNode {
        bounds: *sub_path.bounds(),
        sub_path: None,
        data: None,
        children: None,
        sizes: None,
    });

    if depth > 0 && sub_path.total_points() > options.points_per_subset as usize {
        let (a, b) = sub_path.split(options);
        // A split that fails to separate anything (all points on the split
        // line, for instance) would recurse forever; such a node stays a
        // leaf.
        if a.total_points() < sub_path.total_points() || b.total_points() < sub_path.total_points()
        {
            let c0 = build_node(nodes, a, depth - 1, options);
            let c1 = build_node(nodes, b, depth - 1, options);
            nodes[id].children = Some((c0, c1));
            return id;
        }
    }

    nodes[id].sub_path = Some(sub_path);
    id
}
