#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]

//! Filling of flattened paths into GPU-renderable triangle meshes.
//!
//! The input path is split at construction time into a binary hierarchy of
//! [subsets](struct.FilledPath.html), each covering an axis-aligned region of
//! the path. A subset is triangulated lazily on first access; its triangles
//! are classified by winding number so that a single triangulation can serve
//! any fill rule at draw time. Draw-time queries select the subsets that
//! intersect the viewport and fit the caller's vertex/index budgets, then
//! assemble a [DataWriter](struct.DataWriter.html) listing the attribute and
//! index chunks to submit to the GPU.
//!
//! This crate is reexported in [fillmesh](https://docs.rs/fillmesh/).
//!
//! ## Overview
//!
//! The most interesting types of this crate are:
//!
//! * [FilledPath](struct.FilledPath.html) - the cached subset hierarchy built
//!   from one immutable flattened path.
//! * [Subset](struct.Subset.html) - one node of the hierarchy: the unit of
//!   lazy triangulation and of draw-time selection.
//! * [DataWriter](struct.DataWriter.html) - a per-draw-call query result
//!   holding the attribute/index chunks satisfying a fill rule.
//! * [Triangulator](triangulate/trait.Triangulator.html) - the seam to the
//!   underlying polygon triangulator, mockable in tests.

pub use fillmesh_path as path;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod attribute;
mod builder;
mod clip;
mod coordinates;
mod error;
mod hoard;
mod subpath;
mod subset;
mod tesser;
pub mod triangulate;
mod winding;
mod writer;


pub use crate::path::math;

#[doc(inline)]
pub use crate::attribute::{AttributeData, FillAttribute};
#[doc(inline)]
pub use crate::error::*;
#[doc(inline)]
pub use crate::subset::{FilledPath, ScratchSpace, Subset, SubsetId};
#[doc(inline)]
pub use crate::winding::WindingSet;
#[doc(inline)]
pub use crate::clip::HalfPlane;
#[doc(inline)]
pub use crate::writer::DataWriter;

pub use crate::path::{FillRule, WindingRule};

/// Number of index chunks reserved for the four fixed fill rules.
///
/// Chunks at indices past this value hold the triangles of one individual
/// winding number each, see
/// [Subset::chunk_from_winding_number](struct.Subset.html#method.chunk_from_winding_number).
pub const FILL_RULE_CHUNK_COUNT: usize = 4;

/// Parameters controlling how a [FilledPath](struct.FilledPath.html) builds
/// its subset hierarchy.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct FillOptions {
    /// Maximum depth of the subset hierarchy.
    ///
    /// Default value: `FillOptions::DEFAULT_MAX_RECURSION`.
    pub max_recursion: u32,

    /// A subset holding at most this many points is not split further.
    ///
    /// Default value: `FillOptions::DEFAULT_POINTS_PER_SUBSET`.
    pub points_per_subset: u32,

    /// When a subset's bounding box is more elongated than this ratio, the
    /// split axis is forced to the long axis. A value `<= 0.0` disables the
    /// aspect constraint.
    ///
    /// Default value: `FillOptions::DEFAULT_MAX_ASPECT_RATIO`.
    pub max_aspect_ratio: f32,

    /// Whether to emit guiding boxes: auxiliary contours that do not affect
    /// winding numbers but bias the triangulator towards more local (less
    /// skinny) triangles.
    ///
    /// Default value: `false`.
    pub guiding_boxes: bool,
}

impl FillOptions {
    pub const DEFAULT_MAX_RECURSION: u32 = 12;
    pub const DEFAULT_POINTS_PER_SUBSET: u32 = 64;
    pub const DEFAULT_MAX_ASPECT_RATIO: f32 = 4.0;

    pub const DEFAULT: Self = FillOptions {
        max_recursion: Self::DEFAULT_MAX_RECURSION,
        points_per_subset: Self::DEFAULT_POINTS_PER_SUBSET,
        max_aspect_ratio: Self::DEFAULT_MAX_ASPECT_RATIO,
        guiding_boxes: false,
    };

    #[inline]
    pub const fn with_max_recursion(mut self, depth: u32) -> Self {
        self.max_recursion = depth;
        self
    }

    #[inline]
    pub const fn with_points_per_subset(mut self, count: u32) -> Self {
        self.points_per_subset = count;
        self
    }

    #[inline]
    pub const fn with_max_aspect_ratio(mut self, ratio: f32) -> Self {
        self.max_aspect_ratio = ratio;
        self
    }

    #[inline]
    pub const fn with_guiding_boxes(mut self, enabled: bool) -> Self {
        self.guiding_boxes = enabled;
        self
    }
}

impl Default for FillOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn options_builder() {
    let options = FillOptions::default()
        .with_points_per_subset(8)
        .with_guiding_boxes(true);
    assert_eq!(options.points_per_subset, 8);
    assert!(options.guiding_boxes);
    assert_eq!(options.max_recursion, FillOptions::DEFAULT_MAX_RECURSION);
}
