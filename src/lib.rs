#![deny(bare_trait_objects)]

//! Winding-aware fill meshing of 2D paths for GPU rendering.
//!
//! This crate is a facade over:
//!
//! * [fillmesh_path](https://docs.rs/fillmesh_path/) - flattened path data
//!   structures, fill rules and basic 2D math (reexported as `path`).
//! * [fillmesh_fill](https://docs.rs/fillmesh_fill/) - the filling engine:
//!   spatial subdivision of a path into a hierarchy of subsets, winding-number
//!   classified triangulation of each subset, and draw-time assembly of
//!   vertex/index chunks satisfying a fill rule (reexported at the top level).
//!
//! # Example
//!
//! ```
//! use fillmesh::path::Path;
//! use fillmesh::path::math::{point, Transform};
//! use fillmesh::path::FillRule;
//! use fillmesh::{FilledPath, FillOptions, ScratchSpace};
//!
//! let mut builder = Path::builder();
//! builder.begin(point(0.0, 0.0));
//! builder.line_to(point(1.0, 0.0));
//! builder.line_to(point(1.0, 1.0));
//! builder.line_to(point(0.0, 1.0));
//! builder.close();
//! let path = builder.build();
//!
//! let mut filled = FilledPath::new(&path, &FillOptions::default());
//! let mut scratch = ScratchSpace::new();
//! let writer = filled.compute_writer(
//!     &mut scratch,
//!     &FillRule::NonZero,
//!     &[],
//!     &Transform::identity(),
//!     usize::MAX,
//!     usize::MAX,
//! );
//! assert!(writer.number_index_chunks() > 0);
//! ```

pub use fillmesh_path as path;

pub use fillmesh_fill::*;
