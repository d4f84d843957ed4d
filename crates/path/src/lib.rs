#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]

//! Flattened path data structures for fill meshing.
//!
//! A [Path](path/struct.Path.html) is an ordered collection of closed
//! contours, each an ordered sequence of 2D points. Curves are out of scope:
//! paths are expected to be flattened upstream, so the builder only provides
//! line segments.
//!
//! This crate is reexported in [fillmesh](https://docs.rs/fillmesh/).
//!
//! # Examples
//!
//! ```
//! use fillmesh_path::Path;
//! use fillmesh_path::math::point;
//!
//! let mut builder = Path::builder();
//! builder.begin(point(0.0, 0.0));
//! builder.line_to(point(1.0, 0.0));
//! builder.line_to(point(1.0, 1.0));
//! builder.close();
//! let path = builder.build();
//!
//! assert_eq!(path.num_contours(), 1);
//! ```

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod path;

#[doc(inline)]
pub use crate::path::{Contour, Path, PathBuilder};

pub mod math {
    //! f32 euclid types used everywhere in the fillmesh crates.

    pub use euclid;

    /// Alias for `euclid::default::Point2D<f32>`.
    pub type Point = euclid::default::Point2D<f32>;

    /// Alias for `euclid::default::Vector2D<f32>`.
    pub type Vector = euclid::default::Vector2D<f32>;

    /// Alias for `euclid::default::Box2D<f32>`.
    pub type Box2D = euclid::default::Box2D<f32>;

    /// Alias for `euclid::default::Size2D<f32>`.
    pub type Size = euclid::default::Size2D<f32>;

    /// Alias for `euclid::default::Transform2D<f32>`.
    pub type Transform = euclid::default::Transform2D<f32>;

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }
}

/// The fill rule defines how to determine what is inside and what is outside
/// of a shape from the winding numbers of its regions.
///
/// See the [SVG specification](https://www.w3.org/TR/SVG/painting.html#FillRuleProperty)
/// for the first two. The complement rules select exactly the regions their
/// base rule rejects, which is useful for effects such as filling the hole of
/// a shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillRule {
    EvenOdd,
    NonZero,
    ComplementEvenOdd,
    ComplementNonZero,
}

impl FillRule {
    #[inline]
    pub fn is_in(&self, winding_number: i32) -> bool {
        match *self {
            FillRule::EvenOdd => winding_number % 2 != 0,
            FillRule::NonZero => winding_number != 0,
            FillRule::ComplementEvenOdd => winding_number % 2 == 0,
            FillRule::ComplementNonZero => winding_number == 0,
        }
    }

    #[inline]
    pub fn is_out(&self, winding_number: i32) -> bool {
        !self.is_in(winding_number)
    }
}

/// A predicate over winding numbers selecting filled regions.
///
/// Implemented by [FillRule](enum.FillRule.html) and by closures, so that
/// queries can use either one of the four standard rules or an arbitrary
/// user-provided rule.
pub trait WindingRule {
    fn is_filled(&self, winding_number: i32) -> bool;
}

impl WindingRule for FillRule {
    #[inline]
    fn is_filled(&self, winding_number: i32) -> bool {
        self.is_in(winding_number)
    }
}

impl<F> WindingRule for F
where
    F: Fn(i32) -> bool,
{
    #[inline]
    fn is_filled(&self, winding_number: i32) -> bool {
        self(winding_number)
    }
}

#[test]
fn fill_rules() {
    assert!(FillRule::NonZero.is_in(1));
    assert!(FillRule::NonZero.is_in(-2));
    assert!(FillRule::NonZero.is_out(0));

    assert!(FillRule::EvenOdd.is_in(1));
    assert!(FillRule::EvenOdd.is_in(-3));
    assert!(FillRule::EvenOdd.is_out(0));
    assert!(FillRule::EvenOdd.is_out(2));

    assert!(FillRule::ComplementNonZero.is_in(0));
    assert!(FillRule::ComplementNonZero.is_out(1));

    assert!(FillRule::ComplementEvenOdd.is_in(0));
    assert!(FillRule::ComplementEvenOdd.is_in(2));
    assert!(FillRule::ComplementEvenOdd.is_out(-1));

    let rule = |w: i32| w > 1;
    assert!(rule.is_filled(2));
    assert!(!rule.is_filled(1));
}
