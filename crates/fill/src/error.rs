/// The triangulator's result type.
pub type TriangulateResult = Result<(), TriangulateError>;

/// A hard failure inside the polygon triangulator.
///
/// Most triangulation trouble is *not* reported this way: a triangulator that
/// cannot resolve a vertex emits the reserved invalid vertex id instead, which
/// degrades that subset's output without aborting it. These errors are for
/// inputs the triangulator cannot process at all.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TriangulateError {
    /// A coordinate fed to the triangulator was NaN or infinite.
    NonFinitePosition,
    /// More vertices than the index type can address.
    TooManyVertices,
}

impl core::fmt::Display for TriangulateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TriangulateError::NonFinitePosition => {
                write!(f, "Position is not finite")
            }
            TriangulateError::TooManyVertices => {
                write!(f, "Too many vertices")
            }
        }
    }
}

impl std::error::Error for TriangulateError {}
