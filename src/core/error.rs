use thiserror::Error;

/// Grid coordinates `(x, y)` of a square.
pub type Coord = (usize, usize);

/// Wiring failures raised while building a board.
///
/// All of these point at a bug in the move set or in a hand-built topology;
/// none is recoverable by retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("connection already exists between {a:?} and {b:?}")]
    DuplicateConnection { a: Coord, b: Coord },

    #[error("square {0:?} cannot be connected to itself")]
    SelfLoop(Coord),

    #[error("square {coord:?} is outside a {size}x{size} grid")]
    OutOfBounds { coord: Coord, size: usize },

    #[error("grid size must be at least 1")]
    EmptyGrid,
}
