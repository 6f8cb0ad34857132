//! Knight-move wiring of an N x N grid.
//!
//! Squares and connections live in two flat arenas. A square records the ids
//! of its incident connections; a connection records the ids of its two
//! squares. Nothing owns anything else, so the graph has no reference cycles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Coord, TopologyError};

pub type SquareId = usize;
pub type ConnectionId = usize;

/// The four knight offsets that wire the board. Every offset has `dy > 0`,
/// so its mirror is never visited and each unordered pair is produced once.
pub const KNIGHT_MOVES: [(isize, isize); 4] = [(2, 1), (-2, 1), (1, 2), (-1, 2)];

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square {
    pub x: usize,
    pub y: usize,
    /// Incident connections, in the order they were wired.
    pub connections: Vec<ConnectionId>,
}

impl Square {
    pub fn coord(&self) -> Coord {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone)]
pub struct Topology {
    size: usize,
    squares: Vec<Square>,
    edges: Vec<[SquareId; 2]>,
}

impl Topology {
    /// An N x N grid of squares with no connections yet.
    pub fn new(size: usize) -> Result<Self, TopologyError> {
        if size == 0 {
            return Err(TopologyError::EmptyGrid);
        }

        let mut squares = Vec::with_capacity(size * size);
        for x in 0..size {
            for y in 0..size {
                squares.push(Square {
                    x,
                    y,
                    connections: Vec::new(),
                });
            }
        }

        Ok(Self {
            size,
            squares,
            edges: Vec::new(),
        })
    }

    /// The full knight graph: offsets in `KNIGHT_MOVES` order, squares in
    /// row-major order (x outer, y inner) for each offset.
    pub fn knight_graph(size: usize) -> Result<Self, TopologyError> {
        let mut topo = Self::new(size)?;
        for mv in KNIGHT_MOVES {
            topo.add_knight_move(mv)?;
        }
        Ok(topo)
    }

    fn add_knight_move(&mut self, (dx, dy): (isize, isize)) -> Result<(), TopologyError> {
        let n = self.size as isize;
        for x in 0..n {
            for y in 0..n {
                let (tx, ty) = (x + dx, y + dy);
                if (0..n).contains(&tx) && (0..n).contains(&ty) {
                    self.connect(
                        (x as usize, y as usize),
                        (tx as usize, ty as usize),
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Wire `a` to `b`. Fails if the pair is already connected.
    pub fn connect(&mut self, a: Coord, b: Coord) -> Result<ConnectionId, TopologyError> {
        let ia = self.square_id(a)?;
        let ib = self.square_id(b)?;
        if ia == ib {
            return Err(TopologyError::SelfLoop(a));
        }
        if self.is_connected(a, b) {
            return Err(TopologyError::DuplicateConnection { a, b });
        }

        let id = self.edges.len();
        self.edges.push([ia, ib]);
        self.squares[ia].connections.push(id);
        self.squares[ib].connections.push(id);
        Ok(id)
    }

    /// True if some connection joins `a` and `b` (in either direction).
    pub fn is_connected(&self, a: Coord, b: Coord) -> bool {
        let (Ok(ia), Ok(ib)) = (self.square_id(a), self.square_id(b)) else {
            return false;
        };
        self.squares[ia].connections.iter().any(|&c| {
            let [p, q] = self.edges[c];
            (p == ia && q == ib) || (p == ib && q == ia)
        })
    }

    pub fn square_id(&self, coord: Coord) -> Result<SquareId, TopologyError> {
        square_index(self.size, coord).ok_or(TopologyError::OutOfBounds {
            coord,
            size: self.size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    pub fn square(&self, x: usize, y: usize) -> Option<&Square> {
        self.square_id((x, y)).ok().map(|id| &self.squares[id])
    }

    /// Endpoint square ids per connection, in creation order.
    pub fn edges(&self) -> &[[SquareId; 2]] {
        &self.edges
    }

    pub(crate) fn into_parts(self) -> (usize, Vec<Square>, Vec<[SquareId; 2]>) {
        (self.size, self.squares, self.edges)
    }
}

/// Arena index of `(x, y)` on an N x N grid, row-major with x outer.
#[inline]
pub fn square_index(size: usize, (x, y): Coord) -> Option<SquareId> {
    (x < size && y < size).then(|| x * size + y)
}

/// Number of knight-move pairs on an N x N grid.
pub fn knight_edge_count(size: usize) -> usize {
    if size < 3 {
        0
    } else {
        4 * (size - 1) * (size - 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(t: &Topology) -> Vec<(Coord, Coord)> {
        t.edges()
            .iter()
            .map(|&[a, b]| (t.squares()[a].coord(), t.squares()[b].coord()))
            .collect()
    }

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(Topology::new(0).unwrap_err(), TopologyError::EmptyGrid);
    }

    #[test]
    fn tiny_grids_have_no_connections() {
        for n in [1, 2] {
            let t = Topology::knight_graph(n).unwrap();
            assert_eq!(t.squares().len(), n * n);
            assert!(t.edges().is_empty());
        }
    }

    #[test]
    fn edge_count_matches_knight_pairs() {
        for n in 1..=10 {
            let t = Topology::knight_graph(n).unwrap();
            assert_eq!(t.edges().len(), knight_edge_count(n), "n = {n}");

            // Brute force: every unordered pair at knight distance, exactly once.
            let mut expected = 0;
            for a in t.squares() {
                for b in t.squares() {
                    let dx = a.x.abs_diff(b.x);
                    let dy = a.y.abs_diff(b.y);
                    if (dx, dy) == (1, 2) || (dx, dy) == (2, 1) {
                        expected += 1;
                        assert!(t.is_connected(a.coord(), b.coord()));
                    }
                }
            }
            assert_eq!(t.edges().len(), expected / 2);
        }
    }

    #[test]
    fn creation_order_is_pinned() {
        let t = Topology::knight_graph(3).unwrap();
        assert_eq!(
            coords(&t),
            vec![
                ((0, 0), (2, 1)),
                ((0, 1), (2, 2)),
                ((2, 0), (0, 1)),
                ((2, 1), (0, 2)),
                ((0, 0), (1, 2)),
                ((1, 0), (2, 2)),
                ((1, 0), (0, 2)),
                ((2, 0), (1, 2)),
            ]
        );
    }

    #[test]
    fn square_connection_lists_follow_wiring_order() {
        let t = Topology::knight_graph(3).unwrap();
        let corner = t.square(0, 0).unwrap();
        assert_eq!(corner.connections, vec![0, 4]);
        let center = t.square(1, 1).unwrap();
        assert!(center.connections.is_empty());
    }

    #[test]
    fn duplicate_connection_is_an_error() {
        let mut t = Topology::knight_graph(5).unwrap();
        let before = t.edges().len();
        let err = t.connect((2, 1), (0, 0)).unwrap_err();
        assert_eq!(
            err,
            TopologyError::DuplicateConnection {
                a: (2, 1),
                b: (0, 0)
            }
        );
        assert_eq!(t.edges().len(), before);
    }

    #[test]
    fn self_loop_and_out_of_range_are_errors() {
        let mut t = Topology::new(4).unwrap();
        assert_eq!(
            t.connect((1, 1), (1, 1)).unwrap_err(),
            TopologyError::SelfLoop((1, 1))
        );
        assert_eq!(
            t.connect((0, 0), (4, 1)).unwrap_err(),
            TopologyError::OutOfBounds {
                coord: (4, 1),
                size: 4
            }
        );
        assert!(!t.is_connected((0, 0), (9, 9)));
    }
}
