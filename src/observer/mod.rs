use crate::board::{Board, Diagnostics};
use crate::connection::Charge;
use crate::error::Coord;
use crate::history::Tick;
use crate::topology::square_index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A read-only snapshot of the board for presentation layers.
///
/// Design intent:
/// - Observers cannot mutate or step the board.
/// - Snapshotting is *on-demand* and allocates; `step()` stays unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardSnapshot {
    pub tick: Tick,
    pub size: usize,
    pub diagnostics: Diagnostics,
    pub squares: Vec<SquareView>,
    pub connections: Vec<ConnectionView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SquareView {
    pub x: usize,
    pub y: usize,
    pub active_degree: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectionView {
    pub from: Coord,
    pub to: Coord,
    pub output: u8,
    pub state: Charge,
}

pub struct BoardAdapter<'a> {
    board: &'a Board,
}

impl<'a> BoardAdapter<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let board = self.board;

        let squares = board
            .squares()
            .iter()
            .enumerate()
            .map(|(id, sq)| SquareView {
                x: sq.x,
                y: sq.y,
                active_degree: board.active_degree(id),
            })
            .collect();

        let connections = board
            .connections()
            .iter()
            .enumerate()
            .map(|(id, c)| {
                let (from, to) = board.endpoints(id);
                ConnectionView {
                    from,
                    to,
                    output: board.output(id),
                    state: c.state(),
                }
            })
            .collect();

        BoardSnapshot {
            tick: board.tick(),
            size: board.size(),
            diagnostics: board.diagnostics(),
            squares,
            connections,
        }
    }

    /// Active degree of every square as a text grid, top row = highest y.
    pub fn degree_grid(&self) -> String {
        let board = self.board;
        let n = board.size();
        let mut out = String::with_capacity(n * (2 * n + 1));
        for y in (0..n).rev() {
            for x in 0..n {
                let d = square_index(n, (x, y)).map_or(0, |id| board.active_degree(id));
                if x > 0 {
                    out.push(' ');
                }
                out.push(char::from_digit(d as u32, 10).unwrap_or('+'));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(feature = "serde")]
impl BoardSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
