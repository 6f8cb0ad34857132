//! # knightnet
//!
//! A threshold automaton on the knight graph of a square grid.
//!
//! Every knight-move pair of squares is joined by a bistable connection. Each
//! tick, a connection integrates the activity of the connections sharing one
//! of its squares and switches on, off, or holds. The board reports when the
//! whole network has reached a fixed point.
//!
//! ## Quick Start
//!
//! ```
//! use knightnet::prelude::*;
//!
//! let mut board = Board::new(BoardConfig::with_size(6).with_seed(42)).unwrap();
//! board.step();
//!
//! if let Some(steps) = board.run_until_stable(1_000) {
//!     println!("stable after {steps} more steps");
//! }
//! let lit: Vec<_> = board.active_connections().map(|id| board.endpoints(id)).collect();
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialization of configs and snapshots
//! - `parallel`: Enable multi-threaded stepping via rayon
//!
//! ## Modules
//!
//! - [`topology`]: Knight-move wiring of the grid
//! - [`connection`]: The per-connection threshold rule
//! - [`board`]: Stepping, stability and reset
//! - [`observer`]: Read-only snapshots for presentation

#[path = "core/error.rs"]
pub mod error;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/history.rs"]
pub mod history;

#[path = "core/topology.rs"]
pub mod topology;

#[path = "core/connection.rs"]
pub mod connection;

#[path = "core/board.rs"]
pub mod board;

pub mod observer;

/// Prelude module for convenient imports.
///
/// ```
/// use knightnet::prelude::*;
/// ```
pub mod prelude {
    pub use crate::board::{Board, BoardConfig, Diagnostics, ExecutionTier};
    pub use crate::connection::{Connection, ConnectionState};
    pub use crate::error::{Coord, TopologyError};
    pub use crate::history::{OutputHistory, Tick, PATTERN_LOOKBACK};
    pub use crate::observer::{BoardAdapter, BoardSnapshot};
    pub use crate::topology::{ConnectionId, Square, SquareId, Topology, KNIGHT_MOVES};
}
