#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::debug;

use crate::connection::{Charge, Connection};
use crate::error::{Coord, TopologyError};
use crate::history::Tick;
use crate::prng::Prng;
use crate::topology::{square_index, ConnectionId, Square, SquareId, Topology};

/// Execution tier for `step()`.
///
/// - `Scalar`: single-threaded, in-place update (default, works everywhere)
/// - `Parallel`: next states computed with rayon, then committed
///   (requires `parallel` feature)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExecutionTier {
    #[default]
    Scalar,
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// Side length of the square grid.
    pub size: usize,

    // Seeds the initial output bits. `None` uses a fixed default seed.
    pub seed: Option<u64>,

    pub execution_tier: ExecutionTier,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: 6,
            seed: None,
            execution_tier: ExecutionTier::Scalar,
        }
    }
}

impl BoardConfig {
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_execution_tier(mut self, tier: ExecutionTier) -> Self {
        self.execution_tier = tier;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    pub tick: Tick,
    pub square_count: usize,
    pub connection_count: usize,
    pub active_connections: usize,
    /// Squares with exactly two active connections.
    pub squares_with_degree_two: usize,
    pub stable: bool,
    /// Every square has exactly two active connections, which a closed
    /// knight's tour requires.
    pub tour_candidate: bool,
}

/// The knight-graph automaton: squares, connections and the shared clock.
#[derive(Debug, Clone)]
pub struct Board {
    cfg: BoardConfig,
    size: usize,
    squares: Vec<Square>,
    connections: Vec<Connection>,

    tick: Tick,
    rng: Prng,
    tier: ExecutionTier,

    // Per-square sum of incident outputs at `tick`; rebuilt every step.
    load: Vec<u32>,
}

impl Board {
    /// Build the full knight graph for `cfg.size`.
    pub fn new(cfg: BoardConfig) -> Result<Self, TopologyError> {
        let topology = Topology::knight_graph(cfg.size)?;
        Ok(Self::from_topology(topology, cfg))
    }

    /// Wrap an explicitly wired topology. `cfg.size` is taken from the topology.
    pub fn from_topology(topology: Topology, cfg: BoardConfig) -> Self {
        let (size, squares, edges) = topology.into_parts();
        let mut rng = Prng::new(cfg.seed.unwrap_or(1));

        let connections: Vec<Connection> = edges
            .into_iter()
            .map(|pair| Connection::new(pair, rng.next_bit()))
            .collect();

        debug!(
            size,
            connections = connections.len(),
            "knight board constructed"
        );

        Self {
            cfg: BoardConfig { size, ..cfg },
            size,
            load: vec![0; squares.len()],
            squares,
            connections,
            tick: 0,
            rng,
            tier: cfg.execution_tier,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.cfg
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Current board tick; every connection has been advanced exactly this many times.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    pub fn square(&self, x: usize, y: usize) -> Option<&Square> {
        square_index(self.size, (x, y)).map(|id| &self.squares[id])
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, id: ConnectionId) -> &Connection {
        &self.connections[id]
    }

    /// Coordinates of both endpoints of `id`.
    pub fn endpoints(&self, id: ConnectionId) -> (Coord, Coord) {
        let [a, b] = self.connections[id].squares();
        (self.squares[a].coord(), self.squares[b].coord())
    }

    /// Output of `id` at the current tick.
    pub fn output(&self, id: ConnectionId) -> u8 {
        self.connections[id].output_at(self.tick)
    }

    /// Connections whose current output is 1, in creation order.
    pub fn active_connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        (0..self.connections.len()).filter(move |&id| self.output(id) == 1)
    }

    // =========================================================================
    // Execution Tier Configuration
    // =========================================================================

    pub fn set_execution_tier(&mut self, tier: ExecutionTier) {
        self.tier = tier;
    }

    pub fn execution_tier(&self) -> ExecutionTier {
        self.tier
    }

    /// The tier `step()` will actually use, after compile-time feature gates.
    pub fn effective_execution_tier(&self) -> ExecutionTier {
        match self.tier {
            ExecutionTier::Scalar => ExecutionTier::Scalar,
            ExecutionTier::Parallel => {
                #[cfg(feature = "parallel")]
                {
                    ExecutionTier::Parallel
                }
                #[cfg(not(feature = "parallel"))]
                {
                    ExecutionTier::Scalar
                }
            }
        }
    }

    // =========================================================================
    // Dynamics
    // =========================================================================

    /// Sum of the outputs at `tick` of every connection touching either
    /// endpoint of `id`. `id` itself is counted once per endpoint.
    pub fn neighbor_sum(&self, id: ConnectionId, tick: Tick) -> u32 {
        self.connections[id]
            .squares()
            .into_iter()
            .flat_map(|sq| self.squares[sq].connections.iter())
            .map(|&c| self.connections[c].output_at(tick) as u32)
            .sum()
    }

    /// Sum of the outputs at `tick` of the connections incident to `square`.
    pub fn square_load(&self, square: SquareId, tick: Tick) -> u32 {
        self.squares[square]
            .connections
            .iter()
            .map(|&c| self.connections[c].output_at(tick) as u32)
            .sum()
    }

    /// Advance every connection by one tick.
    ///
    /// All reads are at the current tick and each connection writes only its
    /// own next tick, so update order does not matter.
    pub fn step(&mut self) {
        self.refresh_load();

        match self.effective_execution_tier() {
            ExecutionTier::Scalar => self.step_scalar(),
            ExecutionTier::Parallel => self.step_parallel(),
        }

        self.tick += 1;
    }

    fn refresh_load(&mut self) {
        let t = self.tick;
        for (sq, load) in self.load.iter_mut().enumerate() {
            *load = self.squares[sq]
                .connections
                .iter()
                .map(|&c| self.connections[c].output_at(t) as u32)
                .sum();
        }
    }

    fn step_scalar(&mut self) {
        let load = &self.load;
        for conn in &mut self.connections {
            let [a, b] = conn.squares();
            conn.update(load[a] + load[b]);
        }
    }

    #[cfg(feature = "parallel")]
    fn step_parallel(&mut self) {
        let load = &self.load;
        let next: Vec<(Charge, u8)> = self
            .connections
            .par_iter()
            .map(|conn| {
                let [a, b] = conn.squares();
                conn.propose(load[a] + load[b])
            })
            .collect();

        self.connections
            .par_iter_mut()
            .zip(next)
            .for_each(|(conn, (state, output))| conn.commit(state, output));
    }

    #[cfg(not(feature = "parallel"))]
    fn step_parallel(&mut self) {
        self.step_scalar();
    }

    /// True when no connection changed state or output on the last tick.
    ///
    /// An empty board is trivially stable. A non-empty board at tick 0 has no
    /// previous tick to compare against and is not.
    pub fn is_stable(&self) -> bool {
        self.connections.iter().all(|c| !c.has_changed())
    }

    /// Step until `is_stable()` or `max_steps` steps have run.
    ///
    /// Returns the number of steps taken when stability was reached.
    pub fn run_until_stable(&mut self, max_steps: u64) -> Option<u64> {
        for n in 1..=max_steps {
            self.step();
            if self.is_stable() {
                debug!(steps = n, tick = self.tick, "board stable");
                return Some(n);
            }
        }
        None
    }

    /// Put every connection back to tick 0 with a fresh random output.
    /// Topology is untouched.
    pub fn reset(&mut self) {
        for conn in &mut self.connections {
            conn.reset(self.rng.next_bit());
        }
        self.tick = 0;
        debug!(connections = self.connections.len(), "board reset");
    }

    /// Reseed, then `reset()`. Reproduces a fresh board built with `seed`.
    pub fn reset_with_seed(&mut self, seed: u64) {
        self.rng = Prng::new(seed);
        self.cfg.seed = Some(seed);
        self.reset();
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Active (output 1) connections touching `square` at the current tick.
    pub fn active_degree(&self, square: SquareId) -> usize {
        self.square_load(square, self.tick) as usize
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let active_connections = self.active_connections().count();
        let squares_with_degree_two = (0..self.squares.len())
            .filter(|&sq| self.active_degree(sq) == 2)
            .count();

        Diagnostics {
            tick: self.tick,
            square_count: self.squares.len(),
            connection_count: self.connections.len(),
            active_connections,
            squares_with_degree_two,
            stable: self.is_stable(),
            tour_candidate: !self.connections.is_empty()
                && squares_with_degree_two == self.squares.len(),
        }
    }
}
