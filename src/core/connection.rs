#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::history::{OutputHistory, Tick};
use crate::topology::SquareId;

/// Integer charge carried by a connection. Unbounded in the model; 64 bits
/// plus saturation keeps long runs from wrapping.
pub type Charge = i64;

/// Charge added every tick before subtracting neighborhood activity.
pub const DRIVE: Charge = 4;
/// `state` above this switches the output on.
pub const ON_THRESHOLD: Charge = 3;
/// `state` below this switches the output off.
pub const OFF_THRESHOLD: Charge = 0;

/// Compact, copyable view of a connection's two-tick state window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectionState {
    pub state: Charge,
    pub prev_state: Charge,
    pub output: u8,
}

/// A bistable edge between two squares.
#[derive(Debug, Clone)]
pub struct Connection {
    squares: [SquareId; 2],
    state: Charge,
    prev_state: Charge,
    output: OutputHistory,
}

/// One tick of the threshold rule.
///
/// The charge integrates `DRIVE - neighbor_sum`; the output turns on above
/// `ON_THRESHOLD`, off below `OFF_THRESHOLD`, and holds in between.
#[inline]
pub fn next_state(state: Charge, output: u8, neighbor_sum: u32) -> (Charge, u8) {
    let next = state.saturating_add(DRIVE - Charge::from(neighbor_sum));
    let out = if next > ON_THRESHOLD {
        1
    } else if next < OFF_THRESHOLD {
        0
    } else {
        output
    };
    (next, out)
}

impl Connection {
    pub fn new(squares: [SquareId; 2], seed: u8) -> Self {
        Self {
            squares,
            state: 0,
            prev_state: 0,
            output: OutputHistory::new(seed),
        }
    }

    pub fn squares(&self) -> [SquareId; 2] {
        self.squares
    }

    pub fn state(&self) -> Charge {
        self.state
    }

    pub fn prev_state(&self) -> Charge {
        self.prev_state
    }

    pub fn history(&self) -> &OutputHistory {
        &self.output
    }

    /// Most recent tick this connection has been advanced to.
    pub fn time(&self) -> Tick {
        self.output.latest_tick()
    }

    /// Output at the most recent tick.
    pub fn output(&self) -> u8 {
        self.output.latest()
    }

    /// Output at `tick`; panics outside the retained window.
    pub fn output_at(&self, tick: Tick) -> u8 {
        self.output.get(tick)
    }

    pub fn snapshot(&self) -> ConnectionState {
        ConnectionState {
            state: self.state,
            prev_state: self.prev_state,
            output: self.output(),
        }
    }

    /// Compute the state and output for the next tick without committing.
    #[inline]
    pub fn propose(&self, neighbor_sum: u32) -> (Charge, u8) {
        next_state(self.state, self.output(), neighbor_sum)
    }

    /// Shift the state window and record `output` at the next tick.
    #[inline]
    pub fn commit(&mut self, state: Charge, output: u8) {
        self.prev_state = self.state;
        self.state = state;
        self.output.push(output);
    }

    /// `propose` + `commit`.
    pub fn update(&mut self, neighbor_sum: u32) {
        let (state, output) = self.propose(neighbor_sum);
        self.commit(state, output);
    }

    /// True if the last tick changed either the output or the state.
    /// A connection that has never been advanced has no previous tick and
    /// counts as changed.
    pub fn has_changed(&self) -> bool {
        let t = self.time();
        if t == 0 {
            return true;
        }
        self.output.get(t) != self.output.get(t - 1) || self.state != self.prev_state
    }

    /// Reinitialize mutable fields; endpoints are kept.
    pub fn reset(&mut self, seed: u8) {
        self.state = 0;
        self.prev_state = 0;
        self.output.reset(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::PATTERN_LOOKBACK;

    #[test]
    fn threshold_rule_switches_and_holds() {
        // Above the band: on.
        assert_eq!(next_state(0, 0, 0), (4, 1));
        // Below the band: off.
        assert_eq!(next_state(0, 1, 5), (-1, 0));
        // In the band: sticky either way.
        assert_eq!(next_state(0, 1, 2), (2, 1));
        assert_eq!(next_state(0, 0, 2), (2, 0));
        assert_eq!(next_state(3, 0, 4), (3, 0));
        // Charge carried over from a negative state still switches off.
        assert_eq!(next_state(-1, 1, 4), (-1, 0));
    }

    #[test]
    fn band_edges_are_inclusive() {
        // state == 3 and state == 0 both keep the previous output.
        assert_eq!(next_state(0, 0, 1).1, 0);
        assert_eq!(next_state(0, 1, 4).1, 1);
        // One past each edge flips.
        assert_eq!(next_state(0, 0, 0).1, 1);
        assert_eq!(next_state(0, 1, 5).1, 0);
    }

    #[test]
    fn isolated_connection_seeded_on_keeps_charging() {
        let mut c = Connection::new([0, 1], 1);
        assert!(c.has_changed());

        for t in 1..=30 {
            // Alone on both squares: own output counted twice, so each tick
            // adds 4 - 2 to the charge.
            let sum = 2 * c.output() as u32;
            c.update(sum);
            assert_eq!(c.time(), t);
            assert_eq!(c.state(), 2 * t as Charge);
            assert_eq!(c.prev_state(), 2 * (t as Charge - 1));
            assert_eq!(c.output(), 1);
            assert!(c.has_changed());
        }
        assert!(c.history().len() <= PATTERN_LOOKBACK);
    }

    #[test]
    fn charge_past_i32_range_stays_on() {
        let mut c = Connection::new([0, 1], 1);
        c.state = i32::MAX as Charge - 1;
        c.update(2);
        assert_eq!(c.state(), i32::MAX as Charge + 1);
        assert_eq!(c.output(), 1);
    }

    #[test]
    fn charge_saturates_instead_of_wrapping() {
        let mut c = Connection::new([0, 1], 1);
        c.state = Charge::MAX - 1;
        c.update(0);
        assert_eq!(c.state(), Charge::MAX);
        assert_eq!(c.output(), 1);

        c.update(2);
        assert_eq!(c.state(), Charge::MAX);
        assert_eq!(c.output(), 1);
        // Pinned at the ceiling: no further change.
        assert!(!c.has_changed());

        assert_eq!(next_state(Charge::MIN + 1, 1, 8), (Charge::MIN, 0));
    }

    #[test]
    fn isolated_connection_seeded_off_keeps_charging() {
        let mut c = Connection::new([0, 1], 0);
        c.update(0);
        assert_eq!((c.state(), c.output()), (4, 1));
        c.update(2 * c.output() as u32);
        assert_eq!((c.state(), c.output()), (6, 1));
        assert!(c.has_changed());
    }

    #[test]
    fn reset_restores_initial_fields() {
        let mut c = Connection::new([3, 7], 1);
        for _ in 0..5 {
            c.update(6);
        }
        c.reset(0);
        assert_eq!(c.squares(), [3, 7]);
        assert_eq!(c.time(), 0);
        assert_eq!(
            c.snapshot(),
            ConnectionState {
                state: 0,
                prev_state: 0,
                output: 0
            }
        );
    }
}
