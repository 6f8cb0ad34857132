/// Number of ticks of output each connection keeps.
pub const PATTERN_LOOKBACK: usize = 20;

/// Tick index of the board clock.
pub type Tick = u64;

/// Fixed-capacity ring buffer of a connection's binary outputs.
///
/// Slot `tick % PATTERN_LOOKBACK` holds the output at `tick`. Only the most
/// recent `PATTERN_LOOKBACK` ticks are readable; writing tick `t` overwrites
/// tick `t - PATTERN_LOOKBACK`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputHistory {
    slots: [u8; PATTERN_LOOKBACK],
    latest: Tick,
}

impl OutputHistory {
    /// History holding a single entry, `seed` at tick 0.
    pub fn new(seed: u8) -> Self {
        let mut slots = [0; PATTERN_LOOKBACK];
        slots[0] = seed & 1;
        Self { slots, latest: 0 }
    }

    /// Most recent tick recorded.
    #[inline]
    pub fn latest_tick(&self) -> Tick {
        self.latest
    }

    /// Output at the most recent tick.
    #[inline]
    pub fn latest(&self) -> u8 {
        self.slots[slot(self.latest)]
    }

    /// Oldest tick still readable.
    #[inline]
    pub fn oldest_tick(&self) -> Tick {
        self.latest.saturating_sub(PATTERN_LOOKBACK as Tick - 1)
    }

    /// Number of retained entries (never more than `PATTERN_LOOKBACK`).
    pub fn len(&self) -> usize {
        (self.latest - self.oldest_tick() + 1) as usize
    }

    /// Always false: the tick-0 seed is never evicted without a replacement.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, tick: Tick) -> bool {
        tick <= self.latest && tick >= self.oldest_tick()
    }

    pub fn try_get(&self, tick: Tick) -> Option<u8> {
        self.contains(tick).then(|| self.slots[slot(tick)])
    }

    /// Output at `tick`.
    ///
    /// Panics if `tick` is in the future or already evicted: the board only
    /// reads the previous tick, so either case is a stepping bug.
    #[inline]
    pub fn get(&self, tick: Tick) -> u8 {
        assert!(
            self.contains(tick),
            "output history read at tick {tick} outside retained window {}..={}",
            self.oldest_tick(),
            self.latest
        );
        self.slots[slot(tick)]
    }

    /// Append the output for the tick following `latest_tick()`.
    #[inline]
    pub fn push(&mut self, output: u8) {
        self.latest += 1;
        self.slots[slot(self.latest)] = output & 1;
    }

    /// Drop everything and start again from `seed` at tick 0.
    pub fn reset(&mut self, seed: u8) {
        *self = Self::new(seed);
    }

    /// Retained `(tick, output)` pairs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (Tick, u8)> + '_ {
        (self.oldest_tick()..=self.latest).map(move |t| (t, self.slots[slot(t)]))
    }
}

#[inline]
fn slot(tick: Tick) -> usize {
    (tick % PATTERN_LOOKBACK as Tick) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_at_tick_zero() {
        let h = OutputHistory::new(1);
        assert_eq!(h.latest_tick(), 0);
        assert_eq!(h.get(0), 1);
        assert_eq!(h.len(), 1);
        assert_eq!(h.try_get(1), None);
    }

    #[test]
    fn retains_only_lookback_window() {
        let mut h = OutputHistory::new(0);
        for t in 1..=50u64 {
            h.push((t % 3 == 0) as u8);
            assert!(h.len() <= PATTERN_LOOKBACK);
        }
        assert_eq!(h.len(), PATTERN_LOOKBACK);
        assert_eq!(h.oldest_tick(), 31);
        assert_eq!(h.try_get(30), None);
        assert_eq!(h.get(48), 1);
        assert_eq!(h.get(50), 0);

        let ticks: Vec<Tick> = h.iter().map(|(t, _)| t).collect();
        assert_eq!(ticks, (31..=50).collect::<Vec<_>>());
    }

    #[test]
    fn window_boundary_matches_eviction_point() {
        let mut h = OutputHistory::new(1);
        for _ in 0..19 {
            h.push(0);
        }
        // Ticks 0..=19 are all still present.
        assert_eq!(h.len(), 20);
        assert_eq!(h.get(0), 1);

        h.push(0);
        // Tick 20 evicts tick 0.
        assert_eq!(h.try_get(0), None);
        assert_eq!(h.len(), 20);
    }

    #[test]
    #[should_panic(expected = "outside retained window")]
    fn reading_evicted_tick_panics() {
        let mut h = OutputHistory::new(0);
        for _ in 0..25 {
            h.push(1);
        }
        h.get(2);
    }

    #[test]
    fn reset_discards_history() {
        let mut h = OutputHistory::new(0);
        for _ in 0..5 {
            h.push(1);
        }
        h.reset(1);
        assert_eq!(h, OutputHistory::new(1));
    }
}
