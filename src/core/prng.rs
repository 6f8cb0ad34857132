// Minimal PRNG (no external crates).
//
// This is NOT cryptographically secure.
// It only seeds the initial connection outputs, so runs are reproducible per seed.

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform bit in {0, 1}, taken from the high bit (the best-mixed one).
    #[inline]
    pub fn next_bit(&mut self) -> u8 {
        (self.next_u64() >> 63) as u8
    }
}
