//! Deterministic float stream keyed by an arbitrary string.
//!
//! The seed string is folded with 32-bit FNV-1a over its UTF-16 code units,
//! then each draw advances the state by a fixed odd increment and mixes it
//! (mulberry32). All arithmetic wraps at 2^32, so the stream is identical on
//! every platform and matches other implementations of the same algorithm.
//!
//! This is not a cryptographic generator.

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;
const INCREMENT: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    pub fn new(seed: &str) -> Self {
        let state = seed
            .encode_utf16()
            .fold(FNV_OFFSET_BASIS, |hash, unit| (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME));
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Uniform index in `0..bound` as `floor(next_f64() * bound)`.
    pub fn next_index(&mut self, bound: usize) -> usize {
        let index = (self.next_f64() * bound as f64).floor() as usize;
        index.min(bound.saturating_sub(1))
    }
}

impl Iterator for SeededRandom {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}
