use rand::RngCore;

use crate::adapter::{uint32_to_float, SingleSampleAdapter};
use crate::philox::{PhiloxRandom, PHILOX_RESULT_ELEMENT_COUNT};

/// The uniform value at position `index` of the stream seeded by `(seed, seed2)`.
///
/// This is a pure function. [`SamplingRng`] produces the same values in order.
pub fn draw(seed: i64, seed2: i64, index: u64) -> f32 {
    let block_size = PHILOX_RESULT_ELEMENT_COUNT as u64;
    let mut philox = PhiloxRandom::with_stream(seed as u64, seed2 as u64);
    philox.skip(index / block_size);
    let block = philox.next_block();
    uint32_to_float(block[(index % block_size) as usize])
}

/// A seeded uniform generator whose position is the number of draws taken.
///
/// Restoring from `(seed, seed2, draw_count)` yields a generator that
/// continues exactly where the original left off.
#[derive(Debug, Clone)]
pub struct SamplingRng {
    seed: i64,
    seed2: i64,
    draw_count: u64,
    generator: SingleSampleAdapter,
}

impl SamplingRng {
    pub fn new(seed: i64, seed2: i64) -> Self {
        Self {
            seed,
            seed2,
            draw_count: 0,
            generator: SingleSampleAdapter::new(PhiloxRandom::with_stream(
                seed as u64,
                seed2 as u64,
            )),
        }
    }

    /// Rebuild the generator as if `draw_count` values had already been drawn.
    pub fn restore(seed: i64, seed2: i64, draw_count: u64) -> Self {
        let mut rng = Self::new(seed, seed2);
        rng.generator.skip(draw_count);
        rng.draw_count = draw_count;
        rng
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn seed2(&self) -> i64 {
        self.seed2
    }

    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    /// Draw the next uniform value in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        uint32_to_float(RngCore::next_u32(self))
    }
}

impl RngCore for SamplingRng {
    fn next_u32(&mut self) -> u32 {
        self.draw_count += 1;
        self.generator.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_u32());
        let hi = u64::from(self.next_u32());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_golden_draws_below_ten_percent() {
        let mut rng = SamplingRng::new(42, 7);
        let hits: Vec<u64> = (0..20u64).filter(|_| rng.next_f32() < 0.1).collect();
        assert_eq!(hits, vec![9, 11, 19]);
        assert_eq!(rng.draw_count(), 20);
    }

    #[test]
    fn test_first_draw() {
        let expected = uint32_to_float(0x67ee_6f2c);
        assert_eq!(SamplingRng::new(42, 7).next_f32(), expected);
        assert_eq!(draw(42, 7, 0), expected);
        assert!((expected - 0.862_767_7).abs() < 1e-6);
    }

    #[test]
    fn test_stateful_matches_pure_draw() {
        let mut rng = SamplingRng::new(-5, i64::MIN);
        for index in 0..64 {
            assert_eq!(rng.next_f32(), draw(-5, i64::MIN, index));
        }
    }

    #[test]
    fn test_restore_continues_stream() {
        let mut seeds = ChaCha8Rng::seed_from_u64(2019);
        for _ in 0..32 {
            let seed: i64 = seeds.random();
            let seed2: i64 = seeds.random();
            let position: u64 = seeds.random_range(0..1000);

            let mut original = SamplingRng::new(seed, seed2);
            for _ in 0..position {
                original.next_f32();
            }
            let mut restored = SamplingRng::restore(seed, seed2, position);
            assert_eq!(restored.draw_count(), original.draw_count());
            for _ in 0..9 {
                assert_eq!(restored.next_f32(), original.next_f32());
            }
        }
    }

    #[test]
    fn test_draws_are_roughly_uniform() {
        let mut rng = SamplingRng::new(1, 2);
        let n = 100_000;
        let below = (0..n).filter(|_| rng.next_f32() < 0.25).count();
        let fraction = below as f64 / n as f64;
        assert!((fraction - 0.25).abs() < 0.01, "fraction {fraction}");
    }

    #[test]
    fn test_rng_core_counts_draws() {
        let mut rng = SamplingRng::new(42, 7);
        let _: u64 = rng.next_u64();
        assert_eq!(rng.draw_count(), 2);
        let mut bytes = [0u8; 6];
        rng.fill_bytes(&mut bytes);
        assert_eq!(rng.draw_count(), 4);
        let _ = rng.random_bool(0.5);
        assert!(rng.draw_count() > 4);
    }
}
