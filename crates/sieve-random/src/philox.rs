//! Philox4x32-10
//!
//! Salmon et al., "Parallel Random Numbers: As Easy as 1, 2, 3" (SC 2011).
//! The key is 64 bits, the counter 128 bits, and every invocation produces
//! four 32-bit words and advances the counter by one.

/// Number of 32-bit words produced per generator invocation.
pub const PHILOX_RESULT_ELEMENT_COUNT: usize = 4;

pub type PhiloxBlock = [u32; PHILOX_RESULT_ELEMENT_COUNT];

const PHILOX_W32_A: u32 = 0x9E37_79B9;
const PHILOX_W32_B: u32 = 0xBB67_AE85;
const PHILOX_M4X32_A: u32 = 0xD251_1F53;
const PHILOX_M4X32_B: u32 = 0xCD9E_8D57;
const PHILOX_ROUNDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhiloxRandom {
    counter: [u32; 4],
    key: [u32; 2],
}

impl PhiloxRandom {
    /// Create a generator keyed by `seed_lo` whose counter starts at
    /// `(0, 0, seed_hi)`, so that different `seed_hi` values select
    /// disjoint streams under the same key.
    pub fn with_stream(seed_lo: u64, seed_hi: u64) -> Self {
        let [hi_lo, hi_hi] = split(seed_hi);
        Self {
            counter: [0, 0, hi_lo, hi_hi],
            key: split(seed_lo),
        }
    }

    /// Produce the next block of four words and advance the counter by one.
    pub fn next_block(&mut self) -> PhiloxBlock {
        let mut counter = self.counter;
        let mut key = self.key;
        for round in 0..PHILOX_ROUNDS {
            counter = single_round(counter, key);
            if round + 1 < PHILOX_ROUNDS {
                raise_key(&mut key);
            }
        }
        self.skip_one();
        counter
    }

    /// Advance the 128-bit counter by `count` blocks.
    pub fn skip(&mut self, count: u64) {
        let low = u64::from(self.counter[0]) | (u64::from(self.counter[1]) << 32);
        let (low, carry) = low.overflowing_add(count);
        [self.counter[0], self.counter[1]] = split(low);
        if carry {
            self.counter[2] = self.counter[2].wrapping_add(1);
            if self.counter[2] == 0 {
                self.counter[3] = self.counter[3].wrapping_add(1);
            }
        }
    }

    fn skip_one(&mut self) {
        for word in self.counter.iter_mut() {
            *word = word.wrapping_add(1);
            if *word != 0 {
                break;
            }
        }
    }
}

fn split(value: u64) -> [u32; 2] {
    [value as u32, (value >> 32) as u32]
}

fn multiply_high_low(a: u32, b: u32) -> (u32, u32) {
    let product = (a as u64) * (b as u64);
    ((product >> 32) as u32, product as u32)
}

fn single_round(counter: [u32; 4], key: [u32; 2]) -> [u32; 4] {
    let (hi0, lo0) = multiply_high_low(PHILOX_M4X32_A, counter[0]);
    let (hi1, lo1) = multiply_high_low(PHILOX_M4X32_B, counter[2]);
    [
        hi1 ^ counter[1] ^ key[0],
        lo1,
        hi0 ^ counter[3] ^ key[1],
        lo0,
    ]
}

fn raise_key(key: &mut [u32; 2]) {
    key[0] = key[0].wrapping_add(PHILOX_W32_A);
    key[1] = key[1].wrapping_add(PHILOX_W32_B);
}
