use crate::philox::{PhiloxBlock, PhiloxRandom, PHILOX_RESULT_ELEMENT_COUNT};

/// Hands out the words of a [`PhiloxRandom`] block one at a time.
///
/// A fresh adapter has no buffered words, so the first request runs the
/// generator. Word `n` of the stream is word `n % 4` of block `n / 4`.
#[derive(Debug, Clone)]
pub struct SingleSampleAdapter {
    generator: PhiloxRandom,
    unused_results: PhiloxBlock,
    used_result_index: usize,
}

impl SingleSampleAdapter {
    pub fn new(generator: PhiloxRandom) -> Self {
        Self {
            generator,
            unused_results: [0; PHILOX_RESULT_ELEMENT_COUNT],
            used_result_index: PHILOX_RESULT_ELEMENT_COUNT,
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        if self.used_result_index == PHILOX_RESULT_ELEMENT_COUNT {
            self.unused_results = self.generator.next_block();
            self.used_result_index = 0;
        }
        let value = self.unused_results[self.used_result_index];
        self.used_result_index += 1;
        value
    }

    /// Discard the next `count` words without computing whole blocks
    /// that would be thrown away.
    pub fn skip(&mut self, count: u64) {
        let buffered = (PHILOX_RESULT_ELEMENT_COUNT - self.used_result_index) as u64;
        if count <= buffered {
            self.used_result_index += count as usize;
            return;
        }
        let remaining = count - buffered;
        let block_size = PHILOX_RESULT_ELEMENT_COUNT as u64;
        self.generator.skip(remaining / block_size);
        self.used_result_index = PHILOX_RESULT_ELEMENT_COUNT;
        let offset = (remaining % block_size) as usize;
        if offset > 0 {
            self.unused_results = self.generator.next_block();
            self.used_result_index = offset;
        }
    }
}

/// Map a 32-bit word to a float in `[0, 1)`.
///
/// The low 23 bits become the mantissa of a float in `[1, 2)`,
/// which is then shifted down by one.
pub fn uint32_to_float(x: u32) -> f32 {
    const MANTISSA_MASK: u32 = 0x007f_ffff;
    const EXPONENT_ONE: u32 = 127 << 23;
    f32::from_bits(EXPONENT_ONE | (x & MANTISSA_MASK)) - 1.0
}
