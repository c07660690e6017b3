//! Adler-32 with a vectorized 32 byte block accumulator.
//!
//! Per block of bytes `d0..d31` the running sums advance as
//! `b += 32 * a + sum((32 - i) * d_i)` and `a += sum(d_i)`, which is what the
//! SSSE3 path computes with one SAD and two multiply-adds. Tail bytes and
//! CPUs without SSSE3 go through the byte-at-a-time loop, so both paths
//! produce identical checksums.

const MOD_ADLER: u32 = 65_521;
const BLOCK: usize = 32;
/// Largest byte run the scalar loop can sum before `b` may overflow.
const NMAX: usize = 5_552;

/// Adler-32 of `data`, using SIMD when the CPU supports it.
pub fn adler32(data: &[u8]) -> u32 {
    let mut state = Adler32::new();
    state.update(data);
    state.finish()
}

/// Adler-32 without any vector path.
pub fn adler32_scalar(data: &[u8]) -> u32 {
    let mut state = Adler32::new();
    state.update_scalar(data);
    state.finish()
}

#[derive(Debug, Clone, Copy)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Adler32 {
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    pub fn update(&mut self, data: &[u8]) {
        #[cfg(target_arch = "x86_64")]
        {
            if std::arch::is_x86_feature_detected!("ssse3") {
                // SAFETY: the feature was detected at runtime.
                let tail = unsafe { self.update_blocks_ssse3(data) };
                self.update_scalar(tail);
                return;
            }
        }
        self.update_scalar(data);
    }

    fn update_scalar(&mut self, data: &[u8]) {
        for run in data.chunks(NMAX) {
            for &byte in run {
                self.a += byte as u32;
                self.b += self.a;
            }
            self.a %= MOD_ADLER;
            self.b %= MOD_ADLER;
        }
    }

    /// Consumes every whole 32 byte block and returns the unconsumed tail.
    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "ssse3")]
    unsafe fn update_blocks_ssse3<'a>(&mut self, data: &'a [u8]) -> &'a [u8] {
        use std::arch::x86_64::*;

        let mut chunks = data.chunks_exact(BLOCK);
        unsafe {
            let zero = _mm_setzero_si128();
            let ones = _mm_set1_epi16(1);
            let weights_lo = _mm_setr_epi8(
                32, 31, 30, 29, 28, 27, 26, 25, 24, 23, 22, 21, 20, 19, 18, 17,
            );
            let weights_hi = _mm_setr_epi8(
                16, 15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1,
            );

            for block in &mut chunks {
                let ptr = block.as_ptr() as *const __m128i;
                let lo = _mm_loadu_si128(ptr);
                let hi = _mm_loadu_si128(ptr.add(1));

                let byte_sums =
                    _mm_add_epi64(_mm_sad_epu8(lo, zero), _mm_sad_epu8(hi, zero));
                let weighted = _mm_add_epi32(
                    _mm_madd_epi16(_mm_maddubs_epi16(lo, weights_lo), ones),
                    _mm_madd_epi16(_mm_maddubs_epi16(hi, weights_hi), ones),
                );

                let mut sums = [0u64; 2];
                _mm_storeu_si128(sums.as_mut_ptr() as *mut __m128i, byte_sums);
                let mut lanes = [0u32; 4];
                _mm_storeu_si128(lanes.as_mut_ptr() as *mut __m128i, weighted);

                let sum = (sums[0] + sums[1]) as u32;
                let weighted_sum: u32 = lanes.iter().sum();

                self.b = (self.b + BLOCK as u32 * self.a + weighted_sum) % MOD_ADLER;
                self.a = (self.a + sum) % MOD_ADLER;
            }
        }
        chunks.remainder()
    }

    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }
}
