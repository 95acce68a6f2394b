//! x86_64 SIMD backends.
//!
//! - [`Sse`]: 128-bit lanes; needs SSSE3 for `pshufb` and `palignr`
//! - [`Avx2`]: 256-bit lanes; tables are replicated into both 128-bit halves
//!   because `vpshufb` only looks up within a half
//!
//! Callers must have verified the CPU feature (via `is_x86_feature_detected!`
//! or a compile-time `target_feature`) before using either type.

use core::arch::x86_64::*;

use super::SimdVector;

/// 16 bytes in an SSE register.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub(crate) struct Sse(__m128i);

/// 32 bytes in an AVX2 register.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub(crate) struct Avx2(__m256i);

impl SimdVector for Sse {
    const WIDTH: usize = 16;

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        Self(_mm_loadu_si128(ptr as *const __m128i))
    }

    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        Self(_mm_set1_epi8(byte as i8))
    }

    #[inline(always)]
    unsafe fn table(entries: &[u8; 16]) -> Self {
        Self(_mm_loadu_si128(entries.as_ptr() as *const __m128i))
    }

    #[inline(always)]
    unsafe fn lookup(self, table: Self) -> Self {
        Self(_mm_shuffle_epi8(table.0, self.0))
    }

    #[inline(always)]
    unsafe fn shr4(self) -> Self {
        // No 8-bit shift on x86: shift 16-bit words and drop the bits that
        // crossed in from the neighbouring byte.
        let shifted = _mm_srli_epi16(self.0, 4);
        Self(_mm_and_si128(shifted, _mm_set1_epi8(0x0F)))
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        Self(_mm_and_si128(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn or(self, other: Self) -> Self {
        Self(_mm_or_si128(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn xor(self, other: Self) -> Self {
        Self(_mm_xor_si128(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn saturating_sub(self, other: Self) -> Self {
        Self(_mm_subs_epu8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn prev1(self, prev: Self) -> Self {
        // result[0] = prev[15], result[1..16] = self[0..15]
        Self(_mm_alignr_epi8(self.0, prev.0, 15))
    }

    #[inline(always)]
    unsafe fn prev2(self, prev: Self) -> Self {
        Self(_mm_alignr_epi8(self.0, prev.0, 14))
    }

    #[inline(always)]
    unsafe fn prev3(self, prev: Self) -> Self {
        Self(_mm_alignr_epi8(self.0, prev.0, 13))
    }

    #[inline(always)]
    unsafe fn high_bits(self) -> u64 {
        _mm_movemask_epi8(self.0) as u32 as u64
    }

    #[inline(always)]
    unsafe fn is_zero(self) -> bool {
        _mm_movemask_epi8(_mm_cmpeq_epi8(self.0, _mm_setzero_si128())) == 0xFFFF
    }
}

impl SimdVector for Avx2 {
    const WIDTH: usize = 32;

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        Self(_mm256_loadu_si256(ptr as *const __m256i))
    }

    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        Self(_mm256_set1_epi8(byte as i8))
    }

    #[inline(always)]
    unsafe fn table(entries: &[u8; 16]) -> Self {
        let lane = _mm_loadu_si128(entries.as_ptr() as *const __m128i);
        Self(_mm256_broadcastsi128_si256(lane))
    }

    #[inline(always)]
    unsafe fn lookup(self, table: Self) -> Self {
        Self(_mm256_shuffle_epi8(table.0, self.0))
    }

    #[inline(always)]
    unsafe fn shr4(self) -> Self {
        let shifted = _mm256_srli_epi16(self.0, 4);
        Self(_mm256_and_si256(shifted, _mm256_set1_epi8(0x0F)))
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        Self(_mm256_and_si256(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn or(self, other: Self) -> Self {
        Self(_mm256_or_si256(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn xor(self, other: Self) -> Self {
        Self(_mm256_xor_si256(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn saturating_sub(self, other: Self) -> Self {
        Self(_mm256_subs_epu8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn prev1(self, prev: Self) -> Self {
        // _mm256_alignr_epi8 works within 128-bit halves, so first build
        // [prev_high, self_low] to supply the bytes that cross the middle.
        let prev_high_self_low = _mm256_permute2x128_si256(prev.0, self.0, 0x21);
        Self(_mm256_alignr_epi8(self.0, prev_high_self_low, 15))
    }

    #[inline(always)]
    unsafe fn prev2(self, prev: Self) -> Self {
        let prev_high_self_low = _mm256_permute2x128_si256(prev.0, self.0, 0x21);
        Self(_mm256_alignr_epi8(self.0, prev_high_self_low, 14))
    }

    #[inline(always)]
    unsafe fn prev3(self, prev: Self) -> Self {
        let prev_high_self_low = _mm256_permute2x128_si256(prev.0, self.0, 0x21);
        Self(_mm256_alignr_epi8(self.0, prev_high_self_low, 13))
    }

    #[inline(always)]
    unsafe fn high_bits(self) -> u64 {
        _mm256_movemask_epi8(self.0) as u32 as u64
    }

    #[inline(always)]
    unsafe fn is_zero(self) -> bool {
        _mm256_testz_si256(self.0, self.0) == 1
    }
}
