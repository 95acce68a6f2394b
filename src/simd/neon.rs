//! NEON backend for aarch64 (16 bytes per vector).

use core::arch::aarch64::*;

use super::SimdVector;

/// 16 bytes in a NEON register.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub(crate) struct Neon(uint8x16_t);

/// Extract a bitmask from the high bit of each byte in a NEON vector.
/// Returns a u16 where bit i is set if byte i has its high bit set.
#[inline(always)]
unsafe fn neon_movemask(v: uint8x16_t) -> u16 {
    // Shift each byte right by 7 to get just the high bit
    let high_bits = vshrq_n_u8::<7>(v);

    // Shift each byte left by its lane index within its half
    let shift_amounts: [i8; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2, 3, 4, 5, 6, 7];
    let shifts = vld1q_s8(shift_amounts.as_ptr());
    let shifted = vshlq_u8(high_bits, shifts);

    // Horizontal add within each half to get a single byte
    let low_sum = vaddv_u8(vget_low_u8(shifted)) as u16;
    let high_sum = vaddv_u8(vget_high_u8(shifted)) as u16;

    low_sum | (high_sum << 8)
}

impl SimdVector for Neon {
    const WIDTH: usize = 16;

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        Self(vld1q_u8(ptr))
    }

    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        Self(vdupq_n_u8(byte))
    }

    #[inline(always)]
    unsafe fn table(entries: &[u8; 16]) -> Self {
        Self(vld1q_u8(entries.as_ptr()))
    }

    #[inline(always)]
    unsafe fn lookup(self, table: Self) -> Self {
        Self(vqtbl1q_u8(table.0, self.0))
    }

    #[inline(always)]
    unsafe fn shr4(self) -> Self {
        Self(vshrq_n_u8::<4>(self.0))
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        Self(vandq_u8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn or(self, other: Self) -> Self {
        Self(vorrq_u8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn xor(self, other: Self) -> Self {
        Self(veorq_u8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn saturating_sub(self, other: Self) -> Self {
        Self(vqsubq_u8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn prev1(self, prev: Self) -> Self {
        // vext takes lanes 15.. of prev followed by lanes ..15 of self
        Self(vextq_u8::<15>(prev.0, self.0))
    }

    #[inline(always)]
    unsafe fn prev2(self, prev: Self) -> Self {
        Self(vextq_u8::<14>(prev.0, self.0))
    }

    #[inline(always)]
    unsafe fn prev3(self, prev: Self) -> Self {
        Self(vextq_u8::<13>(prev.0, self.0))
    }

    #[inline(always)]
    unsafe fn high_bits(self) -> u64 {
        neon_movemask(self.0) as u64
    }

    #[inline(always)]
    unsafe fn is_zero(self) -> bool {
        vmaxvq_u8(self.0) == 0
    }

    #[inline(always)]
    unsafe fn is_ascii(self) -> bool {
        vmaxvq_u8(self.0) < 0x80
    }
}
