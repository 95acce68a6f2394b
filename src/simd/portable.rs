//! Portable 128-bit lanes in plain Rust.
//!
//! Used on targets without a hardware backend and as a reference
//! implementation of [`SimdVector`] in tests. Each method is a straight
//! loop over 16 bytes, which the compiler is free to vectorize.

use super::SimdVector;

const LANES: usize = 16;

/// Sixteen byte lanes held in an ordinary array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct Portable(pub(crate) [u8; LANES]);

impl Portable {
    #[inline(always)]
    fn map(self, f: impl Fn(u8) -> u8) -> Self {
        let mut out = self.0;
        for b in out.iter_mut() {
            *b = f(*b);
        }
        Self(out)
    }

    #[inline(always)]
    fn zip(self, other: Self, f: impl Fn(u8, u8) -> u8) -> Self {
        let mut out = [0u8; LANES];
        for i in 0..LANES {
            out[i] = f(self.0[i], other.0[i]);
        }
        Self(out)
    }

    /// Shift up by `n` lanes, filling from the tail of `prev`.
    #[inline(always)]
    fn shift_in(self, prev: Self, n: usize) -> Self {
        let mut out = [0u8; LANES];
        out[..n].copy_from_slice(&prev.0[LANES - n..]);
        out[n..].copy_from_slice(&self.0[..LANES - n]);
        Self(out)
    }
}

impl SimdVector for Portable {
    const WIDTH: usize = LANES;

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        Self(core::ptr::read_unaligned(ptr as *const [u8; LANES]))
    }

    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        Self([byte; LANES])
    }

    #[inline(always)]
    unsafe fn table(entries: &[u8; 16]) -> Self {
        Self(*entries)
    }

    #[inline(always)]
    unsafe fn lookup(self, table: Self) -> Self {
        self.map(|i| table.0[(i & 0x0F) as usize])
    }

    #[inline(always)]
    unsafe fn shr4(self) -> Self {
        self.map(|b| b >> 4)
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        self.zip(other, |a, b| a & b)
    }

    #[inline(always)]
    unsafe fn or(self, other: Self) -> Self {
        self.zip(other, |a, b| a | b)
    }

    #[inline(always)]
    unsafe fn xor(self, other: Self) -> Self {
        self.zip(other, |a, b| a ^ b)
    }

    #[inline(always)]
    unsafe fn saturating_sub(self, other: Self) -> Self {
        self.zip(other, u8::saturating_sub)
    }

    #[inline(always)]
    unsafe fn prev1(self, prev: Self) -> Self {
        self.shift_in(prev, 1)
    }

    #[inline(always)]
    unsafe fn prev2(self, prev: Self) -> Self {
        self.shift_in(prev, 2)
    }

    #[inline(always)]
    unsafe fn prev3(self, prev: Self) -> Self {
        self.shift_in(prev, 3)
    }

    #[inline(always)]
    unsafe fn high_bits(self) -> u64 {
        let mut mask = 0u64;
        for (i, &b) in self.0.iter().enumerate() {
            mask |= ((b >> 7) as u64) << i;
        }
        mask
    }

    #[inline(always)]
    unsafe fn is_zero(self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}
