//! Lane abstraction for byte-wise SIMD.
//!
//! The UTF-8 classifier is written once against [`SimdVector`]; each
//! instruction set provides a thin adapter:
//!
//! - **Portable** (`[u8; 16]`): plain Rust, available everywhere
//! - **SSSE3** (x86_64): 16 bytes/vector, needs `pshufb` and `palignr`
//! - **AVX2** (x86_64): 32 bytes/vector
//! - **NEON** (aarch64): 16 bytes/vector
//!
//! All methods are `unsafe` because the hardware adapters call intrinsics
//! that require the matching CPU feature. Callers enter through a
//! `#[target_feature]` function after runtime detection, and every method is
//! `#[inline(always)]` so it is compiled with that function's features.

pub(crate) mod portable;

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86;

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;

/// A vector of `WIDTH` unsigned bytes.
pub(crate) trait SimdVector: Copy {
    /// Number of byte lanes.
    const WIDTH: usize;

    /// Unaligned load of `WIDTH` bytes.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reading `WIDTH` bytes.
    unsafe fn load(ptr: *const u8) -> Self;

    /// Broadcast `byte` to every lane.
    unsafe fn splat(byte: u8) -> Self;

    /// Replicate a 16-entry table into every 128-bit lane.
    unsafe fn table(entries: &[u8; 16]) -> Self;

    /// Table lookup: lane `i` becomes `table[self[i]]`.
    ///
    /// Every lane of `self` must be in `0..16`.
    unsafe fn lookup(self, table: Self) -> Self;

    /// Logical shift right by 4 within each byte (high nibble).
    unsafe fn shr4(self) -> Self;

    unsafe fn and(self, other: Self) -> Self;
    unsafe fn or(self, other: Self) -> Self;
    unsafe fn xor(self, other: Self) -> Self;

    /// Unsigned saturating subtraction per lane.
    unsafe fn saturating_sub(self, other: Self) -> Self;

    /// `self` shifted up by one lane with the last lane of `prev` shifted in.
    unsafe fn prev1(self, prev: Self) -> Self;

    /// `self` shifted up by two lanes with the last two lanes of `prev` shifted in.
    unsafe fn prev2(self, prev: Self) -> Self;

    /// `self` shifted up by three lanes with the last three lanes of `prev` shifted in.
    unsafe fn prev3(self, prev: Self) -> Self;

    /// Bit `i` is the high bit of lane `i` (movemask).
    unsafe fn high_bits(self) -> u64;

    /// True if every lane is zero.
    unsafe fn is_zero(self) -> bool;

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self::splat(0)
    }

    /// True if no lane has its high bit set.
    #[inline(always)]
    unsafe fn is_ascii(self) -> bool {
        self.high_bits() == 0
    }
}
