//! Block classification for vectorized UTF-8 validation.
//!
//! A block is checked against the tail of the block before it, so every
//! byte pair, triple and quadruple is seen exactly once even when it spans
//! two blocks. The classifier only says *whether* a block contains an
//! error; the exact offset comes from rescanning with the scalar validator.

use super::tables::{
    BYTE_1_HIGH, BYTE_1_LOW, BYTE_2_HIGH, FOURTH_BYTE_FLOOR, INCOMPLETE_MAX, THIRD_BYTE_FLOOR,
};
use crate::simd::SimdVector;
use crate::text::counts::Aggregates;

/// Lookup tables and splatted constants, built once per call.
#[derive(Clone, Copy)]
pub(crate) struct Constants<V> {
    byte_1_high: V,
    byte_1_low: V,
    byte_2_high: V,
    low_nibble: V,
    high_bit: V,
    third_byte: V,
    fourth_byte: V,
    /// Bytes >= 0xC0 keep their high bit after subtracting this.
    lead_floor: V,
    incomplete_max: V,
}

impl<V: SimdVector> Constants<V> {
    #[inline(always)]
    pub(crate) unsafe fn new() -> Self {
        let incomplete = INCOMPLETE_MAX.len() - V::WIDTH;
        Self {
            byte_1_high: V::table(&BYTE_1_HIGH),
            byte_1_low: V::table(&BYTE_1_LOW),
            byte_2_high: V::table(&BYTE_2_HIGH),
            low_nibble: V::splat(0x0F),
            high_bit: V::splat(0x80),
            third_byte: V::splat(THIRD_BYTE_FLOOR),
            fourth_byte: V::splat(FOURTH_BYTE_FLOOR),
            lead_floor: V::splat(0xC0 - 0x80),
            incomplete_max: V::load(INCOMPLETE_MAX.as_ptr().add(incomplete)),
        }
    }
}

/// Error bits that the pair `(prev1, input)` exhibits in each lane.
#[inline(always)]
unsafe fn check_special_cases<V: SimdVector>(input: V, prev1: V, c: &Constants<V>) -> V {
    let byte_1_high = prev1.shr4().lookup(c.byte_1_high);
    let byte_1_low = prev1.and(c.low_nibble).lookup(c.byte_1_low);
    let byte_2_high = input.shr4().lookup(c.byte_2_high);
    byte_1_high.and(byte_1_low).and(byte_2_high)
}

/// Cancel the TWO_CONTS bit where a continuation is the 3rd or 4th byte of
/// a sequence, and flag it where a 3rd or 4th byte is missing.
#[inline(always)]
unsafe fn check_multibyte_lengths<V: SimdVector>(
    input: V,
    prev_input: V,
    special_cases: V,
    c: &Constants<V>,
) -> V {
    let prev2 = input.prev2(prev_input);
    let prev3 = input.prev3(prev_input);
    let is_third_byte = prev2.saturating_sub(c.third_byte);
    let is_fourth_byte = prev3.saturating_sub(c.fourth_byte);
    let must_be_2_3_continuation = is_third_byte.or(is_fourth_byte).and(c.high_bit);
    must_be_2_3_continuation.xor(special_cases)
}

/// Nonzero lanes mark a lead byte whose sequence runs past the block.
#[inline(always)]
unsafe fn is_incomplete<V: SimdVector>(input: V, c: &Constants<V>) -> V {
    input.saturating_sub(c.incomplete_max)
}

/// Counts needed to recover deltas for one clean vector.
///
/// Continuations are the high-bit lanes that are not lead bytes, so the
/// non-ASCII mask is shared between the continuation and ASCII counts.
/// Runs of all-ASCII vectors never get here; the engine counts those with
/// [`Aggregates::add_ascii`].
#[inline(always)]
pub(crate) unsafe fn block_counts<V: SimdVector>(input: V, c: &Constants<V>) -> Aggregates {
    let non_ascii = input.high_bits();
    let leads = input.saturating_sub(c.lead_floor).high_bits();
    let four_byte_leads = input.saturating_sub(c.fourth_byte).high_bits();
    let continuation = (non_ascii & !leads).count_ones() as usize;
    Aggregates {
        ascii: V::WIDTH - non_ascii.count_ones() as usize,
        continuation,
        four_byte_leads: four_byte_leads.count_ones() as usize,
        total: V::WIDTH,
    }
}

/// Carry state between blocks of one call.
#[derive(Clone, Copy)]
pub(crate) struct ClassifierState<V> {
    prev_block: V,
    prev_incomplete: V,
    error: V,
}

impl<V: SimdVector> ClassifierState<V> {
    #[inline(always)]
    pub(crate) unsafe fn new() -> Self {
        Self {
            prev_block: V::zero(),
            prev_incomplete: V::zero(),
            error: V::zero(),
        }
    }

    /// Classify one vector that may contain non-ASCII bytes.
    #[inline(always)]
    pub(crate) unsafe fn check_block(&mut self, input: V, c: &Constants<V>) {
        let prev1 = input.prev1(self.prev_block);
        let special_cases = check_special_cases(input, prev1, c);
        let errors = check_multibyte_lengths(input, self.prev_block, special_cases, c);
        self.error = self.error.or(errors);
        self.prev_incomplete = is_incomplete(input, c);
        self.prev_block = input;
    }

    /// Account for an all-ASCII run ending in `last`.
    ///
    /// ASCII right after an open sequence is an error; otherwise there is
    /// nothing to check.
    #[inline(always)]
    pub(crate) unsafe fn check_ascii_block(&mut self, last: V) {
        self.error = self.error.or(self.prev_incomplete);
        self.prev_incomplete = V::zero();
        self.prev_block = last;
    }

    #[inline(always)]
    pub(crate) unsafe fn has_error(&self) -> bool {
        !self.error.is_zero()
    }

    /// True if the last classified block ends inside a sequence.
    #[inline(always)]
    pub(crate) unsafe fn has_pending(&self) -> bool {
        !self.prev_incomplete.is_zero()
    }
}
