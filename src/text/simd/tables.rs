//! Nibble lookup tables for the vectorized UTF-8 classifier.
//!
//! Each byte pair `(prev1, input)` is classified by three 16-entry lookups:
//! the high nibble of `prev1`, the low nibble of `prev1`, and the high nibble
//! of `input`. Every table entry is a set of error bits; a bit survives the
//! AND of all three lookups only if all three nibbles agree that the pair
//! exhibits that error.

/// Lead byte followed by a non-continuation, or lead at end of a sequence
/// that is cut short.
pub(crate) const TOO_SHORT: u8 = 1 << 0;
/// ASCII followed by a continuation byte.
pub(crate) const TOO_LONG: u8 = 1 << 1;
/// `E0 80..9F`
pub(crate) const OVERLONG_3: u8 = 1 << 2;
/// `F4 90..BF` and `F5..FF ..`
pub(crate) const TOO_LARGE: u8 = 1 << 3;
/// `ED A0..BF`
pub(crate) const SURROGATE: u8 = 1 << 4;
/// `C0..C1 ..`
pub(crate) const OVERLONG_2: u8 = 1 << 5;
/// `F5..FF 80..8F`, the part of [`TOO_LARGE`] that `F4` allows.
pub(crate) const TOO_LARGE_1000: u8 = 1 << 6;
/// `F0 80..8F`
pub(crate) const OVERLONG_4: u8 = 1 << 6;
/// Continuation following continuation. Legal only as the 3rd or 4th byte
/// of a sequence, which the `must_be_2_3_continuation` check cancels out.
pub(crate) const TWO_CONTS: u8 = 1 << 7;

/// Bits that depend only on the kind of `prev1`, not its low nibble.
const CARRY: u8 = TOO_SHORT | TOO_LONG | TWO_CONTS;

/// Indexed by `prev1 >> 4`.
pub(crate) static BYTE_1_HIGH: [u8; 16] = [
    // 0_______ ASCII
    TOO_LONG,
    TOO_LONG,
    TOO_LONG,
    TOO_LONG,
    TOO_LONG,
    TOO_LONG,
    TOO_LONG,
    TOO_LONG,
    // 10______ continuation
    TWO_CONTS,
    TWO_CONTS,
    TWO_CONTS,
    TWO_CONTS,
    // 1100____
    TOO_SHORT | OVERLONG_2,
    // 1101____
    TOO_SHORT,
    // 1110____
    TOO_SHORT | OVERLONG_3 | SURROGATE,
    // 1111____
    TOO_SHORT | TOO_LARGE | TOO_LARGE_1000 | OVERLONG_4,
];

/// Indexed by `prev1 & 0x0F`.
pub(crate) static BYTE_1_LOW: [u8; 16] = [
    // ____0000
    CARRY | OVERLONG_3 | OVERLONG_2 | OVERLONG_4,
    // ____0001
    CARRY | OVERLONG_2,
    // ____001_
    CARRY,
    CARRY,
    // ____0100
    CARRY | TOO_LARGE,
    // ____0101 .. ____1100
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    // ____1101
    CARRY | TOO_LARGE | TOO_LARGE_1000 | SURROGATE,
    // ____111_
    CARRY | TOO_LARGE | TOO_LARGE_1000,
    CARRY | TOO_LARGE | TOO_LARGE_1000,
];

/// Indexed by `input >> 4`.
pub(crate) static BYTE_2_HIGH: [u8; 16] = [
    // 0_______ ASCII
    TOO_SHORT,
    TOO_SHORT,
    TOO_SHORT,
    TOO_SHORT,
    TOO_SHORT,
    TOO_SHORT,
    TOO_SHORT,
    TOO_SHORT,
    // 1000____
    TOO_LONG | OVERLONG_2 | TWO_CONTS | OVERLONG_3 | TOO_LARGE_1000 | OVERLONG_4,
    // 1001____
    TOO_LONG | OVERLONG_2 | TWO_CONTS | OVERLONG_3 | TOO_LARGE,
    // 101_____
    TOO_LONG | OVERLONG_2 | TWO_CONTS | SURROGATE | TOO_LARGE,
    TOO_LONG | OVERLONG_2 | TWO_CONTS | SURROGATE | TOO_LARGE,
    // 11______ lead bytes
    TOO_SHORT,
    TOO_SHORT,
    TOO_SHORT,
    TOO_SHORT,
];

/// Largest byte allowed in each of the last 32 positions without leaving a
/// sequence open. Backends load the last `WIDTH` entries.
pub(crate) static INCOMPLETE_MAX: [u8; 32] = {
    let mut max = [0xFF; 32];
    max[29] = 0b1110_1111; // no 4-byte lead in the third-to-last lane
    max[30] = 0b1101_1111; // no 3-byte lead or above in the second-to-last
    max[31] = 0b1011_1111; // no lead byte at all in the last
    max
};

/// Lead bytes of 3- and 4-byte sequences are above this.
pub(crate) const THIRD_BYTE_FLOOR: u8 = 0b1110_0000 - 0x80;
/// Lead bytes of 4-byte sequences are above this.
pub(crate) const FOURTH_BYTE_FLOOR: u8 = 0b1111_0000 - 0x80;
