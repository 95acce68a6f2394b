//! ASCII run detection.
//!
//! Typical input is mostly ASCII, so both validators skip plain runs with a
//! broadword (SWAR) scan before doing any real decoding. The scan reads
//! aligned `u64` words and OR-reduces four of them (32 bytes) per step; only
//! when the reduced word has a high bit set does it look for the exact byte.

use bytemuck::pod_align_to;

/// High bit of every byte in a word.
const HI_BYTES: u64 = 0x8080_8080_8080_8080;

/// Offset of the first byte >= 0x80, or `input.len()` if there is none.
///
/// # Examples
///
/// ```
/// use utf8scan::text::ascii::first_non_ascii;
///
/// assert_eq!(first_non_ascii(b"plain"), 5);
/// assert_eq!(first_non_ascii("abc→".as_bytes()), 3);
/// ```
pub fn first_non_ascii(input: &[u8]) -> usize {
    let (head, words, tail) = pod_align_to::<u8, u64>(input);

    if let Some(i) = head.iter().position(|&b| b >= 0x80) {
        return i;
    }
    let mut offset = head.len();

    let mut quads = words.chunks_exact(4);
    for quad in &mut quads {
        if (quad[0] | quad[1] | quad[2] | quad[3]) & HI_BYTES != 0 {
            return offset + first_in_words(quad);
        }
        offset += 32;
    }

    let rest = quads.remainder();
    if rest.iter().fold(0, |acc, &w| acc | w) & HI_BYTES != 0 {
        return offset + first_in_words(rest);
    }
    offset += rest.len() * 8;

    match tail.iter().position(|&b| b >= 0x80) {
        Some(i) => offset + i,
        None => input.len(),
    }
}

/// True if every byte is ASCII.
#[inline]
pub fn is_ascii(input: &[u8]) -> bool {
    first_non_ascii(input) == input.len()
}

/// Byte offset of the first high bit within `words`, which must contain one.
#[inline]
fn first_in_words(words: &[u64]) -> usize {
    let mut offset = 0;
    for &w in words {
        let hi = w & HI_BYTES;
        if hi != 0 {
            return offset + byte_index(hi);
        }
        offset += 8;
    }
    offset
}

/// Memory index of the lowest-addressed byte with its high bit set.
#[inline(always)]
fn byte_index(hi: u64) -> usize {
    #[cfg(target_endian = "little")]
    {
        (hi.trailing_zeros() / 8) as usize
    }
    #[cfg(target_endian = "big")]
    {
        (hi.leading_zeros() / 8) as usize
    }
}
