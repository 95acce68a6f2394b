//! Byte-at-a-time UTF-8 validation.
//!
//! This is the ground truth every vectorized implementation is checked
//! against, and the tail processor they all hand off to. The loop alternates
//! between two routines: [`skip_ascii_run`] consumes plain bytes a word at a
//! time, and [`decode_sequence`] checks one non-ASCII sequence. The first
//! sequence that fails ends the scan.

use super::ascii::first_non_ascii;
use super::utf8::{is_continuation_byte, Utf8ErrorKind, Validation};
use crate::Deltas;

/// Validate `input`, returning the offset of the first malformed sequence
/// (or `input.len()`) and the deltas of every complete sequence before it.
pub(crate) fn validate(input: &[u8]) -> Validation {
    let len = input.len();
    let mut pos = 0;
    let mut deltas = Deltas::ZERO;

    while pos < len {
        pos = skip_ascii_run(input, pos);
        if pos == len {
            break;
        }
        match decode_sequence(input, pos) {
            Ok(width) => {
                deltas += sequence_deltas(width);
                pos += width;
            }
            Err(kind) => return Validation::invalid(len, pos, kind, deltas),
        }
    }

    Validation::valid(len, deltas)
}

/// Position of the first non-ASCII byte at or after `pos`.
#[inline]
fn skip_ascii_run(input: &[u8], pos: usize) -> usize {
    // Single ASCII bytes between multi-byte characters are common; avoid the
    // word setup for them.
    match input.get(pos..pos + 2) {
        Some(&[a, b]) if a < 0x80 && b >= 0x80 => pos + 1,
        _ if input[pos] < 0x80 => pos + first_non_ascii(&input[pos..]),
        _ => pos,
    }
}

/// Check the sequence starting at `pos` and return its width in bytes.
///
/// Errors are always attributed to `pos`.
#[inline]
fn decode_sequence(input: &[u8], pos: usize) -> Result<usize, Utf8ErrorKind> {
    let lead = input[pos];
    match lead {
        0x00..=0x7F => Ok(1),

        // Continuation byte where a lead byte is expected
        0x80..=0xBF => Err(Utf8ErrorKind::TooLong),

        // 2-byte sequence: 0xC0-0xDF
        0xC0..=0xDF => {
            let b1 = continuation(input, pos + 1)?;
            // Lead byte 0xC0 or 0xC1 would encode < 0x80
            let cp = ((lead as u32 & 0x1F) << 6) | (b1 as u32 & 0x3F);
            if cp < 0x80 {
                return Err(Utf8ErrorKind::Overlong);
            }
            Ok(2)
        }

        // 3-byte sequence: 0xE0-0xEF
        0xE0..=0xEF => {
            let b1 = continuation(input, pos + 1)?;
            let b2 = continuation(input, pos + 2)?;
            let cp = ((lead as u32 & 0x0F) << 12) | ((b1 as u32 & 0x3F) << 6) | (b2 as u32 & 0x3F);
            if cp < 0x800 {
                return Err(Utf8ErrorKind::Overlong);
            }
            if (0xD800..=0xDFFF).contains(&cp) {
                return Err(Utf8ErrorKind::Surrogate);
            }
            Ok(3)
        }

        // 4-byte sequence: 0xF0-0xF7
        0xF0..=0xF7 => {
            let b1 = continuation(input, pos + 1)?;
            let b2 = continuation(input, pos + 2)?;
            let b3 = continuation(input, pos + 3)?;
            let cp = ((lead as u32 & 0x07) << 18)
                | ((b1 as u32 & 0x3F) << 12)
                | ((b2 as u32 & 0x3F) << 6)
                | (b3 as u32 & 0x3F);
            if cp < 0x10000 {
                return Err(Utf8ErrorKind::Overlong);
            }
            if cp > 0x10FFFF {
                return Err(Utf8ErrorKind::TooLarge);
            }
            Ok(4)
        }

        // 0xF8-0xFF never appear in UTF-8
        0xF8..=0xFF => Err(Utf8ErrorKind::HeaderBits),
    }
}

/// The continuation byte at `i`; a missing or non-continuation byte makes
/// the enclosing sequence too short.
#[inline(always)]
fn continuation(input: &[u8], i: usize) -> Result<u8, Utf8ErrorKind> {
    match input.get(i) {
        Some(&b) if is_continuation_byte(b) => Ok(b),
        _ => Err(Utf8ErrorKind::TooShort),
    }
}

#[inline(always)]
fn sequence_deltas(width: usize) -> Deltas {
    let (utf16, scalar) = match width {
        2 => (-1, 0),
        3 => (-2, 0),
        4 => (-2, -1),
        _ => (0, 0),
    };
    Deltas { utf16, scalar }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(input: &[u8]) -> Option<Utf8ErrorKind> {
        validate(input).error_kind()
    }

    // =========================================================================
    // Valid UTF-8 Tests
    // =========================================================================

    mod valid_utf8 {
        use super::*;

        #[test]
        fn empty_input() {
            assert!(validate(b"").is_valid());
        }

        #[test]
        fn ascii_single_byte() {
            for byte in 0x00..=0x7F {
                let v = validate(&[byte]);
                assert!(v.is_valid(), "ASCII byte 0x{:02X} should be valid", byte);
                assert_eq!(v.deltas(), Deltas::ZERO);
            }
        }

        #[test]
        fn two_byte_sequences() {
            for input in [&[0xC2, 0x80][..], &[0xC3, 0xBF], &[0xDF, 0xBF]] {
                let v = validate(input);
                assert!(v.is_valid());
                assert_eq!((v.utf16_delta(), v.scalar_delta()), (-1, 0));
            }
        }

        #[test]
        fn three_byte_sequences() {
            assert!(validate(&[0xE0, 0xA0, 0x80]).is_valid()); // U+0800
            assert!(validate(&[0xEF, 0xBF, 0xBF]).is_valid()); // U+FFFF
            assert!(validate(&[0xED, 0x9F, 0xBF]).is_valid()); // U+D7FF
            assert!(validate(&[0xEE, 0x80, 0x80]).is_valid()); // U+E000
            let v = validate("日本語".as_bytes());
            assert_eq!((v.utf16_delta(), v.scalar_delta()), (-6, 0));
        }

        #[test]
        fn four_byte_sequences() {
            assert!(validate(&[0xF0, 0x90, 0x80, 0x80]).is_valid()); // U+10000
            assert!(validate(&[0xF4, 0x8F, 0xBF, 0xBF]).is_valid()); // U+10FFFF
            let v = validate("🎉😀".as_bytes());
            assert_eq!((v.utf16_delta(), v.scalar_delta()), (-4, -2));
        }

        #[test]
        fn mixed_sequences() {
            let text = "Hello! 你好 مرحبا 🌍🚀 Ñoño café";
            let v = validate(text.as_bytes());
            assert!(v.is_valid());
            assert_eq!(v.utf16_len(), Some(text.encode_utf16().count()));
            assert_eq!(v.scalar_len(), Some(text.chars().count()));
        }
    }

    // =========================================================================
    // Invalid Input Tests
    // =========================================================================

    mod invalid_utf8 {
        use super::*;

        #[test]
        fn continuation_byte_as_lead() {
            for byte in 0x80..=0xBF {
                let v = validate(&[byte]);
                assert_eq!(v.error_kind(), Some(Utf8ErrorKind::TooLong));
                assert_eq!(v.offset(), 0);
            }
        }

        #[test]
        fn header_bits() {
            for byte in 0xF8..=0xFF {
                let v = validate(&[b'A', byte]);
                assert_eq!(v.error_kind(), Some(Utf8ErrorKind::HeaderBits));
                assert_eq!(v.offset(), 1);
            }
        }

        #[test]
        fn missing_continuation_reported_at_lead() {
            assert_eq!(validate(&[0xC2, b'A']).offset(), 0);
            assert_eq!(validate(&[b'x', 0xE0, 0xA0, b'A']).offset(), 1);
            assert_eq!(validate(&[0xF0, 0x90, 0x80, b'A']).offset(), 0);
            assert_eq!(kind(&[0xC2, 0xC2]), Some(Utf8ErrorKind::TooShort));
        }

        #[test]
        fn truncated_at_end() {
            for input in [&[0xC2][..], &[0xE0, 0xA0], &[0xF0, 0x90, 0x80]] {
                assert_eq!(kind(input), Some(Utf8ErrorKind::TooShort), "{:02X?}", input);
            }
        }

        #[test]
        fn overlong() {
            for lead in [0xC0, 0xC1] {
                for cont in 0x80..=0xBF {
                    assert_eq!(kind(&[lead, cont]), Some(Utf8ErrorKind::Overlong));
                }
            }
            assert_eq!(kind(&[0xE0, 0x80, 0xAF]), Some(Utf8ErrorKind::Overlong));
            assert_eq!(kind(&[0xE0, 0x9F, 0xBF]), Some(Utf8ErrorKind::Overlong));
            assert_eq!(
                kind(&[0xF0, 0x8F, 0xBF, 0xBF]),
                Some(Utf8ErrorKind::Overlong)
            );
        }

        #[test]
        fn surrogates() {
            for cp in [0xD800u32, 0xDBFF, 0xDC00, 0xDFFF] {
                let bytes = [
                    0xE0 | ((cp >> 12) as u8),
                    0x80 | (((cp >> 6) & 0x3F) as u8),
                    0x80 | ((cp & 0x3F) as u8),
                ];
                assert_eq!(kind(&bytes), Some(Utf8ErrorKind::Surrogate), "U+{:04X}", cp);
            }
        }

        #[test]
        fn too_large() {
            let inputs = [
                [0xF4, 0x90, 0x80, 0x80],
                [0xF7, 0xBF, 0xBF, 0xBF],
                [0xF5, 0x80, 0x80, 0x80],
            ];
            for input in inputs {
                assert_eq!(kind(&input), Some(Utf8ErrorKind::TooLarge));
            }
        }

        #[test]
        fn partial_deltas_stop_at_error() {
            let mut input = "é🎉".as_bytes().to_vec();
            input.extend_from_slice(&[0xED, 0xA0, 0x80]);
            input.extend_from_slice("ü".as_bytes());
            let v = validate(&input);
            assert_eq!(v.offset(), 6);
            assert_eq!((v.utf16_delta(), v.scalar_delta()), (-3, -1));
        }
    }

    // =========================================================================
    // Agreement With std
    // =========================================================================

    #[test]
    fn all_two_byte_inputs_agree_with_std() {
        for b0 in 0..=255u8 {
            for b1 in 0..=255u8 {
                let input = [b0, b1];
                let v = validate(&input);
                match core::str::from_utf8(&input) {
                    Ok(_) => assert!(v.is_valid(), "{:02X?}", input),
                    Err(e) => assert_eq!(v.offset(), e.valid_up_to(), "{:02X?}", input),
                }
            }
        }
    }

    #[test]
    fn ascii_runs_of_every_length() {
        for n in 0..100 {
            let mut input = vec![b'q'; n];
            input.push(0x80);
            assert_eq!(validate(&input).offset(), n);
        }
    }
}
